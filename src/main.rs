//! Main entry point for the zipserve CLI application.
//!
//! Lists, extracts or serves entries of a local ZIP archive. Extractions of
//! several entries run concurrently against one shared archive handle.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use zipserve::{Cli, LocalFileReader, Responder, ServeConfig, ZipArchive, ZipEntry, logging};

type Archive = Arc<ZipArchive<LocalFileReader>>;

/// Application entry point.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level());

    let config = cli.serve_config();
    let archive = Arc::new(open_archive(&cli.file, &config)?);
    info!(file = %cli.file, entries = archive.index().len(), "opened archive");

    if cli.respond {
        return respond(archive, &cli, &config).await;
    }

    // List mode: display archive contents and exit
    if cli.list || cli.verbose {
        list_files(&archive, cli.verbose);
        return Ok(());
    }

    process_zip(archive, &cli).await
}

fn open_archive(file: &str, config: &ServeConfig) -> Result<ZipArchive<LocalFileReader>> {
    let mut archive = ZipArchive::open(file)
        .with_context(|| format!("cannot open archive {file}"))?
        .with_checksum_verification(config.verify_checksums);
    if let Some(index) = &config.default_index {
        archive = archive.with_default_name(index.clone());
    }
    Ok(archive)
}

/// Extract the entries selected by the command line.
async fn process_zip(archive: Archive, cli: &Cli) -> Result<()> {
    // Apply filters to determine which files to extract:
    // 1. Skip directories (they are created automatically during extraction)
    // 2. If specific files are requested, only include matching entries
    // 3. Exclude files matching the exclusion patterns
    let files_to_extract: Vec<ZipEntry> = archive
        .list()
        .into_iter()
        .filter_map(|name| archive.index().get(name))
        .filter(|e| {
            if e.is_directory() {
                return false;
            }

            if !cli.paths.is_empty() {
                let matches = cli.paths.iter().any(|f| {
                    let f = f.strip_prefix('/').unwrap_or(f.as_str());
                    if has_glob_chars(f) {
                        glob_match(f, &e.name)
                    } else {
                        // No wildcards: exact match on filename or full path
                        let basename = Path::new(&e.name)
                            .file_name()
                            .map(|s| s.to_string_lossy())
                            .unwrap_or_default();
                        e.name == f || basename == f
                    }
                });
                if !matches {
                    return false;
                }
            }

            !cli.exclude
                .iter()
                .any(|x| e.name.contains(x.as_str()) || glob_match(x, &e.name))
        })
        .cloned()
        .collect();

    if cli.pipe {
        let show_filename = files_to_extract.len() > 1;
        for entry in files_to_extract {
            pipe_file(&archive, entry, show_filename).await?;
        }
        return Ok(());
    }

    let mut tasks = JoinSet::new();
    for entry in files_to_extract {
        let Some(output_path) = output_path_for(&entry, cli) else {
            continue;
        };

        if !cli.is_quiet() {
            println!("  extracting: {}", entry.name);
        }

        let archive = Arc::clone(&archive);
        tasks.spawn(async move {
            let name = entry.name.clone();
            let data = tokio::task::spawn_blocking(move || archive.extract_entry(&entry))
                .await?
                .with_context(|| format!("failed to extract {name}"))?;
            write_file(&output_path, &data).await?;
            debug!(name = %name, bytes = data.len(), "wrote entry");
            Ok::<_, anyhow::Error>(())
        });
    }

    while let Some(result) = tasks.join_next().await {
        result??;
    }

    Ok(())
}

/// Decide where an entry goes, or `None` to skip it.
///
/// Handles -d (output directory), -j (junk paths) and the -n/-o overwrite
/// options.
fn output_path_for(entry: &ZipEntry, cli: &Cli) -> Option<PathBuf> {
    // Names with `..` or a root would land outside the output directory
    let Some(enclosed) = entry.enclosed_path() else {
        warn!(name = %entry.name, "skipping entry with unsafe path");
        return None;
    };

    let file_name = if cli.junk_paths {
        // Junk paths: use only the base filename, ignore directory structure
        enclosed.file_name().map(Path::new).unwrap_or(enclosed)
    } else {
        enclosed
    };

    let output_path = match &cli.extract_dir {
        Some(dir) => PathBuf::from(dir).join(file_name),
        None => file_name.to_path_buf(),
    };

    if output_path.exists() {
        if cli.never_overwrite {
            if !cli.is_quiet() {
                eprintln!("Skipping: {} (file exists)", entry.name);
            }
            return None;
        }

        if !cli.overwrite {
            if !cli.is_quiet() {
                eprintln!("Skipping: {} (use -o to overwrite)", entry.name);
            }
            return None;
        }
    }

    Some(output_path)
}

async fn write_file(output_path: &Path, data: &[u8]) -> Result<()> {
    // Create parent directories if needed
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let mut file = tokio::fs::File::create(output_path)
        .await
        .with_context(|| format!("cannot create {}", output_path.display()))?;
    file.write_all(data).await?;

    Ok(())
}

/// Write one entry to stdout, preceded by a marker when piping several.
async fn pipe_file(archive: &Archive, entry: ZipEntry, show_filename: bool) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    if show_filename {
        stdout
            .write_all(format!("--- {} ---\n", entry.name).as_bytes())
            .await?;
    }

    let name = entry.name.clone();
    let archive = Arc::clone(archive);
    let data = tokio::task::spawn_blocking(move || archive.extract_entry(&entry))
        .await?
        .with_context(|| format!("failed to extract {name}"))?;

    stdout.write_all(&data).await?;
    stdout.flush().await?;
    Ok(())
}

/// Answer each request concurrently, the way a page load fans out, and
/// print the responses in request order.
async fn respond(archive: Archive, cli: &Cli, config: &ServeConfig) -> Result<()> {
    let responder = Arc::new(Responder::new(archive, config));
    let requests = if cli.paths.is_empty() {
        vec![String::new()]
    } else {
        cli.paths.clone()
    };

    let handles: Vec<_> = requests
        .iter()
        .cloned()
        .map(|request| {
            let responder = Arc::clone(&responder);
            tokio::task::spawn_blocking(move || responder.respond(&request))
        })
        .collect();

    for (request, handle) in requests.iter().zip(handles) {
        let response = handle.await?;
        println!("{} {}", response.status, request);
        for (name, value) in &response.headers {
            println!("  {name}: {value}");
        }
        if response.is_success() {
            println!("  ({})", format_size(response.body.len() as u64));
        }
    }

    Ok(())
}

/// List files in the ZIP archive in sorted order.
///
/// Supports two output formats:
/// - Simple format (`-l`): Just file names, one per line
/// - Verbose format (`-v`): Detailed table with size, compression ratio, and timestamps
fn list_files(archive: &Archive, verbose: bool) {
    if verbose {
        println!(
            "{:>10}  {:>10}  {:>5}  {:>10}  {:>5}  Name",
            "Length", "Size", "Cmpr", "Date", "Time"
        );
        println!("{}", "-".repeat(70));
    }

    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    for name in archive.list() {
        if !verbose {
            println!("{name}");
            continue;
        }
        let Some(entry) = archive.index().get(name) else {
            continue;
        };

        let (year, month, day) = entry.mod_date();
        let (hour, minute, _second) = entry.mod_time();
        let uncompressed = entry.uncompressed_size as u64;
        let compressed = entry.compressed_size as u64;

        println!(
            "{:>10}  {:>10}  {}  {:04}-{:02}-{:02}  {:02}:{:02}  {}",
            uncompressed,
            compressed,
            ratio(compressed, uncompressed),
            year,
            month,
            day,
            hour,
            minute,
            entry.name
        );

        if !entry.is_directory() {
            total_uncompressed += uncompressed;
            total_compressed += compressed;
            file_count += 1;
        }
    }

    if verbose {
        println!("{}", "-".repeat(70));
        println!(
            "{:>10}  {:>10}  {}  {:>21}  {} files",
            total_uncompressed,
            total_compressed,
            ratio(total_compressed, total_uncompressed),
            "",
            file_count
        );
    }
}

/// Compression ratio as percentage saved.
fn ratio(compressed: u64, uncompressed: u64) -> String {
    if uncompressed > 0 {
        format!(
            "{:>4}%",
            100u64.saturating_sub(compressed * 100 / uncompressed)
        )
    } else {
        "  0%".to_string()
    }
}

/// Check if a pattern contains glob wildcard characters.
fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Simple glob pattern matching supporting `*` and `?` wildcards.
///
/// - `*` matches zero or more characters
/// - `?` matches exactly one character
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern_chars: Vec<char> = pattern.chars().collect();
    let text_chars: Vec<char> = text.chars().collect();

    fn do_match(pattern: &[char], text: &[char]) -> bool {
        match (pattern.first(), text.first()) {
            (None, None) => true,
            // Star matches zero characters, or one and stays for more
            (Some('*'), _) => {
                do_match(&pattern[1..], text) || (!text.is_empty() && do_match(pattern, &text[1..]))
            }
            (Some('?'), Some(_)) => do_match(&pattern[1..], &text[1..]),
            (Some(p), Some(t)) if *p == *t => do_match(&pattern[1..], &text[1..]),
            _ => false,
        }
    }

    do_match(&pattern_chars, &text_chars)
}

/// Format a byte size into a human-readable string.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
