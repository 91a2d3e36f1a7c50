use clap::Parser;

use crate::config::{DEFAULT_INDEX, DEFAULT_SCHEME, ServeConfig};

#[derive(Parser, Debug)]
#[command(name = "zipserve")]
#[command(version)]
#[command(about = "Random-access ZIP reader that serves archive members on demand", long_about = None)]
#[command(after_help = "Examples:\n  \
  zipserve site.zip -l                       list entries in sorted order\n  \
  zipserve -p site.zip index.html | less     send one entry to stdout\n  \
  zipserve site.zip -r / /app.js /missing    show the response for each request")]
pub struct Cli {
    /// ZIP file path
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Entries to extract, or requests to answer with -r (default: all)
    #[arg(value_name = "PATHS")]
    pub paths: Vec<String>,

    /// List files (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List verbosely and enable debug logging
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Extract files to pipe, no messages
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Answer each PATH as a resource request and print the response head
    #[arg(short = 'r')]
    pub respond: bool,

    /// Extract files into exdir
    #[arg(short = 'd', value_name = "DIR")]
    pub extract_dir: Option<String>,

    /// Exclude files that follow
    #[arg(short = 'x', value_name = "FILE", num_args = 1..)]
    pub exclude: Vec<String>,

    /// Never overwrite existing files
    #[arg(short = 'n')]
    pub never_overwrite: bool,

    /// Overwrite files WITHOUT prompting
    #[arg(short = 'o')]
    pub overwrite: bool,

    /// Junk paths (do not make directories)
    #[arg(short = 'j')]
    pub junk_paths: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Entry served for an empty request path
    #[arg(long, value_name = "NAME", env = "ZIPSERVE_INDEX", default_value = DEFAULT_INDEX)]
    pub index: String,

    /// URL scheme accepted by -r
    #[arg(long, value_name = "NAME", env = "ZIPSERVE_SCHEME", default_value = DEFAULT_SCHEME)]
    pub scheme: String,

    /// Content type override, e.g. --mime wasm=application/wasm
    #[arg(long, value_name = "EXT=TYPE", value_parser = parse_mime_override)]
    pub mime: Vec<(String, String)>,

    /// Skip CRC-32 verification of extracted data
    #[arg(long)]
    pub no_verify: bool,
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.pipe
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.is_very_quiet() {
            "error"
        } else if self.quiet > 0 {
            "warn"
        } else {
            "info"
        }
    }

    pub fn serve_config(&self) -> ServeConfig {
        let mut config = ServeConfig {
            scheme: self.scheme.clone(),
            default_index: Some(self.index.clone()).filter(|i| !i.is_empty()),
            verify_checksums: !self.no_verify,
            ..ServeConfig::default()
        };
        for (ext, mime) in &self.mime {
            config = config.with_mime_override(ext, mime.clone());
        }
        config
    }
}

fn parse_mime_override(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((ext, mime)) if !ext.is_empty() && !mime.is_empty() => {
            Ok((ext.to_string(), mime.to_string()))
        }
        _ => Err(format!("expected EXT=TYPE, got '{s}'")),
    }
}
