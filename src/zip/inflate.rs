//! Raw deflate decompression for method 8 entries.

use flate2::{Decompress, FlushDecompress, Status};

use crate::error::{Error, Result};

/// Output produced per decoder call.
pub const CHUNK_SIZE: usize = 32 * 1024;

/// Upper bound on decoder calls; enough chunks for the largest 32-bit entry.
pub const MAX_ITERATIONS: usize = (u32::MAX as usize / CHUNK_SIZE) + 2;

/// Decompress a complete raw deflate stream.
///
/// `size_hint` only pre-sizes the output and is capped relative to the input.
/// Fails if the decoder reports an error, stops making progress before the
/// end-of-stream marker, or exceeds [`MAX_ITERATIONS`].
pub fn inflate(input: &[u8], size_hint: usize) -> Result<Vec<u8>> {
    inflate_bounded(input, size_hint, MAX_ITERATIONS)
}

fn inflate_bounded(input: &[u8], size_hint: usize, max_iterations: usize) -> Result<Vec<u8>> {
    let mut decoder = Decompress::new(false);
    let mut output = Vec::with_capacity(initial_capacity(input.len(), size_hint));
    let mut chunk = vec![0u8; CHUNK_SIZE];

    for _ in 0..max_iterations {
        let consumed = decoder.total_in() as usize;
        let produced_before = decoder.total_out();

        let status = decoder
            .decompress(&input[consumed..], &mut chunk, FlushDecompress::None)
            .map_err(|e| Error::Decompression(e.to_string()))?;

        let produced = (decoder.total_out() - produced_before) as usize;
        output.extend_from_slice(&chunk[..produced]);

        match status {
            Status::StreamEnd => return Ok(output),
            Status::Ok | Status::BufError => {
                if produced == 0 && decoder.total_in() as usize == consumed {
                    return Err(Error::Decompression(format!(
                        "deflate stream ended early after {} of {} input bytes",
                        consumed,
                        input.len()
                    )));
                }
            }
        }
    }

    Err(Error::Decompression(format!(
        "deflate stream did not finish within {max_iterations} iterations"
    )))
}

/// Declared sizes come from the archive; never trust them for more than a
/// modest head start.
fn initial_capacity(input_len: usize, size_hint: usize) -> usize {
    size_hint
        .min(input_len.saturating_mul(4))
        .min(CHUNK_SIZE * 32)
}
