use anyhow::{Context, Result, ensure};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Loads a `.vals` file (binary value data, little-endian i64).
pub fn load_value_file<P: AsRef<Path>>(path: P) -> Result<Vec<i64>> {
    let mut file = File::open(path).context("Failed to open .vals file")?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;

    ensure!(
        buffer.len() % 8 == 0,
        "value file length {} is not a multiple of 8",
        buffer.len()
    );

    let mut values = Vec::with_capacity(buffer.len() / 8);
    for chunk in buffer.chunks_exact(8) {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        values.push(i64::from_le_bytes(word));
    }

    Ok(values)
}

/// Splits a value stream into equal per-pair batches.
///
/// Each of the `pairs` batches receives `values.len() / pairs` values;
/// any trailing remainder is dropped, matching the benchmark's
/// whole-batch accounting.
pub fn slice_batches(values: &[i64], pairs: usize) -> Vec<Vec<i64>> {
    let batch_len = values.len() / pairs;
    let mut batches = Vec::with_capacity(pairs);

    for i in 0..pairs {
        let start = i * batch_len;
        batches.push(values[start..start + batch_len].to_vec());
    }

    batches
}
