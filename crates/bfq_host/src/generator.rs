//! Workload generator for queue benchmarks.
//!
//! Produces a workload plan (.plan file) describing the queue and
//! thread configuration, and a deterministic stream of values
//! (.vals file) for producers to push through it. The value stream
//! comes from a fixed-seed xorshift generator so repeated runs
//! benchmark identical workloads.

use anyhow::Result;
use std::fs::File;
use std::io::{BufWriter, Write};

/// Generates a benchmark workload plan and value stream.
///
/// Writes the plan as `key value` text lines and the values as raw
/// little-endian i64 words. Values are buffered and flushed in large
/// blocks so generation stays I/O bound only at the margins.
///
/// # Arguments
///
/// * `plan_path` - Output path for the workload plan (.plan file)
/// * `vals_path` - Output path for the value stream (.vals file)
/// * `capacity` - Queue capacity each producer/consumer pair runs against
/// * `pairs` - Number of independent producer/consumer pairs
/// * `ops` - Total number of values to generate
/// * `push_timeout_ms` - Bounded-push timeout for producers (0 = wait forever)
///
/// # Returns
///
/// Ok(()) on success, or an error if file I/O fails.
pub fn generate_workload(
    plan_path: &str,
    vals_path: &str,
    capacity: usize,
    pairs: usize,
    ops: usize,
    push_timeout_ms: u64,
) -> Result<()> {
    println!(
        "Generating workload: {} ops across {} pairs (capacity {})...",
        ops, pairs, capacity
    );

    let mut plan_file = BufWriter::new(File::create(plan_path)?);
    writeln!(plan_file, "# bounded fifo workload plan")?;
    writeln!(plan_file, "capacity {}", capacity)?;
    writeln!(plan_file, "pairs {}", pairs)?;
    writeln!(plan_file, "ops {}", ops)?;
    writeln!(plan_file, "push_timeout_ms {}", push_timeout_ms)?;
    plan_file.flush()?;

    let mut state: u64 = 12345;
    let mut rng = move || {
        state ^= state >> 12;
        state ^= state << 25;
        state ^= state >> 27;
        state.wrapping_mul(0x2545F4914F6CDD1D)
    };

    let mut vals_file = BufWriter::new(File::create(vals_path)?);
    let mut buffer = Vec::with_capacity(1024 * 1024 + 8);

    for _ in 0..ops {
        // Shift keeps values non-negative so checksums stay readable.
        let value = (rng() >> 1) as i64;
        buffer.extend_from_slice(&value.to_le_bytes());

        if buffer.len() >= 1024 * 1024 {
            vals_file.write_all(&buffer)?;
            buffer.clear();
        }
    }
    vals_file.write_all(&buffer)?;

    println!("Done.");
    Ok(())
}
