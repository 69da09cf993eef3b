//! Parser for workload plan files.
//!
//! A plan is a plain text file of `key value` lines with `#` comments.
//! Unknown keys are skipped so older drivers can read newer plans;
//! known keys with unparseable values are reported as errors.

use anyhow::{Context, Result, anyhow, ensure};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

/// Workload parameters for the benchmark driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadPlan {
    /// Queue capacity each producer/consumer pair runs against.
    pub capacity: usize,
    /// Number of independent producer/consumer pairs.
    pub pairs: usize,
    /// Total number of values in the accompanying value file.
    pub ops: usize,
    /// Bounded-push timeout in milliseconds; zero means producers
    /// wait indefinitely (the queue's sentinel).
    pub push_timeout_ms: u64,
}

impl Default for WorkloadPlan {
    fn default() -> Self {
        Self {
            capacity: 64,
            pairs: 4,
            ops: 100_000,
            push_timeout_ms: 0,
        }
    }
}

/// Loads a `.plan` file and constructs a WorkloadPlan.
///
/// Missing keys keep their defaults. Blank lines and lines starting
/// with `#` are skipped.
///
/// # Arguments
///
/// * `path` - Path to the .plan file
///
/// # Returns
///
/// A WorkloadPlan with all recognized fields applied, or an error if
/// the file cannot be read or a known field has an invalid value.
pub fn load_plan_file<P: AsRef<Path>>(path: P) -> Result<WorkloadPlan> {
    let file = File::open(path).context("Failed to open .plan file")?;
    let reader = BufReader::new(file);

    let mut plan = WorkloadPlan::default();

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };

        match key {
            "capacity" => plan.capacity = parse_field(key, value)?,
            "pairs" => plan.pairs = parse_field(key, value)?,
            "ops" => plan.ops = parse_field(key, value)?,
            "push_timeout_ms" => plan.push_timeout_ms = parse_field(key, value)?,
            _ => {}
        }
    }

    ensure!(plan.capacity > 0, "plan capacity must be positive");
    ensure!(plan.pairs > 0, "plan pairs must be positive");

    Ok(plan)
}

fn parse_field<F: FromStr>(key: &str, value: &str) -> Result<F> {
    value
        .parse::<F>()
        .map_err(|_| anyhow!("invalid value {:?} for plan key {:?}", value, key))
}
