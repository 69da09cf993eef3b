use anyhow::{Context, Result};
use bfq_core::fifo::Fifo;
use bfq_io::{loader, parser};
use rayon::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

struct PairOutcome {
    moved: u64,
    timeouts: u64,
    checksum_ok: bool,
}

pub fn run_benchmark(plan_path: &str, vals_path: &str) -> Result<()> {
    println!("Loading plan from {}...", plan_path);
    let plan = parser::load_plan_file(plan_path)?;
    println!(
        "Plan: capacity {}, {} pairs, {} ops, push timeout {} ms",
        plan.capacity, plan.pairs, plan.ops, plan.push_timeout_ms
    );

    println!("Loading values from {}...", vals_path);
    let values = loader::load_value_file(vals_path)?;
    println!("Loaded {} values.", values.len());
    if values.len() != plan.ops {
        println!(
            "WARNING: plan expects {} ops, value file holds {}.",
            plan.ops,
            values.len()
        );
    }

    let batches = loader::slice_batches(&values, plan.pairs);

    println!("Starting Benchmark (Parallel - Rayon)...");
    let start_bench = Instant::now();

    let outcomes: Vec<PairOutcome> = batches
        .par_iter()
        .map(|batch| run_pair(plan.capacity, plan.push_timeout_ms, batch))
        .collect::<Result<_>>()?;

    let duration = start_bench.elapsed();
    let seconds = duration.as_secs_f64();

    let moved: u64 = outcomes.iter().map(|o| o.moved).sum();
    let timeouts: u64 = outcomes.iter().map(|o| o.timeouts).sum();
    let verified = outcomes.iter().filter(|o| o.checksum_ok).count();
    let throughput = moved as f64 / seconds;

    println!("Results");
    println!("Time: {:.4} s", seconds);
    println!("Throughput: {:.2} values/s", throughput);
    println!("Push timeouts (retried): {}", timeouts);
    println!("Verified: {}/{}", verified, outcomes.len());

    Ok(())
}

/// Drives one batch through a fresh queue: the consumer runs on its
/// own thread popping exactly `batch.len()` values while the rayon
/// worker produces. A bounded push that times out is retried until
/// the value lands, so the checksum always covers the whole batch.
fn run_pair(capacity: usize, push_timeout_ms: u64, batch: &[i64]) -> Result<PairOutcome> {
    let fifo = Arc::new(Fifo::<i64>::new(capacity));
    let expected: i64 = batch.iter().fold(0i64, |acc, v| acc.wrapping_add(*v));
    let n = batch.len();

    let consumer = {
        let fifo = Arc::clone(&fifo);
        thread::spawn(move || -> Result<i64, bfq_core::FifoError> {
            let mut sum = 0i64;
            for _ in 0..n {
                sum = sum.wrapping_add(fifo.pop()?);
            }
            Ok(sum)
        })
    };

    let mut timeouts = 0u64;
    for &value in batch {
        if push_timeout_ms == 0 {
            fifo.push(value).context("queue closed mid-benchmark")?;
        } else {
            while !fifo
                .push_timeout(value, push_timeout_ms)
                .context("queue closed mid-benchmark")?
            {
                timeouts += 1;
            }
        }
    }

    let sum = consumer
        .join()
        .expect("consumer thread panicked")
        .context("queue closed mid-benchmark")?;

    Ok(PairOutcome {
        moved: n as u64,
        timeouts,
        checksum_ok: sum == expected,
    })
}
