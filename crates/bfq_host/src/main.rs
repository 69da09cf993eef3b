mod bench;
mod demo;
mod generator;
mod stats;
mod stream;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Gen {
        #[arg(long, default_value = "bench.plan")]
        plan: String,
        #[arg(long, default_value = "bench.vals")]
        vals: String,
        #[arg(long, default_value_t = 64)]
        capacity: usize,
        #[arg(long, default_value_t = 4)]
        pairs: usize,
        #[arg(long, default_value_t = 1_000_000)]
        ops: usize,
        #[arg(long, default_value_t = 0)]
        push_timeout_ms: u64,
    },
    Demo {
        #[arg(short, long, default_value_t = 5)]
        capacity: usize,
    },
    Bench {
        #[arg(short, long)]
        plan: String,
        #[arg(short, long)]
        vals: String,
    },
    Stream {
        #[arg(short, long, default_value_t = 16)]
        capacity: usize,
        #[arg(short, long, default_value_t = 100_000)]
        freq: u64,
        #[arg(short, long, default_value_t = 10)]
        duration: u64,
        #[arg(long, default_value_t = 5)]
        push_timeout_ms: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Gen {
            plan,
            vals,
            capacity,
            pairs,
            ops,
            push_timeout_ms,
        } => {
            generator::generate_workload(&plan, &vals, capacity, pairs, ops, push_timeout_ms)?;
        }
        Commands::Demo { capacity } => {
            demo::run_demo(capacity)?;
        }
        Commands::Bench { plan, vals } => {
            bench::run_benchmark(&plan, &vals)?;
        }
        Commands::Stream {
            capacity,
            freq,
            duration,
            push_timeout_ms,
        } => {
            stream::run_stream(capacity, freq, duration, push_timeout_ms)?;
        }
    }
    Ok(())
}
