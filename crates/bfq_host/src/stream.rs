use crate::stats::HandoffStats;
use anyhow::{Result, ensure};
use bfq_core::fifo::Fifo;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

pub struct StreamStats {
    pub produced: Arc<AtomicU64>,
    pub consumed: Arc<AtomicU64>,
    pub rejected: Arc<AtomicU64>,
    pub latency_us: Arc<AtomicU64>,
}

pub fn run_stream(
    capacity: usize,
    freq: u64,
    duration_secs: u64,
    push_timeout_ms: u64,
) -> Result<()> {
    ensure!(freq > 0, "freq must be positive");

    println!("FIFO STREAMING");
    println!("Capacity: {}", capacity);
    println!("Target Freq: {} Hz", freq);
    println!("Duration: {} s", duration_secs);
    println!("Push Timeout: {} ms", push_timeout_ms);
    println!("-------------------------------");

    let stats = StreamStats {
        produced: Arc::new(AtomicU64::new(0)),
        consumed: Arc::new(AtomicU64::new(0)),
        rejected: Arc::new(AtomicU64::new(0)),
        latency_us: Arc::new(AtomicU64::new(0)),
    };

    let fifo = Arc::new(Fifo::<i64>::new(capacity));
    let epoch = Instant::now();

    let f_cons = fifo.clone();
    let s_cons = stats.consumed.clone();
    let l_cons = stats.latency_us.clone();

    // Values on the queue are producer-side timestamps (nanoseconds
    // since the epoch), so each pop yields its own handoff latency.
    let consumer = thread::spawn(move || {
        let mut lat_stats = HandoffStats::new();

        while let Ok(stamp_ns) = f_cons.pop() {
            let now_ns = epoch.elapsed().as_nanos() as i64;
            let lat_ns = now_ns.saturating_sub(stamp_ns).max(0) as u64;

            s_cons.fetch_add(1, Ordering::Relaxed);
            l_cons.store(lat_ns / 1000, Ordering::Relaxed);
            lat_stats.update(lat_ns);
        }
        // pop reported Closed: drain is complete
        lat_stats.print_report();
    });

    let f_prod = fifo.clone();
    let s_prod = stats.produced.clone();
    let s_rej = stats.rejected.clone();

    let producer = thread::spawn(move || {
        let interval = Duration::from_micros(1_000_000 / freq);

        // A push whose room already exists succeeds even on a closed
        // queue, so the close flag itself is the stop condition.
        while !f_prod.is_closed() {
            let start = Instant::now();
            let stamp_ns = epoch.elapsed().as_nanos() as i64;

            match f_prod.push_timeout(stamp_ns, push_timeout_ms) {
                Ok(true) => {
                    s_prod.fetch_add(1, Ordering::Relaxed);
                }
                Ok(false) => {
                    s_rej.fetch_add(1, Ordering::Relaxed);
                }
                Err(_) => break, // closed: stop producing
            }

            while start.elapsed() < interval {
                std::hint::spin_loop();
            }
        }
    });

    let start_time = Instant::now();
    let mut last_consumed = 0;

    while start_time.elapsed().as_secs() < duration_secs {
        thread::sleep(Duration::from_secs(1));
        let prod = stats.produced.load(Ordering::Relaxed);
        let cons = stats.consumed.load(Ordering::Relaxed);
        let rej = stats.rejected.load(Ordering::Relaxed);
        let lat = stats.latency_us.load(Ordering::Relaxed);

        let tput = cons - last_consumed;
        last_consumed = cons;

        println!(
            "T={:2}s | Prod: {:8} | Cons: {:8} ({:5}/s) | Rej: {:5} | Latency: {:3} us | Backlog: {:3}",
            start_time.elapsed().as_secs(),
            prod,
            cons,
            tput,
            rej,
            lat,
            fifo.len()
        );
    }

    // Closing the queue is the shutdown signal: the producer's next
    // push aborts, the consumer drains what is left and then stops.
    fifo.close();
    producer.join().unwrap();
    consumer.join().unwrap();

    println!("Done.");
    Ok(())
}
