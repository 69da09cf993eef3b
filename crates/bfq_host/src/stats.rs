//! Handoff latency tracking for the streaming driver.
//!
//! Collects enqueue-to-dequeue latency measurements on the consumer
//! thread and reports summary statistics: minimum, maximum, average,
//! an estimated 99th percentile, and a bucketed distribution.

/// Tracks queue handoff latency with minimal overhead.
///
/// Accumulates nanosecond measurements into running min/max/sum
/// counters and a fixed histogram of 5 microsecond buckets, with the
/// last bucket absorbing everything slower. Designed for per-value
/// updates on the consumer's hot path.
pub struct HandoffStats {
    min_ns: u64,
    max_ns: u64,
    sum_ns: u64,
    count: u64,
    buckets: [u64; 32],
}

const BUCKET_WIDTH_NS: u64 = 5_000;

impl HandoffStats {
    pub fn new() -> Self {
        Self {
            min_ns: u64::MAX,
            max_ns: 0,
            sum_ns: 0,
            count: 0,
            buckets: [0; 32],
        }
    }

    /// Records one handoff latency in nanoseconds.
    pub fn update(&mut self, nanos: u64) {
        if nanos < self.min_ns {
            self.min_ns = nanos;
        }
        if nanos > self.max_ns {
            self.max_ns = nanos;
        }
        self.sum_ns += nanos;
        self.count += 1;

        let idx = (nanos / BUCKET_WIDTH_NS).min(31) as usize;
        self.buckets[idx] += 1;
    }

    pub fn avg_ns(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum_ns as f64 / self.count as f64
        }
    }

    /// Estimates the 99th percentile from the histogram.
    ///
    /// Returns the upper bound of the bucket containing the 99th
    /// percentile sample, in nanoseconds. The last bucket is
    /// unbounded, so estimates beyond it saturate at the observed max.
    pub fn p99_ns(&self) -> u64 {
        if self.count == 0 {
            return 0;
        }
        let threshold = (self.count as f64 * 0.99).ceil() as u64;
        let mut seen = 0;
        for (idx, &bucket) in self.buckets.iter().enumerate() {
            seen += bucket;
            if seen >= threshold {
                if idx == 31 {
                    return self.max_ns;
                }
                return (idx as u64 + 1) * BUCKET_WIDTH_NS;
            }
        }
        self.max_ns
    }

    /// Prints a formatted latency report with distribution.
    pub fn print_report(&self) {
        println!("\nHandoff Latency (enqueue to dequeue)");
        println!("Count: {}", self.count);
        if self.count == 0 {
            return;
        }

        let avg_ns = self.avg_ns();
        if avg_ns < 1000.0 {
            println!("Min:   {:.2} ns", self.min_ns as f64);
            println!("Avg:   {:.2} ns", avg_ns);
            println!("Max:   {:.2} ns", self.max_ns as f64);
            println!("p99:   {:.2} ns", self.p99_ns() as f64);
        } else {
            println!("Min:   {:.2} us", self.min_ns as f64 / 1000.0);
            println!("Avg:   {:.2} us", avg_ns / 1000.0);
            println!("Max:   {:.2} us", self.max_ns as f64 / 1000.0);
            println!("p99:   {:.2} us", self.p99_ns() as f64 / 1000.0);
        }

        println!("Distribution (5us buckets):");
        for (idx, &count) in self.buckets.iter().enumerate() {
            if count > 0 {
                let lower = idx as u64 * BUCKET_WIDTH_NS / 1000;
                let upper = (idx as u64 + 1) * BUCKET_WIDTH_NS / 1000;
                let overflow = if idx == 31 { ">" } else { "" };
                println!("[{:3}-{:3}{} us]: {}", lower, upper, overflow, count);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_min_avg_max() {
        let mut stats = HandoffStats::new();
        stats.update(1_000);
        stats.update(3_000);
        stats.update(2_000);

        assert_eq!(stats.min_ns, 1_000);
        assert_eq!(stats.max_ns, 3_000);
        assert_eq!(stats.avg_ns(), 2_000.0);
    }

    #[test]
    fn p99_ignores_a_lone_outlier() {
        let mut stats = HandoffStats::new();
        for _ in 0..99 {
            stats.update(1_000); // bucket 0
        }
        stats.update(42_000); // bucket 8

        // 99 of 100 samples sit in the first bucket.
        assert_eq!(stats.p99_ns(), 5_000);
    }

    #[test]
    fn p99_lands_in_the_slow_bucket() {
        let mut stats = HandoffStats::new();
        for _ in 0..98 {
            stats.update(1_000); // bucket 0
        }
        stats.update(42_000); // bucket 8
        stats.update(43_000); // bucket 8

        assert_eq!(stats.p99_ns(), 45_000);
    }

    #[test]
    fn empty_stats_report_zeroes() {
        let stats = HandoffStats::new();
        assert_eq!(stats.avg_ns(), 0.0);
        assert_eq!(stats.p99_ns(), 0);
    }
}
