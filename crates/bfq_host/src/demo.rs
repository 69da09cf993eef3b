//! Scripted demonstration of the blocking FIFO contract.
//!
//! Walks the queue through its public operations with printed state
//! checks: snapshot reads, blocking adds and removes, the bounded push
//! timing out against a full queue, a background remover draining the
//! queue while the main thread waits for empty, and a scoped
//! multi-call section.

use anyhow::{Result, ensure};
use bfq_core::fifo::Fifo;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub fn run_demo(capacity: usize) -> Result<()> {
    ensure!(capacity >= 3, "demo needs a capacity of at least 3");
    simple_check(capacity)?;
    timeout_check()?;
    atomic_check()?;
    empty_check(capacity)?;
    Ok(())
}

/// Fill and drain a few values, printing the snapshots in between.
fn simple_check(capacity: usize) -> Result<()> {
    println!("SIMPLE CHECK (capacity {})", capacity);
    let fifo = Fifo::<i64>::new(capacity);

    print_state(&fifo); // expect: empty=true full=false len=0

    fifo.push(5)?;
    fifo.push(7)?;
    fifo.push(3)?;
    print_state(&fifo); // expect: empty=false full=false len=3

    println!("fifo.pop() = {}", fifo.pop()?);
    println!("fifo.pop() = {}", fifo.pop()?);
    println!("fifo.pop() = {}", fifo.pop()?);
    print_state(&fifo); // expect: empty=true full=false len=0

    println!();
    Ok(())
}

/// A bounded push against a full capacity-1 queue: first left to
/// expire, then rescued by a pop partway through the bound.
fn timeout_check() -> Result<()> {
    println!("TIMEOUT CHECK (capacity 1)");
    let fifo = Arc::new(Fifo::<i64>::new(1));
    fifo.push(1)?;

    let start = Instant::now();
    let stored = fifo.push_timeout(2, 500)?;
    println!(
        "push_timeout(2, 500) with no remover -> {} after {:?}",
        stored,
        start.elapsed()
    );

    let remover = {
        let fifo = Arc::clone(&fifo);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            fifo.pop()
        })
    };

    let start = Instant::now();
    let stored = fifo.push_timeout(2, 500)?;
    println!(
        "push_timeout(2, 500) with pop at 100 ms -> {} after {:?}",
        stored,
        start.elapsed()
    );
    println!("remover got {}", remover.join().unwrap()?);

    println!("fifo.pop() = {}", fifo.pop()?);
    println!();
    Ok(())
}

/// A check-then-act sequence under the scoped guard: no other thread
/// can interleave between the drain and the refill.
fn atomic_check() -> Result<()> {
    println!("ATOMIC SECTION CHECK (capacity 4)");
    let fifo = Fifo::<i64>::new(4);
    fifo.push(11)?;
    fifo.push(22)?;

    let mut guard = fifo.lock();
    let mut drained = 0;
    while let Some(v) = guard.try_pop() {
        println!("guard.try_pop() = {}", v);
        drained += 1;
    }
    guard.try_push(drained);
    drop(guard);

    println!("fifo.pop() = {}", fifo.pop()?);
    println!();
    Ok(())
}

/// The remover thread drains one value per tick while the main thread
/// blocks in wait_until_empty, then the close releases the remover.
fn empty_check(capacity: usize) -> Result<()> {
    println!("EMPTY CHECK (capacity {})", capacity);
    let fifo = Arc::new(Fifo::<i64>::new(capacity));
    fifo.push(10)?;
    fifo.push(20)?;
    fifo.push(30)?;

    let remover = {
        let fifo = Arc::clone(&fifo);
        thread::spawn(move || {
            while let Ok(value) = fifo.pop() {
                println!("[remover] fifo.pop() = {}", value);
                thread::sleep(Duration::from_millis(200));
            }
            // pop reported Closed: the demo is over
        })
    };

    let start = Instant::now();
    fifo.wait_until_empty()?;
    println!(
        "Yay! It's empty - after waiting {:.5} seconds",
        start.elapsed().as_secs_f64()
    );

    fifo.close();
    remover.join().unwrap();
    Ok(())
}

fn print_state(fifo: &Fifo<i64>) {
    println!("fifo.is_empty() = {}", fifo.is_empty());
    println!("fifo.is_full()  = {}", fifo.is_full());
    println!("fifo.len()      = {}", fifo.len());
}
