//! I/O utilities for loading queue workload files.
//!
//! Provides functions for reading workload plans (.plan files) and
//! value streams (.vals files) used by the benchmark driver. These
//! utilities handle file format parsing and conversion to internal
//! data structures.

/// Parser for workload plan descriptions in plan format.
///
/// Parses `.plan` files of `key value` lines that describe a benchmark
/// workload: queue capacity, producer/consumer pair count, operation
/// count, and the bounded-push timeout. Constructs WorkloadPlan
/// instances from the parsed fields.
pub mod parser;

/// File loading utilities for benchmark value streams.
///
/// Provides functions for reading binary value data (.vals files) and
/// converting them into internal data structures. Handles file I/O,
/// byte order conversion, and data validation.
pub mod loader;
