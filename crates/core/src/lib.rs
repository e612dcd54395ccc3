//! RSP core: a cycle-accurate simulator core for an embedded scalar+vector
//! signal processor.
//!
//! This crate implements:
//! 1. **Core:** the five-stage scalar pipeline (IF/RD/EX/DF/WB), the 8-lane
//!    16-bit vector coprocessor (CP2), and the control coprocessor (CP0).
//! 2. **ISA:** decoding for the MIPS-like scalar encoding and the
//!    vector-compute encoding, plus the bit-field extraction both share.
//! 3. **Simulation:** [`sim::Simulator`], the host-facing memory-mapped
//!    register window wrapping one [`core::Core`].
//!
//! Host bus/DRAM, the companion display processor's internals, microcode
//! loading, and the reciprocal ROM's real contents are out of scope; see
//! `DESIGN.md` for the reasoning behind those boundaries.

/// Shared odds and ends: host-boundary error types.
pub mod common;
/// Simulator configuration (defaults, `Deserialize`-able overrides).
pub mod config;
/// The core's architectural state, execution units, and pipeline.
pub mod core;
/// Instruction set: decode tables and bit-field extraction.
pub mod isa;
/// Simulation: `Simulator`, the host-facing register-window interface.
pub mod sim;
/// Execution statistics collection.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize overrides.
pub use crate::config::Config;
/// The core's pure architectural state and pipeline.
pub use crate::core::Core;
/// Top-level simulator; owns one `Core` behind the host-facing register
/// window.
pub use crate::sim::Simulator;
