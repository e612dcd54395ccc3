//! Host-boundary error types.
//!
//! Instruction execution itself never fails (see the crate-level docs on the
//! no-trap taxonomy): an invalid opcode becomes a no-op, an out-of-range
//! address is masked, and so on. [`CoreError`] exists one layer up, for a
//! host misusing the memory-mapped interface in [`crate::sim::Simulator`] —
//! core-internal conditions are always handled silently, while a `Result`
//! only ever surfaces at the host/loader boundary.

use thiserror::Error;

/// Conditions that can only arise from a host driving the register-window
/// interface incorrectly.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    /// A word-sized register-window access was not 4-byte aligned.
    #[error("unaligned register-window access at offset {0:#x}")]
    UnalignedAccess(u32),

    /// The address did not fall inside any of the mapped windows (DMEM,
    /// IMEM, the control register window, or the secondary PC/BIST window).
    #[error("address {0:#010x} is not inside any mapped window")]
    UnmappedAddress(u32),
}
