//! [`Simulator`]: address-decodes the four host-visible memory-mapped
//! windows onto [`Core`]'s already-specified operations. This module
//! introduces no new processor semantics — every window access resolves to
//! something the core already defines (a CP0 register read/write, a PC
//! write that resets the pipeline, a plain memory access).

use crate::common::error::CoreError;
use crate::config::Config;
use crate::core::companion::{CompanionPort, NullPort};
use crate::core::cp0::Cp0Reg;
use crate::core::Core;

/// Base addresses and sizes of the four memory-mapped windows.
pub mod windows {
    /// Data memory window: 4 KiB starting here.
    pub const DMEM_BASE: u32 = 0x0000_0000;
    /// Instruction memory window: 4 KiB starting here.
    pub const IMEM_BASE: u32 = 0x0000_1000;
    /// Size of the DMEM/IMEM windows, in bytes.
    pub const MEM_WINDOW_SIZE: u32 = 0x1000;
    /// Control-coprocessor register window: 16 x 4 bytes starting here.
    pub const CP0_BASE: u32 = 0x0004_0000;
    /// Number of 4-byte registers in the CP0 window.
    pub const CP0_REG_COUNT: u32 = 16;
    /// Secondary window: program counter (index 0) and built-in-self-test
    /// (index 1), 2 x 4 bytes starting here.
    pub const PC_BIST_BASE: u32 = 0x0008_0000;
    /// Number of 4-byte registers in the PC/BIST window.
    pub const PC_BIST_REG_COUNT: u32 = 2;
}

/// Top-level simulator: the pure architectural [`Core`] plus the host's
/// memory-mapped view of it.
#[derive(Debug)]
pub struct Simulator {
    /// The core's architectural state and pipeline.
    pub core: Core,
}

impl Simulator {
    /// Creates a simulator with no companion processor wired up.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            core: Core::new(config),
        }
    }

    /// Creates a simulator wired to a real companion-processor port.
    #[must_use]
    pub fn with_companion(config: &Config, companion: Box<dyn CompanionPort>) -> Self {
        Self {
            core: Core::with_companion(config, companion),
        }
    }

    /// Advances the core by one cycle (a no-op once `HALT` is set).
    pub fn tick(&mut self) {
        self.core.tick();
    }

    /// Reads a 32-bit word from one of the four mapped windows.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnalignedAccess`] if `addr` is not 4-byte
    /// aligned, or [`CoreError::UnmappedAddress`] if it falls in none of the
    /// four windows.
    pub fn read_u32(&mut self, addr: u32) -> Result<u32, CoreError> {
        if addr & 0x3 != 0 {
            return Err(CoreError::UnalignedAccess(addr));
        }

        if let Some(offset) = window_offset(addr, windows::DMEM_BASE, windows::MEM_WINDOW_SIZE) {
            return Ok(self.core.memory.read_u32(offset));
        }
        if let Some(offset) = window_offset(addr, windows::IMEM_BASE, windows::MEM_WINDOW_SIZE) {
            return Ok(self.core.memory.fetch(offset));
        }
        if let Some(reg) = cp0_register(addr) {
            return Ok(self.core.cp0_read(reg));
        }
        if let Some(index) = pc_bist_index(addr) {
            return Ok(match index {
                0 => self.core.pc(),
                _ => 0,
            });
        }

        Err(CoreError::UnmappedAddress(addr))
    }

    /// Writes a 32-bit word to one of the four mapped windows.
    ///
    /// A write to the PC register (index 0 of the secondary window) resets
    /// the pipeline; a write to `READ_LEN`/`WRITE_LEN` drains a DMA to
    /// completion before returning.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnalignedAccess`] if `addr` is not 4-byte
    /// aligned, or [`CoreError::UnmappedAddress`] if it falls in none of the
    /// four windows.
    pub fn write_u32(&mut self, addr: u32, value: u32) -> Result<(), CoreError> {
        if addr & 0x3 != 0 {
            return Err(CoreError::UnalignedAccess(addr));
        }

        if let Some(offset) = window_offset(addr, windows::DMEM_BASE, windows::MEM_WINDOW_SIZE) {
            self.core.memory.write_u32(offset, value);
            return Ok(());
        }
        if let Some(offset) = window_offset(addr, windows::IMEM_BASE, windows::MEM_WINDOW_SIZE) {
            let bytes = value.to_be_bytes();
            let base = offset as usize & (self.core.memory.imem().len() - 1) & !3;
            self.core.memory.imem_mut()[base..base + 4].copy_from_slice(&bytes);
            return Ok(());
        }
        if let Some(reg) = cp0_register(addr) {
            self.core.cp0_write(reg, value);
            return Ok(());
        }
        if let Some(index) = pc_bist_index(addr) {
            if index == 0 {
                self.core.write_pc(value);
            }
            return Ok(());
        }

        Err(CoreError::UnmappedAddress(addr))
    }

    /// Drains the external-interrupt line `BREAK` may have raised.
    pub fn take_external_interrupt(&mut self) -> bool {
        self.core.take_external_interrupt()
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

/// A companion port usable as a placeholder while no real display
/// processor is attached; re-exported here so host code that only imports
/// [`Simulator`] doesn't also need `crate::core::companion`.
pub fn null_companion() -> Box<dyn CompanionPort> {
    Box::new(NullPort)
}

fn window_offset(addr: u32, base: u32, size: u32) -> Option<u32> {
    let rel = addr.checked_sub(base)?;
    (rel < size).then_some(rel)
}

fn cp0_register(addr: u32) -> Option<Cp0Reg> {
    let rel = addr.checked_sub(windows::CP0_BASE)?;
    let index = rel / 4;
    (index < windows::CP0_REG_COUNT).then(|| Cp0Reg::from_index(index as u8))
}

fn pc_bist_index(addr: u32) -> Option<u32> {
    let rel = addr.checked_sub(windows::PC_BIST_BASE)?;
    let index = rel / 4;
    (index < windows::PC_BIST_REG_COUNT).then_some(index)
}
