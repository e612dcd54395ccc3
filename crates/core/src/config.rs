//! Configuration for the RSP core.
//!
//! A private `defaults` module holds the baseline constants, a small set of
//! `Deserialize`-able structs expose host-supplied overrides, and a
//! `Default` impl reproduces those same constants. The processor's memory
//! geometry is fixed by the hardware (4 KiB DMEM, 4 KiB IMEM), so there is
//! nothing to actually tune there; the config layer still exists because it
//! is the natural home for the `trace` toggle and for a host-supplied
//! reciprocal ROM.

use serde::Deserialize;

/// Default configuration constants.
mod defaults {
    /// Size of the data memory, in bytes.
    pub const DMEM_SIZE: usize = 4096;

    /// Size of the instruction memory, in bytes.
    pub const IMEM_SIZE: usize = 4096;

    /// Size of the DRAM image the DMA engine transfers against. The real
    /// DRAM and host bus are out of scope (only the command-register
    /// protocol is specified); this is the stand-in buffer that makes DMA
    /// transfers observable without a real host attached.
    pub const DRAM_SIZE: usize = 1 << 20;
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use rsp_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.general.trace, false);
/// assert_eq!(config.memory.dmem_size, 4096);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// General simulation settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Memory geometry and reciprocal ROM source.
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

/// General simulation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Enable per-stage tracing to the `tracing` subscriber.
    #[serde(default)]
    pub trace: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { trace: false }
    }
}

/// Memory geometry and reciprocal ROM configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Size of the data memory, in bytes. Fixed by the hardware; present for
    /// completeness and documentation rather than as a tunable.
    #[serde(default = "MemoryConfig::default_dmem_size")]
    pub dmem_size: usize,

    /// Size of the instruction memory, in bytes.
    #[serde(default = "MemoryConfig::default_imem_size")]
    pub imem_size: usize,

    /// Host-supplied reciprocal ROM contents. When absent, the crate's own
    /// built-in table (`core::reciprocal_rom::TABLE`) is used. When present,
    /// must contain exactly 512 entries.
    #[serde(default)]
    pub reciprocal_rom: Option<Vec<u16>>,

    /// Size of the DMA engine's external DRAM stand-in, in bytes.
    #[serde(default = "MemoryConfig::default_dram_size")]
    pub dram_size: usize,
}

impl MemoryConfig {
    fn default_dmem_size() -> usize {
        defaults::DMEM_SIZE
    }

    fn default_imem_size() -> usize {
        defaults::IMEM_SIZE
    }

    fn default_dram_size() -> usize {
        defaults::DRAM_SIZE
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            dmem_size: defaults::DMEM_SIZE,
            imem_size: defaults::IMEM_SIZE,
            reciprocal_rom: None,
            dram_size: defaults::DRAM_SIZE,
        }
    }
}
