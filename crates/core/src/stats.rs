//! Execution statistics.
//!
//! A small, cheap-to-update counter struct rather than a full profiling
//! subsystem, in the spirit of a debug build's `counts[...]` per-opcode
//! retirement tally.

/// Counters updated once per [`crate::core::Core::tick`] call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stats {
    /// Total number of ticks executed.
    pub cycles: u64,
    /// Scalar instructions that reached WB and committed a result (or would
    /// have, had their destination not been register 0).
    pub scalar_retired: u64,
    /// Vector instructions that executed (including no-op vector opcodes).
    pub vector_retired: u64,
    /// Cycles in which a scalar and a vector instruction issued together.
    pub dual_issued_cycles: u64,
    /// Cycles stalled due to a load-use hazard.
    pub load_use_stalls: u64,
    /// Cycles stalled due to a load-store hazard.
    pub load_store_stalls: u64,
    /// DMA transfers triggered via the READ_LEN/WRITE_LEN registers.
    pub dma_transfers: u64,
}

impl Stats {
    /// Prints a short human-readable summary to stdout.
    pub fn print(&self) {
        println!("==========================================================");
        println!("RSP CORE STATISTICS");
        println!("==========================================================");
        println!("cycles                 {}", self.cycles);
        println!("scalar_retired          {}", self.scalar_retired);
        println!("vector_retired          {}", self.vector_retired);
        println!("dual_issued_cycles      {}", self.dual_issued_cycles);
        println!("load_use_stalls         {}", self.load_use_stalls);
        println!("load_store_stalls       {}", self.load_store_stalls);
        println!("dma_transfers           {}", self.dma_transfers);
        println!("==========================================================");
    }
}
