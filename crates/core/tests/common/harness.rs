use rsp_core::config::Config;
use rsp_core::core::cp0::{status_bits, Cp0Reg};
use rsp_core::core::regs::VectorLanes;
use rsp_core::sim::Simulator;

/// Owns a [`Simulator`] and provides the load/run/inspect calls the
/// end-to-end scenarios need, mirroring the shape of a host embedding this
/// crate: load a program into instruction memory, clear `HALT`, tick, read
/// registers back out.
pub struct TestContext {
    pub sim: Simulator,
}

impl TestContext {
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self {
            sim: Simulator::new(&Config::default()),
        }
    }

    /// Builds a context with `general.trace` enabled, for tests that assert
    /// on emitted trace events rather than just architectural state.
    pub fn with_trace() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let config = Config {
            general: rsp_core::config::GeneralConfig { trace: true },
            ..Config::default()
        };
        Self {
            sim: Simulator::new(&config),
        }
    }

    /// Loads a sequence of 32-bit instruction words at IMEM offset 0, points
    /// the fetch PC at the start of the program, and clears `HALT` so the
    /// pipeline actually advances.
    pub fn load_program(mut self, words: &[u32]) -> Self {
        for (i, word) in words.iter().enumerate() {
            let offset = i * 4;
            self.sim.core.memory.imem_mut()[offset..offset + 4].copy_from_slice(&word.to_be_bytes());
        }
        self.sim.core.write_pc(0x1000);
        let _ = self.sim.core.cp0.write(Cp0Reg::Status, status_bits::HALT);
        self
    }

    pub fn set_reg(&mut self, index: u8, value: u32) {
        self.sim.core.scalar_regs.write(index, value);
    }

    pub fn get_reg(&self, index: u8) -> u32 {
        self.sim.core.scalar_regs.read(index)
    }

    pub fn set_vreg(&mut self, index: u8, lanes: VectorLanes) {
        self.sim.core.vector_regs.write(index, lanes);
    }

    pub fn get_vreg(&self, index: u8) -> VectorLanes {
        self.sim.core.vector_regs.read(index)
    }

    /// Runs the core for `cycles` ticks.
    pub fn run(&mut self, cycles: usize) {
        for _ in 0..cycles {
            self.sim.tick();
        }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
