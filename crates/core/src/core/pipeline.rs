//! The five-stage pipeline: latches, hazard detection, dual-issue, and the
//! [`Core`] that ties every execution unit together behind a single
//! per-cycle `tick`.
//!
//! Stages run in the reverse order real latch-based hardware would need —
//! WB, DF, EX (scalar then vector), RD, IF — so that a stage never
//! overwrites a latch a later stage in the same tick still has to read. See
//! `DESIGN.md` for how this replaces the source's "pointer into the next
//! latch" branch-resolution trick with an `Option<u32>` the tick applies to
//! the fetch PC before running IF.

use crate::config::Config;
use crate::core::companion::{CompanionPort, NullPort};
use crate::core::cp0::{status_bits, Cp0, Cp0Reg};
use crate::core::memory::{self, Memory};
use crate::core::regs::{Accumulator, ScalarRegs, VectorFlags, VectorRegs, NO_DEST};
use crate::core::scalar_ex::{self, ExInput};
use crate::core::vector_ex::{self, Operands as VectorOperands};
use crate::isa::decoder::{self, Decoded, OpInfo, ScalarOp, VectorOp};
use crate::isa::fields::{self, ScalarFields};
use crate::stats::Stats;

/// Masks a raw address down to the 12-bit instruction-memory space and sets
/// the "in-imem" marker bit — the same transform a host write to the
/// program-counter register goes through, reused here for every internal
/// PC update (fetch advance, branch, jump) so they all land in one space.
fn canonical_pc(value: u32) -> u32 {
    (value & 0xFFC) | 0x1000
}

#[derive(Debug, Clone, Copy)]
enum ScalarWidth {
    Byte,
    Half,
    Word,
}

/// Which vector load/store helper in [`crate::core::memory`] a family tag
/// maps to (everything except the transpose pair and the no-op `SWV`).
#[derive(Debug, Clone, Copy)]
enum VecMemKind {
    Byte,
    Short,
    Word,
    Double,
    Quad,
    Rest,
    PackedUnsigned,
    PackedSigned,
    HalfPacked,
    FourthPacked,
}

/// A memory operation latched by EX for DF to perform: the address and
/// addressing-mode details are resolved in EX, and the actual transfer
/// against memory happens a stage later in DF.
#[derive(Debug, Clone, Copy)]
enum MemOp {
    ScalarLoad {
        addr: u32,
        width: ScalarWidth,
        signed: bool,
        dest: u8,
    },
    ScalarStore {
        addr: u32,
        width: ScalarWidth,
        value: u32,
    },
    VectorLoad {
        kind: VecMemKind,
        addr: u32,
        element: u8,
        dest: u8,
    },
    VectorStore {
        kind: VecMemKind,
        addr: u32,
        element: u8,
        src: u8,
    },
    Transpose {
        is_load: bool,
        addr: u32,
        group_base: u8,
        element: u8,
    },
    /// `SWV`: a live opcode slot with no defined algorithm. Still counted
    /// as a memory access for hazard purposes but performs no actual
    /// transfer.
    Nop,
}

/// A register write waiting to retire, threaded from EX through DF to WB.
#[derive(Debug, Clone, Copy, Default)]
struct PendingWrite {
    dest: u8,
    value: u32,
}

#[derive(Debug, Clone, Copy)]
struct ScalarSlot {
    op: ScalarOp,
    info: OpInfo,
    iw: u32,
    /// Address of this instruction (not the delay slot).
    pc: u32,
}

#[derive(Debug, Clone, Copy)]
struct VectorSlot {
    op: VectorOp,
    iw: u32,
}

#[derive(Debug, Clone, Copy, Default)]
struct IfRdLatch {
    words: [u32; 2],
    fetch_pc: u32,
}

#[derive(Debug, Clone, Copy, Default)]
struct RdExLatch {
    scalar: Option<ScalarSlot>,
    vector: Option<VectorSlot>,
}

#[derive(Debug, Clone, Copy, Default)]
struct ExDfLatch {
    mem: Option<MemOp>,
    scalar: Option<PendingWrite>,
}

#[derive(Debug, Clone, Copy, Default)]
struct DfWbLatch {
    pending: Option<PendingWrite>,
}

/// Stride shift (log2 of the element size the 7-bit offset field is scaled
/// by) for the vector load/store family's byte/short/word/double/quad
/// addressing modes.
fn vector_stride(op: ScalarOp) -> u32 {
    use ScalarOp::{
        Ldv, Lfv, Lhv, Llv, Lpv, Lqv, Lrv, Lsv, Ltv, Luv, Lbv, Sbv, Sdv, Sfv, Shv, Slv, Spv, Sqv,
        Srv, Ssv, Stv, Suv, Swv,
    };
    match op {
        Lbv | Sbv => 0,
        Lsv | Ssv => 1,
        Llv | Slv => 2,
        Ldv | Sdv => 3,
        Lqv | Sqv | Lrv | Srv | Lpv | Spv | Luv | Suv | Lhv | Shv | Lfv | Sfv | Ltv | Stv | Swv => 4,
        _ => 0,
    }
}

fn vec_mem_kind(op: ScalarOp) -> Option<VecMemKind> {
    use ScalarOp::{Ldv, Lfv, Lhv, Llv, Lpv, Lqv, Lrv, Lsv, Luv, Lbv, Sdv, Sfv, Shv, Slv, Spv, Sqv, Srv, Ssv, Suv, Sbv};
    use VecMemKind::{Byte, Double, FourthPacked, HalfPacked, PackedSigned, PackedUnsigned, Quad, Rest, Short, Word};
    Some(match op {
        Lbv | Sbv => Byte,
        Lsv | Ssv => Short,
        Llv | Slv => Word,
        Ldv | Sdv => Double,
        Lqv | Sqv => Quad,
        Lrv | Srv => Rest,
        Lpv | Spv => PackedUnsigned,
        Luv | Suv => PackedSigned,
        Lhv | Shv => HalfPacked,
        Lfv | Sfv => FourthPacked,
        _ => return None,
    })
}

fn build_mem_op(op: ScalarOp, f: ScalarFields, rs_val: u32, rt_val: u32) -> MemOp {
    use ScalarOp::{Lb, Lbu, Lh, Lhu, Lw, Sb, Sh, Stv, Sw, Swv, Ltv};

    match op {
        Lb => MemOp::ScalarLoad {
            addr: rs_val.wrapping_add(scalar_ex::sign_extend16(f.imm)),
            width: ScalarWidth::Byte,
            signed: true,
            dest: f.rt,
        },
        Lbu => MemOp::ScalarLoad {
            addr: rs_val.wrapping_add(scalar_ex::sign_extend16(f.imm)),
            width: ScalarWidth::Byte,
            signed: false,
            dest: f.rt,
        },
        Lh => MemOp::ScalarLoad {
            addr: rs_val.wrapping_add(scalar_ex::sign_extend16(f.imm)),
            width: ScalarWidth::Half,
            signed: true,
            dest: f.rt,
        },
        Lhu => MemOp::ScalarLoad {
            addr: rs_val.wrapping_add(scalar_ex::sign_extend16(f.imm)),
            width: ScalarWidth::Half,
            signed: false,
            dest: f.rt,
        },
        Lw => MemOp::ScalarLoad {
            addr: rs_val.wrapping_add(scalar_ex::sign_extend16(f.imm)),
            width: ScalarWidth::Word,
            signed: true,
            dest: f.rt,
        },
        Sb => MemOp::ScalarStore {
            addr: rs_val.wrapping_add(scalar_ex::sign_extend16(f.imm)),
            width: ScalarWidth::Byte,
            value: rt_val,
        },
        Sh => MemOp::ScalarStore {
            addr: rs_val.wrapping_add(scalar_ex::sign_extend16(f.imm)),
            width: ScalarWidth::Half,
            value: rt_val,
        },
        Sw => MemOp::ScalarStore {
            addr: rs_val.wrapping_add(scalar_ex::sign_extend16(f.imm)),
            width: ScalarWidth::Word,
            value: rt_val,
        },
        Swv => MemOp::Nop,
        Ltv | Stv => MemOp::Transpose {
            is_load: op == Ltv,
            addr: memory::vector_address(rs_val, f.offset7, vector_stride(op)),
            group_base: f.rt,
            element: f.element,
        },
        _ => {
            // Reached only when the caller has already checked is_load/is_store and
            // none of the scalar/transpose arms above matched, so `op` names one of
            // the remaining vector load/store opcodes and `vec_mem_kind` is total.
            // Fall back to a no-op transfer rather than panic if that ever changes.
            let Some(kind) = vec_mem_kind(op) else {
                return MemOp::Nop;
            };
            let addr = memory::vector_address(rs_val, f.offset7, vector_stride(op));
            if op.info().is_load {
                MemOp::VectorLoad {
                    kind,
                    addr,
                    element: f.element,
                    dest: f.rt,
                }
            } else {
                MemOp::VectorStore {
                    kind,
                    addr,
                    element: f.element,
                    src: f.rt,
                }
            }
        }
    }
}

fn scalar_dest_register(info: OpInfo, f: ScalarFields) -> u8 {
    if info.writes_link {
        31
    } else if info.writes_rd {
        f.rd
    } else if info.writes_rt {
        f.rt
    } else {
        NO_DEST
    }
}

/// The core's architectural state and pipeline, executing one instruction
/// stream against 4 KiB of instruction memory and 4 KiB of data memory.
#[derive(Debug)]
pub struct Core {
    pub scalar_regs: ScalarRegs,
    pub vector_regs: VectorRegs,
    pub accumulator: Accumulator,
    pub vector_flags: VectorFlags,
    pub memory: Memory,
    pub cp0: Cp0,
    pub stats: Stats,
    reciprocal_rom: Option<Vec<u16>>,
    /// Stand-in for the external DRAM the DMA engine transfers against; the
    /// real host bus/DRAM is out of scope but draining a DMA request needs
    /// somewhere to copy to/from.
    dram: Vec<u8>,

    pc: u32,
    if_rd: IfRdLatch,
    rd_ex: RdExLatch,
    ex_df: ExDfLatch,
    df_wb: DfWbLatch,
    /// Set after a cycle in which the instruction just issued to the
    /// scalar slot was a branch, so the following RD refuses to dual-issue
    /// the delay-slot instruction.
    in_delay_slot: bool,
    /// Latched by `BREAK` when `INTR_BREAK` is set; drained by the host via
    /// [`Core::take_external_interrupt`].
    external_interrupt: bool,
    /// Gates the per-stage `tracing::trace!` diagnostics (`config.general.trace`).
    trace: bool,
}

impl Core {
    /// Creates a core with no companion processor wired up (reads as zero,
    /// discards writes — see [`crate::core::companion::NullPort`]).
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self::with_companion(config, Box::new(NullPort))
    }

    /// Creates a core wired to a real companion-processor port.
    #[must_use]
    pub fn with_companion(config: &Config, companion: Box<dyn CompanionPort>) -> Self {
        Self {
            scalar_regs: ScalarRegs::default(),
            vector_regs: VectorRegs::default(),
            accumulator: Accumulator::default(),
            vector_flags: VectorFlags::default(),
            memory: Memory::new(config.memory.dmem_size, config.memory.imem_size),
            cp0: Cp0::with_companion(companion),
            stats: Stats::default(),
            reciprocal_rom: config.memory.reciprocal_rom.clone(),
            dram: vec![0; config.memory.dram_size],
            pc: 0x1000,
            if_rd: IfRdLatch::default(),
            rd_ex: RdExLatch::default(),
            ex_df: ExDfLatch::default(),
            df_wb: DfWbLatch::default(),
            in_delay_slot: false,
            external_interrupt: false,
            trace: config.general.trace,
        }
    }

    #[must_use]
    pub fn pc(&self) -> u32 {
        self.pc
    }

    /// Resets the pipeline to a clean state and sets the fetch PC, exactly
    /// the contract a host write to the PC register has.
    pub fn write_pc(&mut self, value: u32) {
        self.pc = canonical_pc(value);
        self.if_rd = IfRdLatch::default();
        self.rd_ex = RdExLatch::default();
        self.ex_df = ExDfLatch::default();
        self.df_wb = DfWbLatch::default();
        self.in_delay_slot = false;
    }

    #[must_use]
    pub fn dram(&self) -> &[u8] {
        &self.dram
    }

    pub fn dram_mut(&mut self) -> &mut [u8] {
        &mut self.dram
    }

    /// Drains the external-interrupt line BREAK may have raised.
    pub fn take_external_interrupt(&mut self) -> bool {
        std::mem::take(&mut self.external_interrupt)
    }

    /// Reads a control-coprocessor register.
    pub fn cp0_read(&mut self, reg: Cp0Reg) -> u32 {
        self.cp0.read(reg)
    }

    /// Writes a control-coprocessor register, draining any DMA it triggers
    /// to completion before returning: DMA has no modeled latency.
    pub fn cp0_write(&mut self, reg: Cp0Reg, value: u32) {
        if self.cp0.write(reg, value) {
            if self.trace {
                tracing::trace!(?reg, value, "DMA request drained synchronously");
            }
            let _ = self
                .cp0
                .step_dma(self.memory.dmem_mut(), self.memory.imem_mut(), &mut self.dram);
            self.stats.dma_transfers += 1;
        }
    }

    /// Advances the core by one cycle. A no-op while `HALT` is set: once
    /// `BREAK` halts the core, every subsequent tick returns immediately
    /// without touching any latch.
    pub fn tick(&mut self) {
        if self.cp0.is_halted() {
            return;
        }

        let (load_store_stall, load_use_stall) = self.detect_hazards();
        let stalled = load_store_stall || load_use_stall;

        self.stage_wb();
        self.stage_df();
        let branch_target = self.stage_ex();
        self.stage_rd(stalled);
        self.stage_if(stalled, branch_target);

        if load_store_stall {
            self.stats.load_store_stalls += 1;
        }
        if load_use_stall {
            self.stats.load_use_stalls += 1;
        }
        self.stats.cycles += 1;
    }

    /// Load-store and load-use hazards, evaluated against the latch state
    /// as it stands at the start of the tick — i.e. against the
    /// instructions about to enter DF, EX, and RD this same cycle.
    fn detect_hazards(&self) -> (bool, bool) {
        let w0 = self.if_rd.words[0];
        let (is_mem_or_cop, needs_rs, needs_rt, rs, rt) = match decoder::classify(w0) {
            Decoded::Scalar(op) => {
                let info = op.info();
                let f = fields::scalar_fields(w0);
                (
                    info.is_load || info.is_store || info.is_coprocessor_access,
                    info.needs_rs,
                    info.needs_rt,
                    f.rs,
                    f.rt,
                )
            }
            Decoded::VectorCompute => (false, false, false, 0, 0),
        };

        let load_store_stall = self.ex_df.mem.is_some() && is_mem_or_cop;

        let ex_load_dest = self.rd_ex.scalar.and_then(|slot| {
            slot.info
                .is_load
                .then(|| fields::scalar_fields(slot.iw).rt)
        });
        let df_load_dest = match self.ex_df.mem {
            Some(MemOp::ScalarLoad { dest, .. }) => Some(dest),
            _ => None,
        };
        let load_use_stall = [ex_load_dest, df_load_dest].into_iter().flatten().any(|dest| {
            dest != 0 && ((needs_rs && rs == dest) || (needs_rt && rt == dest))
        });

        (load_store_stall, load_use_stall)
    }

    /// Step 1: commit the DF→WB latch's pending write.
    fn stage_wb(&mut self) {
        if let Some(pending) = self.df_wb.pending.take() {
            if self.trace {
                tracing::trace!(dest = pending.dest, value = pending.value, "WB retire");
            }
            self.scalar_regs.write(pending.dest, pending.value);
            self.stats.scalar_retired += 1;
        }
    }

    /// Step 2: run any pending memory access latched by EX.
    fn stage_df(&mut self) {
        let mut pending = self.ex_df.scalar.take();
        if let Some(mem_op) = self.ex_df.mem.take() {
            if let Some(loaded) = self.perform_mem_op(mem_op) {
                pending = Some(loaded);
            }
        }
        self.df_wb = DfWbLatch { pending };
    }

    fn perform_mem_op(&mut self, op: MemOp) -> Option<PendingWrite> {
        match op {
            MemOp::Nop => None,
            MemOp::ScalarLoad {
                addr,
                width,
                signed,
                dest,
            } => {
                let value = match (width, signed) {
                    (ScalarWidth::Byte, true) => i32::from(self.memory.read_u8(addr) as i8) as u32,
                    (ScalarWidth::Byte, false) => u32::from(self.memory.read_u8(addr)),
                    (ScalarWidth::Half, true) => i32::from(self.memory.read_u16(addr) as i16) as u32,
                    (ScalarWidth::Half, false) => u32::from(self.memory.read_u16(addr)),
                    (ScalarWidth::Word, _) => self.memory.read_u32(addr),
                };
                Some(PendingWrite { dest, value })
            }
            MemOp::ScalarStore { addr, width, value } => {
                match width {
                    ScalarWidth::Byte => self.memory.write_u8(addr, value as u8),
                    ScalarWidth::Half => self.memory.write_u16(addr, value as u16),
                    ScalarWidth::Word => self.memory.write_u32(addr, value),
                }
                None
            }
            MemOp::VectorLoad {
                kind,
                addr,
                element,
                dest,
            } => {
                let mut lanes = self.vector_regs.read(dest);
                match kind {
                    VecMemKind::Byte => memory::load_byte(&self.memory, addr, element, &mut lanes),
                    VecMemKind::Short => memory::load_short(&self.memory, addr, element, &mut lanes),
                    VecMemKind::Word => memory::load_word(&self.memory, addr, element, &mut lanes),
                    VecMemKind::Double => memory::load_double(&self.memory, addr, element, &mut lanes),
                    VecMemKind::Quad => memory::load_quad(&self.memory, addr, element, &mut lanes),
                    VecMemKind::Rest => memory::load_rest(&self.memory, addr, element, &mut lanes),
                    VecMemKind::PackedUnsigned => {
                        memory::load_packed_unsigned(&self.memory, addr, element, &mut lanes);
                    }
                    VecMemKind::PackedSigned => {
                        memory::load_packed_signed(&self.memory, addr, element, &mut lanes);
                    }
                    VecMemKind::HalfPacked => memory::load_half_packed(&self.memory, addr, element, &mut lanes),
                    VecMemKind::FourthPacked => {
                        memory::load_fourth_packed(&self.memory, addr, element, &mut lanes);
                    }
                }
                self.vector_regs.write(dest, lanes);
                None
            }
            MemOp::VectorStore {
                kind,
                addr,
                element,
                src,
            } => {
                let lanes = self.vector_regs.read(src);
                match kind {
                    VecMemKind::Byte => memory::store_byte(&mut self.memory, addr, element, &lanes),
                    VecMemKind::Short => memory::store_short(&mut self.memory, addr, element, &lanes),
                    VecMemKind::Word => memory::store_word(&mut self.memory, addr, element, &lanes),
                    VecMemKind::Double => memory::store_double(&mut self.memory, addr, element, &lanes),
                    VecMemKind::Quad => memory::store_quad(&mut self.memory, addr, element, &lanes),
                    VecMemKind::Rest => memory::store_rest(&mut self.memory, addr, element, &lanes),
                    VecMemKind::PackedUnsigned => {
                        memory::store_packed_unsigned(&mut self.memory, addr, element, &lanes);
                    }
                    VecMemKind::PackedSigned => {
                        memory::store_packed_signed(&mut self.memory, addr, element, &lanes);
                    }
                    VecMemKind::HalfPacked => memory::store_half_packed(&mut self.memory, addr, element, &lanes),
                    VecMemKind::FourthPacked => {
                        memory::store_fourth_packed(&mut self.memory, addr, element, &lanes);
                    }
                }
                None
            }
            MemOp::Transpose {
                is_load,
                addr,
                group_base,
                element,
            } => {
                if is_load {
                    memory::load_transpose(&self.memory, addr, group_base, element, &mut self.vector_regs);
                } else {
                    memory::store_transpose(&mut self.memory, addr, group_base, element, &self.vector_regs);
                }
                None
            }
        }
    }

    /// Steps 3+4: scalar and vector EX, in parallel. Returns the resolved
    /// branch/jump target, if any, for IF to apply this same tick.
    fn stage_ex(&mut self) -> Option<u32> {
        let forward = |df_wb: &DfWbLatch, reg: u8, val: u32| -> u32 {
            if reg != 0 {
                if let Some(pending) = df_wb.pending {
                    if pending.dest == reg {
                        return pending.value;
                    }
                }
            }
            val
        };

        let mut new_ex_df = ExDfLatch::default();
        let mut branch_target = None;

        if let Some(slot) = self.rd_ex.scalar {
            let f = fields::scalar_fields(slot.iw);
            let rs_val = forward(&self.df_wb, f.rs, self.scalar_regs.read(f.rs));
            let rt_val = forward(&self.df_wb, f.rt, self.scalar_regs.read(f.rt));

            if slot.info.is_load || slot.info.is_store {
                let dest = match slot.op {
                    ScalarOp::Lb | ScalarOp::Lh | ScalarOp::Lw | ScalarOp::Lbu | ScalarOp::Lhu => f.rt,
                    _ => NO_DEST,
                };
                new_ex_df.scalar = Some(PendingWrite { dest, value: 0 });
                new_ex_df.mem = Some(build_mem_op(slot.op, f, rs_val, rt_val));
            } else if slot.info.is_coprocessor_access {
                new_ex_df.scalar = Some(self.execute_coprocessor_move(slot.op, f, rt_val));
            } else if slot.op == ScalarOp::Break {
                self.cp0.set_broke();
                if self.cp0.status() & status_bits::INTR_BREAK != 0 {
                    self.external_interrupt = true;
                }
                new_ex_df.scalar = Some(PendingWrite { dest: NO_DEST, value: 0 });
            } else {
                let out = scalar_ex::execute(ExInput {
                    op: slot.op,
                    rs_val,
                    rt_val,
                    imm: f.imm,
                    shamt: f.shamt,
                    target26: f.target26,
                    pc: slot.pc,
                });
                branch_target = out.branch_target;
                new_ex_df.scalar = Some(PendingWrite {
                    dest: scalar_dest_register(slot.info, f),
                    value: out.value,
                });
            }
        }

        if let Some(vslot) = self.rd_ex.vector {
            let vf = fields::vector_fields(vslot.iw);
            let vs = self.vector_regs.read(vf.vs);
            let vt = vector_ex::apply_element(self.vector_regs.read(vf.vt), vf.e);
            let result = vector_ex::execute(
                vslot.op,
                VectorOperands {
                    vs,
                    vt,
                    e: vf.e,
                    acc: &mut self.accumulator,
                    flags: &mut self.vector_flags,
                    reciprocal_rom: self.reciprocal_rom.as_deref(),
                },
            );
            if vector_ex::has_writeback(vslot.op) {
                if vslot.op == VectorOp::Vmov {
                    // VMOV only ever touches the one lane its element
                    // specifier names, leaving the rest of VD untouched.
                    let lane = (vf.e & 0x7) as usize;
                    let mut merged = self.vector_regs.read(vf.vd);
                    merged[lane] = result[lane];
                    self.vector_regs.write(vf.vd, merged);
                } else {
                    self.vector_regs.write(vf.vd, result);
                }
            }
            self.stats.vector_retired += 1;
        }

        self.ex_df = new_ex_df;
        branch_target
    }

    fn execute_coprocessor_move(&mut self, op: ScalarOp, f: ScalarFields, rt_val: u32) -> PendingWrite {
        match op {
            ScalarOp::Mfc0 => PendingWrite {
                dest: f.rt,
                value: self.cp0_read(Cp0Reg::from_index(f.rd)),
            },
            ScalarOp::Mtc0 => {
                self.cp0_write(Cp0Reg::from_index(f.rd), rt_val);
                PendingWrite { dest: NO_DEST, value: 0 }
            }
            ScalarOp::Mfc2 => {
                let lane = (f.element as usize >> 1) & 7;
                let value = i32::from(self.vector_regs.read(f.rd)[lane] as i16) as u32;
                PendingWrite { dest: f.rt, value }
            }
            ScalarOp::Mtc2 => {
                let lane = (f.element as usize >> 1) & 7;
                let mut lanes = self.vector_regs.read(f.rd);
                lanes[lane] = rt_val as u16;
                self.vector_regs.write(f.rd, lanes);
                PendingWrite { dest: NO_DEST, value: 0 }
            }
            ScalarOp::Cfc2 => {
                let value = match f.rd & 0x3 {
                    0 => u32::from(self.vector_flags.vco),
                    1 => u32::from(self.vector_flags.vcc),
                    _ => u32::from(self.vector_flags.vce),
                };
                PendingWrite { dest: f.rt, value }
            }
            ScalarOp::Ctc2 => {
                match f.rd & 0x3 {
                    0 => self.vector_flags.vco = rt_val as u16,
                    1 => self.vector_flags.vcc = rt_val as u16,
                    _ => self.vector_flags.vce = rt_val as u8,
                }
                PendingWrite { dest: NO_DEST, value: 0 }
            }
            _ => unreachable!("execute_coprocessor_move called on a non-coprocessor opcode"),
        }
    }

    /// Step 5: classify both words in the IF→RD latch and decide issue.
    fn stage_rd(&mut self, stalled: bool) {
        if stalled {
            self.rd_ex = RdExLatch::default();
            return;
        }

        let w0 = self.if_rd.words[0];
        let w1 = self.if_rd.words[1];
        let pc0 = self.if_rd.fetch_pc;
        let pc1 = pc0.wrapping_add(4);
        let d0 = decoder::classify(w0);
        let d1 = decoder::classify(w1);
        let was_delay_slot = self.in_delay_slot;

        let scalar_slot = |iw: u32, pc: u32| ScalarSlot {
            op: decoder::decode_scalar(iw),
            info: decoder::decode_scalar(iw).info(),
            iw,
            pc,
        };
        let vector_slot = |iw: u32| VectorSlot {
            op: decoder::decode_vector(iw),
            iw,
        };

        let mut rd_ex = RdExLatch::default();
        match (d0, d1) {
            (Decoded::Scalar(_), Decoded::Scalar(_)) => {
                rd_ex.scalar = Some(scalar_slot(w0, pc0));
            }
            (Decoded::VectorCompute, Decoded::VectorCompute) => {
                rd_ex.vector = Some(vector_slot(w0));
            }
            _ => {
                let first_is_branch = matches!(d0, Decoded::Scalar(op) if op.info().is_branch);
                if !first_is_branch && !was_delay_slot {
                    match d0 {
                        Decoded::Scalar(_) => {
                            rd_ex.scalar = Some(scalar_slot(w0, pc0));
                            rd_ex.vector = Some(vector_slot(w1));
                        }
                        Decoded::VectorCompute => {
                            rd_ex.vector = Some(vector_slot(w0));
                            rd_ex.scalar = Some(scalar_slot(w1, pc1));
                        }
                    }
                    self.stats.dual_issued_cycles += 1;
                } else {
                    match d0 {
                        Decoded::Scalar(_) => rd_ex.scalar = Some(scalar_slot(w0, pc0)),
                        Decoded::VectorCompute => rd_ex.vector = Some(vector_slot(w0)),
                    }
                }
            }
        }

        self.in_delay_slot = matches!(rd_ex.scalar, Some(slot) if slot.info.is_branch);
        self.rd_ex = rd_ex;
    }

    /// Step 6: fetch the next issue pair, unless a hazard held RD back.
    fn stage_if(&mut self, stalled: bool, branch_target: Option<u32>) {
        if stalled {
            return;
        }
        if let Some(target) = branch_target {
            self.pc = canonical_pc(target);
        }
        let w0 = self.memory.fetch(self.pc);
        let w1 = self.memory.fetch(self.pc.wrapping_add(4));
        self.if_rd = IfRdLatch {
            words: [w0, w1],
            fetch_pc: self.pc,
        };
        self.pc = canonical_pc(self.pc.wrapping_add(4));
    }
}
