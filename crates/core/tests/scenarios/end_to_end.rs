//! End-to-end pipeline scenarios driven entirely through
//! [`rsp_core::Simulator`], the same interface a host embedding this crate
//! would use: load a program into instruction memory, clear `HALT`, tick,
//! read the architectural state back out.

use crate::common::builder::instruction::InstructionBuilder as I;
use crate::common::harness::TestContext;
use rsp_core::core::cp0::status_bits;

#[test]
fn load_immediate_and_add() {
    let mut ctx = TestContext::new().load_program(&[
        I::addi(1, 0, 5),
        I::addi(2, 0, 7),
        I::add(3, 1, 2),
    ]);
    ctx.run(12);
    assert_eq!(ctx.get_reg(1), 5);
    assert_eq!(ctx.get_reg(2), 7);
    assert_eq!(ctx.get_reg(3), 12);
}

#[test]
fn delay_slot_always_executes_before_the_branch_target_takes_effect() {
    let mut ctx = TestContext::new().load_program(&[
        I::beq(0, 0, 2), // branch to PC + 8 + 4 = skips the second ADDI
        I::addi(1, 0, 1),
        I::addi(1, 0, 2),
    ]);
    ctx.run(12);
    assert_eq!(ctx.get_reg(1), 1);
}

#[test]
fn load_use_hazard_stalls_then_forwards_the_loaded_value() {
    let mut ctx = TestContext::new().load_program(&[I::lw(1, 0, 0), I::add(2, 1, 1)]);
    ctx.sim.core.memory.write_u32(0, 0x1234_5678);
    ctx.run(12);
    assert_eq!(ctx.get_reg(2), 0x2468_ACF0);
    assert!(ctx.sim.core.stats.load_use_stalls >= 1);
}

#[test]
fn break_halts_and_further_ticks_are_no_ops() {
    let mut ctx = TestContext::new().load_program(&[I::addi(1, 0, 9), I::brk()]);
    ctx.run(12);
    assert!(ctx.sim.core.cp0.is_halted());
    assert_ne!(ctx.sim.core.cp0.status() & status_bits::BROKE, 0);
    let before = ctx.get_reg(1);
    ctx.run(5);
    assert_eq!(ctx.get_reg(1), before);
}

#[test]
fn vector_add_with_carry_and_propagation() {
    let mut ctx = TestContext::new();
    ctx.set_vreg(1, [0x7FFF; 8]);
    ctx.set_vreg(2, [0x0001; 8]);
    let iw = I::vector(16, 3, 1, 2, 0); // VADD vd=3, vs=1, vt=2
    ctx = ctx.load_program(&[iw]);
    ctx.run(6);
    assert_eq!(ctx.get_vreg(3), [0x7FFF; 8]);
    assert_eq!(ctx.sim.core.accumulator.low, [0x8000; 8]);
}

#[test]
fn vaddc_sets_the_carry_flag_on_unsigned_overflow_and_clears_it_next_instruction() {
    let mut ctx = TestContext::new();
    ctx.set_vreg(1, [0xFFFF; 8]);
    ctx.set_vreg(2, [0x0002; 8]);
    let vaddc = I::vector(20, 3, 1, 2, 0); // VADDC
    let vadd = I::vector(16, 4, 1, 2, 0); // VADD clears vco
    ctx = ctx.load_program(&[vaddc, vadd]);
    ctx.run(3);
    assert_ne!(ctx.sim.core.vector_flags.vco & 0x00FF, 0);
    ctx.run(6);
    assert_eq!(ctx.sim.core.vector_flags.vco & 0x00FF, 0);
}

#[test]
fn aligned_lqv_then_sqv_round_trips_sixteen_bytes() {
    let mut ctx = TestContext::new();
    for i in 0..16u32 {
        ctx.sim.core.memory.write_u8(0x10 + i, i as u8);
    }
    // offset7 is pre-scaled by the quad stride (16 bytes): 1 -> 0x10, 2 -> 0x20.
    let lqv = I::lqv(1, 0, 0, 1);
    let sqv = I::sqv(1, 0, 0, 2);
    ctx = ctx.load_program(&[lqv, sqv]);
    ctx.run(8);
    for i in 0..16u32 {
        assert_eq!(
            ctx.sim.core.memory.read_u8(0x20 + i),
            ctx.sim.core.memory.read_u8(0x10 + i)
        );
    }
}

#[test]
fn mtc0_writes_drive_a_dma_transfer_from_dram_into_dmem() {
    let mut ctx = TestContext::new();
    for i in 0..8u8 {
        ctx.sim.core.dram_mut()[i as usize] = i + 1;
    }
    ctx.set_reg(1, 0); // MEM_ADDR: DMEM offset 0
    ctx.set_reg(2, 0); // DRAM_ADDR: 0
    ctx.set_reg(3, 7); // READ_LEN: 8-byte row, 1 row
    ctx = ctx.load_program(&[
        I::mtc0(1, 0),
        I::mtc0(2, 1),
        I::mtc0(3, 2),
    ]);
    ctx.run(12);
    for i in 0..8u32 {
        assert_eq!(ctx.sim.core.memory.read_u8(i), i as u8 + 1);
    }
    assert_eq!(ctx.sim.core.stats.dma_transfers, 1);
}

#[test]
fn mtc0_multi_row_read_with_skip_advances_dmem_not_dram() {
    let mut ctx = TestContext::new();
    for i in 0..16u8 {
        ctx.sim.core.dram_mut()[i as usize] = i + 1;
    }
    let read_len = (8 - 1) | (1 << 12) | (4 << 20); // len=8, count=2, skip=4
    ctx.set_reg(1, 0); // MEM_ADDR
    ctx.set_reg(2, 0); // DRAM_ADDR
    ctx.set_reg(3, read_len); // READ_LEN
    ctx = ctx.load_program(&[
        I::mtc0(1, 0),
        I::mtc0(2, 1),
        I::mtc0(3, 2),
    ]);
    ctx.run(12);
    for i in 0..8u32 {
        assert_eq!(ctx.sim.core.memory.read_u8(i), i as u8 + 1);
    }
    for i in 0..8u32 {
        assert_eq!(ctx.sim.core.memory.read_u8(12 + i), i as u8 + 9);
    }
    for i in 8..12u32 {
        assert_eq!(ctx.sim.core.memory.read_u8(i), 0);
    }
}
