//! Scalar EX stage: the ALU, shift unit, and branch/jump target
//! computation. Memory addressing and the actual data access happen in DF
//! (see [`crate::core::memory`]); this stage only produces the value or
//! address DF will need.

use crate::isa::decoder::ScalarOp;

/// Sign-extends a 16-bit immediate to 32 bits.
#[must_use]
pub fn sign_extend16(imm: u16) -> u32 {
    i32::from(imm as i16) as u32
}

/// Operands the EX stage needs, latched by RD.
#[derive(Debug, Clone, Copy)]
pub struct ExInput {
    pub op: ScalarOp,
    pub rs_val: u32,
    pub rt_val: u32,
    pub imm: u16,
    pub shamt: u8,
    pub target26: u32,
    /// Address of the instruction in this EX slot (not the delay slot).
    pub pc: u32,
}

/// Result of the EX stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExOutput {
    /// ALU result, or an effective address for loads/stores.
    pub value: u32,
    /// Resolved branch/jump target, when this instruction is taken.
    pub branch_target: Option<u32>,
}

/// Runs the EX stage for a scalar (non-vector-compute) instruction.
#[must_use]
pub fn execute(input: ExInput) -> ExOutput {
    let ExInput {
        op,
        rs_val,
        rt_val,
        imm,
        shamt,
        target26,
        pc,
    } = input;
    let next_pc = pc.wrapping_add(4);
    let imm_se = sign_extend16(imm);
    let branch_target = |taken: bool, offset: u32| -> Option<u32> {
        if taken {
            Some(next_pc.wrapping_add(offset << 2))
        } else {
            None
        }
    };

    match op {
        ScalarOp::Sll => ExOutput {
            value: rt_val << shamt,
            branch_target: None,
        },
        ScalarOp::Srl => ExOutput {
            value: rt_val >> shamt,
            branch_target: None,
        },
        ScalarOp::Sra => ExOutput {
            value: ((rt_val as i32) >> shamt) as u32,
            branch_target: None,
        },
        ScalarOp::Sllv => ExOutput {
            value: rt_val << (rs_val & 0x1F),
            branch_target: None,
        },
        ScalarOp::Srlv => ExOutput {
            value: rt_val >> (rs_val & 0x1F),
            branch_target: None,
        },
        ScalarOp::Srav => ExOutput {
            value: ((rt_val as i32) >> (rs_val & 0x1F)) as u32,
            branch_target: None,
        },
        ScalarOp::Add | ScalarOp::Addi => ExOutput {
            value: rs_val.wrapping_add(if op == ScalarOp::Addi { imm_se } else { rt_val }),
            branch_target: None,
        },
        ScalarOp::Sub => ExOutput {
            value: rs_val.wrapping_sub(rt_val),
            branch_target: None,
        },
        ScalarOp::And => ExOutput {
            value: rs_val & rt_val,
            branch_target: None,
        },
        ScalarOp::Andi => ExOutput {
            value: rs_val & u32::from(imm),
            branch_target: None,
        },
        ScalarOp::Or => ExOutput {
            value: rs_val | rt_val,
            branch_target: None,
        },
        ScalarOp::Ori => ExOutput {
            value: rs_val | u32::from(imm),
            branch_target: None,
        },
        ScalarOp::Xor => ExOutput {
            value: rs_val ^ rt_val,
            branch_target: None,
        },
        ScalarOp::Xori => ExOutput {
            value: rs_val ^ u32::from(imm),
            branch_target: None,
        },
        ScalarOp::Nor => ExOutput {
            value: !(rs_val | rt_val),
            branch_target: None,
        },
        ScalarOp::Slt => ExOutput {
            value: u32::from((rs_val as i32) < (rt_val as i32)),
            branch_target: None,
        },
        ScalarOp::Slti => ExOutput {
            value: u32::from((rs_val as i32) < (imm_se as i32)),
            branch_target: None,
        },
        ScalarOp::Sltu => ExOutput {
            value: u32::from(rs_val < rt_val),
            branch_target: None,
        },
        ScalarOp::Sltiu => ExOutput {
            value: u32::from(rs_val < imm_se),
            branch_target: None,
        },
        ScalarOp::Lui => ExOutput {
            value: u32::from(imm) << 16,
            branch_target: None,
        },

        ScalarOp::Jr | ScalarOp::Jalr => ExOutput {
            value: next_pc,
            branch_target: Some(rs_val),
        },
        ScalarOp::J | ScalarOp::Jal => ExOutput {
            value: next_pc,
            branch_target: Some((next_pc & 0xF000_0000) | (target26 << 2)),
        },
        ScalarOp::Bltz | ScalarOp::Bltzal => ExOutput {
            value: next_pc,
            branch_target: branch_target((rs_val as i32) < 0, imm_se),
        },
        ScalarOp::Bgez | ScalarOp::Bgezal => ExOutput {
            value: next_pc,
            branch_target: branch_target((rs_val as i32) >= 0, imm_se),
        },
        ScalarOp::Beq => ExOutput {
            value: 0,
            branch_target: branch_target(rs_val == rt_val, imm_se),
        },
        ScalarOp::Bne => ExOutput {
            value: 0,
            branch_target: branch_target(rs_val != rt_val, imm_se),
        },
        ScalarOp::Blez => ExOutput {
            value: 0,
            branch_target: branch_target((rs_val as i32) <= 0, imm_se),
        },
        ScalarOp::Bgtz => ExOutput {
            value: 0,
            branch_target: branch_target((rs_val as i32) > 0, imm_se),
        },

        ScalarOp::Lb
        | ScalarOp::Lh
        | ScalarOp::Lw
        | ScalarOp::Lbu
        | ScalarOp::Lhu
        | ScalarOp::Sb
        | ScalarOp::Sh
        | ScalarOp::Sw
        | ScalarOp::Lbv
        | ScalarOp::Lsv
        | ScalarOp::Llv
        | ScalarOp::Ldv
        | ScalarOp::Lqv
        | ScalarOp::Lrv
        | ScalarOp::Lpv
        | ScalarOp::Luv
        | ScalarOp::Lhv
        | ScalarOp::Lfv
        | ScalarOp::Ltv
        | ScalarOp::Sbv
        | ScalarOp::Ssv
        | ScalarOp::Slv
        | ScalarOp::Sdv
        | ScalarOp::Sqv
        | ScalarOp::Srv
        | ScalarOp::Spv
        | ScalarOp::Suv
        | ScalarOp::Shv
        | ScalarOp::Sfv
        | ScalarOp::Swv
        | ScalarOp::Stv => ExOutput {
            value: rs_val.wrapping_add(imm_se),
            branch_target: None,
        },

        ScalarOp::Mfc0
        | ScalarOp::Mtc0
        | ScalarOp::Mfc2
        | ScalarOp::Cfc2
        | ScalarOp::Mtc2
        | ScalarOp::Ctc2
        | ScalarOp::Break
        | ScalarOp::Invalid => ExOutput::default(),
    }
}
