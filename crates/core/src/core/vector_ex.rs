//! Vector-unit execution: element broadcast, the multiply-accumulate and
//! compare families, logicals, move/merge, and the reciprocal protocol.
//!
//! Every vector-compute instruction reads `vs` unshuffled and `vt` through
//! the element-specifier broadcast in [`apply_element`], matching the
//! `RSPGetVectorOperands` shuffle table in the original source. Saturation
//! and accumulator bookkeeping follow the same scheme for every tag in a
//! family (F/U/L/M/N/H) so the family is implemented once and dispatched by
//! a handful of bools rather than six near-identical copies.

use crate::core::reciprocal_rom;
use crate::core::regs::{Accumulator, VectorFlags, VectorLanes};
use crate::isa::decoder::VectorOp;

/// Whether `op` writes its result into `vd`. `false` for VNOP/VINVALID and
/// the tags with no defined algorithm in the source (VRNDP/VRNDN/VMULQ/
/// VMACQ): [`execute`] still returns a value for them (`vs` unchanged) but
/// the pipeline must not commit it.
#[must_use]
pub fn has_writeback(op: VectorOp) -> bool {
    !matches!(
        op,
        VectorOp::Vnop
            | VectorOp::Vinvalid
            | VectorOp::Vrndp
            | VectorOp::Vrndn
            | VectorOp::Vmulq
            | VectorOp::Vmacq
    )
}

/// Applies the element specifier to `lanes`, returning the broadcast view
/// used as the `vt` operand.
#[must_use]
pub fn apply_element(lanes: VectorLanes, e: u8) -> VectorLanes {
    let source = |i: usize| -> usize {
        match e & 0xF {
            0 | 1 => i,
            2 => i & 1,
            3 => 2 + (i & 1),
            4..=7 => usize::from(e & 0xF) - 4,
            _ => usize::from(e & 0xF) - 8,
        }
    };
    let mut out = [0u16; 8];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = lanes[source(i)];
    }
    out
}

fn set_bit(flags: &mut u16, lane: usize, value: bool) {
    if value {
        *flags |= 1 << lane;
    } else {
        *flags &= !(1 << lane);
    }
}

fn saturate_i16(value: i64) -> u16 {
    value.clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16 as u16
}

fn saturate_u16(value: i64) -> u16 {
    value.clamp(0, i64::from(u16::MAX)) as u16
}

/// `VMUDL`/`VMADL`'s destination extraction: the bits of the accumulator
/// above the low bank (its mid:high 32-bit view) determine whether the low
/// bank alone fits in an unsigned 16-bit result. 0 when that view is
/// negative, 0xFFFF when it is positive (the true value overflows 16 bits),
/// the raw low bank otherwise.
fn low_bank_clamp(acc: &Accumulator, i: usize) -> u16 {
    let upper = (u32::from(acc.high[i]) << 16) | u32::from(acc.mid[i]);
    match (upper as i32).cmp(&0) {
        std::cmp::Ordering::Less => 0,
        std::cmp::Ordering::Greater => 0xFFFF,
        std::cmp::Ordering::Equal => acc.low[i],
    }
}

/// Inputs common to every per-lane vector-compute handler.
pub struct Operands<'a> {
    pub vs: VectorLanes,
    pub vt: VectorLanes,
    /// Raw element-specifier field from the instruction word.
    /// [`VectorOp::Vsar`] reads this directly (it selects an accumulator
    /// bank rather than
    /// shuffling `vt`), everything else only sees its effect through the
    /// already-broadcast `vt` produced by [`apply_element`].
    pub e: u8,
    pub acc: &'a mut Accumulator,
    pub flags: &'a mut VectorFlags,
    pub reciprocal_rom: Option<&'a [u16]>,
}

/// Executes `op` with broadcast-adjusted `vt`, returning the value to be
/// written into `vd`.
#[must_use]
pub fn execute(op: VectorOp, operands: Operands<'_>) -> VectorLanes {
    let Operands {
        vs,
        vt,
        e,
        acc,
        flags,
        reciprocal_rom: rom,
    } = operands;
    let mut vd = [0u16; 8];

    match op {
        VectorOp::Vmulf | VectorOp::Vmulu | VectorOp::Vmacf | VectorOp::Vmacu => {
            let is_mac = matches!(op, VectorOp::Vmacf | VectorOp::Vmacu);
            let is_unsigned = matches!(op, VectorOp::Vmulu | VectorOp::Vmacu);
            for i in 0..8 {
                let prod = i64::from(vs[i] as i16) * i64::from(vt[i] as i16) * 2;
                let value = if is_mac {
                    acc.lane_i64(i) + prod
                } else {
                    prod + 0x8000
                };
                acc.set_lane(i, value);
                vd[i] = if is_unsigned {
                    saturate_u16(value >> 16)
                } else {
                    saturate_i16(value >> 16)
                };
            }
        }

        // The four `L`/`M`/`N`/`H` multiply ops are the standard
        // unsigned-correction decomposition of the signed×signed product
        // `se16(vs) * se16(vt)`: writing `vs_s = se16(vs)`, `vs_u = ze16(vs)`
        // (similarly for vt), the identity
        //   vs_s*vt_s = vs_u*vt_u + (vs_s-vs_u)*vt_u + vs_u*(vt_s-vt_u)
        //                         + (vs_s-vs_u)*(vt_s-vt_u)
        // holds exactly (each `(x_s-x_u)` term is 0 when `x` is non-negative
        // and -0x10000 otherwise), so `VMUDH` followed by `VMADL`/`VMADM`/
        // `VMADN` accumulating the other three terms reproduces the exact
        // 48-bit signed product, regardless of which of the four is the
        // initial overwrite and which three accumulate.
        VectorOp::Vmudl | VectorOp::Vmadl => {
            let is_mac = op == VectorOp::Vmadl;
            for i in 0..8 {
                let prod = i64::from(vs[i]) * i64::from(vt[i]);
                let value = if is_mac { acc.lane_i64(i) + prod } else { prod };
                acc.set_lane(i, value);
                vd[i] = low_bank_clamp(acc, i);
            }
        }

        VectorOp::Vmudm | VectorOp::Vmadm => {
            let is_mac = op == VectorOp::Vmadm;
            for i in 0..8 {
                let vs_s = i64::from(vs[i] as i16);
                let vs_u = i64::from(vs[i]);
                let prod = (vs_s - vs_u) * i64::from(vt[i]);
                let value = if is_mac { acc.lane_i64(i) + prod } else { prod };
                acc.set_lane(i, value);
                vd[i] = saturate_i16(value >> 16);
            }
        }

        VectorOp::Vmudn | VectorOp::Vmadn => {
            let is_mac = op == VectorOp::Vmadn;
            for i in 0..8 {
                let vt_s = i64::from(vt[i] as i16);
                let vt_u = i64::from(vt[i]);
                let prod = i64::from(vs[i]) * (vt_s - vt_u);
                let value = if is_mac { acc.lane_i64(i) + prod } else { prod };
                acc.set_lane(i, value);
                vd[i] = value as u16;
            }
        }

        VectorOp::Vmudh | VectorOp::Vmadh => {
            let is_mac = op == VectorOp::Vmadh;
            for i in 0..8 {
                let vs_s = i64::from(vs[i] as i16);
                let vs_u = i64::from(vs[i]);
                let vt_s = i64::from(vt[i] as i16);
                let vt_u = i64::from(vt[i]);
                let prod = (vs_s - vs_u) * (vt_s - vt_u);
                let value = if is_mac { acc.lane_i64(i) + prod } else { prod };
                acc.set_lane(i, value);
                vd[i] = saturate_i16(value >> 16);
            }
        }

        VectorOp::Vadd => {
            let carry = flags.vco & 0xFF;
            for i in 0..8 {
                let sum = i64::from(vs[i] as i16) + i64::from(vt[i] as i16) + i64::from((carry >> i) & 1);
                acc.set_lane(i, sum);
                vd[i] = saturate_i16(sum);
            }
            flags.vco = 0;
        }

        VectorOp::Vsub => {
            let borrow = flags.vco & 0xFF;
            for i in 0..8 {
                let diff =
                    i64::from(vs[i] as i16) - i64::from(vt[i] as i16) - i64::from((borrow >> i) & 1);
                acc.set_lane(i, diff);
                vd[i] = saturate_i16(diff);
            }
            flags.vco = 0;
        }

        VectorOp::Vaddc => {
            let mut carry = 0u16;
            for i in 0..8 {
                let sum = u32::from(vs[i]) + u32::from(vt[i]);
                let truncated = sum as u16;
                set_bit(&mut carry, i, sum > 0xFFFF);
                set_bit(&mut carry, i + 8, truncated != 0);
                acc.set_lane(i, i64::from(truncated));
                vd[i] = truncated;
            }
            flags.vco = carry;
        }

        VectorOp::Vsubc => {
            let mut flag = 0u16;
            for i in 0..8 {
                let a = i32::from(vs[i]);
                let b = i32::from(vt[i]);
                let diff = a - b;
                set_bit(&mut flag, i, diff < 0);
                set_bit(&mut flag, i + 8, diff != 0);
                acc.set_lane(i, i64::from(diff as u16));
                vd[i] = diff as u16;
            }
            flags.vco = flag;
        }

        VectorOp::Vabs => {
            for i in 0..8 {
                let s = vs[i] as i16;
                let t = vt[i] as i16;
                let value = match s.cmp(&0) {
                    std::cmp::Ordering::Equal => 0,
                    std::cmp::Ordering::Less => {
                        if t == i16::MIN {
                            i16::MAX
                        } else {
                            t.wrapping_neg()
                        }
                    }
                    std::cmp::Ordering::Greater => t,
                };
                acc.set_lane(i, i64::from(value));
                vd[i] = value as u16;
            }
        }

        VectorOp::Veq | VectorOp::Vne | VectorOp::Vlt | VectorOp::Vge => {
            let mut cc = 0u16;
            let carry = flags.vco & 0xFF != 0;
            for i in 0..8 {
                let s = vs[i] as i16;
                let t = vt[i] as i16;
                let cond = match op {
                    VectorOp::Veq => s == t,
                    VectorOp::Vne => s != t,
                    VectorOp::Vlt => s < t || (s == t && carry),
                    VectorOp::Vge => s > t || (s == t && !carry),
                    _ => unreachable!(),
                };
                set_bit(&mut cc, i, cond);
                let value = if cond { s } else { t };
                acc.set_lane(i, i64::from(value));
                vd[i] = value as u16;
            }
            flags.vcc = cc;
            flags.vco = 0;
        }

        VectorOp::Vch | VectorOp::Vcl | VectorOp::Vcr => {
            let mut carry = 0u16;
            let mut noteq = 0u16;
            let mut ext = 0u8;
            for i in 0..8 {
                let s = vs[i] as i16;
                let t = vt[i] as i16;
                let sign_differs = (s ^ t) < 0;
                let negated_t = if t == i16::MIN { i16::MAX } else { t.wrapping_neg() };
                let (selected, eq) = if sign_differs {
                    (if t < 0 { s } else { negated_t }, s == negated_t)
                } else {
                    (if t < 0 { negated_t } else { t }, s == t)
                };
                set_bit(&mut carry, i, sign_differs);
                set_bit(&mut noteq, i, !eq);
                if op == VectorOp::Vch {
                    let vce_bit = sign_differs && s.wrapping_add(t) == -1;
                    if vce_bit {
                        ext |= 1 << i;
                    }
                }
                acc.set_lane(i, i64::from(selected));
                vd[i] = selected as u16;
            }
            flags.vco = carry | (noteq << 8);
            if op == VectorOp::Vch {
                flags.vce = ext;
            }
        }

        VectorOp::Vsar => {
            for (i, slot) in vd.iter_mut().enumerate() {
                *slot = match e & 0x3 {
                    0 => acc.high[i],
                    1 => acc.mid[i],
                    2 => acc.low[i],
                    _ => 0,
                };
            }
        }

        VectorOp::Vand | VectorOp::Vnand => {
            for i in 0..8 {
                let v = vs[i] & vt[i];
                let v = if op == VectorOp::Vnand { !v } else { v };
                acc.low[i] = v;
                vd[i] = v;
            }
        }
        VectorOp::Vor | VectorOp::Vnor => {
            for i in 0..8 {
                let v = vs[i] | vt[i];
                let v = if op == VectorOp::Vnor { !v } else { v };
                acc.low[i] = v;
                vd[i] = v;
            }
        }
        VectorOp::Vxor | VectorOp::Vnxor => {
            for i in 0..8 {
                let v = vs[i] ^ vt[i];
                let v = if op == VectorOp::Vnxor { !v } else { v };
                acc.low[i] = v;
                vd[i] = v;
            }
        }

        VectorOp::Vmov => {
            vd = vt;
        }

        VectorOp::Vmrg => {
            for i in 0..8 {
                let cond = (flags.vcc >> i) & 1 != 0;
                vd[i] = if cond { vs[i] } else { vt[i] };
            }
        }

        VectorOp::Vrcp | VectorOp::Vrcpl | VectorOp::Vrcph => {
            let elem = vt[0] as i16;
            let result = match op {
                VectorOp::Vrcph => {
                    let out_high = ((flags.div_out >> 16) & 0xFFFF) as u16;
                    flags.div_in = i32::from(elem) << 16;
                    flags.double_precision = true;
                    out_high
                }
                VectorOp::Vrcpl => {
                    let input = if flags.double_precision {
                        flags.div_in | (i32::from(elem) & 0xFFFF)
                    } else {
                        i32::from(elem)
                    };
                    let result = reciprocal(input, rom);
                    flags.div_out = result;
                    flags.double_precision = false;
                    (result & 0xFFFF) as u16
                }
                _ => {
                    let result = reciprocal(i32::from(elem), rom);
                    flags.div_out = result;
                    (result & 0xFFFF) as u16
                }
            };
            vd = [result; 8];
        }

        VectorOp::Vrsq | VectorOp::Vrsql | VectorOp::Vrsqh => {
            let elem = vt[0] as i16;
            let result = match op {
                VectorOp::Vrsqh => {
                    let out_high = ((flags.div_out >> 16) & 0xFFFF) as u16;
                    flags.div_in = i32::from(elem) << 16;
                    flags.double_precision = true;
                    out_high
                }
                VectorOp::Vrsql => {
                    let input = if flags.double_precision {
                        flags.div_in | (i32::from(elem) & 0xFFFF)
                    } else {
                        i32::from(elem)
                    };
                    let result = rsqrt(input, rom);
                    flags.div_out = result;
                    flags.double_precision = false;
                    (result & 0xFFFF) as u16
                }
                _ => {
                    let result = rsqrt(i32::from(elem), rom);
                    flags.div_out = result;
                    (result & 0xFFFF) as u16
                }
            };
            vd = [result; 8];
        }

        // VNOP and everything with no defined algorithm in the source
        // (VRNDP/VRNDN/VMULQ/VMACQ, and the unused opcode slots) leave
        // the destination register and accumulator untouched.
        VectorOp::Vnop
        | VectorOp::Vinvalid
        | VectorOp::Vrndp
        | VectorOp::Vrndn
        | VectorOp::Vmulq
        | VectorOp::Vmacq => {
            vd = vs;
        }
    }

    vd
}

fn reciprocal_magnitude(mag: u32, rom: Option<&[u16]>) -> u32 {
    let shift = mag.leading_zeros();
    let normalized = mag << shift;
    let index = ((normalized >> 22) & 0x1FF) as usize;
    let rom_value = u32::from(reciprocal_rom::lookup(rom, index));
    (rom_value << 14) >> shift.min(31)
}

/// Computes the reciprocal of a 16.16-style fixed-point input, using the
/// module's reciprocal ROM for the mantissa lookup.
#[must_use]
pub fn reciprocal(input: i32, rom: Option<&[u16]>) -> i32 {
    if input == 0 {
        return 0x7FFF_FFFF;
    }
    if input as u32 == 0xFFFF_8000 {
        return 0xFFFF_0000u32 as i32;
    }
    let negative = input < 0;
    let mag = if negative { input.unsigned_abs() } else { input as u32 };
    let result = reciprocal_magnitude(mag, rom) as i32;
    if negative {
        !result
    } else {
        result
    }
}

fn rsqrt_magnitude(mag: u32, rom: Option<&[u16]>) -> u32 {
    let shift = mag.leading_zeros();
    let normalized = mag << shift;
    let odd = shift & 1;
    let index = (((normalized >> 22) & 0x1FF) | (odd << 8)) as usize;
    let rom_value = u32::from(reciprocal_rom::lookup(rom, index));
    (rom_value << 14) >> (shift >> 1).min(31)
}

/// Computes the reciprocal square root, mirroring [`reciprocal`]'s ROM
/// addressing with the extra even/odd-shift bit the square root needs.
#[must_use]
pub fn rsqrt(input: i32, rom: Option<&[u16]>) -> i32 {
    if input == 0 {
        return 0x7FFF_FFFF;
    }
    if input as u32 == 0xFFFF_8000 {
        return 0xFFFF_0000u32 as i32;
    }
    let negative = input < 0;
    let mag = if negative { input.unsigned_abs() } else { input as u32 };
    let result = rsqrt_magnitude(mag, rom) as i32;
    if negative {
        !result
    } else {
        result
    }
}
