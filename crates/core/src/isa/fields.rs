//! Bit-field extraction for the two instruction formats the decoder
//! recognizes: the MIPS-like R/I/J scalar format, and the vector-compute
//! format used once `classify` reports [`crate::isa::decoder::Decoded::VectorCompute`].
//!
//! Field extraction is kept separate from opcode classification so that the
//! pipeline can pull register numbers, immediates, and the element
//! specifier out of an instruction word without re-deciding what kind of
//! word it is.

/// Fields of a scalar-format instruction word (R-type, I-type, and J-type
/// fields all extracted unconditionally; a given opcode only consumes the
/// subset its format defines).
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarFields {
    /// Bits `[25:21]`: source register / vector-store base.
    pub rs: u8,
    /// Bits `[20:16]`: second source / destination register, or the
    /// vector register field for the vector load/store family.
    pub rt: u8,
    /// Bits `[15:11]`: R-type destination register, or the
    /// control-coprocessor register index for MFC0/MTC0/MFC2/CFC2/MTC2/CTC2.
    pub rd: u8,
    /// Bits `[10:6]`: shift amount.
    pub shamt: u8,
    /// Bits `[15:0]`: I-type immediate.
    pub imm: u16,
    /// Bits `[25:0]`: J-type jump target.
    pub target26: u32,
    /// Bits `[10:7]`: vector load/store element index.
    pub element: u8,
    /// Bits `[6:0]`: vector load/store signed byte offset.
    pub offset7: u8,
}

/// Extracts every scalar-format field from `iw`. Cheap enough to call
/// unconditionally; the caller only reads the fields its opcode needs.
#[must_use]
pub fn scalar_fields(iw: u32) -> ScalarFields {
    ScalarFields {
        rs: ((iw >> 21) & 0x1F) as u8,
        rt: ((iw >> 16) & 0x1F) as u8,
        rd: ((iw >> 11) & 0x1F) as u8,
        shamt: ((iw >> 6) & 0x1F) as u8,
        imm: (iw & 0xFFFF) as u16,
        target26: iw & 0x03FF_FFFF,
        element: ((iw >> 7) & 0xF) as u8,
        offset7: (iw & 0x7F) as u8,
    }
}

/// Fields of a vector-compute instruction word: `e(4) vt(5) vs(5) vd(5)
/// func(6)`, following the 1-bit format marker at bit 25 that
/// [`crate::isa::decoder::classify`] has already consumed.
#[derive(Debug, Clone, Copy, Default)]
pub struct VectorFields {
    /// Bits `[24:21]`: element specifier.
    pub e: u8,
    /// Bits `[20:16]`: VT source register.
    pub vt: u8,
    /// Bits `[15:11]`: VS source register.
    pub vs: u8,
    /// Bits `[10:6]`: VD destination register.
    pub vd: u8,
}

/// Extracts the vector-compute fields from `iw`. The opcode tag itself
/// (bits `[5:0]`) is decoded separately by
/// [`crate::isa::decoder::decode_vector`].
#[must_use]
pub fn vector_fields(iw: u32) -> VectorFields {
    VectorFields {
        e: ((iw >> 21) & 0xF) as u8,
        vt: ((iw >> 16) & 0x1F) as u8,
        vs: ((iw >> 11) & 0x1F) as u8,
        vd: ((iw >> 6) & 0x1F) as u8,
    }
}
