//! Opcode decode tables for the three chip variants.
//!
//! A decode table maps each of the 256 opcode bytes to an
//! `{instruction, addressing mode, base cycles}` triple. Three tables exist,
//! layered the way the silicon was: the NMOS 6502 base, the Rockwell
//! extension adding the bit-manipulation column, and the WDC 65C02 adding
//! new modes and instructions and turning every remaining hole into a
//! documented multi-cycle NOP. [`Variant`] picks the table and is the only
//! configuration point.

use crate::addressing::AddrMode;

/// Chip variant being emulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// Original NMOS 6502. Unused opcodes decode to a zero-cycle illegal
    /// marker rather than their undocumented behavior.
    #[default]
    Nmos,
    /// Rockwell R65C00-series extension: the NMOS set plus
    /// RMB/SMB/BBR/BBS.
    Rockwell,
    /// WDC 65C02: Rockwell set plus new addressing modes, BRA, STZ,
    /// TRB/TSB, the extra stack ops, WAI/STP, and NOPs in every hole.
    Wdc,
}

impl Variant {
    /// The decode table for this variant.
    pub const fn decode_table(self) -> &'static [Opcode; 256] {
        match self {
            Self::Nmos => &NMOS,
            Self::Rockwell => &ROCKWELL,
            Self::Wdc => &WDC,
        }
    }

    /// True for the variant with CMOS behavior fixes (decimal-mode N/Z,
    /// D cleared on reset and interrupt entry, JMP-indirect repaired).
    pub const fn is_cmos(self) -> bool {
        matches!(self, Self::Wdc)
    }
}

/// Instruction tags. The Rockwell bit instructions carry their bit index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)] // the mnemonics are the documentation
pub enum Instruction {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Bra, Brk, Bvc, Bvs,
    Clc, Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny,
    Jmp, Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Phx, Phy, Pla, Plp,
    Plx, Ply, Rol, Ror, Rti, Rts, Sbc, Sec, Sed, Sei, Sta, Stp, Stx, Sty,
    Stz, Tax, Tay, Trb, Tsb, Tsx, Txa, Txs, Tya, Wai,
    Rmb(u8), Smb(u8), Bbr(u8), Bbs(u8),
    /// Unused opcode on a variant that leaves it unimplemented.
    Ill,
}

impl Instruction {
    /// Canonical mnemonic for disassembly.
    pub const fn mnemonic(self) -> &'static str {
        const RMB: [&str; 8] = ["RMB0", "RMB1", "RMB2", "RMB3", "RMB4", "RMB5", "RMB6", "RMB7"];
        const SMB: [&str; 8] = ["SMB0", "SMB1", "SMB2", "SMB3", "SMB4", "SMB5", "SMB6", "SMB7"];
        const BBR: [&str; 8] = ["BBR0", "BBR1", "BBR2", "BBR3", "BBR4", "BBR5", "BBR6", "BBR7"];
        const BBS: [&str; 8] = ["BBS0", "BBS1", "BBS2", "BBS3", "BBS4", "BBS5", "BBS6", "BBS7"];
        match self {
            Self::Adc => "ADC", Self::And => "AND", Self::Asl => "ASL",
            Self::Bcc => "BCC", Self::Bcs => "BCS", Self::Beq => "BEQ",
            Self::Bit => "BIT", Self::Bmi => "BMI", Self::Bne => "BNE",
            Self::Bpl => "BPL", Self::Bra => "BRA", Self::Brk => "BRK",
            Self::Bvc => "BVC", Self::Bvs => "BVS", Self::Clc => "CLC",
            Self::Cld => "CLD", Self::Cli => "CLI", Self::Clv => "CLV",
            Self::Cmp => "CMP", Self::Cpx => "CPX", Self::Cpy => "CPY",
            Self::Dec => "DEC", Self::Dex => "DEX", Self::Dey => "DEY",
            Self::Eor => "EOR", Self::Inc => "INC", Self::Inx => "INX",
            Self::Iny => "INY", Self::Jmp => "JMP", Self::Jsr => "JSR",
            Self::Lda => "LDA", Self::Ldx => "LDX", Self::Ldy => "LDY",
            Self::Lsr => "LSR", Self::Nop => "NOP", Self::Ora => "ORA",
            Self::Pha => "PHA", Self::Php => "PHP", Self::Phx => "PHX",
            Self::Phy => "PHY", Self::Pla => "PLA", Self::Plp => "PLP",
            Self::Plx => "PLX", Self::Ply => "PLY", Self::Rol => "ROL",
            Self::Ror => "ROR", Self::Rti => "RTI", Self::Rts => "RTS",
            Self::Sbc => "SBC", Self::Sec => "SEC", Self::Sed => "SED",
            Self::Sei => "SEI", Self::Sta => "STA", Self::Stp => "STP",
            Self::Stx => "STX", Self::Sty => "STY", Self::Stz => "STZ",
            Self::Tax => "TAX", Self::Tay => "TAY", Self::Trb => "TRB",
            Self::Tsb => "TSB", Self::Tsx => "TSX", Self::Txa => "TXA",
            Self::Txs => "TXS", Self::Tya => "TYA", Self::Wai => "WAI",
            Self::Rmb(bit) => RMB[(bit & 7) as usize],
            Self::Smb(bit) => SMB[(bit & 7) as usize],
            Self::Bbr(bit) => BBR[(bit & 7) as usize],
            Self::Bbs(bit) => BBS[(bit & 7) as usize],
            Self::Ill => "???",
        }
    }
}

/// One decode-table entry.
#[derive(Debug, Clone, Copy)]
pub struct Opcode {
    /// What to execute.
    pub instruction: Instruction,
    /// How to locate the operand.
    pub mode: AddrMode,
    /// Base cycle cost; extra cycles come from page crossings and taken
    /// branches.
    pub cycles: u8,
    /// Whether a page-crossing read adds one cycle.
    pub page_penalty: bool,
}

const fn op(instruction: Instruction, mode: AddrMode, cycles: u8) -> Opcode {
    Opcode {
        instruction,
        mode,
        cycles,
        page_penalty: false,
    }
}

/// Entry for reads through AbsX/AbsY/IndY that pay the page-cross cycle.
const fn opp(instruction: Instruction, mode: AddrMode, cycles: u8) -> Opcode {
    Opcode {
        instruction,
        mode,
        cycles,
        page_penalty: true,
    }
}

const ILLEGAL: Opcode = op(Instruction::Ill, AddrMode::Imp, 0);

/// The documented NMOS instruction set; everything else is [`ILLEGAL`].
#[allow(clippy::too_many_lines)]
const fn base_table() -> [Opcode; 256] {
    use AddrMode::{Abs, AbsX, AbsY, Acc, Imm, Imp, Ind, IndX, IndY, Rel, Zpg, ZpgX, ZpgY};
    use Instruction as I;

    let mut t = [ILLEGAL; 256];

    t[0x00] = op(I::Brk, Imp, 7);
    t[0x01] = op(I::Ora, IndX, 6);
    t[0x05] = op(I::Ora, Zpg, 3);
    t[0x06] = op(I::Asl, Zpg, 5);
    t[0x08] = op(I::Php, Imp, 3);
    t[0x09] = op(I::Ora, Imm, 2);
    t[0x0A] = op(I::Asl, Acc, 2);
    t[0x0D] = op(I::Ora, Abs, 4);
    t[0x0E] = op(I::Asl, Abs, 6);

    t[0x10] = op(I::Bpl, Rel, 2);
    t[0x11] = opp(I::Ora, IndY, 5);
    t[0x15] = op(I::Ora, ZpgX, 4);
    t[0x16] = op(I::Asl, ZpgX, 6);
    t[0x18] = op(I::Clc, Imp, 2);
    t[0x19] = opp(I::Ora, AbsY, 4);
    t[0x1D] = opp(I::Ora, AbsX, 4);
    t[0x1E] = op(I::Asl, AbsX, 7);

    t[0x20] = op(I::Jsr, Abs, 6);
    t[0x21] = op(I::And, IndX, 6);
    t[0x24] = op(I::Bit, Zpg, 3);
    t[0x25] = op(I::And, Zpg, 3);
    t[0x26] = op(I::Rol, Zpg, 5);
    t[0x28] = op(I::Plp, Imp, 4);
    t[0x29] = op(I::And, Imm, 2);
    t[0x2A] = op(I::Rol, Acc, 2);
    t[0x2C] = op(I::Bit, Abs, 4);
    t[0x2D] = op(I::And, Abs, 4);
    t[0x2E] = op(I::Rol, Abs, 6);

    t[0x30] = op(I::Bmi, Rel, 2);
    t[0x31] = opp(I::And, IndY, 5);
    t[0x35] = op(I::And, ZpgX, 4);
    t[0x36] = op(I::Rol, ZpgX, 6);
    t[0x38] = op(I::Sec, Imp, 2);
    t[0x39] = opp(I::And, AbsY, 4);
    t[0x3D] = opp(I::And, AbsX, 4);
    t[0x3E] = op(I::Rol, AbsX, 7);

    t[0x40] = op(I::Rti, Imp, 6);
    t[0x41] = op(I::Eor, IndX, 6);
    t[0x45] = op(I::Eor, Zpg, 3);
    t[0x46] = op(I::Lsr, Zpg, 5);
    t[0x48] = op(I::Pha, Imp, 3);
    t[0x49] = op(I::Eor, Imm, 2);
    t[0x4A] = op(I::Lsr, Acc, 2);
    t[0x4C] = op(I::Jmp, Abs, 3);
    t[0x4D] = op(I::Eor, Abs, 4);
    t[0x4E] = op(I::Lsr, Abs, 6);

    t[0x50] = op(I::Bvc, Rel, 2);
    t[0x51] = opp(I::Eor, IndY, 5);
    t[0x55] = op(I::Eor, ZpgX, 4);
    t[0x56] = op(I::Lsr, ZpgX, 6);
    t[0x58] = op(I::Cli, Imp, 2);
    t[0x59] = opp(I::Eor, AbsY, 4);
    t[0x5D] = opp(I::Eor, AbsX, 4);
    t[0x5E] = op(I::Lsr, AbsX, 7);

    t[0x60] = op(I::Rts, Imp, 6);
    t[0x61] = op(I::Adc, IndX, 6);
    t[0x65] = op(I::Adc, Zpg, 3);
    t[0x66] = op(I::Ror, Zpg, 5);
    t[0x68] = op(I::Pla, Imp, 4);
    t[0x69] = op(I::Adc, Imm, 2);
    t[0x6A] = op(I::Ror, Acc, 2);
    t[0x6C] = op(I::Jmp, Ind, 5);
    t[0x6D] = op(I::Adc, Abs, 4);
    t[0x6E] = op(I::Ror, Abs, 6);

    t[0x70] = op(I::Bvs, Rel, 2);
    t[0x71] = opp(I::Adc, IndY, 5);
    t[0x75] = op(I::Adc, ZpgX, 4);
    t[0x76] = op(I::Ror, ZpgX, 6);
    t[0x78] = op(I::Sei, Imp, 2);
    t[0x79] = opp(I::Adc, AbsY, 4);
    t[0x7D] = opp(I::Adc, AbsX, 4);
    t[0x7E] = op(I::Ror, AbsX, 7);

    t[0x81] = op(I::Sta, IndX, 6);
    t[0x84] = op(I::Sty, Zpg, 3);
    t[0x85] = op(I::Sta, Zpg, 3);
    t[0x86] = op(I::Stx, Zpg, 3);
    t[0x88] = op(I::Dey, Imp, 2);
    t[0x8A] = op(I::Txa, Imp, 2);
    t[0x8C] = op(I::Sty, Abs, 4);
    t[0x8D] = op(I::Sta, Abs, 4);
    t[0x8E] = op(I::Stx, Abs, 4);

    t[0x90] = op(I::Bcc, Rel, 2);
    t[0x91] = op(I::Sta, IndY, 6);
    t[0x94] = op(I::Sty, ZpgX, 4);
    t[0x95] = op(I::Sta, ZpgX, 4);
    t[0x96] = op(I::Stx, ZpgY, 4);
    t[0x98] = op(I::Tya, Imp, 2);
    t[0x99] = op(I::Sta, AbsY, 5);
    t[0x9A] = op(I::Txs, Imp, 2);
    t[0x9D] = op(I::Sta, AbsX, 5);

    t[0xA0] = op(I::Ldy, Imm, 2);
    t[0xA1] = op(I::Lda, IndX, 6);
    t[0xA2] = op(I::Ldx, Imm, 2);
    t[0xA4] = op(I::Ldy, Zpg, 3);
    t[0xA5] = op(I::Lda, Zpg, 3);
    t[0xA6] = op(I::Ldx, Zpg, 3);
    t[0xA8] = op(I::Tay, Imp, 2);
    t[0xA9] = op(I::Lda, Imm, 2);
    t[0xAA] = op(I::Tax, Imp, 2);
    t[0xAC] = op(I::Ldy, Abs, 4);
    t[0xAD] = op(I::Lda, Abs, 4);
    t[0xAE] = op(I::Ldx, Abs, 4);

    t[0xB0] = op(I::Bcs, Rel, 2);
    t[0xB1] = opp(I::Lda, IndY, 5);
    t[0xB4] = op(I::Ldy, ZpgX, 4);
    t[0xB5] = op(I::Lda, ZpgX, 4);
    t[0xB6] = op(I::Ldx, ZpgY, 4);
    t[0xB8] = op(I::Clv, Imp, 2);
    t[0xB9] = opp(I::Lda, AbsY, 4);
    t[0xBA] = op(I::Tsx, Imp, 2);
    t[0xBC] = opp(I::Ldy, AbsX, 4);
    t[0xBD] = opp(I::Lda, AbsX, 4);
    t[0xBE] = opp(I::Ldx, AbsY, 4);

    t[0xC0] = op(I::Cpy, Imm, 2);
    t[0xC1] = op(I::Cmp, IndX, 6);
    t[0xC4] = op(I::Cpy, Zpg, 3);
    t[0xC5] = op(I::Cmp, Zpg, 3);
    t[0xC6] = op(I::Dec, Zpg, 5);
    t[0xC8] = op(I::Iny, Imp, 2);
    t[0xC9] = op(I::Cmp, Imm, 2);
    t[0xCA] = op(I::Dex, Imp, 2);
    t[0xCC] = op(I::Cpy, Abs, 4);
    t[0xCD] = op(I::Cmp, Abs, 4);
    t[0xCE] = op(I::Dec, Abs, 6);

    t[0xD0] = op(I::Bne, Rel, 2);
    t[0xD1] = opp(I::Cmp, IndY, 5);
    t[0xD5] = op(I::Cmp, ZpgX, 4);
    t[0xD6] = op(I::Dec, ZpgX, 6);
    t[0xD8] = op(I::Cld, Imp, 2);
    t[0xD9] = opp(I::Cmp, AbsY, 4);
    t[0xDD] = opp(I::Cmp, AbsX, 4);
    t[0xDE] = op(I::Dec, AbsX, 7);

    t[0xE0] = op(I::Cpx, Imm, 2);
    t[0xE1] = op(I::Sbc, IndX, 6);
    t[0xE4] = op(I::Cpx, Zpg, 3);
    t[0xE5] = op(I::Sbc, Zpg, 3);
    t[0xE6] = op(I::Inc, Zpg, 5);
    t[0xE8] = op(I::Inx, Imp, 2);
    t[0xE9] = op(I::Sbc, Imm, 2);
    t[0xEA] = op(I::Nop, Imp, 2);
    t[0xEC] = op(I::Cpx, Abs, 4);
    t[0xED] = op(I::Sbc, Abs, 4);
    t[0xEE] = op(I::Inc, Abs, 6);

    t[0xF0] = op(I::Beq, Rel, 2);
    t[0xF1] = opp(I::Sbc, IndY, 5);
    t[0xF5] = op(I::Sbc, ZpgX, 4);
    t[0xF6] = op(I::Inc, ZpgX, 6);
    t[0xF8] = op(I::Sed, Imp, 2);
    t[0xF9] = opp(I::Sbc, AbsY, 4);
    t[0xFD] = opp(I::Sbc, AbsX, 4);
    t[0xFE] = op(I::Inc, AbsX, 7);

    t
}

/// Overlay the Rockwell bit-manipulation column onto a table.
///
/// Columns $x7 and $xF: RMB/SMB on the zero page, BBR/BBS with the combined
/// zero-page-plus-displacement operand.
const fn with_bit_ops(mut t: [Opcode; 256]) -> [Opcode; 256] {
    use Instruction as I;

    let mut bit: u8 = 0;
    while bit < 8 {
        let row = (bit as usize) << 4;
        t[row + 0x07] = op(I::Rmb(bit), AddrMode::Zpg, 5);
        t[row + 0x87] = op(I::Smb(bit), AddrMode::Zpg, 5);
        t[row + 0x0F] = op(I::Bbr(bit), AddrMode::ZpgRel, 5);
        t[row + 0x8F] = op(I::Bbs(bit), AddrMode::ZpgRel, 5);
        bit += 1;
    }
    t
}

/// The WDC 65C02 table: Rockwell plus the CMOS additions, with every
/// remaining hole defined as a NOP of documented length and cost.
const fn wdc_table() -> [Opcode; 256] {
    use AddrMode::{Abs, AbsIndX, AbsX, Acc, Imm, Imp, Ind, Rel, Zpg, ZpgInd, ZpgX};
    use Instruction as I;

    let mut t = with_bit_ops(base_table());

    // Columns $x3 and $xB: single-byte, single-cycle NOPs. WAI and STP are
    // carved back out below.
    let mut row: usize = 0;
    while row < 16 {
        t[(row << 4) + 0x03] = op(I::Nop, Imp, 1);
        t[(row << 4) + 0x0B] = op(I::Nop, Imp, 1);
        row += 1;
    }

    // Column $x2 holes: two-byte, two-cycle NOPs.
    t[0x02] = op(I::Nop, Imm, 2);
    t[0x22] = op(I::Nop, Imm, 2);
    t[0x42] = op(I::Nop, Imm, 2);
    t[0x62] = op(I::Nop, Imm, 2);
    t[0x82] = op(I::Nop, Imm, 2);
    t[0xC2] = op(I::Nop, Imm, 2);
    t[0xE2] = op(I::Nop, Imm, 2);

    // Remaining holes in columns $x4 and $xC.
    t[0x44] = op(I::Nop, Zpg, 3);
    t[0x54] = op(I::Nop, ZpgX, 4);
    t[0xD4] = op(I::Nop, ZpgX, 4);
    t[0xF4] = op(I::Nop, ZpgX, 4);
    t[0x5C] = op(I::Nop, Abs, 8);
    t[0xDC] = op(I::Nop, Abs, 4);
    t[0xFC] = op(I::Nop, Abs, 4);

    // Test-and-set / test-and-reset.
    t[0x04] = op(I::Tsb, Zpg, 5);
    t[0x0C] = op(I::Tsb, Abs, 6);
    t[0x14] = op(I::Trb, Zpg, 5);
    t[0x1C] = op(I::Trb, Abs, 6);

    // Zero-page indirect forms of the accumulator group.
    t[0x12] = op(I::Ora, ZpgInd, 5);
    t[0x32] = op(I::And, ZpgInd, 5);
    t[0x52] = op(I::Eor, ZpgInd, 5);
    t[0x72] = op(I::Adc, ZpgInd, 5);
    t[0x92] = op(I::Sta, ZpgInd, 5);
    t[0xB2] = op(I::Lda, ZpgInd, 5);
    t[0xD2] = op(I::Cmp, ZpgInd, 5);
    t[0xF2] = op(I::Sbc, ZpgInd, 5);

    // Accumulator increment/decrement.
    t[0x1A] = op(I::Inc, Acc, 2);
    t[0x3A] = op(I::Dec, Acc, 2);

    // Extra BIT forms.
    t[0x34] = op(I::Bit, ZpgX, 4);
    t[0x3C] = opp(I::Bit, AbsX, 4);
    t[0x89] = op(I::Bit, Imm, 2);

    // X/Y stack operations.
    t[0x5A] = op(I::Phy, Imp, 3);
    t[0x7A] = op(I::Ply, Imp, 4);
    t[0xDA] = op(I::Phx, Imp, 3);
    t[0xFA] = op(I::Plx, Imp, 4);

    // Store zero.
    t[0x64] = op(I::Stz, Zpg, 3);
    t[0x74] = op(I::Stz, ZpgX, 4);
    t[0x9C] = op(I::Stz, Abs, 4);
    t[0x9E] = op(I::Stz, AbsX, 5);

    // Branch always.
    t[0x80] = op(I::Bra, Rel, 2);

    // JMP gains the indexed-indirect form; the indirect form takes an extra
    // cycle for the repaired page handling.
    t[0x6C] = op(I::Jmp, Ind, 6);
    t[0x7C] = op(I::Jmp, AbsIndX, 6);

    // Halt instructions.
    t[0xCB] = op(I::Wai, Imp, 3);
    t[0xDB] = op(I::Stp, Imp, 3);

    t
}

/// NMOS 6502 decode table.
pub const NMOS: [Opcode; 256] = base_table();

/// Rockwell decode table: NMOS plus the bit-manipulation column.
pub const ROCKWELL: [Opcode; 256] = with_bit_ops(base_table());

/// WDC 65C02 decode table.
pub const WDC: [Opcode; 256] = wdc_table();
