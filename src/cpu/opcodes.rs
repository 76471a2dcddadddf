//! Static opcode table for the official 6502 instruction set.
//!
//! Each of the 151 documented opcodes maps to an [`Instruction`]: the
//! operation, how its operand is addressed, the base cycle cost and whether
//! an indexed page crossing adds a cycle. The remaining 105 bytes decode to
//! `None`.

use super::addressing::AddressingMode;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
}

impl Operation {
    pub fn mnemonic(self) -> &'static str {
        use Operation::*;
        match self {
            Adc => "ADC",
            And => "AND",
            Asl => "ASL",
            Bcc => "BCC",
            Bcs => "BCS",
            Beq => "BEQ",
            Bit => "BIT",
            Bmi => "BMI",
            Bne => "BNE",
            Bpl => "BPL",
            Brk => "BRK",
            Bvc => "BVC",
            Bvs => "BVS",
            Clc => "CLC",
            Cld => "CLD",
            Cli => "CLI",
            Clv => "CLV",
            Cmp => "CMP",
            Cpx => "CPX",
            Cpy => "CPY",
            Dec => "DEC",
            Dex => "DEX",
            Dey => "DEY",
            Eor => "EOR",
            Inc => "INC",
            Inx => "INX",
            Iny => "INY",
            Jmp => "JMP",
            Jsr => "JSR",
            Lda => "LDA",
            Ldx => "LDX",
            Ldy => "LDY",
            Lsr => "LSR",
            Nop => "NOP",
            Ora => "ORA",
            Pha => "PHA",
            Php => "PHP",
            Pla => "PLA",
            Plp => "PLP",
            Rol => "ROL",
            Ror => "ROR",
            Rti => "RTI",
            Rts => "RTS",
            Sbc => "SBC",
            Sec => "SEC",
            Sed => "SED",
            Sei => "SEI",
            Sta => "STA",
            Stx => "STX",
            Sty => "STY",
            Tax => "TAX",
            Tay => "TAY",
            Tsx => "TSX",
            Txa => "TXA",
            Txs => "TXS",
            Tya => "TYA",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub operation: Operation,
    pub mode: AddressingMode,
    pub cycles: u8,
    /// Read-class indexed access: +1 cycle when the index crosses a page.
    pub page_penalty: bool,
}

impl Instruction {
    const fn new(operation: Operation, mode: AddressingMode, cycles: u8, page_penalty: bool) -> Self {
        Instruction {
            operation,
            mode,
            cycles,
            page_penalty,
        }
    }

    /// Opcode byte plus operand bytes.
    pub fn len(&self) -> u8 {
        1 + self.mode.operand_len()
    }
}

#[inline]
pub fn decode(opcode: u8) -> Option<Instruction> {
    OPCODES[opcode as usize]
}

pub static OPCODES: [Option<Instruction>; 256] = build_table();

const fn build_table() -> [Option<Instruction>; 256] {
    use AddressingMode::*;
    use Operation::*;

    let defs: [(u8, Operation, AddressingMode, u8, bool); 151] = [
        (0x69, Adc, Immediate, 2, false),
        (0x65, Adc, ZeroPage, 3, false),
        (0x75, Adc, ZeroPageX, 4, false),
        (0x6D, Adc, Absolute, 4, false),
        (0x7D, Adc, AbsoluteX, 4, true),
        (0x79, Adc, AbsoluteY, 4, true),
        (0x61, Adc, IndexedIndirect, 6, false),
        (0x71, Adc, IndirectIndexed, 5, true),
        (0x29, And, Immediate, 2, false),
        (0x25, And, ZeroPage, 3, false),
        (0x35, And, ZeroPageX, 4, false),
        (0x2D, And, Absolute, 4, false),
        (0x3D, And, AbsoluteX, 4, true),
        (0x39, And, AbsoluteY, 4, true),
        (0x21, And, IndexedIndirect, 6, false),
        (0x31, And, IndirectIndexed, 5, true),
        (0x0A, Asl, Accumulator, 2, false),
        (0x06, Asl, ZeroPage, 5, false),
        (0x16, Asl, ZeroPageX, 6, false),
        (0x0E, Asl, Absolute, 6, false),
        (0x1E, Asl, AbsoluteX, 7, false),
        (0x90, Bcc, Relative, 2, false),
        (0xB0, Bcs, Relative, 2, false),
        (0xF0, Beq, Relative, 2, false),
        (0x24, Bit, ZeroPage, 3, false),
        (0x2C, Bit, Absolute, 4, false),
        (0x30, Bmi, Relative, 2, false),
        (0xD0, Bne, Relative, 2, false),
        (0x10, Bpl, Relative, 2, false),
        (0x00, Brk, Implied, 7, false),
        (0x50, Bvc, Relative, 2, false),
        (0x70, Bvs, Relative, 2, false),
        (0x18, Clc, Implied, 2, false),
        (0xD8, Cld, Implied, 2, false),
        (0x58, Cli, Implied, 2, false),
        (0xB8, Clv, Implied, 2, false),
        (0xC9, Cmp, Immediate, 2, false),
        (0xC5, Cmp, ZeroPage, 3, false),
        (0xD5, Cmp, ZeroPageX, 4, false),
        (0xCD, Cmp, Absolute, 4, false),
        (0xDD, Cmp, AbsoluteX, 4, true),
        (0xD9, Cmp, AbsoluteY, 4, true),
        (0xC1, Cmp, IndexedIndirect, 6, false),
        (0xD1, Cmp, IndirectIndexed, 5, true),
        (0xE0, Cpx, Immediate, 2, false),
        (0xE4, Cpx, ZeroPage, 3, false),
        (0xEC, Cpx, Absolute, 4, false),
        (0xC0, Cpy, Immediate, 2, false),
        (0xC4, Cpy, ZeroPage, 3, false),
        (0xCC, Cpy, Absolute, 4, false),
        (0xC6, Dec, ZeroPage, 5, false),
        (0xD6, Dec, ZeroPageX, 6, false),
        (0xCE, Dec, Absolute, 6, false),
        (0xDE, Dec, AbsoluteX, 7, false),
        (0xCA, Dex, Implied, 2, false),
        (0x88, Dey, Implied, 2, false),
        (0x49, Eor, Immediate, 2, false),
        (0x45, Eor, ZeroPage, 3, false),
        (0x55, Eor, ZeroPageX, 4, false),
        (0x4D, Eor, Absolute, 4, false),
        (0x5D, Eor, AbsoluteX, 4, true),
        (0x59, Eor, AbsoluteY, 4, true),
        (0x41, Eor, IndexedIndirect, 6, false),
        (0x51, Eor, IndirectIndexed, 5, true),
        (0xE6, Inc, ZeroPage, 5, false),
        (0xF6, Inc, ZeroPageX, 6, false),
        (0xEE, Inc, Absolute, 6, false),
        (0xFE, Inc, AbsoluteX, 7, false),
        (0xE8, Inx, Implied, 2, false),
        (0xC8, Iny, Implied, 2, false),
        (0x4C, Jmp, Absolute, 3, false),
        (0x6C, Jmp, Indirect, 5, false),
        (0x20, Jsr, Absolute, 6, false),
        (0xA9, Lda, Immediate, 2, false),
        (0xA5, Lda, ZeroPage, 3, false),
        (0xB5, Lda, ZeroPageX, 4, false),
        (0xAD, Lda, Absolute, 4, false),
        (0xBD, Lda, AbsoluteX, 4, true),
        (0xB9, Lda, AbsoluteY, 4, true),
        (0xA1, Lda, IndexedIndirect, 6, false),
        (0xB1, Lda, IndirectIndexed, 5, true),
        (0xA2, Ldx, Immediate, 2, false),
        (0xA6, Ldx, ZeroPage, 3, false),
        (0xB6, Ldx, ZeroPageY, 4, false),
        (0xAE, Ldx, Absolute, 4, false),
        (0xBE, Ldx, AbsoluteY, 4, true),
        (0xA0, Ldy, Immediate, 2, false),
        (0xA4, Ldy, ZeroPage, 3, false),
        (0xB4, Ldy, ZeroPageX, 4, false),
        (0xAC, Ldy, Absolute, 4, false),
        (0xBC, Ldy, AbsoluteX, 4, true),
        (0x4A, Lsr, Accumulator, 2, false),
        (0x46, Lsr, ZeroPage, 5, false),
        (0x56, Lsr, ZeroPageX, 6, false),
        (0x4E, Lsr, Absolute, 6, false),
        (0x5E, Lsr, AbsoluteX, 7, false),
        (0xEA, Nop, Implied, 2, false),
        (0x09, Ora, Immediate, 2, false),
        (0x05, Ora, ZeroPage, 3, false),
        (0x15, Ora, ZeroPageX, 4, false),
        (0x0D, Ora, Absolute, 4, false),
        (0x1D, Ora, AbsoluteX, 4, true),
        (0x19, Ora, AbsoluteY, 4, true),
        (0x01, Ora, IndexedIndirect, 6, false),
        (0x11, Ora, IndirectIndexed, 5, true),
        (0x48, Pha, Implied, 3, false),
        (0x08, Php, Implied, 3, false),
        (0x68, Pla, Implied, 4, false),
        (0x28, Plp, Implied, 4, false),
        (0x2A, Rol, Accumulator, 2, false),
        (0x26, Rol, ZeroPage, 5, false),
        (0x36, Rol, ZeroPageX, 6, false),
        (0x2E, Rol, Absolute, 6, false),
        (0x3E, Rol, AbsoluteX, 7, false),
        (0x6A, Ror, Accumulator, 2, false),
        (0x66, Ror, ZeroPage, 5, false),
        (0x76, Ror, ZeroPageX, 6, false),
        (0x6E, Ror, Absolute, 6, false),
        (0x7E, Ror, AbsoluteX, 7, false),
        (0x40, Rti, Implied, 6, false),
        (0x60, Rts, Implied, 6, false),
        (0xE9, Sbc, Immediate, 2, false),
        (0xE5, Sbc, ZeroPage, 3, false),
        (0xF5, Sbc, ZeroPageX, 4, false),
        (0xED, Sbc, Absolute, 4, false),
        (0xFD, Sbc, AbsoluteX, 4, true),
        (0xF9, Sbc, AbsoluteY, 4, true),
        (0xE1, Sbc, IndexedIndirect, 6, false),
        (0xF1, Sbc, IndirectIndexed, 5, true),
        (0x38, Sec, Implied, 2, false),
        (0xF8, Sed, Implied, 2, false),
        (0x78, Sei, Implied, 2, false),
        (0x85, Sta, ZeroPage, 3, false),
        (0x95, Sta, ZeroPageX, 4, false),
        (0x8D, Sta, Absolute, 4, false),
        (0x9D, Sta, AbsoluteX, 5, false),
        (0x99, Sta, AbsoluteY, 5, false),
        (0x81, Sta, IndexedIndirect, 6, false),
        (0x91, Sta, IndirectIndexed, 6, false),
        (0x86, Stx, ZeroPage, 3, false),
        (0x96, Stx, ZeroPageY, 4, false),
        (0x8E, Stx, Absolute, 4, false),
        (0x84, Sty, ZeroPage, 3, false),
        (0x94, Sty, ZeroPageX, 4, false),
        (0x8C, Sty, Absolute, 4, false),
        (0xAA, Tax, Implied, 2, false),
        (0xA8, Tay, Implied, 2, false),
        (0xBA, Tsx, Implied, 2, false),
        (0x8A, Txa, Implied, 2, false),
        (0x9A, Txs, Implied, 2, false),
        (0x98, Tya, Implied, 2, false),
    ];

    let mut table: [Option<Instruction>; 256] = [None; 256];
    let mut i = 0;
    while i < defs.len() {
        let (opcode, operation, mode, cycles, page_penalty) = defs[i];
        table[opcode as usize] = Some(Instruction::new(operation, mode, cycles, page_penalty));
        i += 1;
    }
    table
}
