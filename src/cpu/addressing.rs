//! Operand resolution for the 13 official addressing modes.
//!
//! On entry PC points at the first operand byte (the opcode has already been
//! fetched). Every helper leaves PC past the operand bytes it consumed.

use super::{Cpu, CpuBus};
use crate::bus::bytes_to_word;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Relative,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndexedIndirect,
    IndirectIndexed,
}

impl AddressingMode {
    pub fn operand_len(self) -> u8 {
        match self {
            AddressingMode::Implied | AddressingMode::Accumulator => 0,
            AddressingMode::Immediate
            | AddressingMode::ZeroPage
            | AddressingMode::ZeroPageX
            | AddressingMode::ZeroPageY
            | AddressingMode::Relative
            | AddressingMode::IndexedIndirect
            | AddressingMode::IndirectIndexed => 1,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Implied,
    Accumulator,
    Immediate(u8),
    Address(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub operand: Operand,
    pub page_crossed: bool,
}

impl Resolved {
    fn plain(operand: Operand) -> Self {
        Resolved {
            operand,
            page_crossed: false,
        }
    }
}

#[inline]
fn crosses_page(a: u16, b: u16) -> bool {
    (a & 0xFF00) != (b & 0xFF00)
}

pub fn resolve(cpu: &mut Cpu, bus: &mut dyn CpuBus, mode: AddressingMode) -> Resolved {
    match mode {
        AddressingMode::Implied => Resolved::plain(Operand::Implied),
        AddressingMode::Accumulator => Resolved::plain(Operand::Accumulator),
        AddressingMode::Immediate => Resolved::plain(Operand::Immediate(cpu.read_byte(bus))),
        AddressingMode::ZeroPage => Resolved::plain(Operand::Address(cpu.read_byte(bus) as u16)),
        AddressingMode::ZeroPageX => {
            let base = cpu.read_byte(bus);
            Resolved::plain(Operand::Address(base.wrapping_add(cpu.x) as u16))
        }
        AddressingMode::ZeroPageY => {
            let base = cpu.read_byte(bus);
            Resolved::plain(Operand::Address(base.wrapping_add(cpu.y) as u16))
        }
        AddressingMode::Relative => {
            let offset = cpu.read_byte(bus) as i8;
            let next = cpu.pc;
            let target = next.wrapping_add(offset as u16);
            Resolved {
                operand: Operand::Address(target),
                page_crossed: crosses_page(next, target),
            }
        }
        AddressingMode::Absolute => Resolved::plain(Operand::Address(cpu.read_word(bus))),
        AddressingMode::AbsoluteX => indexed(cpu.read_word(bus), cpu.x),
        AddressingMode::AbsoluteY => indexed(cpu.read_word(bus), cpu.y),
        AddressingMode::Indirect => {
            let ptr = cpu.read_word(bus);
            // The high byte is fetched without carrying into the pointer's page.
            let hi_ptr = (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF);
            let lo = bus.read(ptr);
            let hi = bus.read(hi_ptr);
            Resolved::plain(Operand::Address(bytes_to_word(lo, hi)))
        }
        AddressingMode::IndexedIndirect => {
            let ptr = cpu.read_byte(bus).wrapping_add(cpu.x);
            Resolved::plain(Operand::Address(read_zero_page_word(bus, ptr)))
        }
        AddressingMode::IndirectIndexed => {
            let ptr = cpu.read_byte(bus);
            let base = read_zero_page_word(bus, ptr);
            indexed(base, cpu.y)
        }
    }
}

fn indexed(base: u16, index: u8) -> Resolved {
    let addr = base.wrapping_add(index as u16);
    Resolved {
        operand: Operand::Address(addr),
        page_crossed: crosses_page(base, addr),
    }
}

/// Pointer fetch that stays inside page zero: $FF pairs with $00.
fn read_zero_page_word(bus: &mut dyn CpuBus, ptr: u8) -> u16 {
    let lo = bus.read(ptr as u16);
    let hi = bus.read(ptr.wrapping_add(1) as u16);
    bytes_to_word(lo, hi)
}
