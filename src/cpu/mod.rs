use bitflags::bitflags;
use std::fmt;

use crate::bus::{bytes_to_word, word_to_bytes};

pub mod addressing;
pub mod execute;
pub mod opcodes;

#[cfg(test)]
mod tests;

pub const STACK_PAGE: u16 = 0x0100;
pub const STACK_RESET: u8 = 0xFD;
pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;
pub const INTERRUPT_CYCLES: u8 = 7;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusFlags: u8 {
        const CARRY = 0b00000001;
        const ZERO = 0b00000010;
        const INTERRUPT_DISABLE = 0b00000100;
        const DECIMAL = 0b00001000; // stored, never used by the 2A03 ALU
        const BREAK = 0b00010000;
        const UNUSED = 0b00100000;
        const OVERFLOW = 0b01000000;
        const NEGATIVE = 0b10000000;
    }
}

impl StatusFlags {
    /// Power-on / reset value ($24).
    pub const RESET: StatusFlags = StatusFlags::INTERRUPT_DISABLE.union(StatusFlags::UNUSED);
}

/// The address-space seam the CPU executes against.
pub trait CpuBus {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, data: u8);

    /// Returns true once per NMI edge.
    fn poll_nmi(&mut self) -> bool {
        false
    }

    /// Level of the shared IRQ line.
    fn irq_line(&self) -> bool {
        false
    }

    fn read_word(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr);
        let hi = self.read(addr.wrapping_add(1));
        bytes_to_word(lo, hi)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterSnapshot {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub p: u8,
    pub cycles: u64,
}

impl fmt::Display for RegisterSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PC:{:04X} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
            self.pc, self.a, self.x, self.y, self.p, self.sp, self.cycles
        )
    }
}

/// Conditions that end an emulation session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CpuError {
    /// The byte at `pc` is not an official opcode. PC is left pointing at it.
    UnknownOpcode {
        opcode: u8,
        pc: u16,
        registers: RegisterSnapshot,
    },
}

impl fmt::Display for CpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpuError::UnknownOpcode {
                opcode,
                pc,
                registers,
            } => write!(
                f,
                "unknown opcode 0x{:02X} at ${:04X} ({})",
                opcode, pc, registers
            ),
        }
    }
}

impl std::error::Error for CpuError {}

pub struct Cpu {
    pub a: u8,   // Accumulator
    pub x: u8,   // X register
    pub y: u8,   // Y register
    pub sp: u8,  // Stack pointer
    pub pc: u16, // Program counter
    pub status: StatusFlags,
    cycles: u64,
}

impl Cpu {
    pub fn new() -> Self {
        Cpu {
            a: 0,
            x: 0,
            y: 0,
            sp: STACK_RESET,
            pc: 0,
            status: StatusFlags::RESET,
            cycles: 0,
        }
    }

    /// Power-on reset: registers cleared and PC loaded from $FFFC/$FFFD.
    pub fn reset(&mut self, bus: &mut dyn CpuBus) {
        let entry = bus.read_word(RESET_VECTOR);
        self.reset_to(entry);
        log::debug!("CPU reset: vector ${:04X}", entry);
    }

    /// Reset with a fixed entry point instead of the vector (test ROMs such
    /// as nestest start at $C000).
    pub fn reset_to(&mut self, entry: u16) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = STACK_RESET;
        self.status = StatusFlags::RESET;
        self.pc = entry;
        self.cycles = 0;
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub(crate) fn set_cycles(&mut self, cycles: u64) {
        self.cycles = cycles;
    }

    pub fn snapshot(&self) -> RegisterSnapshot {
        RegisterSnapshot {
            a: self.a,
            x: self.x,
            y: self.y,
            sp: self.sp,
            pc: self.pc,
            p: self.status.bits(),
            cycles: self.cycles,
        }
    }

    /// Runs one unit of work: a pending interrupt or a single instruction.
    /// Returns the cycles it took.
    pub fn step(&mut self, bus: &mut dyn CpuBus) -> Result<u8, CpuError> {
        if bus.poll_nmi() {
            self.nmi(bus);
            return Ok(INTERRUPT_CYCLES);
        }
        if self.irq_unmasked(bus.irq_line()) {
            self.irq(bus);
            return Ok(INTERRUPT_CYCLES);
        }

        let opcode_pc = self.pc;
        let opcode = bus.read(opcode_pc);
        let instruction = match opcodes::decode(opcode) {
            Some(instruction) => instruction,
            None => {
                let registers = self.snapshot();
                log::error!(
                    "Halting on unknown opcode: 0x{:02X} at PC: 0x{:04X} ({})",
                    opcode,
                    opcode_pc,
                    registers
                );
                return Err(CpuError::UnknownOpcode {
                    opcode,
                    pc: opcode_pc,
                    registers,
                });
            }
        };
        self.pc = self.pc.wrapping_add(1);

        let resolved = addressing::resolve(self, bus, instruction.mode);
        let mut cycles = instruction.cycles;
        if instruction.page_penalty && resolved.page_crossed {
            cycles += 1;
        }
        cycles += execute::execute(self, bus, instruction.operation, resolved);

        self.cycles += cycles as u64;
        Ok(cycles)
    }

    /// Whether an IRQ line at `level` would be taken before the next
    /// instruction.
    pub fn irq_unmasked(&self, level: bool) -> bool {
        level && !self.status.contains(StatusFlags::INTERRUPT_DISABLE)
    }

    pub fn nmi(&mut self, bus: &mut dyn CpuBus) {
        self.interrupt(bus, NMI_VECTOR);
        log::debug!("NMI -> ${:04X}", self.pc);
    }

    /// Maskable interrupt. Ignored while I is set.
    pub fn irq(&mut self, bus: &mut dyn CpuBus) {
        if self.status.contains(StatusFlags::INTERRUPT_DISABLE) {
            log::warn!("IRQ masked at PC ${:04X}", self.pc);
            return;
        }
        self.interrupt(bus, IRQ_VECTOR);
        log::debug!("IRQ -> ${:04X}", self.pc);
    }

    fn interrupt(&mut self, bus: &mut dyn CpuBus, vector: u16) {
        self.push_word(bus, self.pc);
        let status = (self.status - StatusFlags::BREAK) | StatusFlags::UNUSED;
        self.push(bus, status.bits());
        self.status.insert(StatusFlags::INTERRUPT_DISABLE);
        self.pc = bus.read_word(vector);
        self.cycles += INTERRUPT_CYCLES as u64;
    }

    pub(crate) fn read_byte(&mut self, bus: &mut dyn CpuBus) -> u8 {
        let byte = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        byte
    }

    pub(crate) fn read_word(&mut self, bus: &mut dyn CpuBus) -> u16 {
        let lo = self.read_byte(bus);
        let hi = self.read_byte(bus);
        bytes_to_word(lo, hi)
    }

    pub fn push(&mut self, bus: &mut dyn CpuBus, value: u8) {
        bus.write(STACK_PAGE | self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    pub fn pull(&mut self, bus: &mut dyn CpuBus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read(STACK_PAGE | self.sp as u16)
    }

    /// High byte first, so the low byte ends up at the lower address.
    pub(crate) fn push_word(&mut self, bus: &mut dyn CpuBus, word: u16) {
        let bytes = word_to_bytes(word);
        self.push(bus, bytes.hi);
        self.push(bus, bytes.lo);
    }

    pub(crate) fn pull_word(&mut self, bus: &mut dyn CpuBus) -> u16 {
        let lo = self.pull(bus);
        let hi = self.pull(bus);
        bytes_to_word(lo, hi)
    }

    pub(crate) fn set_zero_negative_flags(&mut self, value: u8) {
        self.status.set(StatusFlags::ZERO, value == 0);
        self.status.set(StatusFlags::NEGATIVE, value & 0x80 != 0);
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
