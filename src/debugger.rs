use std::collections::{HashMap, VecDeque};
use std::fmt;

use crate::bus::{bytes_to_word, Bus};
use crate::cpu::addressing::AddressingMode;
use crate::cpu::opcodes::{self, Instruction};
use crate::cpu::{Cpu, RegisterSnapshot};

#[derive(Debug, Clone)]
pub struct Breakpoint {
    pub address: u16,
    pub enabled: bool,
    pub hit_count: u32,
}

/// One executed instruction, captured before it runs.
#[derive(Debug, Clone)]
pub struct TraceEntry {
    pub pc: u16,
    pub opcode: u8,
    pub operands: Vec<u8>,
    pub registers: RegisterSnapshot,
}

impl TraceEntry {
    pub fn capture(cpu: &Cpu, bus: &Bus) -> Self {
        let pc = cpu.pc;
        let opcode = bus.peek(pc);
        let operand_len = opcodes::decode(opcode)
            .map(|i| i.mode.operand_len())
            .unwrap_or(0);
        let operands = (1..=operand_len as u16)
            .map(|offset| bus.peek(pc.wrapping_add(offset)))
            .collect();
        TraceEntry {
            pc,
            opcode,
            operands,
            registers: cpu.snapshot(),
        }
    }

    pub fn disassemble(&self) -> String {
        match opcodes::decode(self.opcode) {
            Some(instruction) => {
                let operand = format_operand(&instruction, self.pc, &self.operands);
                if operand.is_empty() {
                    instruction.operation.mnemonic().to_string()
                } else {
                    format!("{} {}", instruction.operation, operand)
                }
            }
            None => "???".to_string(),
        }
    }
}

fn format_operand(instruction: &Instruction, pc: u16, operands: &[u8]) -> String {
    let byte = operands.first().copied().unwrap_or(0);
    let word = bytes_to_word(byte, operands.get(1).copied().unwrap_or(0));
    match instruction.mode {
        AddressingMode::Implied => String::new(),
        AddressingMode::Accumulator => "A".to_string(),
        AddressingMode::Immediate => format!("#${:02X}", byte),
        AddressingMode::ZeroPage => format!("${:02X}", byte),
        AddressingMode::ZeroPageX => format!("${:02X},X", byte),
        AddressingMode::ZeroPageY => format!("${:02X},Y", byte),
        AddressingMode::Relative => {
            let target = pc.wrapping_add(2).wrapping_add(byte as i8 as u16);
            format!("${:04X}", target)
        }
        AddressingMode::Absolute => format!("${:04X}", word),
        AddressingMode::AbsoluteX => format!("${:04X},X", word),
        AddressingMode::AbsoluteY => format!("${:04X},Y", word),
        AddressingMode::Indirect => format!("(${:04X})", word),
        AddressingMode::IndexedIndirect => format!("(${:02X},X)", byte),
        AddressingMode::IndirectIndexed => format!("(${:02X}),Y", byte),
    }
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bytes = format!("{:02X}", self.opcode);
        for operand in &self.operands {
            bytes.push_str(&format!(" {:02X}", operand));
        }
        let r = &self.registers;
        write!(
            f,
            "{:04X}  {:<8}  {:<14}A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
            self.pc,
            bytes,
            self.disassemble(),
            r.a,
            r.x,
            r.y,
            r.p,
            r.sp,
            r.cycles
        )
    }
}

pub struct Debugger {
    breakpoints: HashMap<u16, Breakpoint>,
    trace_buffer: VecDeque<TraceEntry>,
    history_size: usize,
    instruction_count: u64,
}

impl Debugger {
    pub fn new(history_size: usize) -> Self {
        Self {
            breakpoints: HashMap::new(),
            trace_buffer: VecDeque::with_capacity(history_size),
            history_size,
            instruction_count: 0,
        }
    }

    pub fn add_breakpoint(&mut self, address: u16) {
        self.breakpoints.insert(
            address,
            Breakpoint {
                address,
                enabled: true,
                hit_count: 0,
            },
        );
        log::debug!("Breakpoint added at ${:04X}", address);
    }

    pub fn remove_breakpoint(&mut self, address: u16) -> bool {
        self.breakpoints.remove(&address).is_some()
    }

    pub fn toggle_breakpoint(&mut self, address: u16) {
        if let Some(bp) = self.breakpoints.get_mut(&address) {
            bp.enabled = !bp.enabled;
        }
    }

    pub fn breakpoint(&self, address: u16) -> Option<&Breakpoint> {
        self.breakpoints.get(&address)
    }

    /// Counts a hit when an enabled breakpoint sits at `pc`.
    pub fn hit_breakpoint(&mut self, pc: u16) -> bool {
        match self.breakpoints.get_mut(&pc) {
            Some(bp) if bp.enabled => {
                bp.hit_count += 1;
                log::info!("Breakpoint hit at ${:04X} (hit count: {})", pc, bp.hit_count);
                true
            }
            _ => false,
        }
    }

    pub fn record(&mut self, cpu: &Cpu, bus: &Bus) -> &TraceEntry {
        if self.history_size > 0 && self.trace_buffer.len() >= self.history_size {
            self.trace_buffer.pop_front();
        }
        self.trace_buffer.push_back(TraceEntry::capture(cpu, bus));
        self.instruction_count += 1;
        // history_size == 0 still keeps the latest entry so callers can log it.
        if self.history_size == 0 && self.trace_buffer.len() > 1 {
            self.trace_buffer.pop_front();
        }
        &self.trace_buffer[self.trace_buffer.len() - 1]
    }

    pub fn history(&self) -> impl Iterator<Item = &TraceEntry> {
        self.trace_buffer.iter()
    }

    pub fn instruction_count(&self) -> u64 {
        self.instruction_count
    }

    pub fn clear_trace(&mut self) {
        self.trace_buffer.clear();
    }

    pub fn dump_trace(&self) {
        log::error!("=== Execution Trace (last {}) ===", self.trace_buffer.len());
        for entry in &self.trace_buffer {
            log::error!("{}", entry);
        }
    }
}

impl Default for Debugger {
    fn default() -> Self {
        Self::new(crate::debug_flags::DEFAULT_TRACE_HISTORY)
    }
}
