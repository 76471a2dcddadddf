//! Instruction-execution core of an NES (2A03 / 6502) emulator.
//!
//! The CPU talks to the address space only through [`cpu::CpuBus`]; the
//! concrete [`bus::Bus`] applies the internal RAM mirroring and holds the
//! flat cartridge space.

pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod debug_flags;
pub mod debugger;
pub mod emulator;
pub mod memory;
pub mod save_state;

pub use bus::{bytes_to_word, word_to_bytes, Bus, WordBytes};
pub use cpu::{Cpu, CpuBus, CpuError, RegisterSnapshot, StatusFlags};
pub use emulator::{Emulator, RunOutcome};
