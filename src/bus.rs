use crate::cpu::{CpuBus, RESET_VECTOR};
use crate::memory::Memory;

pub const RAM_SIZE: u16 = 0x0800;
pub const RAM_MIRROR_END: u16 = 0x1FFF;
pub const PRG_START: u16 = 0x8000;
pub const PRG_BANK_SIZE: usize = 0x4000;
const PRG_WINDOW_SIZE: usize = 0x8000;

/// The two halves of a 16-bit word. Words are little-endian throughout the
/// core: `lo` is bits 0-7, `hi` is bits 8-15.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordBytes {
    pub lo: u8,
    pub hi: u8,
}

#[inline]
pub fn bytes_to_word(lo: u8, hi: u8) -> u16 {
    (lo as u16) | ((hi as u16) << 8)
}

#[inline]
pub fn word_to_bytes(word: u16) -> WordBytes {
    WordBytes {
        lo: (word & 0xFF) as u8,
        hi: (word >> 8) as u8,
    }
}

/// Maps a CPU address to the cell that backs it. Internal RAM repeats every
/// 2 KiB up to $1FFF; everything above is stored at its own address.
#[inline]
pub fn decode(addr: u16) -> u16 {
    match addr {
        0x0000..=RAM_MIRROR_END => addr & (RAM_SIZE - 1),
        _ => addr,
    }
}

pub struct Bus {
    memory: Memory,
    nmi_pending: bool,
    irq_line: bool,
}

impl Bus {
    pub fn new() -> Self {
        Bus {
            memory: Memory::new(),
            nmi_pending: false,
            irq_line: false,
        }
    }

    /// Read without going through `CpuBus`, for tracing and inspection.
    pub fn peek(&self, addr: u16) -> u8 {
        self.memory.read(decode(addr))
    }

    pub fn peek_word(&self, addr: u16) -> u16 {
        bytes_to_word(self.peek(addr), self.peek(addr.wrapping_add(1)))
    }

    /// Copies `bytes` into the address space starting at `origin`, wrapping
    /// past $FFFF.
    pub fn load(&mut self, origin: u16, bytes: &[u8]) {
        let mut addr = origin;
        for &byte in bytes {
            self.memory.write(decode(addr), byte);
            addr = addr.wrapping_add(1);
        }
    }

    /// Places PRG ROM in $8000-$FFFF. An image whose size divides 32 KiB
    /// repeats through the whole window (NROM-128 shows up at both $8000 and
    /// $C000), so the vectors come from the end of the image. Other sizes are
    /// laid out linearly from $8000.
    pub fn load_prg(&mut self, prg: &[u8]) {
        let prg = &prg[..prg.len().min(PRG_WINDOW_SIZE)];
        if prg.is_empty() {
            log::warn!("Empty PRG image, nothing placed");
            return;
        }

        if PRG_WINDOW_SIZE % prg.len() == 0 {
            let copies = PRG_WINDOW_SIZE / prg.len();
            for copy in 0..copies {
                self.load(PRG_START + (copy * prg.len()) as u16, prg);
            }
            log::debug!(
                "PRG placed: {} bytes at ${:04X} ({} copies)",
                prg.len(),
                PRG_START,
                copies
            );
        } else {
            self.load(PRG_START, prg);
            log::debug!("PRG placed: {} bytes at ${:04X}", prg.len(), PRG_START);
            if PRG_START as usize + prg.len() <= RESET_VECTOR as usize + 1 {
                log::warn!(
                    "PRG image of {} bytes does not reach the reset vector at ${:04X}",
                    prg.len(),
                    RESET_VECTOR
                );
            }
        }
    }

    pub fn request_nmi(&mut self) {
        self.nmi_pending = true;
    }

    pub fn set_irq(&mut self, level: bool) {
        self.irq_line = level;
    }

    pub fn nmi_pending(&self) -> bool {
        self.nmi_pending
    }

    pub fn irq_asserted(&self) -> bool {
        self.irq_line
    }

    pub fn reset_interrupts(&mut self) {
        self.nmi_pending = false;
        self.irq_line = false;
    }

    /// Power-on clear of the 2 KiB internal RAM. Cartridge space keeps its
    /// contents.
    pub fn clear_ram(&mut self) {
        self.memory.clear(0..RAM_SIZE);
        self.reset_interrupts();
    }

    // Save state methods
    pub fn memory_snapshot(&self) -> Vec<u8> {
        self.memory.snapshot()
    }

    pub fn restore_memory(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.memory.restore(bytes)
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuBus for Bus {
    fn read(&mut self, addr: u16) -> u8 {
        self.memory.read(decode(addr))
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.memory.write(decode(addr), data);
    }

    fn poll_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi_pending)
    }

    fn irq_line(&self) -> bool {
        self.irq_line
    }
}
