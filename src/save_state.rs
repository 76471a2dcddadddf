use serde::{Deserialize, Serialize};

use crate::bus::Bus;
use crate::cpu::{Cpu, StatusFlags};
use crate::memory::check_snapshot_len;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveState {
    // CPU state
    pub cpu_a: u8,
    pub cpu_x: u8,
    pub cpu_y: u8,
    pub cpu_pc: u16,
    pub cpu_sp: u8,
    pub cpu_status: u8,
    pub cpu_cycles: u64,

    // Interrupt lines
    pub nmi_pending: bool,
    pub irq_line: bool,

    // Full 64 KiB backing store
    pub memory: Vec<u8>,
}

impl SaveState {
    pub fn capture(cpu: &Cpu, bus: &Bus) -> Self {
        SaveState {
            cpu_a: cpu.a,
            cpu_x: cpu.x,
            cpu_y: cpu.y,
            cpu_pc: cpu.pc,
            cpu_sp: cpu.sp,
            cpu_status: cpu.status.bits(),
            cpu_cycles: cpu.cycles(),
            nmi_pending: bus.nmi_pending(),
            irq_line: bus.irq_asserted(),
            memory: bus.memory_snapshot(),
        }
    }

    /// Loads the state into `cpu` and `bus`. Nothing is touched if the
    /// memory image does not cover the whole address space.
    pub fn restore(&self, cpu: &mut Cpu, bus: &mut Bus) -> Result<(), Box<dyn std::error::Error>> {
        bus.restore_memory(&self.memory)?;
        // `request_nmi` only ever raises the edge, so clear first.
        bus.reset_interrupts();
        if self.nmi_pending {
            bus.request_nmi();
        }
        bus.set_irq(self.irq_line);

        cpu.a = self.cpu_a;
        cpu.x = self.cpu_x;
        cpu.y = self.cpu_y;
        cpu.pc = self.cpu_pc;
        cpu.sp = self.cpu_sp;
        // B only exists on the stack and bit 5 always reads as set.
        cpu.status = (StatusFlags::from_bits_retain(self.cpu_status) - StatusFlags::BREAK)
            | StatusFlags::UNUSED;
        cpu.set_cycles(self.cpu_cycles);
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(data: &[u8]) -> Result<SaveState, Box<dyn std::error::Error>> {
        let state: SaveState = bincode::deserialize(data)?;
        check_snapshot_len(state.memory.len())?;
        Ok(state)
    }

    pub fn save_to_file(&self, filename: &str) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::write(filename, self.to_bytes()?)?;
        log::info!("Save state written to: {}", filename);
        Ok(())
    }

    pub fn load_from_file(filename: &str) -> Result<SaveState, Box<dyn std::error::Error>> {
        let data = std::fs::read(filename)?;
        let save_state = Self::from_bytes(&data)?;
        log::info!("Save state loaded from: {}", filename);
        Ok(save_state)
    }
}
