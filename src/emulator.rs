use crate::bus::Bus;
use crate::cartridge::Cartridge;
use crate::cpu::{Cpu, CpuError};
use crate::debug_flags;
use crate::debugger::Debugger;
use crate::save_state::SaveState;

/// Why `Emulator::run` returned without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The instruction budget ran out.
    StepLimit,
    /// An enabled breakpoint was reached; the instruction there has not run.
    Breakpoint(u16),
    /// An instruction left PC where it was, e.g. `JMP *` or `BNE *`.
    Trapped(u16),
}

pub struct Emulator {
    cpu: Cpu,
    bus: Bus,
    debugger: Debugger,
}

impl Emulator {
    pub fn new(bus: Bus) -> Self {
        Emulator {
            cpu: Cpu::new(),
            bus,
            debugger: Debugger::new(debug_flags::trace_history()),
        }
    }

    pub fn with_cartridge(cartridge: &Cartridge) -> Self {
        let mut bus = Bus::new();
        cartridge.install(&mut bus);
        Self::new(bus)
    }

    /// Power-on reset through the $FFFC vector. Internal RAM is cleared.
    pub fn reset(&mut self) {
        self.bus.clear_ram();
        self.cpu.reset(&mut self.bus);
        self.debugger.clear_trace();
    }

    /// Reset with an explicit entry point, bypassing the vector.
    pub fn reset_to(&mut self, entry: u16) {
        self.bus.clear_ram();
        self.cpu.reset_to(entry);
        self.debugger.clear_trace();
    }

    /// Steps the CPU. Only instructions are recorded in the trace; a step
    /// that services an interrupt leaves the history alone.
    pub fn step(&mut self) -> Result<u8, CpuError> {
        if self.interrupt_pending() {
            let pc = self.cpu.pc;
            let cycles = self.cpu.step(&mut self.bus)?;
            if debug_flags::trace_cpu() {
                log::trace!("Interrupt at ${:04X} -> ${:04X}", pc, self.cpu.pc);
            }
            return Ok(cycles);
        }

        let entry = self.debugger.record(&self.cpu, &self.bus);
        if debug_flags::trace_cpu() {
            log::trace!("{}", entry);
        }
        self.cpu.step(&mut self.bus)
    }

    fn interrupt_pending(&self) -> bool {
        self.bus.nmi_pending() || self.cpu.irq_unmasked(self.bus.irq_asserted())
    }

    /// Runs until a breakpoint, a trap or `limit` instructions (0 runs
    /// without a limit). A breakpoint at the starting PC does not stop
    /// the first instruction, so a run can resume from one.
    pub fn run(&mut self, limit: u64) -> Result<RunOutcome, CpuError> {
        let mut executed = 0u64;
        loop {
            if limit != 0 && executed >= limit {
                log::debug!("Step limit of {} reached at ${:04X}", limit, self.cpu.pc);
                return Ok(RunOutcome::StepLimit);
            }
            let pc = self.cpu.pc;
            if executed > 0 && self.debugger.hit_breakpoint(pc) {
                return Ok(RunOutcome::Breakpoint(pc));
            }

            self.step()?;
            executed += 1;

            if self.cpu.pc == pc {
                log::debug!("Trapped at ${:04X} after {} instructions", pc, executed);
                return Ok(RunOutcome::Trapped(pc));
            }
        }
    }

    pub fn request_nmi(&mut self) {
        self.bus.request_nmi();
    }

    pub fn set_irq(&mut self, level: bool) {
        self.bus.set_irq(level);
    }

    pub fn save_state(&self) -> SaveState {
        SaveState::capture(&self.cpu, &self.bus)
    }

    pub fn load_state(&mut self, state: &SaveState) -> Result<(), Box<dyn std::error::Error>> {
        state.restore(&mut self.cpu, &mut self.bus)?;
        self.debugger.clear_trace();
        Ok(())
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    pub fn debugger(&self) -> &Debugger {
        &self.debugger
    }

    pub fn debugger_mut(&mut self) -> &mut Debugger {
        &mut self.debugger
    }
}
