use super::*;

#[path = "addressing_tests.rs"]
mod addressing_mode_tests;

#[path = "additional_tests.rs"]
mod additional_cpu_tests;

struct TestBus {
    memory: Box<[u8; 0x10000]>,
    nmi: bool,
    irq: bool,
}

impl TestBus {
    fn new() -> Self {
        Self {
            memory: Box::new([0; 0x10000]),
            nmi: false,
            irq: false,
        }
    }

    fn load_program(&mut self, program: &[u8], start_addr: u16) {
        for (i, &byte) in program.iter().enumerate() {
            self.memory[start_addr as usize + i] = byte;
        }
    }
}

impl CpuBus for TestBus {
    fn read(&mut self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.memory[addr as usize] = data;
    }

    fn poll_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi)
    }

    fn irq_line(&self) -> bool {
        self.irq
    }
}

fn setup_cpu() -> (Cpu, TestBus) {
    let cpu = Cpu::new();
    let mut bus = TestBus::new();
    // Reset vector
    bus.write(0xFFFC, 0x00);
    bus.write(0xFFFD, 0x80);
    (cpu, bus)
}

/// Loads `program` at $8000, resets, and returns ready-to-step state.
fn run_setup(program: &[u8]) -> (Cpu, TestBus) {
    let (mut cpu, mut bus) = setup_cpu();
    bus.load_program(program, 0x8000);
    cpu.reset(&mut bus);
    (cpu, bus)
}

fn step(cpu: &mut Cpu, bus: &mut TestBus) -> u8 {
    cpu.step(bus).expect("official opcode")
}

#[test]
fn test_reset_state() {
    let (mut cpu, mut bus) = setup_cpu();
    cpu.a = 0x12;
    cpu.x = 0x34;
    cpu.y = 0x56;
    cpu.sp = 0x00;
    cpu.status = StatusFlags::all();
    cpu.reset(&mut bus);

    assert_eq!(cpu.a, 0);
    assert_eq!(cpu.x, 0);
    assert_eq!(cpu.y, 0);
    assert_eq!(cpu.sp, 0xFD);
    assert_eq!(cpu.pc, 0x8000);
    assert_eq!(cpu.status.bits(), 0x24);
    assert_eq!(cpu.cycles(), 0);
}

#[test]
fn test_reset_to_entry_point() {
    let mut cpu = Cpu::new();
    cpu.reset_to(0xC000);
    assert_eq!(cpu.pc, 0xC000);
    assert_eq!(cpu.sp, STACK_RESET);
    assert_eq!(cpu.status, StatusFlags::RESET);
}

#[test]
fn test_lda_immediate() {
    let (mut cpu, mut bus) = run_setup(&[0xA9, 0x42]);

    let cycles = step(&mut cpu, &mut bus);

    assert_eq!(cpu.a, 0x42);
    assert_eq!(cpu.pc, 0x8002);
    assert_eq!(cycles, 2);
    assert!(!cpu.status.contains(StatusFlags::ZERO));
    assert!(!cpu.status.contains(StatusFlags::NEGATIVE));
}

#[test]
fn test_lda_zero_flag() {
    let (mut cpu, mut bus) = run_setup(&[0xA9, 0x00]);
    cpu.status.insert(StatusFlags::NEGATIVE);

    step(&mut cpu, &mut bus);

    assert_eq!(cpu.a, 0x00);
    assert!(cpu.status.contains(StatusFlags::ZERO));
    assert!(!cpu.status.contains(StatusFlags::NEGATIVE));
}

#[test]
fn test_lda_negative_flag() {
    let (mut cpu, mut bus) = run_setup(&[0xA9, 0x80]);
    cpu.status.insert(StatusFlags::ZERO);

    step(&mut cpu, &mut bus);

    assert_eq!(cpu.a, 0x80);
    assert!(!cpu.status.contains(StatusFlags::ZERO));
    assert!(cpu.status.contains(StatusFlags::NEGATIVE));
}

#[test]
fn test_sta_zero_page() {
    let (mut cpu, mut bus) = run_setup(&[0x85, 0x10]);
    cpu.a = 0x42;

    let cycles = step(&mut cpu, &mut bus);

    assert_eq!(bus.read(0x0010), 0x42);
    assert_eq!(cpu.pc, 0x8002);
    assert_eq!(cycles, 3);
}

#[test]
fn test_ldx_ldy_stx_sty() {
    // LDX #$10, LDY #$20, STX $0300, STY $30
    let (mut cpu, mut bus) = run_setup(&[0xA2, 0x10, 0xA0, 0x20, 0x8E, 0x00, 0x03, 0x84, 0x30]);

    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.x, 0x10);
    assert_eq!(cpu.y, 0x20);

    assert_eq!(step(&mut cpu, &mut bus), 4);
    assert_eq!(step(&mut cpu, &mut bus), 3);
    assert_eq!(bus.read(0x0300), 0x10);
    assert_eq!(bus.read(0x0030), 0x20);
}

#[test]
fn test_adc_signed_overflow() {
    // LDA #$50, ADC #$50
    let (mut cpu, mut bus) = run_setup(&[0xA9, 0x50, 0x69, 0x50]);
    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);

    assert_eq!(cpu.a, 0xA0);
    assert!(cpu.status.contains(StatusFlags::OVERFLOW));
    assert!(!cpu.status.contains(StatusFlags::CARRY));
    assert!(cpu.status.contains(StatusFlags::NEGATIVE));
    assert!(!cpu.status.contains(StatusFlags::ZERO));
}

#[test]
fn test_adc_unsigned_carry_to_zero() {
    // LDA #$FF, ADC #$01
    let (mut cpu, mut bus) = run_setup(&[0xA9, 0xFF, 0x69, 0x01]);
    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);

    assert_eq!(cpu.a, 0x00);
    assert!(!cpu.status.contains(StatusFlags::OVERFLOW));
    assert!(cpu.status.contains(StatusFlags::CARRY));
    assert!(cpu.status.contains(StatusFlags::ZERO));
}

#[test]
fn test_adc_uses_carry_in() {
    // SEC, LDA #$10, ADC #$10
    let (mut cpu, mut bus) = run_setup(&[0x38, 0xA9, 0x10, 0x69, 0x10]);
    for _ in 0..3 {
        step(&mut cpu, &mut bus);
    }
    assert_eq!(cpu.a, 0x21);
    assert!(!cpu.status.contains(StatusFlags::CARRY));
}

#[test]
fn test_sbc_borrow_and_overflow() {
    // SEC, LDA #$50, SBC #$B0  => 0x50 - (-0x50) overflows
    let (mut cpu, mut bus) = run_setup(&[0x38, 0xA9, 0x50, 0xE9, 0xB0]);
    for _ in 0..3 {
        step(&mut cpu, &mut bus);
    }
    assert_eq!(cpu.a, 0xA0);
    assert!(cpu.status.contains(StatusFlags::OVERFLOW));
    assert!(!cpu.status.contains(StatusFlags::CARRY));

    // SEC, LDA #$05, SBC #$03 => 2, no borrow
    let (mut cpu, mut bus) = run_setup(&[0x38, 0xA9, 0x05, 0xE9, 0x03]);
    for _ in 0..3 {
        step(&mut cpu, &mut bus);
    }
    assert_eq!(cpu.a, 0x02);
    assert!(cpu.status.contains(StatusFlags::CARRY));
    assert!(!cpu.status.contains(StatusFlags::OVERFLOW));

    // CLC, LDA #$05, SBC #$05 => borrow in gives 0xFF
    let (mut cpu, mut bus) = run_setup(&[0x18, 0xA9, 0x05, 0xE9, 0x05]);
    for _ in 0..3 {
        step(&mut cpu, &mut bus);
    }
    assert_eq!(cpu.a, 0xFF);
    assert!(!cpu.status.contains(StatusFlags::CARRY));
    assert!(cpu.status.contains(StatusFlags::NEGATIVE));
}

#[test]
fn test_logical_operations() {
    // LDA #$F0, AND #$3C, ORA #$01, EOR #$FF
    let (mut cpu, mut bus) = run_setup(&[0xA9, 0xF0, 0x29, 0x3C, 0x09, 0x01, 0x49, 0xFF]);
    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x30);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x31);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0xCE);
    assert!(cpu.status.contains(StatusFlags::NEGATIVE));
}

#[test]
fn test_compare_flags() {
    // LDA #$40, CMP #$30, CMP #$40, CMP #$50
    let (mut cpu, mut bus) = run_setup(&[0xA9, 0x40, 0xC9, 0x30, 0xC9, 0x40, 0xC9, 0x50]);
    step(&mut cpu, &mut bus);

    step(&mut cpu, &mut bus);
    assert!(cpu.status.contains(StatusFlags::CARRY));
    assert!(!cpu.status.contains(StatusFlags::ZERO));

    step(&mut cpu, &mut bus);
    assert!(cpu.status.contains(StatusFlags::CARRY));
    assert!(cpu.status.contains(StatusFlags::ZERO));

    step(&mut cpu, &mut bus);
    assert!(!cpu.status.contains(StatusFlags::CARRY));
    assert!(!cpu.status.contains(StatusFlags::ZERO));
    assert!(cpu.status.contains(StatusFlags::NEGATIVE));
    assert_eq!(cpu.a, 0x40);
}

#[test]
fn test_cpx_cpy() {
    // LDX #$05, CPX #$05, LDY #$01, CPY #$02
    let (mut cpu, mut bus) = run_setup(&[0xA2, 0x05, 0xE0, 0x05, 0xA0, 0x01, 0xC0, 0x02]);
    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);
    assert!(cpu.status.contains(StatusFlags::ZERO | StatusFlags::CARRY));
    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);
    assert!(!cpu.status.contains(StatusFlags::CARRY));
    assert!(cpu.status.contains(StatusFlags::NEGATIVE));
}

#[test]
fn test_bit() {
    let (mut cpu, mut bus) = run_setup(&[0xA9, 0x01, 0x24, 0x10]);
    bus.write(0x0010, 0xC0);
    step(&mut cpu, &mut bus);
    let cycles = step(&mut cpu, &mut bus);

    assert_eq!(cycles, 3);
    assert!(cpu.status.contains(StatusFlags::ZERO));
    assert!(cpu.status.contains(StatusFlags::OVERFLOW));
    assert!(cpu.status.contains(StatusFlags::NEGATIVE));
    assert_eq!(cpu.a, 0x01);
}

#[test]
fn test_shift_accumulator() {
    // LDA #$81, ASL A, LSR A
    let (mut cpu, mut bus) = run_setup(&[0xA9, 0x81, 0x0A, 0x4A]);
    step(&mut cpu, &mut bus);

    assert_eq!(step(&mut cpu, &mut bus), 2);
    assert_eq!(cpu.a, 0x02);
    assert!(cpu.status.contains(StatusFlags::CARRY));

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x01);
    assert!(!cpu.status.contains(StatusFlags::CARRY));
}

#[test]
fn test_rotate_through_carry() {
    // SEC, LDA #$80, ROL A, ROR A
    let (mut cpu, mut bus) = run_setup(&[0x38, 0xA9, 0x80, 0x2A, 0x6A]);
    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x01);
    assert!(cpu.status.contains(StatusFlags::CARRY));

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x80);
    assert!(cpu.status.contains(StatusFlags::CARRY));
    assert!(cpu.status.contains(StatusFlags::NEGATIVE));
}

#[test]
fn test_memory_read_modify_write() {
    // ASL $20, INC $21, DEC $0400, ROR $22
    let (mut cpu, mut bus) = run_setup(&[0x06, 0x20, 0xE6, 0x21, 0xCE, 0x00, 0x04, 0x66, 0x22]);
    bus.write(0x0020, 0x40);
    bus.write(0x0021, 0xFF);
    bus.write(0x0400, 0x00);
    bus.write(0x0022, 0x01);

    assert_eq!(step(&mut cpu, &mut bus), 5);
    assert_eq!(bus.read(0x0020), 0x80);
    assert!(cpu.status.contains(StatusFlags::NEGATIVE));

    assert_eq!(step(&mut cpu, &mut bus), 5);
    assert_eq!(bus.read(0x0021), 0x00);
    assert!(cpu.status.contains(StatusFlags::ZERO));

    assert_eq!(step(&mut cpu, &mut bus), 6);
    assert_eq!(bus.read(0x0400), 0xFF);
    assert!(cpu.status.contains(StatusFlags::NEGATIVE));

    step(&mut cpu, &mut bus);
    assert_eq!(bus.read(0x0022), 0x00);
    assert!(cpu.status.contains(StatusFlags::CARRY));
    assert!(cpu.status.contains(StatusFlags::ZERO));
}

#[test]
fn test_increment_decrement_registers() {
    // INX, INY, DEX, DEX, DEY
    let (mut cpu, mut bus) = run_setup(&[0xE8, 0xC8, 0xCA, 0xCA, 0x88]);
    cpu.x = 0xFF;

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.x, 0x00);
    assert!(cpu.status.contains(StatusFlags::ZERO));

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.y, 0x01);

    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.x, 0xFE);
    assert!(cpu.status.contains(StatusFlags::NEGATIVE));

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.y, 0x00);
    assert!(cpu.status.contains(StatusFlags::ZERO));
}

#[test]
fn test_transfers() {
    // LDA #$80, TAX, TAY, LDA #$00, TXA, TSX, TYA
    let (mut cpu, mut bus) = run_setup(&[0xA9, 0x80, 0xAA, 0xA8, 0xA9, 0x00, 0x8A, 0xBA, 0x98]);
    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.x, 0x80);
    assert_eq!(cpu.y, 0x80);

    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x80);
    assert!(cpu.status.contains(StatusFlags::NEGATIVE));

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.x, 0xFD);

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x80);
}

#[test]
fn test_txs_leaves_flags() {
    // LDX #$00, TXS
    let (mut cpu, mut bus) = run_setup(&[0xA2, 0x00, 0x9A]);
    step(&mut cpu, &mut bus);
    cpu.status.remove(StatusFlags::ZERO);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.sp, 0x00);
    assert!(!cpu.status.contains(StatusFlags::ZERO));
}

#[test]
fn test_flag_instructions() {
    // SEC, SED, SEI, CLC, CLD, CLI, CLV
    let (mut cpu, mut bus) = run_setup(&[0x38, 0xF8, 0x78, 0x18, 0xD8, 0x58, 0xB8]);
    cpu.status.insert(StatusFlags::OVERFLOW);
    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);
    assert!(cpu
        .status
        .contains(StatusFlags::CARRY | StatusFlags::DECIMAL | StatusFlags::INTERRUPT_DISABLE));
    for _ in 0..4 {
        assert_eq!(step(&mut cpu, &mut bus), 2);
    }
    assert_eq!(cpu.status, StatusFlags::UNUSED);
}

#[test]
fn test_jmp_absolute() {
    let (mut cpu, mut bus) = run_setup(&[0x4C, 0xF5, 0xC5]);
    let cycles = step(&mut cpu, &mut bus);
    assert_eq!(cycles, 3);
    assert_eq!(cpu.pc, 0xC5F5);
}

#[test]
fn test_jsr_rts() {
    // JSR $9000 ; at $9000: RTS
    let (mut cpu, mut bus) = run_setup(&[0x20, 0x00, 0x90]);
    bus.load_program(&[0x60], 0x9000);

    let cycles = step(&mut cpu, &mut bus);
    assert_eq!(cycles, 6);
    assert_eq!(cpu.pc, 0x9000);
    assert_eq!(cpu.sp, 0xFB);
    // Return address $8002 stored high byte first.
    assert_eq!(bus.read(0x01FD), 0x80);
    assert_eq!(bus.read(0x01FC), 0x02);

    let cycles = step(&mut cpu, &mut bus);
    assert_eq!(cycles, 6);
    assert_eq!(cpu.pc, 0x8003);
    assert_eq!(cpu.sp, 0xFD);
}

#[test]
fn test_brk_and_rti() {
    let (mut cpu, mut bus) = run_setup(&[0x00, 0xFF, 0xEA]);
    bus.write(0xFFFE, 0x00);
    bus.write(0xFFFF, 0x90);
    bus.load_program(&[0x40], 0x9000);
    cpu.status = StatusFlags::UNUSED | StatusFlags::CARRY;

    let cycles = step(&mut cpu, &mut bus);
    assert_eq!(cycles, 7);
    assert_eq!(cpu.pc, 0x9000);
    assert!(cpu.status.contains(StatusFlags::INTERRUPT_DISABLE));
    assert_eq!(bus.read(0x01FD), 0x80);
    assert_eq!(bus.read(0x01FC), 0x02);
    assert_eq!(bus.read(0x01FB), 0x31); // C | B | UNUSED

    let cycles = step(&mut cpu, &mut bus);
    assert_eq!(cycles, 6);
    assert_eq!(cpu.pc, 0x8002);
    assert_eq!(cpu.sp, 0xFD);
    assert_eq!(cpu.status, StatusFlags::UNUSED | StatusFlags::CARRY);
}

#[test]
fn test_php_plp() {
    // PHP, PLP with B set in the pulled byte
    let (mut cpu, mut bus) = run_setup(&[0x08, 0x28]);
    cpu.status = StatusFlags::UNUSED | StatusFlags::NEGATIVE;

    assert_eq!(step(&mut cpu, &mut bus), 3);
    assert_eq!(bus.read(0x01FD), 0xB0);

    bus.write(0x01FD, 0xDF); // everything except UNUSED
    assert_eq!(step(&mut cpu, &mut bus), 4);
    assert!(!cpu.status.contains(StatusFlags::BREAK));
    assert!(cpu.status.contains(StatusFlags::UNUSED));
    assert_eq!(cpu.status.bits(), 0xEF);
}

#[test]
fn test_pha_pla() {
    let (mut cpu, mut bus) = run_setup(&[0x48, 0xA9, 0x01, 0x68]);
    cpu.a = 0x80;
    assert_eq!(step(&mut cpu, &mut bus), 3);
    step(&mut cpu, &mut bus);
    assert_eq!(step(&mut cpu, &mut bus), 4);
    assert_eq!(cpu.a, 0x80);
    assert!(cpu.status.contains(StatusFlags::NEGATIVE));
    assert_eq!(cpu.sp, 0xFD);
}

#[test]
fn test_branch_not_taken() {
    // BEQ +4 with Z clear
    let (mut cpu, mut bus) = run_setup(&[0xF0, 0x04]);
    let cycles = step(&mut cpu, &mut bus);
    assert_eq!(cycles, 2);
    assert_eq!(cpu.pc, 0x8002);
}

#[test]
fn test_branch_taken_same_page() {
    // BNE +4
    let (mut cpu, mut bus) = run_setup(&[0xD0, 0x04]);
    let cycles = step(&mut cpu, &mut bus);
    assert_eq!(cycles, 3);
    assert_eq!(cpu.pc, 0x8006);
}

#[test]
fn test_branch_taken_backwards_across_page() {
    // BNE -4 from $8000 lands at $7FFE
    let (mut cpu, mut bus) = run_setup(&[0xD0, 0xFC]);
    let cycles = step(&mut cpu, &mut bus);
    assert_eq!(cycles, 4);
    assert_eq!(cpu.pc, 0x7FFE);
}

#[test]
fn test_branch_variants() {
    let cases: [(u8, StatusFlags, bool); 8] = [
        (0x90, StatusFlags::CARRY, false),
        (0xB0, StatusFlags::CARRY, true),
        (0xD0, StatusFlags::ZERO, false),
        (0xF0, StatusFlags::ZERO, true),
        (0x10, StatusFlags::NEGATIVE, false),
        (0x30, StatusFlags::NEGATIVE, true),
        (0x50, StatusFlags::OVERFLOW, false),
        (0x70, StatusFlags::OVERFLOW, true),
    ];
    for (opcode, flag, taken_when_set) in cases {
        for set in [false, true] {
            let (mut cpu, mut bus) = run_setup(&[opcode, 0x10]);
            cpu.status.set(flag, set);
            step(&mut cpu, &mut bus);
            let expected = if set == taken_when_set { 0x8012 } else { 0x8002 };
            assert_eq!(cpu.pc, expected, "opcode 0x{:02X} flag set={}", opcode, set);
        }
    }
}

#[test]
fn test_unknown_opcode_is_fatal() {
    let (mut cpu, mut bus) = run_setup(&[0xA9, 0x07, 0x02]);
    step(&mut cpu, &mut bus);

    let err = cpu.step(&mut bus).unwrap_err();
    match err {
        CpuError::UnknownOpcode {
            opcode,
            pc,
            registers,
        } => {
            assert_eq!(opcode, 0x02);
            assert_eq!(pc, 0x8002);
            assert_eq!(registers.a, 0x07);
        }
    }
    // PC stays on the offending byte and nothing is consumed.
    assert_eq!(cpu.pc, 0x8002);
    assert_eq!(cpu.cycles(), 2);
    assert!(cpu.step(&mut bus).is_err());
}

#[test]
fn test_unknown_opcode_message() {
    let (mut cpu, mut bus) = run_setup(&[0xFF]);
    let err = cpu.step(&mut bus).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("0xFF"));
    assert!(message.contains("$8000"));
}

#[test]
fn test_cycle_counter_accumulates() {
    // LDA #$01 (2), STA $0200 (4), NOP (2)
    let (mut cpu, mut bus) = run_setup(&[0xA9, 0x01, 0x8D, 0x00, 0x02, 0xEA]);
    for _ in 0..3 {
        step(&mut cpu, &mut bus);
    }
    assert_eq!(cpu.cycles(), 8);
}
