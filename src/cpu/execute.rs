//! Instruction semantics. `execute` returns only the cycles added on top
//! of the table cost (branch taken / branch page cross).

use super::addressing::{Operand, Resolved};
use super::opcodes::Operation;
use super::{Cpu, CpuBus, StatusFlags, IRQ_VECTOR};

pub fn execute(cpu: &mut Cpu, bus: &mut dyn CpuBus, operation: Operation, resolved: Resolved) -> u8 {
    let operand = resolved.operand;
    match operation {
        // Loads / stores
        Operation::Lda => {
            cpu.a = load(cpu, bus, operand);
            cpu.set_zero_negative_flags(cpu.a);
        }
        Operation::Ldx => {
            cpu.x = load(cpu, bus, operand);
            cpu.set_zero_negative_flags(cpu.x);
        }
        Operation::Ldy => {
            cpu.y = load(cpu, bus, operand);
            cpu.set_zero_negative_flags(cpu.y);
        }
        Operation::Sta => store(bus, operand, cpu.a),
        Operation::Stx => store(bus, operand, cpu.x),
        Operation::Sty => store(bus, operand, cpu.y),

        // Transfers
        Operation::Tax => {
            cpu.x = cpu.a;
            cpu.set_zero_negative_flags(cpu.x);
        }
        Operation::Tay => {
            cpu.y = cpu.a;
            cpu.set_zero_negative_flags(cpu.y);
        }
        Operation::Tsx => {
            cpu.x = cpu.sp;
            cpu.set_zero_negative_flags(cpu.x);
        }
        Operation::Txa => {
            cpu.a = cpu.x;
            cpu.set_zero_negative_flags(cpu.a);
        }
        Operation::Txs => cpu.sp = cpu.x,
        Operation::Tya => {
            cpu.a = cpu.y;
            cpu.set_zero_negative_flags(cpu.a);
        }

        // Arithmetic / logic
        Operation::Adc => {
            let value = load(cpu, bus, operand);
            adc(cpu, value);
        }
        Operation::Sbc => {
            let value = load(cpu, bus, operand);
            adc(cpu, !value);
        }
        Operation::And => {
            let value = load(cpu, bus, operand);
            cpu.a &= value;
            cpu.set_zero_negative_flags(cpu.a);
        }
        Operation::Ora => {
            let value = load(cpu, bus, operand);
            cpu.a |= value;
            cpu.set_zero_negative_flags(cpu.a);
        }
        Operation::Eor => {
            let value = load(cpu, bus, operand);
            cpu.a ^= value;
            cpu.set_zero_negative_flags(cpu.a);
        }
        Operation::Cmp => {
            let value = load(cpu, bus, operand);
            let reg = cpu.a;
            compare(cpu, reg, value);
        }
        Operation::Cpx => {
            let value = load(cpu, bus, operand);
            let reg = cpu.x;
            compare(cpu, reg, value);
        }
        Operation::Cpy => {
            let value = load(cpu, bus, operand);
            let reg = cpu.y;
            compare(cpu, reg, value);
        }
        Operation::Bit => {
            let value = load(cpu, bus, operand);
            cpu.status.set(StatusFlags::ZERO, cpu.a & value == 0);
            cpu.status.set(StatusFlags::OVERFLOW, value & 0x40 != 0);
            cpu.status.set(StatusFlags::NEGATIVE, value & 0x80 != 0);
        }

        // Shifts / rotates
        Operation::Asl => modify(cpu, bus, operand, |cpu, value| {
            cpu.status.set(StatusFlags::CARRY, value & 0x80 != 0);
            value << 1
        }),
        Operation::Lsr => modify(cpu, bus, operand, |cpu, value| {
            cpu.status.set(StatusFlags::CARRY, value & 0x01 != 0);
            value >> 1
        }),
        Operation::Rol => modify(cpu, bus, operand, |cpu, value| {
            let carry_in = cpu.status.contains(StatusFlags::CARRY) as u8;
            cpu.status.set(StatusFlags::CARRY, value & 0x80 != 0);
            (value << 1) | carry_in
        }),
        Operation::Ror => modify(cpu, bus, operand, |cpu, value| {
            let carry_in = (cpu.status.contains(StatusFlags::CARRY) as u8) << 7;
            cpu.status.set(StatusFlags::CARRY, value & 0x01 != 0);
            (value >> 1) | carry_in
        }),

        // Increments / decrements
        Operation::Inc => modify(cpu, bus, operand, |_, value| value.wrapping_add(1)),
        Operation::Dec => modify(cpu, bus, operand, |_, value| value.wrapping_sub(1)),
        Operation::Inx => {
            cpu.x = cpu.x.wrapping_add(1);
            cpu.set_zero_negative_flags(cpu.x);
        }
        Operation::Iny => {
            cpu.y = cpu.y.wrapping_add(1);
            cpu.set_zero_negative_flags(cpu.y);
        }
        Operation::Dex => {
            cpu.x = cpu.x.wrapping_sub(1);
            cpu.set_zero_negative_flags(cpu.x);
        }
        Operation::Dey => {
            cpu.y = cpu.y.wrapping_sub(1);
            cpu.set_zero_negative_flags(cpu.y);
        }

        // Stack
        Operation::Pha => cpu.push(bus, cpu.a),
        Operation::Php => {
            let status = cpu.status | StatusFlags::BREAK | StatusFlags::UNUSED;
            cpu.push(bus, status.bits());
        }
        Operation::Pla => {
            cpu.a = cpu.pull(bus);
            cpu.set_zero_negative_flags(cpu.a);
        }
        Operation::Plp => {
            let value = cpu.pull(bus);
            restore_status(cpu, value);
        }

        // Control flow
        Operation::Jmp => cpu.pc = address(operand),
        Operation::Jsr => {
            // Return address is the last byte of the JSR; RTS adds one.
            let return_addr = cpu.pc.wrapping_sub(1);
            cpu.push_word(bus, return_addr);
            cpu.pc = address(operand);
        }
        Operation::Rts => {
            cpu.pc = cpu.pull_word(bus).wrapping_add(1);
        }
        Operation::Rti => {
            let value = cpu.pull(bus);
            restore_status(cpu, value);
            cpu.pc = cpu.pull_word(bus);
        }
        Operation::Brk => {
            // Skip the padding byte that follows BRK.
            let return_addr = cpu.pc.wrapping_add(1);
            cpu.push_word(bus, return_addr);
            let status = cpu.status | StatusFlags::BREAK | StatusFlags::UNUSED;
            cpu.push(bus, status.bits());
            cpu.status.insert(StatusFlags::INTERRUPT_DISABLE);
            cpu.pc = bus.read_word(IRQ_VECTOR);
        }

        // Branches
        Operation::Bcc
        | Operation::Bcs
        | Operation::Bne
        | Operation::Beq
        | Operation::Bpl
        | Operation::Bmi
        | Operation::Bvc
        | Operation::Bvs => {
            let taken = branch_taken(cpu.status, operation);
            return branch(cpu, resolved, taken);
        }

        // Flags
        Operation::Clc => cpu.status.remove(StatusFlags::CARRY),
        Operation::Sec => cpu.status.insert(StatusFlags::CARRY),
        Operation::Cli => cpu.status.remove(StatusFlags::INTERRUPT_DISABLE),
        Operation::Sei => cpu.status.insert(StatusFlags::INTERRUPT_DISABLE),
        Operation::Cld => cpu.status.remove(StatusFlags::DECIMAL),
        Operation::Sed => cpu.status.insert(StatusFlags::DECIMAL),
        Operation::Clv => cpu.status.remove(StatusFlags::OVERFLOW),

        Operation::Nop => {}
    }
    0
}

// The opcode table only pairs operations with modes that produce the
// operand they need; the panicking arms mark a broken table entry.

fn load(cpu: &Cpu, bus: &mut dyn CpuBus, operand: Operand) -> u8 {
    match operand {
        Operand::Immediate(value) => value,
        Operand::Address(addr) => bus.read(addr),
        Operand::Accumulator => cpu.a,
        Operand::Implied => unreachable!("read from implied operand"),
    }
}

fn store(bus: &mut dyn CpuBus, operand: Operand, value: u8) {
    bus.write(address(operand), value);
}

fn address(operand: Operand) -> u16 {
    match operand {
        Operand::Address(addr) => addr,
        other => unreachable!("expected an address operand, got {:?}", other),
    }
}

/// Read-modify-write on the accumulator or memory, then Z/N on the result.
fn modify(
    cpu: &mut Cpu,
    bus: &mut dyn CpuBus,
    operand: Operand,
    op: impl FnOnce(&mut Cpu, u8) -> u8,
) {
    let result = match operand {
        Operand::Accumulator => {
            let value = cpu.a;
            let result = op(cpu, value);
            cpu.a = result;
            result
        }
        Operand::Address(addr) => {
            let value = bus.read(addr);
            let result = op(cpu, value);
            bus.write(addr, result);
            result
        }
        other => unreachable!("read-modify-write on {:?}", other),
    };
    cpu.set_zero_negative_flags(result);
}

fn adc(cpu: &mut Cpu, value: u8) {
    let carry = cpu.status.contains(StatusFlags::CARRY) as u16;
    let sum = cpu.a as u16 + value as u16 + carry;
    let result = sum as u8;

    cpu.status.set(StatusFlags::CARRY, sum > 0xFF);
    cpu.status.set(
        StatusFlags::OVERFLOW,
        (cpu.a ^ result) & (value ^ result) & 0x80 != 0,
    );

    cpu.a = result;
    cpu.set_zero_negative_flags(cpu.a);
}

fn compare(cpu: &mut Cpu, reg: u8, value: u8) {
    cpu.status.set(StatusFlags::CARRY, reg >= value);
    cpu.set_zero_negative_flags(reg.wrapping_sub(value));
}

fn restore_status(cpu: &mut Cpu, value: u8) {
    cpu.status = (StatusFlags::from_bits_truncate(value) - StatusFlags::BREAK) | StatusFlags::UNUSED;
}

fn branch_taken(status: StatusFlags, operation: Operation) -> bool {
    match operation {
        Operation::Bcc => !status.contains(StatusFlags::CARRY),
        Operation::Bcs => status.contains(StatusFlags::CARRY),
        Operation::Bne => !status.contains(StatusFlags::ZERO),
        Operation::Beq => status.contains(StatusFlags::ZERO),
        Operation::Bpl => !status.contains(StatusFlags::NEGATIVE),
        Operation::Bmi => status.contains(StatusFlags::NEGATIVE),
        Operation::Bvc => !status.contains(StatusFlags::OVERFLOW),
        Operation::Bvs => status.contains(StatusFlags::OVERFLOW),
        _ => false,
    }
}

fn branch(cpu: &mut Cpu, resolved: Resolved, condition: bool) -> u8 {
    if !condition {
        return 0;
    }
    cpu.pc = address(resolved.operand);
    if resolved.page_crossed {
        2
    } else {
        1
    }
}
