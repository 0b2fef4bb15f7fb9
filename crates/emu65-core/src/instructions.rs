//! Instruction handlers.
//!
//! [`Cpu::execute`] is the second of the two decode dispatches: the table
//! picked the `(instruction, mode)` pair, the resolver produced the operand,
//! and this match applies the documented effect. Handlers return the extra
//! cycles they charge beyond the table's base cost (branches only; the
//! page-cross penalty is applied by the caller from the table flag).

use crate::addressing::{AddrMode, Resolved};
use crate::bus::Bus;
use crate::cpu::Cpu;
use crate::opcodes::Instruction;
use crate::status::Status;
use crate::vectors;

impl Cpu {
    /// Apply `instruction` with the resolved operand. Returns extra cycles.
    #[allow(clippy::too_many_lines)]
    pub(crate) fn execute<B: Bus>(
        &mut self,
        bus: &mut B,
        instruction: Instruction,
        mode: AddrMode,
        operand: &Resolved,
    ) -> u8 {
        use Instruction as I;

        match instruction {
            // Loads and stores.
            I::Lda => {
                self.a = self.operand_value(bus, operand);
                self.set_zn(self.a);
                0
            }
            I::Ldx => {
                self.x = self.operand_value(bus, operand);
                self.set_zn(self.x);
                0
            }
            I::Ldy => {
                self.y = self.operand_value(bus, operand);
                self.set_zn(self.y);
                0
            }
            I::Sta => {
                self.store(bus, operand, self.a);
                0
            }
            I::Stx => {
                self.store(bus, operand, self.x);
                0
            }
            I::Sty => {
                self.store(bus, operand, self.y);
                0
            }
            I::Stz => {
                self.store(bus, operand, 0);
                0
            }

            // Register transfers. TXS is the one that leaves flags alone.
            I::Tax => {
                self.x = self.a;
                self.set_zn(self.x);
                0
            }
            I::Tay => {
                self.y = self.a;
                self.set_zn(self.y);
                0
            }
            I::Txa => {
                self.a = self.x;
                self.set_zn(self.a);
                0
            }
            I::Tya => {
                self.a = self.y;
                self.set_zn(self.a);
                0
            }
            I::Tsx => {
                self.x = self.sp;
                self.set_zn(self.x);
                0
            }
            I::Txs => {
                self.sp = self.x;
                0
            }

            // Arithmetic.
            I::Adc => {
                let value = self.operand_value(bus, operand);
                self.adc(value);
                0
            }
            I::Sbc => {
                let value = self.operand_value(bus, operand);
                self.sbc(value);
                0
            }
            I::Cmp => {
                let value = self.operand_value(bus, operand);
                self.compare(self.a, value);
                0
            }
            I::Cpx => {
                let value = self.operand_value(bus, operand);
                self.compare(self.x, value);
                0
            }
            I::Cpy => {
                let value = self.operand_value(bus, operand);
                self.compare(self.y, value);
                0
            }
            I::Inc => {
                self.modify(bus, mode, operand, Self::inc_value);
                0
            }
            I::Dec => {
                self.modify(bus, mode, operand, Self::dec_value);
                0
            }
            I::Inx => {
                self.x = self.x.wrapping_add(1);
                self.set_zn(self.x);
                0
            }
            I::Iny => {
                self.y = self.y.wrapping_add(1);
                self.set_zn(self.y);
                0
            }
            I::Dex => {
                self.x = self.x.wrapping_sub(1);
                self.set_zn(self.x);
                0
            }
            I::Dey => {
                self.y = self.y.wrapping_sub(1);
                self.set_zn(self.y);
                0
            }

            // Bitwise.
            I::And => {
                let value = self.operand_value(bus, operand);
                self.a &= value;
                self.set_zn(self.a);
                0
            }
            I::Ora => {
                let value = self.operand_value(bus, operand);
                self.a |= value;
                self.set_zn(self.a);
                0
            }
            I::Eor => {
                let value = self.operand_value(bus, operand);
                self.a ^= value;
                self.set_zn(self.a);
                0
            }
            I::Bit => {
                let value = self.operand_value(bus, operand);
                self.status.assign(Status::Z, self.a & value == 0);
                // The immediate form only touches Z.
                if mode != AddrMode::Imm {
                    self.status.assign(Status::V, value & 0x40 != 0);
                    self.status.assign(Status::N, value & 0x80 != 0);
                }
                0
            }
            I::Asl => {
                self.modify(bus, mode, operand, Self::asl_value);
                0
            }
            I::Lsr => {
                self.modify(bus, mode, operand, Self::lsr_value);
                0
            }
            I::Rol => {
                self.modify(bus, mode, operand, Self::rol_value);
                0
            }
            I::Ror => {
                self.modify(bus, mode, operand, Self::ror_value);
                0
            }
            I::Trb => {
                if let Some(addr) = operand.addr {
                    let value = bus.read(addr);
                    self.status.assign(Status::Z, self.a & value == 0);
                    bus.write(addr, value & !self.a);
                }
                0
            }
            I::Tsb => {
                if let Some(addr) = operand.addr {
                    let value = bus.read(addr);
                    self.status.assign(Status::Z, self.a & value == 0);
                    bus.write(addr, value | self.a);
                }
                0
            }

            // Rockwell zero-page bit manipulation. Flags untouched.
            I::Rmb(bit) => {
                if let Some(addr) = operand.addr {
                    let value = bus.read(addr);
                    bus.write(addr, value & !(1 << bit));
                }
                0
            }
            I::Smb(bit) => {
                if let Some(addr) = operand.addr {
                    let value = bus.read(addr);
                    bus.write(addr, value | (1 << bit));
                }
                0
            }
            I::Bbr(bit) => {
                let value = self.operand_value(bus, operand);
                self.branch_if(value & (1 << bit) == 0, operand)
            }
            I::Bbs(bit) => {
                let value = self.operand_value(bus, operand);
                self.branch_if(value & (1 << bit) != 0, operand)
            }

            // Flag operations.
            I::Clc => {
                self.status.remove(Status::C);
                0
            }
            I::Sec => {
                self.status.insert(Status::C);
                0
            }
            I::Cli => {
                self.status.remove(Status::I);
                0
            }
            I::Sei => {
                self.status.insert(Status::I);
                0
            }
            I::Cld => {
                self.status.remove(Status::D);
                0
            }
            I::Sed => {
                self.status.insert(Status::D);
                0
            }
            I::Clv => {
                self.status.remove(Status::V);
                0
            }

            // Control flow.
            I::Jmp => {
                if let Some(target) = operand.addr {
                    self.pc = target;
                }
                0
            }
            I::Jsr => {
                if let Some(target) = operand.addr {
                    // The stacked address is the last operand byte; RTS
                    // adds one on the way back.
                    let ret = self.pc.wrapping_sub(1);
                    self.push(bus, (ret >> 8) as u8);
                    self.push(bus, (ret & 0xFF) as u8);
                    self.pc = target;
                }
                0
            }
            I::Rts => {
                let lo = u16::from(self.pull(bus));
                let hi = u16::from(self.pull(bus));
                self.pc = ((hi << 8) | lo).wrapping_add(1);
                0
            }
            I::Brk => {
                // Return address skips the padding byte after the opcode.
                let ret = self.pc.wrapping_add(1);
                self.push(bus, (ret >> 8) as u8);
                self.push(bus, (ret & 0xFF) as u8);
                self.push(bus, self.status.to_stack_byte(true));
                self.status.insert(Status::I);
                if self.variant().is_cmos() {
                    self.status.remove(Status::D);
                }
                self.pc = bus.read_u16(vectors::IRQ);
                0
            }
            I::Rti => {
                let flags = self.pull(bus);
                self.status = Status::from_stack_byte(flags);
                let lo = u16::from(self.pull(bus));
                let hi = u16::from(self.pull(bus));
                self.pc = (hi << 8) | lo;
                0
            }
            I::Bcc => self.branch_if(!self.status.contains(Status::C), operand),
            I::Bcs => self.branch_if(self.status.contains(Status::C), operand),
            I::Beq => self.branch_if(self.status.contains(Status::Z), operand),
            I::Bne => self.branch_if(!self.status.contains(Status::Z), operand),
            I::Bmi => self.branch_if(self.status.contains(Status::N), operand),
            I::Bpl => self.branch_if(!self.status.contains(Status::N), operand),
            I::Bvc => self.branch_if(!self.status.contains(Status::V), operand),
            I::Bvs => self.branch_if(self.status.contains(Status::V), operand),
            I::Bra => self.branch_if(true, operand),

            // Stack operations.
            I::Pha => {
                self.push(bus, self.a);
                0
            }
            I::Phx => {
                self.push(bus, self.x);
                0
            }
            I::Phy => {
                self.push(bus, self.y);
                0
            }
            I::Php => {
                let byte = self.status.to_stack_byte(true);
                self.push(bus, byte);
                0
            }
            I::Pla => {
                self.a = self.pull(bus);
                self.set_zn(self.a);
                0
            }
            I::Plx => {
                self.x = self.pull(bus);
                self.set_zn(self.x);
                0
            }
            I::Ply => {
                self.y = self.pull(bus);
                self.set_zn(self.y);
                0
            }
            I::Plp => {
                let byte = self.pull(bus);
                self.status = Status::from_stack_byte(byte);
                0
            }

            // Halts.
            I::Wai => {
                self.waiting = true;
                0
            }
            I::Stp => {
                self.stopped = true;
                0
            }

            I::Nop | I::Ill => 0,
        }
    }

    // ---- operand plumbing -----------------------------------------------

    /// The 8-bit value an instruction consumes.
    fn operand_value<B: Bus>(&mut self, bus: &mut B, operand: &Resolved) -> u8 {
        if let Some(value) = operand.imm {
            value
        } else if let Some(addr) = operand.addr {
            bus.read(addr)
        } else {
            0
        }
    }

    /// Store `value` at the effective address, if the mode produced one.
    fn store<B: Bus>(&mut self, bus: &mut B, operand: &Resolved, value: u8) {
        if let Some(addr) = operand.addr {
            bus.write(addr, value);
        }
    }

    /// Read-modify-write plumbing shared by the shifts and INC/DEC:
    /// accumulator mode operates on A, otherwise on memory.
    fn modify<B: Bus>(
        &mut self,
        bus: &mut B,
        mode: AddrMode,
        operand: &Resolved,
        f: fn(&mut Self, u8) -> u8,
    ) {
        if mode == AddrMode::Acc {
            self.a = f(self, self.a);
        } else if let Some(addr) = operand.addr {
            let value = bus.read(addr);
            let result = f(self, value);
            bus.write(addr, result);
        }
    }

    /// Take the branch if `taken`; one extra cycle, two on a page cross.
    fn branch_if(&mut self, taken: bool, operand: &Resolved) -> u8 {
        if !taken {
            return 0;
        }
        if let Some(target) = operand.target {
            self.pc = target;
        }
        1 + u8::from(operand.crossed)
    }

    // ---- arithmetic -----------------------------------------------------

    fn adc(&mut self, value: u8) {
        if self.status.contains(Status::D) {
            self.adc_decimal(value);
        } else {
            self.adc_binary(value);
        }
    }

    fn sbc(&mut self, value: u8) {
        if self.status.contains(Status::D) {
            self.sbc_decimal(value);
        } else {
            // Binary SBC is ADC of the one's complement.
            self.adc_binary(!value);
        }
    }

    fn adc_binary(&mut self, value: u8) {
        let a = u16::from(self.a);
        let v = u16::from(value);
        let carry = u16::from(self.status.contains(Status::C));
        let sum = a + v + carry;
        let result = sum as u8;

        self.status.assign(Status::C, sum > 0xFF);
        // Signed overflow: both inputs share a sign the result lacks.
        self.status
            .assign(Status::V, (!(a ^ v) & (a ^ sum) & 0x80) != 0);
        self.a = result;
        self.set_zn(result);
    }

    /// Decimal ADC. Each nibble that exceeds 9 is adjusted by 6; carry is
    /// taken from the decimal result. N and Z differ per variant: NMOS keeps
    /// Z from the binary sum and N from the pre-adjust high nibble, CMOS
    /// derives both from the decimal result.
    fn adc_decimal(&mut self, value: u8) {
        let a = u16::from(self.a);
        let v = u16::from(value);
        let carry = u16::from(self.status.contains(Status::C));
        let binary = a + v + carry;

        let mut lo = (a & 0x0F) + (v & 0x0F) + carry;
        let mut hi = (a >> 4) + (v >> 4);
        if lo > 0x09 {
            lo += 0x06;
            hi += 1;
        }

        let negative_mid = hi & 0x08 != 0;
        let overflow = (!(a ^ v) & (a ^ (hi << 4)) & 0x80) != 0;

        if hi > 0x09 {
            hi += 0x06;
        }
        let result = (((hi & 0x0F) << 4) | (lo & 0x0F)) as u8;

        self.status.assign(Status::C, hi > 0x0F);
        self.status.assign(Status::V, overflow);
        if self.variant().is_cmos() {
            self.set_zn(result);
        } else {
            self.status.assign(Status::Z, binary as u8 == 0);
            self.status.assign(Status::N, negative_mid);
        }
        self.a = result;
    }

    /// Decimal SBC. Borrowed nibbles are adjusted by 6; C, V and the NMOS
    /// N/Z come from the binary computation, CMOS N/Z from the decimal
    /// result.
    fn sbc_decimal(&mut self, value: u8) {
        let a = u16::from(self.a);
        let v = u16::from(value);
        let carry = u16::from(self.status.contains(Status::C));
        let binary = a + u16::from(!value) + carry;
        let borrow = 1 - carry as i16;

        let mut lo = (a & 0x0F) as i16 - (v & 0x0F) as i16 - borrow;
        let mut hi = (a >> 4) as i16 - (v >> 4) as i16;
        if lo < 0 {
            lo -= 0x06;
            hi -= 1;
        }
        if hi < 0 {
            hi -= 0x06;
        }
        let result = ((((hi as u16) & 0x0F) << 4) | ((lo as u16) & 0x0F)) as u8;

        self.status.assign(Status::C, binary > 0xFF);
        self.status
            .assign(Status::V, ((a ^ v) & (a ^ binary) & 0x80) != 0);
        if self.variant().is_cmos() {
            self.set_zn(result);
        } else {
            self.set_zn(binary as u8);
        }
        self.a = result;
    }

    /// Compare: subtract, discard, keep N/Z/C.
    fn compare(&mut self, register: u8, value: u8) {
        self.status.assign(Status::C, register >= value);
        self.set_zn(register.wrapping_sub(value));
    }

    // ---- shift/rotate/step kernels used through `modify` ----------------

    fn asl_value(&mut self, value: u8) -> u8 {
        self.status.assign(Status::C, value & 0x80 != 0);
        let result = value << 1;
        self.set_zn(result);
        result
    }

    fn lsr_value(&mut self, value: u8) -> u8 {
        self.status.assign(Status::C, value & 0x01 != 0);
        let result = value >> 1;
        self.set_zn(result);
        result
    }

    fn rol_value(&mut self, value: u8) -> u8 {
        let carry_in = u8::from(self.status.contains(Status::C));
        self.status.assign(Status::C, value & 0x80 != 0);
        let result = (value << 1) | carry_in;
        self.set_zn(result);
        result
    }

    fn ror_value(&mut self, value: u8) -> u8 {
        let carry_in = u8::from(self.status.contains(Status::C)) << 7;
        self.status.assign(Status::C, value & 0x01 != 0);
        let result = (value >> 1) | carry_in;
        self.set_zn(result);
        result
    }

    fn inc_value(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.set_zn(result);
        result
    }

    fn dec_value(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.set_zn(result);
        result
    }
}
