//! Processor status register.
//!
//! Bit layout, high to low: `N V U B D I Z C`. Two conventions matter for
//! round-tripping the register through the stack:
//!
//! - bit 5 (`U`) has no storage on the real chip and always reads as 1;
//! - bit 4 (`B`) only exists in the pushed copy — 1 when the push came from
//!   software (PHP or BRK), 0 when it came from an IRQ or NMI entry.

use bitflags::bitflags;

bitflags! {
    /// Status flags packed into the P register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Status: u8 {
        /// Carry: carry-out of bit 7 on adds, borrow-complement on
        /// subtracts and compares, shifted-out bit on shifts.
        const C = 1 << 0;

        /// Zero: last result was 0.
        const Z = 1 << 1;

        /// Interrupt disable: while set, the IRQ line is ignored.
        const I = 1 << 2;

        /// Decimal: ADC/SBC operate on binary-coded decimal.
        const D = 1 << 3;

        /// Break marker, meaningful only in the stacked copy.
        const B = 1 << 4;

        /// Unused bit, reads as 1.
        const U = 1 << 5;

        /// Overflow: signed overflow on ADC/SBC, bit 6 of the operand on BIT.
        const V = 1 << 6;

        /// Negative: bit 7 of the last result.
        const N = 1 << 7;
    }
}

impl Status {
    /// State after a reset: interrupts disabled, unused bit high.
    pub const RESET: Self = Self::I.union(Self::U);

    /// Flags with interrupts enabled and the unused bit high.
    pub const fn new() -> Self {
        Self::U
    }

    /// Set or clear a single flag.
    #[inline]
    pub fn assign(&mut self, flag: Self, value: bool) {
        if value {
            self.insert(flag);
        } else {
            self.remove(flag);
        }
    }

    /// Update N and Z from a result byte.
    #[inline]
    pub fn set_zn(&mut self, value: u8) {
        self.assign(Self::Z, value == 0);
        self.assign(Self::N, value & 0x80 != 0);
    }

    /// The byte pushed on the stack.
    ///
    /// `software` is true for PHP and BRK pushes, which set the B bit; the
    /// interrupt entry sequences push it clear. U is always high.
    #[inline]
    pub const fn to_stack_byte(self, software: bool) -> u8 {
        let mut byte = self.bits() | Self::U.bits();
        if software {
            byte |= Self::B.bits();
        }
        byte
    }

    /// Rebuild flags from a byte pulled off the stack.
    ///
    /// B has no storage and is dropped; U is forced high.
    #[inline]
    pub fn from_stack_byte(byte: u8) -> Self {
        Self::from_bits_truncate((byte & !Self::B.bits()) | Self::U.bits())
    }
}
