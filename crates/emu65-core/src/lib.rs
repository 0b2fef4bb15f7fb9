//! 65xx-family CPU and system-bus emulator core.
//!
//! This crate emulates the MOS 6502 line of eight-bit processors — the NMOS
//! original, the Rockwell extension with the bit-manipulation column, and
//! the WDC 65C02 — together with the memory bus devices attach to and a
//! host-clock pacing loop. It supports:
//!
//! - all three decode tables, selected by [`Variant`]
//! - cycle counting with page-cross and branch-taken penalties
//! - IRQ/NMI/RESET control inputs and the 65C02 WAI/STP halt states
//! - an address-decoding bus with overlay attachment and silent access
//! - binary and decimal arithmetic with per-variant flag semantics
//!
//! # Architecture
//!
//! The CPU is generic over the [`Bus`] trait, so it runs against anything
//! from a flat test array to the full [`DeviceBus`] interval map. Devices
//! implement [`Device`] and are shared with the bus via [`SharedDevice`]
//! handles.
//!
//! # Example
//!
//! ```
//! use emu65_core::{share, Bus, Emulator, Memory, Variant};
//!
//! let mut emu = Emulator::new(Variant::Wdc);
//! let ram = share(Memory::ram(0x10000));
//! emu.attach(Some(ram), 0x0000, 0xFFFF);
//!
//! // LDA #$01, STA $0200, at the reset vector's target.
//! for (i, byte) in [0xA9, 0x01, 0x8D, 0x00, 0x02].iter().enumerate() {
//!     emu.bus.poke(0x8000 + i as u16, *byte);
//! }
//! emu.bus.poke(0xFFFC, 0x00);
//! emu.bus.poke(0xFFFD, 0x80);
//!
//! emu.set_reset(true);
//! emu.run_instruction();
//! emu.set_reset(false);
//! emu.run_instruction();
//! emu.run_instruction();
//! assert_eq!(emu.bus.peek(0x0200), 0x01);
//! ```

#![warn(missing_docs)]

mod addressing;
mod bus;
mod clock;
mod cpu;
mod device;
mod emulator;
mod instructions;
mod memory;
mod opcodes;
mod status;
mod trace;

pub use addressing::AddrMode;
pub use bus::{Bus, DeviceBus, Region};
pub use clock::Clock;
pub use cpu::Cpu;
pub use device::{share, Address, Device, NullDevice, SharedDevice};
pub use emulator::Emulator;
pub use memory::{Memory, MemoryError};
pub use opcodes::{Instruction, Opcode, Variant};
pub use status::Status;
pub use trace::{disassemble, TraceEntry, Tracer};

/// Interrupt and reset vector locations, little-endian pairs.
pub mod vectors {
    /// Non-maskable interrupt vector.
    pub const NMI: u16 = 0xFFFA;
    /// Reset vector.
    pub const RESET: u16 = 0xFFFC;
    /// IRQ and BRK vector.
    pub const IRQ: u16 = 0xFFFE;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(variant: Variant, program: &[u8]) -> Emulator {
        let mut emu = Emulator::new(variant);
        let ram = share(Memory::ram(0x10000));
        emu.attach(Some(ram), 0x0000, 0xFFFF);

        for (i, &byte) in program.iter().enumerate() {
            emu.bus.poke(0x0400 + i as u16, byte);
        }
        emu.bus.poke(vectors::RESET, 0x00);
        emu.bus.poke(vectors::RESET + 1, 0x04);

        emu.set_reset(true);
        emu.run_instruction();
        emu.set_reset(false);
        emu
    }

    #[test]
    fn smoke_lda_sta() {
        let mut emu = machine(Variant::Nmos, &[0xA9, 0x55, 0x8D, 0x00, 0x02]);
        emu.run_instruction();
        emu.run_instruction();
        assert_eq!(emu.bus.peek(0x0200), 0x55);
        assert_eq!(emu.cpu.a, 0x55);
    }

    #[test]
    fn smoke_counts_cycles_through_the_device_bus() {
        let mut emu = machine(Variant::Nmos, &[0xA9, 0x55]);
        let before = emu.cpu.total_cycles();
        emu.run_instruction();
        assert_eq!(emu.cpu.total_cycles() - before, 2);
    }

    #[test]
    fn smoke_interrupt_through_the_device_bus() {
        let mut emu = machine(Variant::Nmos, &[0xEA, 0xEA]);
        emu.bus.poke(vectors::IRQ, 0x00);
        emu.bus.poke(vectors::IRQ + 1, 0x20);

        emu.cpu.status.remove(Status::I);
        emu.set_irq(true);
        emu.run_instruction();
        assert_eq!(emu.cpu.pc, 0x2000);
    }

    #[test]
    fn rom_overlay_shadows_ram() {
        let mut emu = machine(Variant::Nmos, &[0xEA]);
        let rom = share({
            let mut rom = Memory::rom(0x0100);
            rom.load(0x0000, &[0xC3]).unwrap();
            rom
        });
        emu.attach(Some(rom), 0xFF00, 0xFFFF);

        assert_eq!(emu.bus.peek(0xFF00), 0xC3);
        emu.bus.write(0xFF00, 0x00);
        assert_eq!(emu.bus.peek(0xFF00), 0xC3);
    }
}
