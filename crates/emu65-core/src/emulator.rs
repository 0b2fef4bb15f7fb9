//! The emulator aggregate: one CPU wired to one device bus.
//!
//! Everything that used to be process-wide state lives here; the clock
//! pacer, monitors and tests all drive a `&mut Emulator`.

use crate::bus::DeviceBus;
use crate::cpu::Cpu;
use crate::device::SharedDevice;
use crate::opcodes::Variant;

/// A complete machine: CPU plus bus.
pub struct Emulator {
    /// The processor.
    pub cpu: Cpu,
    /// The address-decoding bus the processor executes against.
    pub bus: DeviceBus,
}

impl Emulator {
    /// A machine of the given chip variant with an empty (null-backed) bus.
    pub fn new(variant: Variant) -> Self {
        Self {
            cpu: Cpu::new(variant),
            bus: DeviceBus::new(),
        }
    }

    /// Overlay a device across `[begin, end]` on the bus.
    pub fn attach(&mut self, device: Option<SharedDevice>, begin: u16, end: u16) {
        self.bus.attach(device, begin, end);
    }

    /// Consume one CPU cycle.
    pub fn clock(&mut self) {
        self.cpu.clock(&mut self.bus);
    }

    /// Run to the end of the next instruction boundary.
    pub fn run_instruction(&mut self) {
        self.cpu.run_instruction(&mut self.bus);
    }

    /// Assert or release the RESET input.
    pub fn set_reset(&mut self, active: bool) {
        self.cpu.set_reset(active);
    }

    /// Assert or release the IRQ input.
    pub fn set_irq(&mut self, active: bool) {
        self.cpu.set_irq(active);
    }

    /// Assert or release the NMI input.
    pub fn set_nmi(&mut self, active: bool) {
        self.cpu.set_nmi(active);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::share;
    use crate::memory::Memory;

    use crate::bus::Bus;

    #[test]
    fn reset_through_the_device_bus() {
        let mut emu = Emulator::new(Variant::Nmos);
        let ram = share(Memory::ram(0x10000));
        emu.attach(Some(ram), 0x0000, 0xFFFF);

        emu.bus.poke(0xFFFC, 0x34);
        emu.bus.poke(0xFFFD, 0x12);

        emu.set_reset(true);
        emu.run_instruction();
        emu.set_reset(false);

        assert_eq!(emu.cpu.pc, 0x1234);
        assert_eq!(emu.cpu.remaining_cycles(), 0);
    }

    #[test]
    fn program_runs_against_attached_ram() {
        let mut emu = Emulator::new(Variant::Nmos);
        let ram = share(Memory::ram(0x10000));
        emu.attach(Some(ram), 0x0000, 0xFFFF);

        // LDA #$2A, STA $0200
        for (i, byte) in [0xA9, 0x2A, 0x8D, 0x00, 0x02].iter().enumerate() {
            emu.bus.poke(0x8000 + i as u16, *byte);
        }
        emu.bus.poke(0xFFFC, 0x00);
        emu.bus.poke(0xFFFD, 0x80);

        emu.set_reset(true);
        emu.run_instruction();
        emu.set_reset(false);
        emu.run_instruction();
        emu.run_instruction();

        assert_eq!(emu.bus.peek(0x0200), 0x2A);
    }
}
