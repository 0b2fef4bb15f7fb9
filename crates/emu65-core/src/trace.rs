//! Execution tracing and disassembly.
//!
//! All inspection here goes through the silent `peek` access so tracing a
//! machine with memory-mapped I/O never perturbs it. Capture happens before
//! an instruction executes; the rendered line shows the state the
//! instruction starts from.

use std::fmt;
use std::fmt::Write as _;

use crate::addressing::AddrMode;
use crate::bus::Bus;
use crate::cpu::Cpu;
use crate::opcodes::Variant;

/// Disassemble the instruction at `addr` into conventional 6502 syntax.
///
/// Returns the rendered text and the instruction length in bytes.
pub fn disassemble(bus: &mut impl Bus, addr: u16, variant: Variant) -> (String, u8) {
    let opcode = bus.peek(addr);
    let entry = &variant.decode_table()[opcode as usize];
    let mnemonic = entry.instruction.mnemonic();

    let b1 = bus.peek(addr.wrapping_add(1));
    let b2 = bus.peek(addr.wrapping_add(2));
    let word = u16::from_le_bytes([b1, b2]);
    let length = 1 + entry.mode.operand_size();
    let end = addr.wrapping_add(u16::from(length));

    let text = match entry.mode {
        AddrMode::Imp => mnemonic.to_string(),
        AddrMode::Acc => format!("{mnemonic} A"),
        AddrMode::Imm => format!("{mnemonic} #${b1:02X}"),
        AddrMode::Zpg => format!("{mnemonic} ${b1:02X}"),
        AddrMode::ZpgX => format!("{mnemonic} ${b1:02X},X"),
        AddrMode::ZpgY => format!("{mnemonic} ${b1:02X},Y"),
        AddrMode::ZpgInd => format!("{mnemonic} (${b1:02X})"),
        AddrMode::Abs => format!("{mnemonic} ${word:04X}"),
        AddrMode::AbsX => format!("{mnemonic} ${word:04X},X"),
        AddrMode::AbsY => format!("{mnemonic} ${word:04X},Y"),
        AddrMode::Ind => format!("{mnemonic} (${word:04X})"),
        AddrMode::AbsIndX => format!("{mnemonic} (${word:04X},X)"),
        AddrMode::IndX => format!("{mnemonic} (${b1:02X},X)"),
        AddrMode::IndY => format!("{mnemonic} (${b1:02X}),Y"),
        AddrMode::Rel => {
            let target = end.wrapping_add(b1 as i8 as u16);
            format!("{mnemonic} ${target:04X}")
        }
        AddrMode::ZpgRel => {
            let target = end.wrapping_add(b2 as i8 as u16);
            format!("{mnemonic} ${b1:02X},${target:04X}")
        }
    };

    (text, length)
}

/// Snapshot of the CPU at one instruction boundary.
#[derive(Debug, Clone)]
pub struct TraceEntry {
    /// Program counter at capture.
    pub pc: u16,
    /// Opcode plus operand bytes.
    pub bytes: Vec<u8>,
    /// Disassembled instruction.
    pub disassembly: String,
    /// Accumulator.
    pub a: u8,
    /// X register.
    pub x: u8,
    /// Y register.
    pub y: u8,
    /// Packed status flags.
    pub p: u8,
    /// Stack pointer.
    pub sp: u8,
    /// Total cycles consumed so far.
    pub cycles: u64,
}

impl TraceEntry {
    /// Capture the state at the CPU's current PC.
    ///
    /// Call before the instruction executes; the entry describes what is
    /// about to run, not what just ran.
    pub fn capture(cpu: &Cpu, bus: &mut impl Bus) -> Self {
        let (disassembly, length) = disassemble(bus, cpu.pc, cpu.variant());
        let bytes = (0..length)
            .map(|i| bus.peek(cpu.pc.wrapping_add(u16::from(i))))
            .collect();

        Self {
            pc: cpu.pc,
            bytes,
            disassembly,
            a: cpu.a,
            x: cpu.x,
            y: cpu.y,
            p: cpu.status.bits(),
            sp: cpu.sp,
            cycles: cpu.total_cycles(),
        }
    }
}

impl fmt::Display for TraceEntry {
    /// One fixed-width line per instruction:
    /// `PC  BYTES     DISASM            A:.. X:.. Y:.. P:.. SP:.. CYC:..`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bytes = String::new();
        for byte in &self.bytes {
            let _ = write!(bytes, "{byte:02X} ");
        }
        write!(
            f,
            "{:04X}  {:<9} {:<14} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
            self.pc,
            bytes.trim_end(),
            self.disassembly,
            self.a,
            self.x,
            self.y,
            self.p,
            self.sp,
            self.cycles
        )
    }
}

/// Collects trace lines while enabled.
///
/// Disabled tracers do nothing, so the call can stay in a host loop without
/// a verbosity check at every site. Captured lines also go to the `log`
/// facade at trace level.
pub struct Tracer {
    enabled: bool,
    entries: Vec<TraceEntry>,
}

impl Tracer {
    /// A tracer; pass `enabled = false` for a no-op collector.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: Vec::new(),
        }
    }

    /// Record the instruction the CPU is about to run.
    pub fn trace(&mut self, cpu: &Cpu, bus: &mut impl Bus) {
        if !self.enabled {
            return;
        }
        let entry = TraceEntry::capture(cpu, bus);
        log::trace!("{entry}");
        self.entries.push(entry);
    }

    /// Everything captured so far.
    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcodes::Variant;

    struct TestBus {
        memory: [u8; 0x10000],
    }

    impl Bus for TestBus {
        fn read(&mut self, addr: u16) -> u8 {
            self.memory[addr as usize]
        }

        fn write(&mut self, addr: u16, data: u8) {
            self.memory[addr as usize] = data;
        }

        fn peek(&mut self, addr: u16) -> u8 {
            self.memory[addr as usize]
        }
    }

    fn bus_with(addr: u16, bytes: &[u8]) -> TestBus {
        let mut bus = TestBus {
            memory: [0; 0x10000],
        };
        for (i, &byte) in bytes.iter().enumerate() {
            bus.memory[addr as usize + i] = byte;
        }
        bus
    }

    #[test]
    fn disassembles_common_modes() {
        let mut bus = bus_with(0x8000, &[0xA9, 0x42]);
        assert_eq!(
            disassemble(&mut bus, 0x8000, Variant::Nmos),
            ("LDA #$42".to_string(), 2)
        );

        let mut bus = bus_with(0x8000, &[0x8D, 0x00, 0x02]);
        assert_eq!(
            disassemble(&mut bus, 0x8000, Variant::Nmos),
            ("STA $0200".to_string(), 3)
        );

        let mut bus = bus_with(0x8000, &[0x0A]);
        assert_eq!(
            disassemble(&mut bus, 0x8000, Variant::Nmos),
            ("ASL A".to_string(), 1)
        );

        let mut bus = bus_with(0x8000, &[0xB1, 0x10]);
        assert_eq!(
            disassemble(&mut bus, 0x8000, Variant::Nmos),
            ("LDA ($10),Y".to_string(), 2)
        );
    }

    #[test]
    fn disassembles_branch_targets() {
        // BNE -2 from $8000: target = $8000 + 2 - 2 = $8000.
        let mut bus = bus_with(0x8000, &[0xD0, 0xFE]);
        assert_eq!(
            disassemble(&mut bus, 0x8000, Variant::Nmos),
            ("BNE $8000".to_string(), 2)
        );
    }

    #[test]
    fn disassembles_rockwell_and_wdc_forms() {
        // BBS3 $12, +4 from $8000: target = $8003 + 4.
        let mut bus = bus_with(0x8000, &[0xBF, 0x12, 0x04]);
        assert_eq!(
            disassemble(&mut bus, 0x8000, Variant::Rockwell),
            ("BBS3 $12,$8007".to_string(), 3)
        );

        let mut bus = bus_with(0x8000, &[0xB2, 0x10]);
        assert_eq!(
            disassemble(&mut bus, 0x8000, Variant::Wdc),
            ("LDA ($10)".to_string(), 2)
        );

        // The same byte is an illegal single-byte marker on NMOS.
        let mut bus = bus_with(0x8000, &[0xB2, 0x10]);
        assert_eq!(
            disassemble(&mut bus, 0x8000, Variant::Nmos),
            ("???".to_string(), 1)
        );
    }

    #[test]
    fn trace_line_format() {
        let mut bus = bus_with(0x8000, &[0xA9, 0x42]);
        bus.memory[0xFFFC] = 0x00;
        bus.memory[0xFFFD] = 0x80;

        let mut cpu = Cpu::new(Variant::Nmos);
        cpu.set_reset(true);
        cpu.run_instruction(&mut bus);
        cpu.set_reset(false);

        let entry = TraceEntry::capture(&cpu, &mut bus);
        let line = entry.to_string();
        assert!(line.starts_with("8000  A9 42"));
        assert!(line.contains("LDA #$42"));
        assert!(line.contains("SP:FD"));
        assert!(line.contains("CYC:7"));
    }

    #[test]
    fn disabled_tracer_collects_nothing() {
        let mut bus = bus_with(0x8000, &[0xEA]);
        let cpu = Cpu::new(Variant::Nmos);

        let mut tracer = Tracer::new(false);
        tracer.trace(&cpu, &mut bus);
        assert!(tracer.entries().is_empty());

        let mut tracer = Tracer::new(true);
        tracer.trace(&cpu, &mut bus);
        assert_eq!(tracer.entries().len(), 1);
    }
}
