//! Memory bus: the CPU-facing access trait and the device interval map.
//!
//! [`Bus`] is the contract the CPU executes against; anything that can
//! resolve 16-bit addresses to bytes can drive the CPU, which keeps unit
//! tests on a flat array. [`DeviceBus`] is the real implementation: a sparse
//! ordered map from address ranges to attached devices, with overlay
//! semantics for late attachments.

use std::fmt;
use std::rc::Rc;

use crate::device::{Address, NullDevice, SharedDevice};

/// Memory access interface the CPU executes against.
///
/// `read`/`write` are notified accesses and may have side effects on I/O
/// devices. `peek`/`poke` are the silent pair for debuggers and the
/// disassembler.
pub trait Bus {
    /// Read a byte; may notify the owning device.
    fn read(&mut self, addr: u16) -> u8;

    /// Write a byte; may notify the owning device.
    fn write(&mut self, addr: u16, data: u8);

    /// Read a byte without device notification.
    ///
    /// Default implementation returns 0; override for debugger support.
    fn peek(&mut self, addr: u16) -> u8 {
        let _ = addr;
        0
    }

    /// Write a byte without device notification.
    ///
    /// Default implementation forwards to `write`.
    fn poke(&mut self, addr: u16, data: u8) {
        self.write(addr, data);
    }

    /// Read a little-endian 16-bit value from `addr` and `addr + 1`.
    #[inline]
    fn read_u16(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// Read a 16-bit value without crossing the page of `addr`.
    ///
    /// When `addr` sits at `$xxFF` the high byte comes from `$xx00` — the
    /// NMOS JMP-indirect behavior.
    #[inline]
    fn read_u16_wrap(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi_addr = if addr & 0x00FF == 0x00FF {
            addr & 0xFF00
        } else {
            addr.wrapping_add(1)
        };
        let hi = self.read(hi_addr) as u16;
        (hi << 8) | lo
    }
}

/// One contiguous slice of the address space owned by a single device.
///
/// `begin` and `end` are inclusive; `base` is the device-local offset that
/// corresponds to `begin`.
#[derive(Clone)]
pub struct Region {
    /// First bus address covered.
    pub begin: u16,
    /// Last bus address covered.
    pub end: u16,
    /// Device-local offset of `begin`.
    pub base: u16,
    device: SharedDevice,
}

impl Region {
    /// Handle to the owning device.
    pub fn device(&self) -> &SharedDevice {
        &self.device
    }

    /// Translate a bus address into the `{full, relative}` pair.
    fn translate(&self, addr: u16) -> Address {
        Address {
            full: addr,
            relative: self.base.wrapping_add(addr - self.begin),
        }
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("begin", &self.begin)
            .field("end", &self.end)
            .field("base", &self.base)
            .field("device", &self.device.borrow().name())
            .finish()
    }
}

/// Sparse interval map routing bus traffic to attached devices.
///
/// The region list always covers `[0x0000, 0xFFFF]` exactly once, strictly
/// ordered, with a null sentinel backing every unclaimed range and no two
/// adjacent regions pointing at the same device.
///
/// The bus holds shared handles only; device callbacks may mutate their own
/// backing state but must not attach or detach regions while an access is in
/// flight (the `RefCell` borrow makes such re-entrancy a panic, not silent
/// corruption).
pub struct DeviceBus {
    regions: Vec<Region>,
    null: SharedDevice,
}

impl DeviceBus {
    /// A bus with the whole address space backed by the null sentinel.
    pub fn new() -> Self {
        let null: SharedDevice = Rc::new(std::cell::RefCell::new(NullDevice));
        let regions = vec![Region {
            begin: 0x0000,
            end: 0xFFFF,
            base: 0x0000,
            device: Rc::clone(&null),
        }];
        Self { regions, null }
    }

    /// Overlay `device` across the inclusive range `[begin, end]`.
    ///
    /// A reversed range is swapped; `None` re-attaches the null sentinel,
    /// which is how a range is released. Overlapped regions are split into
    /// remnants, the overlay always starts at device offset 0, and adjacent
    /// regions owned by the same device are merged afterwards.
    pub fn attach(&mut self, device: Option<SharedDevice>, begin: u16, end: u16) {
        let (begin, end) = if begin <= end { (begin, end) } else { (end, begin) };
        let device = device.unwrap_or_else(|| Rc::clone(&self.null));

        let mut next: Vec<Region> = Vec::with_capacity(self.regions.len() + 2);
        let mut overlay_emitted = false;

        for region in &self.regions {
            if region.end < begin || region.begin > end {
                next.push(region.clone());
                continue;
            }

            // Left remnant keeps its original base.
            if region.begin < begin {
                next.push(Region {
                    begin: region.begin,
                    end: begin - 1,
                    base: region.base,
                    device: Rc::clone(&region.device),
                });
            }

            // The overlay slice goes in exactly once, before the right
            // remnant of the first region it touches.
            if !overlay_emitted {
                next.push(Region {
                    begin,
                    end,
                    base: 0,
                    device: Rc::clone(&device),
                });
                overlay_emitted = true;
            }

            // Right remnant re-bases to stay aligned with its device.
            if region.end > end {
                next.push(Region {
                    begin: end + 1,
                    end: region.end,
                    base: region.base.wrapping_add(end + 1 - region.begin),
                    device: Rc::clone(&region.device),
                });
            }
        }

        self.regions = Self::coalesce(next);
    }

    /// Merge adjacent regions that point at the same device.
    fn coalesce(regions: Vec<Region>) -> Vec<Region> {
        let mut merged: Vec<Region> = Vec::with_capacity(regions.len());
        for region in regions {
            match merged.last_mut() {
                Some(last) if Rc::ptr_eq(&last.device, &region.device) => {
                    last.end = region.end;
                }
                _ => merged.push(region),
            }
        }
        merged
    }

    /// Locate the region containing `addr`.
    ///
    /// Coverage is total, so this always finds one.
    fn region_for(&self, addr: u16) -> &Region {
        let index = self.regions.partition_point(|r| r.begin <= addr) - 1;
        &self.regions[index]
    }

    /// Read-only view of the region list.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }
}

impl Default for DeviceBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for DeviceBus {
    fn read(&mut self, addr: u16) -> u8 {
        let region = self.region_for(addr);
        let local = region.translate(addr);
        region.device.borrow_mut().read(local)
    }

    fn write(&mut self, addr: u16, data: u8) {
        let region = self.region_for(addr);
        let local = region.translate(addr);
        region.device.borrow_mut().write(local, data);
    }

    fn peek(&mut self, addr: u16) -> u8 {
        let region = self.region_for(addr);
        let local = region.translate(addr);
        region.device.borrow_mut().peek(local)
    }

    fn poke(&mut self, addr: u16, data: u8) {
        let region = self.region_for(addr);
        let local = region.translate(addr);
        region.device.borrow_mut().poke(local, data);
    }
}

impl fmt::Display for DeviceBus {
    /// Region table, one line per region: range, base, device name.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, region) in self.regions.iter().enumerate() {
            if i != 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "${:04X}..=${:04X} @ ${:04X} {}",
                region.begin,
                region.end,
                region.base,
                region.device.borrow().name()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::share;
    use crate::memory::Memory;

    #[test]
    fn fresh_bus_is_one_null_region() {
        let bus = DeviceBus::new();
        assert_eq!(bus.regions().len(), 1);
        assert_eq!(bus.regions()[0].begin, 0x0000);
        assert_eq!(bus.regions()[0].end, 0xFFFF);
    }

    #[test]
    fn overlay_splits_surrounding_region() {
        let mut bus = DeviceBus::new();
        let dev = share(Memory::ram(0x10000));
        bus.attach(Some(Rc::clone(&dev)), 0x0080, 0xFF7F);

        let regions = bus.regions();
        assert_eq!(regions.len(), 3);
        assert_eq!((regions[0].begin, regions[0].end), (0x0000, 0x007F));
        assert_eq!((regions[1].begin, regions[1].end), (0x0080, 0xFF7F));
        assert_eq!((regions[2].begin, regions[2].end), (0xFF80, 0xFFFF));
        assert!(Rc::ptr_eq(regions[1].device(), &dev));
    }

    #[test]
    fn overlay_relative_addressing() {
        let mut bus = DeviceBus::new();
        let dev = share(Memory::ram(0x10000));
        bus.attach(Some(Rc::clone(&dev)), 0x0080, 0xFF7F);

        // 0x0100 lies 0x0080 into the overlay, so the device sees 0x0080.
        bus.write(0x0100, 0x5A);
        assert_eq!(
            dev.borrow_mut().read(crate::device::Address {
                full: 0x0100,
                relative: 0x0080,
            }),
            0x5A
        );
    }

    #[test]
    fn full_coverage_replacement() {
        let mut bus = DeviceBus::new();
        let dev = share(Memory::ram(0x10000));
        bus.attach(Some(Rc::clone(&dev)), 0x0000, 0xFFFF);

        assert_eq!(bus.regions().len(), 1);
        assert!(Rc::ptr_eq(bus.regions()[0].device(), &dev));
    }

    #[test]
    fn adjacent_same_device_regions_coalesce() {
        let mut bus = DeviceBus::new();
        let dev = share(Memory::ram(0x10000));
        bus.attach(Some(Rc::clone(&dev)), 0x0000, 0x7FFF);
        bus.attach(Some(Rc::clone(&dev)), 0x8000, 0xFFFF);

        assert_eq!(bus.regions().len(), 1);
        assert_eq!(bus.regions()[0].begin, 0x0000);
        assert_eq!(bus.regions()[0].end, 0xFFFF);
    }

    #[test]
    fn reversed_range_is_swapped() {
        let mut bus = DeviceBus::new();
        let dev = share(Memory::ram(0x100));
        bus.attach(Some(dev), 0x20FF, 0x2000);

        let covering: Vec<_> = bus
            .regions()
            .iter()
            .filter(|r| r.begin == 0x2000 && r.end == 0x20FF)
            .collect();
        assert_eq!(covering.len(), 1);
    }

    #[test]
    fn none_reattaches_the_null_sentinel() {
        let mut bus = DeviceBus::new();
        let dev = share(Memory::ram(0x10000));
        bus.attach(Some(dev), 0x0000, 0xFFFF);
        bus.attach(None, 0x0000, 0xFFFF);

        assert_eq!(bus.regions().len(), 1);
        assert_eq!(bus.read(0x1234), 0);
    }

    #[test]
    fn buried_device_is_unreachable() {
        let mut bus = DeviceBus::new();
        let lower = share(Memory::ram(0x10000));
        let upper = share(Memory::ram(0x10000));
        bus.attach(Some(Rc::clone(&lower)), 0x0000, 0xFFFF);
        bus.write(0x4000, 0x11);
        bus.attach(Some(Rc::clone(&upper)), 0x0000, 0xFFFF);

        bus.write(0x4000, 0x22);
        assert_eq!(bus.read(0x4000), 0x22);
        for region in bus.regions() {
            assert!(!Rc::ptr_eq(region.device(), &lower));
        }
    }

    #[test]
    fn right_remnant_keeps_device_alignment() {
        let mut bus = DeviceBus::new();
        let ram = share(Memory::ram(0x10000));
        bus.attach(Some(Rc::clone(&ram)), 0x0000, 0xFFFF);
        bus.write(0x9000, 0x77);

        // Punch a hole below 0x9000; the remnant above it must still map
        // 0x9000 to the same backing byte.
        let hole = share(Memory::ram(0x100));
        bus.attach(Some(hole), 0x0000, 0x7FFF);
        assert_eq!(bus.read(0x9000), 0x77);
    }

    #[test]
    fn null_regions_read_zero_and_drop_writes() {
        let mut bus = DeviceBus::new();
        bus.write(0x8000, 0xFF);
        assert_eq!(bus.read(0x8000), 0);
        assert_eq!(bus.peek(0x8000), 0);
    }

    #[test]
    fn rom_region_drops_notified_and_silent_writes() {
        let mut bus = DeviceBus::new();
        let rom = share(Memory::rom(0x100));
        bus.attach(Some(rom), 0xFF00, 0xFFFF);

        bus.write(0xFF10, 0xAA);
        bus.poke(0xFF11, 0xBB);
        assert_eq!(bus.read(0xFF10), 0);
        assert_eq!(bus.read(0xFF11), 0);
    }

    #[test]
    fn read_u16_is_little_endian() {
        let mut bus = DeviceBus::new();
        let ram = share(Memory::ram(0x10000));
        bus.attach(Some(ram), 0x0000, 0xFFFF);

        bus.write(0x1000, 0x34);
        bus.write(0x1001, 0x12);
        assert_eq!(bus.read_u16(0x1000), 0x1234);
    }

    #[test]
    fn read_u16_wrap_stays_in_page() {
        let mut bus = DeviceBus::new();
        let ram = share(Memory::ram(0x10000));
        bus.attach(Some(ram), 0x0000, 0xFFFF);

        bus.write(0x10FF, 0x34);
        bus.write(0x1100, 0x56);
        bus.write(0x1000, 0x12);

        assert_eq!(bus.read_u16(0x10FF), 0x5634);
        assert_eq!(bus.read_u16_wrap(0x10FF), 0x1234);
    }

    #[test]
    fn every_address_is_owned_once() {
        let mut bus = DeviceBus::new();
        let a = share(Memory::ram(0x1000));
        let b = share(Memory::ram(0x1000));
        bus.attach(Some(a), 0x1000, 0x1FFF);
        bus.attach(Some(b), 0x1800, 0x27FF);

        let regions = bus.regions();
        assert_eq!(regions[0].begin, 0x0000);
        for pair in regions.windows(2) {
            assert_eq!(pair[0].end.wrapping_add(1), pair[1].begin);
            assert!(!Rc::ptr_eq(pair[0].device(), pair[1].device()));
        }
        assert_eq!(regions.last().unwrap().end, 0xFFFF);
    }

    #[test]
    fn display_lists_regions() {
        let mut bus = DeviceBus::new();
        let ram = share(Memory::ram(0x8000));
        bus.attach(Some(ram), 0x0000, 0x7FFF);

        let printed = bus.to_string();
        assert!(printed.contains("$0000..=$7FFF"));
        assert!(printed.contains("ram"));
        assert!(printed.contains("null"));
    }
}
