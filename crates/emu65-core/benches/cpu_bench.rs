//! Throughput benchmarks for the CPU core and the device bus.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use emu65_core::{share, Bus, Emulator, Memory, Variant};

/// Machine running a tight arithmetic loop out of RAM.
fn looping_machine(variant: Variant) -> Emulator {
    let mut emu = Emulator::new(variant);
    let ram = share(Memory::ram(0x10000));
    emu.attach(Some(ram), 0x0000, 0xFFFF);

    // loop: INX, CLC, ADC #$01, STA $0200, JMP loop
    let program = [
        0xE8, 0x18, 0x69, 0x01, 0x8D, 0x00, 0x02, 0x4C, 0x00, 0x04,
    ];
    for (i, &byte) in program.iter().enumerate() {
        emu.bus.poke(0x0400 + i as u16, byte);
    }
    emu.bus.poke(0xFFFC, 0x00);
    emu.bus.poke(0xFFFD, 0x04);

    emu.set_reset(true);
    emu.run_instruction();
    emu.set_reset(false);
    emu
}

fn bench_instruction_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu");
    group.throughput(Throughput::Elements(1000));

    for variant in [Variant::Nmos, Variant::Wdc] {
        group.bench_function(format!("run_instruction_{variant:?}"), |b| {
            let mut emu = looping_machine(variant);
            b.iter(|| {
                for _ in 0..1000 {
                    emu.run_instruction();
                }
                black_box(emu.cpu.a)
            });
        });
    }
    group.finish();
}

fn bench_bus_dispatch(c: &mut Criterion) {
    let mut emu = looping_machine(Variant::Nmos);
    // A handful of extra overlays so lookup has something to search.
    for i in 0..8u16 {
        let dev = share(Memory::ram(0x1000));
        emu.attach(Some(dev), 0x1000 * i, 0x1000 * i + 0x0FFF);
    }

    c.bench_function("bus/read", |b| {
        b.iter(|| {
            let mut acc = 0u32;
            for addr in (0..0x10000u32).step_by(251) {
                acc = acc.wrapping_add(u32::from(emu.bus.read(addr as u16)));
            }
            black_box(acc)
        });
    });
}

criterion_group!(benches, bench_instruction_throughput, bench_bus_dispatch);
criterion_main!(benches);
