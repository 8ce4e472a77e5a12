//! Throughput benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use devcon::commands::stock_commands;
use devcon::core::transport::Loopback;
use devcon::{Engine, EngineOptions, RingBuffer};

fn ring_benchmark(c: &mut Criterion) {
    let data: Vec<u8> = (0..256).map(|i| (i % 256) as u8).collect();

    let mut group = c.benchmark_group("ring");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("write_read_cycle", |b| {
        let mut ring = RingBuffer::new(512);
        let mut out = vec![0u8; 512];
        b.iter(|| {
            ring.write_block(black_box(&data)).unwrap();
            let n = ring.read_block(&mut out).unwrap();
            black_box(n)
        })
    });

    group.bench_function("byte_write_read", |b| {
        let mut ring = RingBuffer::new(512);
        b.iter(|| {
            for &byte in &data {
                ring.write(black_box(byte)).unwrap();
            }
            while ring.read().is_ok() {}
        })
    });

    group.finish();
}

fn engine_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");

    group.bench_function("echo_line", |b| {
        let (port, host) = Loopback::pair();
        let mut engine = Engine::new(
            EngineOptions::default(),
            Box::new(port.clone()),
            Box::new(port),
            stock_commands(),
        );
        b.iter(|| {
            host.push(b"echo benchmark payload\r");
            for _ in 0..8 {
                engine.process();
            }
            black_box(host.take_output())
        })
    });

    group.bench_function("idle_tick", |b| {
        let (port, host) = Loopback::pair();
        let mut engine = Engine::new(
            EngineOptions::default(),
            Box::new(port.clone()),
            Box::new(port),
            stock_commands(),
        );
        for _ in 0..4 {
            engine.process();
        }
        host.take_output();
        b.iter(|| engine.process())
    });

    group.finish();
}

criterion_group!(benches, ring_benchmark, engine_benchmark);
criterion_main!(benches);
