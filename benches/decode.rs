// ABOUTME: Criterion benchmarks for decode throughput over synthetic wire buffers.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use erlterm::{tag, Decoder};

fn push_atom(buf: &mut Vec<u8>, text: &str) {
    buf.push(tag::SMALL_ATOM_UTF8);
    buf.push(text.len() as u8);
    buf.extend_from_slice(text.as_bytes());
}

fn push_i32(buf: &mut Vec<u8>, value: i32) {
    if let Ok(small) = u8::try_from(value) {
        buf.extend_from_slice(&[tag::SMALL_INTEGER, small]);
    } else {
        buf.push(tag::INTEGER);
        buf.extend_from_slice(&value.to_be_bytes());
    }
}

fn push_map_header(buf: &mut Vec<u8>, pairs: u32) {
    buf.push(tag::MAP);
    buf.extend_from_slice(&pairs.to_be_bytes());
}

fn push_list_header(buf: &mut Vec<u8>, count: u32) {
    buf.push(tag::LIST);
    buf.extend_from_slice(&count.to_be_bytes());
}

fn bench_flat_map(c: &mut Criterion) {
    let mut wire = Vec::new();
    push_map_header(&mut wire, 100);
    for i in 0..100 {
        push_atom(&mut wire, &format!("field_{i:02}"));
        push_i32(&mut wire, i * 37);
    }

    let mut group = c.benchmark_group("flat_map_100");
    group.throughput(Throughput::Bytes(wire.len() as u64));
    group.bench_function("read_map_i64", |b| {
        b.iter(|| {
            let mut dec = Decoder::new(black_box(&wire[..]), 0x1000);
            let mut total = 0i64;
            dec.read_map(|dec, _| {
                total += dec.read_i64()?;
                Ok(())
            })
            .unwrap();
            total
        })
    });
    group.finish();
}

fn bench_int_list(c: &mut Criterion) {
    let mut wire = Vec::new();
    push_list_header(&mut wire, 1000);
    for i in 0..1000 {
        push_i32(&mut wire, i);
    }
    wire.push(tag::NIL);

    let mut group = c.benchmark_group("int_list_1000");
    group.throughput(Throughput::Elements(1000));
    group.bench_function("read_list_i32", |b| {
        b.iter(|| {
            let mut dec = Decoder::new(black_box(&wire[..]), 0x1000);
            let mut total = 0i64;
            dec.read_list(|dec| {
                total += i64::from(dec.read_i32()?);
                Ok(())
            })
            .unwrap();
            total
        })
    });
    group.finish();
}

fn bench_atom_list(c: &mut Criterion) {
    let mut wire = Vec::new();
    push_list_header(&mut wire, 500);
    for i in 0..500 {
        push_atom(&mut wire, &format!("node_{i:03}@cluster.local"));
    }
    wire.push(tag::NIL);

    let mut group = c.benchmark_group("atom_list_500");
    group.throughput(Throughput::Bytes(wire.len() as u64));
    group.bench_function("read_atom", |b| {
        b.iter(|| {
            let mut dec = Decoder::new(black_box(&wire[..]), 0x1000);
            let mut chars = 0usize;
            dec.read_list(|dec| {
                chars += dec.read_atom()?.len();
                Ok(())
            })
            .unwrap();
            chars
        })
    });
    group.bench_function("skip_term", |b| {
        b.iter(|| {
            let mut dec = Decoder::new(black_box(&wire[..]), 0x1000);
            dec.skip_term().unwrap();
            dec.cursor()
        })
    });
    group.finish();
}

criterion_group!(benches, bench_flat_map, bench_int_list, bench_atom_list);

criterion_main!(benches);
