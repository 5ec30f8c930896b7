//! Benchmarks for fragment buffer allocation, header access and alignment.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use reef_fragment::{FragmentBuffer, aligned_data_size, map_payloads};
use reef_types::{BackendId, CodingParams};

fn bench_allocate(c: &mut Criterion) {
    let sizes: &[usize] = &[4 * 1024, 64 * 1024, 1024 * 1024];

    let mut group = c.benchmark_group("fragment_allocate");
    for &size in sizes {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("allocate", size), &size, |b, &size| {
            b.iter(|| FragmentBuffer::allocate(size).unwrap());
        });
    }
    group.finish();
}

fn bench_header_access(c: &mut Criterion) {
    let mut frag = FragmentBuffer::allocate(64 * 1024).unwrap();

    let mut group = c.benchmark_group("fragment_header");
    group.bench_function("set_and_get_fields", |b| {
        b.iter(|| {
            frag.set_idx(3).unwrap();
            frag.set_payload_size(65536).unwrap();
            frag.set_orig_data_size(1 << 20).unwrap();
            frag.set_checksum(0xFEED).unwrap();
            (
                frag.idx().unwrap(),
                frag.payload_size().unwrap(),
                frag.orig_data_size().unwrap(),
                frag.checksum().unwrap(),
            )
        });
    });
    group.bench_function("validate", |b| {
        b.iter(|| frag.validate().unwrap());
    });
    group.finish();
}

fn bench_aligned_size(c: &mut Criterion) {
    let configs = [
        ("vandermonde", BackendId::RsVandermonde),
        ("cauchy", BackendId::RsCauchy),
        ("flat_xor", BackendId::FlatXor),
    ];

    let mut group = c.benchmark_group("aligned_data_size");
    for (name, backend) in configs {
        let params = CodingParams::new(backend, 10, 4, 8).unwrap();
        group.bench_with_input(BenchmarkId::new("align", name), &params, |b, params| {
            b.iter(|| aligned_data_size(params, 1_000_003));
        });
    }
    group.finish();
}

fn bench_map_payloads(c: &mut Criterion) {
    let frags: Vec<FragmentBuffer> = (0..16)
        .map(|_| FragmentBuffer::allocate(64 * 1024).unwrap())
        .collect();
    // Every fourth fragment is missing, as after a partial stripe read.
    let stripe: Vec<Option<&[u8]>> = frags
        .iter()
        .enumerate()
        .map(|(i, f)| (i % 4 != 3).then(|| f.as_bytes()))
        .collect();

    let mut group = c.benchmark_group("stripe");
    group.bench_function("map_payloads_16", |b| {
        b.iter(|| map_payloads(&stripe));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_allocate,
    bench_header_access,
    bench_aligned_size,
    bench_map_payloads
);
criterion_main!(benches);
