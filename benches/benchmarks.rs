use base64inplace::{
    STANDARD, decode, decode_in_place, decode_slice, encode, encode_in_place, encode_slice,
    encoded_len,
};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};
use std::hint::black_box;

const BYTE_SIZES: [usize; 5] = [3, 50, 100, 500, 3 * 1024];
const LARGE_BYTE_SIZES: [usize; 2] = [3 * 1024 * 1024, 10 * 1024 * 1024];

fn random_bytes(size: usize) -> Vec<u8> {
    let mut r = rand::rngs::SmallRng::from_rng(&mut rand::rng());
    (0..size).map(|_| r.random::<u8>()).collect()
}

fn bench_encode(c: &mut Criterion, label: &str, sizes: &[usize]) {
    let mut group = c.benchmark_group(label);
    for &size in sizes {
        let input = random_bytes(size);
        let mut output = vec![0; encoded_len(size).unwrap()];
        let mut buffer = output.clone();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("encode", size), &input, |b, input| {
            b.iter(|| black_box(encode(input)));
        });
        group.bench_with_input(BenchmarkId::new("encode_slice", size), &input, |b, input| {
            b.iter(|| black_box(encode_slice(input, &mut output, &STANDARD)));
        });
        group.bench_with_input(BenchmarkId::new("encode_in_place", size), &input, |b, input| {
            b.iter(|| {
                buffer[..size].copy_from_slice(input);
                black_box(encode_in_place(&mut buffer, size, &STANDARD))
            });
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion, label: &str, sizes: &[usize]) {
    let mut group = c.benchmark_group(label);
    for &size in sizes {
        let encoded = encode(random_bytes(size)).into_bytes();
        let mut output = vec![0; size];
        let mut buffer = encoded.clone();

        group.throughput(Throughput::Bytes(encoded.len() as u64));
        group.bench_with_input(BenchmarkId::new("decode", size), &encoded, |b, encoded| {
            b.iter(|| black_box(decode(encoded)));
        });
        group.bench_with_input(BenchmarkId::new("decode_slice", size), &encoded, |b, encoded| {
            b.iter(|| black_box(decode_slice(encoded, &mut output, &STANDARD)));
        });
        group.bench_with_input(BenchmarkId::new("decode_in_place", size), &encoded, |b, encoded| {
            b.iter(|| {
                buffer.copy_from_slice(encoded);
                black_box(decode_in_place(&mut buffer, &STANDARD))
            });
        });
    }
    group.finish();
}

fn bench(c: &mut Criterion) {
    bench_encode(c, "encode", &BYTE_SIZES);
    bench_decode(c, "decode", &BYTE_SIZES);
}

fn bench_large(c: &mut Criterion) {
    bench_encode(c, "encode_large", &LARGE_BYTE_SIZES);
    bench_decode(c, "decode_large", &LARGE_BYTE_SIZES);
}

criterion_group!(benches, bench);
criterion_group! {
    name = large;
    config = Criterion::default().sample_size(10);
    targets = bench_large
}
criterion_main!(benches, large);
