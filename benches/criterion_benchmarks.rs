use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use digirle::rle::{self, FrameOptions};
use std::fs;
use std::path::Path;

/// Pseudo-random runs: `max_run` bounds each run length.
fn gen_runs(size: usize, max_run: usize, seed: u64) -> Vec<u8> {
    let mut s = seed;
    let mut out = Vec::with_capacity(size);
    while out.len() < size {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        let byte = (s >> 33) as u8;
        let len = 1 + (s >> 41) as usize % max_run.max(1);
        out.extend(std::iter::repeat_n(byte, len.min(size - out.len())));
    }
    out
}

fn write_ratio_snapshot() {
    let mut csv = String::from("max_run,encoded_bytes,raw_bytes,ratio\n");
    for max_run in [1usize, 2, 4, 9, 16, 64, 256] {
        let raw = gen_runs(1024 * 1024, max_run, 123);
        let encoded = rle::encode(&raw);
        let ratio = encoded.len() as f64 / raw.len() as f64;
        csv.push_str(&format!(
            "{max_run},{},{},{ratio}\n",
            encoded.len(),
            raw.len()
        ));
    }
    let out_dir = Path::new("target/criterion/custom_reports");
    let _ = fs::create_dir_all(out_dir);
    let _ = fs::write(out_dir.join("ratio_snapshot.csv"), csv);
}

fn bench_encoding_speed(c: &mut Criterion) {
    let mut g = c.benchmark_group("encoding_speed_mb_s");
    for size in [64 * 1024usize, 1024 * 1024, 8 * 1024 * 1024] {
        let raw = gen_runs(size, 16, 1);
        g.throughput(Throughput::Bytes(size as u64));
        g.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(rle::encode(black_box(&raw))));
        });
    }
    g.finish();
}

fn bench_decoding_speed(c: &mut Criterion) {
    let mut g = c.benchmark_group("decoding_speed_mb_s");
    for size in [64 * 1024usize, 1024 * 1024, 8 * 1024 * 1024] {
        let encoded = rle::encode(&gen_runs(size, 16, 2));
        g.throughput(Throughput::Bytes(size as u64));
        g.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(rle::decode(black_box(&encoded)).unwrap()));
        });
    }
    g.finish();
}

fn bench_ratio_vs_run_length(c: &mut Criterion) {
    write_ratio_snapshot();
    let mut g = c.benchmark_group("encode_vs_run_length");
    for max_run in [1usize, 9, 64] {
        let raw = gen_runs(1024 * 1024, max_run, 3);
        g.bench_with_input(BenchmarkId::from_parameter(max_run), &max_run, |b, _| {
            b.iter(|| black_box(rle::encode(&raw).len()));
        });
    }
    g.finish();
}

fn bench_classifier(c: &mut Criterion) {
    let mut g = c.benchmark_group("classifier");
    let plain = gen_runs(1024 * 1024, 4, 4)
        .into_iter()
        .map(|b| b'a' + b % 26)
        .collect::<Vec<_>>();
    let encoded = rle::encode(&plain);
    g.throughput(Throughput::Bytes(plain.len() as u64));
    g.bench_function("looks_encoded_plain", |b| {
        b.iter(|| black_box(rle::looks_encoded(black_box(&plain))));
    });
    g.bench_function("is_well_formed_encoded", |b| {
        b.iter(|| black_box(rle::is_well_formed(black_box(&encoded))));
    });
    g.finish();
}

fn bench_framed_roundtrip(c: &mut Criterion) {
    let mut g = c.benchmark_group("framed_roundtrip");
    let raw = gen_runs(2 * 1024 * 1024, 32, 5);
    g.throughput(Throughput::Bytes(raw.len() as u64));
    for checksum in [false, true] {
        g.bench_with_input(
            BenchmarkId::from_parameter(if checksum { "adler32" } else { "no_checksum" }),
            &checksum,
            |b, &checksum| {
                b.iter(|| {
                    let framed = rle::frame::encode_framed(&raw, FrameOptions { checksum });
                    black_box(rle::frame::decode_framed(&framed).unwrap());
                });
            },
        );
    }
    g.finish();
}

criterion_group!(
    benches,
    bench_encoding_speed,
    bench_decoding_speed,
    bench_ratio_vs_run_length,
    bench_classifier,
    bench_framed_roundtrip
);
criterion_main!(benches);
