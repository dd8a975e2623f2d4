use codec_lab_core::{analysis::analyze, compress, decompress, Algorithm};
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn inputs() -> Vec<(&'static str, Vec<u8>)> {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let random: Vec<u8> = (0..64 * 1024).map(|_| rng.gen()).collect();
    let text = b"The quick brown fox jumps over the lazy dog. ".repeat(1500);
    let runs = vec![b'x'; 64 * 1024];
    vec![("random", random), ("text", text), ("runs", runs)]
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    for (name, input) in inputs() {
        group.throughput(Throughput::Bytes(input.len() as u64));
        for algorithm in Algorithm::ALL {
            group.bench_function(format!("{algorithm}/{name}"), |b| {
                b.iter(|| compress(algorithm, &input).unwrap())
            });
        }
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    for (name, input) in inputs() {
        group.throughput(Throughput::Bytes(input.len() as u64));
        for algorithm in Algorithm::ALL {
            let (container, _) = compress(algorithm, &input).unwrap();
            group.bench_function(format!("{algorithm}/{name}"), |b| {
                b.iter(|| decompress(algorithm, &container).unwrap())
            });
        }
    }
    group.finish();
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");
    for (name, input) in inputs() {
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_function(name, |b| b.iter(|| analyze(&input)));
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode, bench_analyze);
criterion_main!(benches);
