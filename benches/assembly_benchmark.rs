use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;
use superstring_rs::{assemble, find_overlap, FragmentStore};

/// Reads of `read_len` where each read shares `overlap_len` bases with the previous one.
fn generate_synthetic_reads(n: usize, read_len: usize, overlap_len: usize) -> Vec<String> {
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(42);
    let bases = b"ACGT";
    let mut reads = Vec::with_capacity(n);

    let mut current: Vec<u8> = (0..read_len).map(|_| bases[rng.gen_range(0..4)]).collect();
    reads.push(String::from_utf8(current.clone()).unwrap());

    for _ in 1..n {
        let mut next = Vec::with_capacity(read_len);
        next.extend_from_slice(&current[read_len - overlap_len..]);
        for _ in overlap_len..read_len {
            next.push(bases[rng.gen_range(0..4)]);
        }
        reads.push(String::from_utf8(next.clone()).unwrap());
        current = next;
    }

    // input order carries no information
    reads.shuffle(&mut rng);
    reads
}

fn bench_greedy_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("greedy_assembly");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);

    for n in [50, 200, 500].iter() {
        let reads = generate_synthetic_reads(*n, 100, 60);

        group.bench_with_input(BenchmarkId::new("assemble", n), &reads, |b, reads| {
            b.iter(|| {
                let mut fragments = FragmentStore::from_sequences(reads.iter().cloned());
                let superstring = assemble(black_box(&mut fragments)).unwrap();
                black_box(superstring);
            });
        });
    }

    group.finish();
}

fn bench_overlap_widening(c: &mut Criterion) {
    let mut group = c.benchmark_group("overlap_widening");

    for read_len in [50, 150, 300].iter() {
        let reads = generate_synthetic_reads(2, *read_len, *read_len / 2 + 5);
        let (superstring, fragment) = (&reads[0], &reads[1]);

        group.bench_with_input(
            BenchmarkId::new("full_widening", read_len),
            read_len,
            |b, &read_len| {
                b.iter(|| {
                    for widening in 0..=read_len / 2 {
                        black_box(find_overlap(
                            black_box(superstring),
                            black_box(fragment),
                            widening,
                        ));
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_greedy_assembly, bench_overlap_widening);
criterion_main!(benches);
