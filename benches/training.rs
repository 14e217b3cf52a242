use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode, Throughput};
use wbpe::{TokenizerConfig, Trainer};

fn build_corpus() -> String {
    // Zipf-ish synthetic corpus: a few frequent stems with shared suffixes.
    let stems = ["low", "lower", "lowest", "new", "newer", "newest", "wide", "wider", "widest"];
    let mut corpus = String::with_capacity(1 << 20);
    let mut n = 0usize;
    while corpus.len() < 1 << 20 {
        let stem = stems[n % stems.len()];
        for _ in 0..(stems.len() - n % stems.len()) {
            corpus.push_str(stem);
            corpus.push(' ');
        }
        n += 1;
    }
    corpus
}

fn bench_training(c: &mut Criterion) {
    let corpus = build_corpus();
    let cfg = TokenizerConfig::builder()
        .min_frequency(2)
        .show_progress(false)
        .build()
        .expect("configuration");

    let mut group = c.benchmark_group("train_text_corpus");
    group.throughput(Throughput::Bytes(corpus.len() as u64));
    group.sampling_mode(SamplingMode::Flat);
    group.bench_function(BenchmarkId::from_parameter("MiB_1"), |b| {
        b.iter(|| {
            let trainer = Trainer::new(cfg.clone());
            let artifacts = trainer.train(&corpus, 256).expect("training");
            let _ = black_box(artifacts);
        });
    });
    group.finish();
}

criterion_group!(benches, bench_training);
criterion_main!(benches);
