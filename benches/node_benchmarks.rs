use criterion::{criterion_group, criterion_main, Criterion};
use dasp_graph::Buffer;

use lauter::nodes::{Amp, ElementSource};
use lauter::{AudioNode, ProcessContext};

pub fn criterion_benchmark(c: &mut Criterion) {
    let ctx = ProcessContext {
        sample_rate: 48_000,
        block_size: 64,
    };

    c.bench_function("ElementSource.process()", |b| {
        let samples: Vec<f32> = (0..48_000).map(|i| (i as f32 * 0.001).sin()).collect();
        let mut source = ElementSource::new(samples.into(), true);
        let mut output = [Buffer::default()];
        let input = [];

        b.iter(move || source.process(&ctx, std::iter::empty(), &input, &mut output))
    });

    c.bench_function("Amp.process()", |b| {
        let mut amp = Amp::new(1.0);
        let mut output = [Buffer::default(), Buffer::default()];
        let input = [];

        b.iter(move || {
            amp.process(
                &ctx,
                std::iter::once(lauter::nodes::AmpMessage::SetTarget(9.0)),
                &input,
                &mut output,
            )
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
