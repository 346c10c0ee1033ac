// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Performance benchmarks for the section player
//!
//! Run with: cargo bench
//!
//! These benchmarks measure:
//! - Render callback cost at common buffer sizes
//! - Section name parsing and availability table construction
//! - WAV decoding

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hound::{SampleFormat, WavSpec, WavWriter};
use styplay::cache::decode_wav;
use styplay::{AvailabilityTable, DecodedBuffer, PlaybackGraph, Section, SessionAuthority};

fn stereo_buffer(frames: usize, sample_rate: u32) -> Arc<DecodedBuffer> {
    let samples = (0..frames * 2).map(|i| ((i % 200) as f32 / 100.0) - 1.0).collect();
    Arc::new(DecodedBuffer::new(samples, sample_rate, 2))
}

/// Benchmark the audio callback path (loop line with resampling)
fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    for size in [128usize, 512, 2048].iter() {
        let graph = PlaybackGraph::new(48000);
        graph.start_loop(stereo_buffer(44100 * 4, 44100), 1.07, 0.8);
        let renderer = graph.renderer();
        let mut out = vec![0.0f32; size * 2];

        group.bench_with_input(BenchmarkId::new("loop", size), size, |b, _| {
            b.iter(|| {
                renderer.render(black_box(&mut out), 2);
            })
        });
    }

    let graph = PlaybackGraph::new(44100);
    let mut sessions = SessionAuthority::new();
    let buffer = stereo_buffer(44100, 44100);
    let mut out = vec![0.0f32; 1024];
    group.bench_function("one_shot_restart", |b| {
        b.iter(|| {
            graph.start_one_shot(Arc::clone(&buffer), 1.0, 1.0, sessions.new_session());
            graph.render(black_box(&mut out), 2);
        })
    });

    group.finish();
}

/// Benchmark section name parsing (availability resolution)
fn bench_section_parsing(c: &mut Criterion) {
    let names = [
        "Main A", "Intro B", "Ending C", "End D", "Fill In AA", "fill in bb", "Break A", "Main  C",
    ];

    c.bench_function("section_parse", |b| {
        b.iter(|| {
            for name in names.iter() {
                black_box(Section::parse(black_box(name)).ok());
            }
        })
    });

    let map: HashMap<String, bool> = names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.to_string(), i % 3 != 0))
        .collect();
    c.bench_function("availability_table", |b| {
        b.iter(|| black_box(AvailabilityTable::from_map(black_box(&map)).len()))
    });
}

/// Benchmark decoding a 2 second stereo section
fn bench_decode(c: &mut Criterion) {
    let spec = WavSpec {
        channels: 2,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..44100 * 2 * 2 {
            writer.write_sample((i % 4000) as i16 - 2000).unwrap();
        }
        writer.finalize().unwrap();
    }
    let bytes = cursor.into_inner();

    c.bench_function("decode_wav_2s", |b| {
        b.iter(|| black_box(decode_wav(black_box(&bytes)).map(|buf| buf.frames()).ok()))
    });
}

criterion_group!(benches, bench_render, bench_section_parsing, bench_decode);
criterion_main!(benches);
