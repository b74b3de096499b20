use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rag_chat_client::format;
use rag_chat_client::transcript::Transcript;
use rag_chat_client::types::Sender;

const CHUNK: &str = "Here is **bold** and *italic* text with a <tag> & a ***mix***.\n";
const CHUNKS: usize = 200;

fn reply_text() -> String {
    let mut text = String::with_capacity(CHUNK.len() * CHUNKS + 64);
    for i in 0..CHUNKS {
        text.push_str(CHUNK);
        if i % 50 == 0 {
            text.push_str("```\nlet x = a * b * c;\n```\n");
        }
    }
    text
}

// Re-rendering from the full text on every chunk is quadratic in reply
// length; this tracks what a long reply costs end to end.
fn bench_streaming_rerender(c: &mut Criterion) {
    let chunks: Vec<&str> = std::iter::repeat(CHUNK).take(CHUNKS).collect();

    c.bench_function("stream_rerender_200_chunks", |b| {
        b.iter(|| {
            let mut transcript = Transcript::new();
            transcript.append_message("prompt", Sender::User);
            let handle = transcript.begin_streaming_message();
            let mut accumulated = String::new();
            for chunk in &chunks {
                accumulated.push_str(chunk);
                transcript
                    .update_streaming_message(handle, &accumulated)
                    .expect("streaming block exists");
            }
            black_box(transcript.len());
        })
    });
}

fn format_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("format");
    let text = reply_text();

    group.bench_function("short_line", |b| b.iter(|| black_box(format(black_box(CHUNK)))));
    group.bench_function("long_reply", |b| b.iter(|| black_box(format(black_box(&text)))));
    group.finish();
}

criterion_group!(benches, format_benchmarks, bench_streaming_rerender);
criterion_main!(benches);
