use std::time::{Duration, Instant};

use tintbook::document::{Paragraph, Run};

/// Performance benchmark suite for the run isolator
///
/// Run with: cargo test --release --bench performance -- --nocapture
///
/// This measures:
/// - Full single-character isolation sweeps over one paragraph
/// - Isolation on paragraphs already exploded into one-character runs
/// - Range isolation across many small runs
const SMALL_PARAGRAPH_CHARS: usize = 100;
const MEDIUM_PARAGRAPH_CHARS: usize = 1_000;
const LARGE_PARAGRAPH_CHARS: usize = 10_000;

const ITERATIONS: usize = 50;

const SAMPLE_WORDS: &[&str] = &[
    "Lorem",
    "ipsum",
    "dolor",
    "sit",
    "amet",
    "consectetur",
    "adipiscing",
    "elit",
    "sed",
    "do",
    "eiusmod",
    "tempor",
    "incididunt",
    "ut",
    "labore",
    "et",
    "dolore",
    "magna",
    "aliqua",
];

/// Create a single-run paragraph of roughly the requested character length
fn create_paragraph(target_chars: usize) -> Paragraph {
    let mut text = String::with_capacity(target_chars + 16);
    let mut word = 0;
    while text.len() < target_chars {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(SAMPLE_WORDS[word % SAMPLE_WORDS.len()]);
        word += 1;
    }
    text.truncate(target_chars);
    Paragraph::with_runs(vec![Run::new(text)])
}

/// Create a paragraph already split into one-character runs
fn create_exploded_paragraph(target_chars: usize) -> Paragraph {
    let source = create_paragraph(target_chars);
    let runs = source
        .text()
        .chars()
        .map(|ch| Run::new(ch.to_string()))
        .collect();
    Paragraph::with_runs(runs)
}

struct BenchmarkResult {
    name: String,
    iterations: usize,
    total_duration: Duration,
    avg_duration: Duration,
    min_duration: Duration,
    max_duration: Duration,
}

impl BenchmarkResult {
    fn print(&self) {
        println!("\n{}", "=".repeat(70));
        println!("Benchmark: {}", self.name);
        println!("{}", "=".repeat(70));
        println!("Iterations:     {}", self.iterations);
        println!("Total time:     {:?}", self.total_duration);
        println!("Average:        {:?}", self.avg_duration);
        println!("Min:            {:?}", self.min_duration);
        println!("Max:            {:?}", self.max_duration);
    }
}

fn benchmark<F>(name: &str, iterations: usize, mut f: F) -> BenchmarkResult
where
    F: FnMut(),
{
    let mut durations = Vec::with_capacity(iterations);

    // Warmup
    for _ in 0..5 {
        f();
    }

    for _ in 0..iterations {
        let start = Instant::now();
        f();
        durations.push(start.elapsed());
    }

    let total_duration: Duration = durations.iter().sum();
    let avg_duration = total_duration / iterations as u32;
    let min_duration = *durations.iter().min().unwrap();
    let max_duration = *durations.iter().max().unwrap();

    BenchmarkResult {
        name: name.to_string(),
        iterations,
        total_duration,
        avg_duration,
        min_duration,
        max_duration,
    }
}

fn sweep(paragraph: &mut Paragraph) {
    let len = paragraph.char_len();
    for start in 0..len {
        paragraph.isolate(start, start + 1).unwrap();
    }
}

#[test]
fn bench_single_character_sweeps() {
    println!("\nSINGLE-CHARACTER ISOLATION SWEEPS");

    for (label, chars) in [
        ("small", SMALL_PARAGRAPH_CHARS),
        ("medium", MEDIUM_PARAGRAPH_CHARS),
        ("large", LARGE_PARAGRAPH_CHARS),
    ] {
        let result = benchmark(
            &format!("sweep over fresh {label} paragraph ({chars} chars)"),
            ITERATIONS,
            || {
                let mut paragraph = create_paragraph(chars);
                sweep(&mut paragraph);
            },
        );
        result.print();
    }
}

#[test]
fn bench_sweep_over_already_isolated_runs() {
    println!("\nRE-ISOLATION OF ALREADY-MINIMAL RUNS");

    let result = benchmark(
        &format!("no-op sweep ({MEDIUM_PARAGRAPH_CHARS} one-char runs)"),
        ITERATIONS,
        || {
            let mut paragraph = create_exploded_paragraph(MEDIUM_PARAGRAPH_CHARS);
            sweep(&mut paragraph);
        },
    );
    result.print();
}

#[test]
fn bench_range_isolation_across_many_runs() {
    println!("\nRANGE ISOLATION ACROSS MANY RUNS");

    let result = benchmark(
        &format!("absorb half of {MEDIUM_PARAGRAPH_CHARS} one-char runs"),
        ITERATIONS,
        || {
            let mut paragraph = create_exploded_paragraph(MEDIUM_PARAGRAPH_CHARS);
            let len = paragraph.char_len();
            paragraph.isolate(len / 4, len / 4 + len / 2).unwrap();
        },
    );
    result.print();
}
