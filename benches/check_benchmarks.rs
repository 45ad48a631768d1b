//! Criterion benchmarks for the JSON literal check.
//!
//! Run with: `cargo bench`
//!
//! Sources are generated synthetically so results are reproducible across machines.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use jsoncheck::{analyze_source, new_csharp_parser, validate_json, CancellationToken};

// ─── Helpers ─────────────────────────────────────────────────────────

/// A C# file with `num_methods` methods; every fourth call passes invalid JSON.
fn synthetic_source(num_methods: usize) -> String {
    let mut source = String::from(
        "using System;\nusing Newtonsoft.Json;\nusing Newtonsoft.Json.Linq;\n\nnamespace Bench\n{\n    public class Settings { public int A { get; set; } }\n\n    public class Loader\n    {\n",
    );
    for i in 0..num_methods {
        let body = match i % 4 {
            0 => format!("var o = JObject.Parse(\"{{\\\"id\\\": {}, \\\"tags\\\": [1, 2, 3]}}\");", i),
            1 => format!("var a = JArray.Parse(\"[{}, {}, {}]\");", i, i + 1, i + 2),
            2 => "var s = JsonConvert.DeserializeObject<Settings>(input);".to_string(),
            _ => format!("var bad = JObject.Parse(\"{{id: {}}}\");", i),
        };
        source.push_str(&format!(
            "        public void Method{}(string input)\n        {{\n            Console.WriteLine(input.Trim());\n            {}\n        }}\n\n",
            i, body
        ));
    }
    source.push_str("    }\n}\n");
    source
}

// ─── Whole-file analysis ─────────────────────────────────────────────

fn bench_analyze_source(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_source");
    let cancel = CancellationToken::new();

    for &num_methods in &[10, 100, 1_000] {
        let source = synthetic_source(num_methods);
        let mut parser = new_csharp_parser().unwrap();

        group.bench_with_input(
            BenchmarkId::new("methods", num_methods),
            &source,
            |b, source| {
                b.iter(|| {
                    let diagnostics = analyze_source(&mut parser, source, "Loader.cs", &cancel).unwrap();
                    black_box(diagnostics.len());
                })
            },
        );
    }

    group.finish();
}

// ─── JSON validation ─────────────────────────────────────────────────

fn bench_validate_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_json");

    let small_valid = r#"{"name": "x", "count": 3}"#;
    let small_invalid = r#"{name: "x"}"#;
    let large_valid = format!(
        "[{}]",
        (0..1_000).map(|i| format!(r#"{{"id": {}, "ok": true}}"#, i)).collect::<Vec<_>>().join(",")
    );

    group.bench_function("small_valid", |b| {
        b.iter(|| black_box(validate_json(black_box(small_valid)).is_ok()))
    });

    group.bench_function("small_invalid", |b| {
        b.iter(|| black_box(validate_json(black_box(small_invalid)).is_err()))
    });

    group.bench_function("array_1k_objects", |b| {
        b.iter(|| black_box(validate_json(black_box(&large_valid)).is_ok()))
    });

    group.finish();
}

criterion_group!(benches, bench_analyze_source, bench_validate_json);
criterion_main!(benches);
