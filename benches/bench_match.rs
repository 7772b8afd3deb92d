use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sculptor::unifier::AggressivePolicy;
use sculptor::{compile, FileContext};

/// Generate a realistic object-language file with a mix of calls, control
/// flow, and declarations so matching has real structure to walk.
fn make_source_file(index: usize) -> String {
    format!(
        r#"package main

import "fmt"

func usedFunction{i}(x, y int) int {{
    result := x + y
    fmt.Println(result)
    return result
}}

func hasDeadBranch{i}() int {{
    if x := usedFunction{i}(1, 2); x == nil {{
        fmt.Println(nil)
    }}
    for i := 0; i < 10; i++ {{
        fmt.Println(i)
    }}
    return usedFunction{i}(3, 4)
}}
"#,
        i = index
    )
}

fn bench_match(c: &mut Criterion) {
    let pipeline = compile("x fmt.Println($x)\ng $x == nil").unwrap();

    let sources: Vec<String> = (0..50).map(make_source_file).collect();
    let contexts: Vec<FileContext> = sources.iter().map(|s| FileContext::parse(s).unwrap()).collect();

    c.bench_function("run_50_files", |b| {
        b.iter(|| {
            for ctx in &contexts {
                let matches = sculptor::run(black_box(&pipeline), ctx, AggressivePolicy::none()).unwrap();
                black_box(matches);
            }
        });
    });

    let big_source: String = (0..200).map(make_source_file).collect::<Vec<_>>().join("\n");
    let big_ctx = FileContext::parse(&big_source).unwrap();

    c.bench_function("run_single_large_file", |b| {
        b.iter(|| {
            let matches = sculptor::run(black_box(&pipeline), &big_ctx, AggressivePolicy::none()).unwrap();
            black_box(matches);
        });
    });
}

criterion_group!(benches, bench_match);
criterion_main!(benches);
