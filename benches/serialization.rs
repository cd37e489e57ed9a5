use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use oson::{delistify, listify, oson, parse, stringify, Value};

fn sample_document() -> Value {
    oson!({
        "id": 42,
        "name": "benchmark",
        "active": true,
        "score": 99.5,
        "tags": ["important", "verified", "production"],
        "metadata": {
            "created": "2023-01-01T00:00:00Z",
            "updated": "2023-12-31T23:59:59Z",
            "version": 3
        },
        "items": [
            { "sku": "SKU1", "price": 9.99, "quantity": 1 },
            { "sku": "SKU2", "price": 19.99, "quantity": 2 },
            { "sku": "SKU3", "price": 29.99, "quantity": 3 }
        ]
    })
}

fn shared_document(copies: usize) -> Value {
    let inner = oson!({ "a": { "b": 42 } });
    Value::array((0..copies).map(|_| inner.clone()).collect())
}

fn benchmark_listify(c: &mut Criterion) {
    let document = sample_document();

    c.bench_function("listify_nested_document", |b| {
        b.iter(|| listify(black_box(&document)))
    });
}

fn benchmark_delistify(c: &mut Criterion) {
    let document = sample_document();
    let oson = listify(&document).unwrap();

    c.bench_function("delistify_nested_document", |b| {
        b.iter(|| delistify(black_box(&oson)))
    });
}

fn benchmark_stringify(c: &mut Criterion) {
    let document = sample_document();

    c.bench_function("stringify_nested_document", |b| {
        b.iter(|| stringify(black_box(&document)))
    });
}

fn benchmark_parse(c: &mut Criterion) {
    let document = sample_document();
    let text = stringify(&document).unwrap();

    c.bench_function("parse_nested_document", |b| {
        b.iter(|| parse(black_box(&text)))
    });
}

fn benchmark_shared_references(c: &mut Criterion) {
    let mut group = c.benchmark_group("shared_references");

    for copies in [10, 100, 1000].iter() {
        let document = shared_document(*copies);
        let text = stringify(&document).unwrap();

        group.bench_with_input(
            BenchmarkId::new("stringify", copies),
            &document,
            |b, document| b.iter(|| stringify(black_box(document))),
        );
        group.bench_with_input(BenchmarkId::new("parse", copies), &text, |b, text| {
            b.iter(|| parse(black_box(text)))
        });
    }
    group.finish();
}

fn benchmark_comparison_with_json(c: &mut Criterion) {
    let json_document = serde_json::json!({
        "id": 42,
        "name": "benchmark",
        "active": true,
        "score": 99.5,
        "tags": ["important", "verified", "production"],
        "metadata": {
            "created": "2023-01-01T00:00:00Z",
            "updated": "2023-12-31T23:59:59Z",
            "version": 3
        },
        "items": [
            { "sku": "SKU1", "price": 9.99, "quantity": 1 },
            { "sku": "SKU2", "price": 19.99, "quantity": 2 },
            { "sku": "SKU3", "price": 29.99, "quantity": 3 }
        ]
    });
    let oson_document = sample_document();

    let mut group = c.benchmark_group("comparison");

    group.bench_function("oson_stringify", |b| {
        b.iter(|| stringify(black_box(&oson_document)))
    });

    group.bench_function("json_stringify", |b| {
        b.iter(|| serde_json::to_string(black_box(&json_document)))
    });

    let oson_text = stringify(&oson_document).unwrap();
    let json_text = serde_json::to_string(&json_document).unwrap();

    group.bench_function("oson_parse", |b| {
        b.iter(|| parse(black_box(&oson_text)))
    });

    group.bench_function("json_parse", |b| {
        b.iter(|| serde_json::from_str::<serde_json::Value>(black_box(&json_text)))
    });

    group.finish();
}

fn benchmark_roundtrip(c: &mut Criterion) {
    let document = sample_document();

    c.bench_function("roundtrip_nested_document", |b| {
        b.iter(|| {
            let text = stringify(black_box(&document)).unwrap();
            let _back = parse(black_box(&text)).unwrap();
        })
    });
}

criterion_group!(
    benches,
    benchmark_listify,
    benchmark_delistify,
    benchmark_stringify,
    benchmark_parse,
    benchmark_shared_references,
    benchmark_comparison_with_json,
    benchmark_roundtrip
);
criterion_main!(benches);
