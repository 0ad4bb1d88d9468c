use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nu_plugin_packlist::algo::{aggregate, filter, graph, parser};

const HEADER: &str =
    "Suppliername,deliverdate,customer,licenseID,DeviceCategory,UDI,DeviceName,LotNumber,SN,ModelNum,Numbers,Unit";

/// Generate a synthetic packing list with `n` shipment rows
fn generate_csv(n: usize) -> String {
    let mut out = String::from(HEADER);
    for i in 0..n {
        out.push_str(&format!(
            "\nB{:05},{},C{:05},LIC-{:03},CAT-{},{:014},\"“Device {}”\",{},,M{},{},unit",
            i % 7,
            45900 + (i % 60),
            i % 400,
            i % 25,
            i % 3,
            i,
            i % 40,
            800000 + i,
            i % 50,
            1 + i % 4,
        ));
    }
    out
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for size in [100, 1000, 10000] {
        let csv = generate_csv(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &csv, |b, text| {
            b.iter(|| parser::parse(black_box(text)))
        });
    }
    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let set = parser::parse(&generate_csv(10000)).unwrap();
    c.bench_function("filter/options_customer_10000", |b| {
        b.iter(|| filter::options_for(black_box(&set), "customer"))
    });
    c.bench_function("filter/apply_supplier_10000", |b| {
        b.iter(|| filter::apply(black_box(&set), "Suppliername", "B00003").len())
    });
}

fn bench_aggregate(c: &mut Criterion) {
    let set = parser::parse(&generate_csv(10000)).unwrap();
    c.bench_function("aggregate/kpis_10000", |b| {
        b.iter(|| aggregate::kpis(black_box(&set)))
    });
    c.bench_function("aggregate/top_customers_10000", |b| {
        b.iter(|| aggregate::top_n(black_box(&set), "customer", aggregate::CHART_TOP_N))
    });
    c.bench_function("aggregate/timeline_10000", |b| {
        b.iter(|| aggregate::timeline(black_box(&set), "deliverdate"))
    });
}

fn bench_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph");
    for size in [100, 1000, 10000] {
        let set = parser::parse(&generate_csv(size)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &set, |b, s| {
            b.iter(|| graph::build_graph(black_box(s)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_filter, bench_aggregate, bench_graph);
criterion_main!(benches);
