use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use yaml_bind::{
    construct, from_events, represent, to_events, yaml_object, AnchorStyle, Event, EventStream,
    RepresentOptions, TagLibrary, TagStyle,
};

yaml_object! {
    #[derive(Clone, Default)]
    pub struct Product {
        pub sku: String,
        pub name: String,
        pub price: f64,
        pub quantity: u32,
    }
}

#[derive(Serialize, Deserialize, Clone)]
struct ProductView {
    sku: String,
    name: String,
    price: f64,
    quantity: u32,
}

fn products(size: u32) -> Vec<Product> {
    (0..size)
        .map(|i| Product {
            sku: format!("SKU{}", i),
            name: format!("Product {}", i),
            price: 9.99 + f64::from(i),
            quantity: i,
        })
        .collect()
}

fn events_of(products: &[Product], options: &RepresentOptions, tags: &mut TagLibrary) -> Vec<Event> {
    represent(products, tags, options)
        .unwrap()
        .collect::<yaml_bind::Result<_>>()
        .unwrap()
}

fn benchmark_represent(c: &mut Criterion) {
    let mut group = c.benchmark_group("represent_records");

    for size in [10, 100, 500].iter() {
        let items = products(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &items, |b, items| {
            let mut tags = TagLibrary::core();
            let options = RepresentOptions::new();
            b.iter(|| represent(black_box(items.as_slice()), &mut tags, &options))
        });
    }
    group.finish();
}

fn benchmark_construct(c: &mut Criterion) {
    let mut group = c.benchmark_group("construct_records");

    for size in [10, 100, 500].iter() {
        let mut tags = TagLibrary::core();
        let events = events_of(&products(*size), &RepresentOptions::new(), &mut tags);
        group.bench_with_input(BenchmarkId::from_parameter(size), &events, |b, events| {
            b.iter(|| {
                let mut stream = EventStream::from_events(events.clone());
                construct::<Vec<Product>>(black_box(&mut stream), &mut tags)
            })
        });
    }
    group.finish();
}

fn benchmark_tag_styles(c: &mut Criterion) {
    let mut group = c.benchmark_group("tag_styles");
    let items = products(100);

    for (label, style) in [
        ("none", TagStyle::None),
        ("root_only", TagStyle::RootOnly),
        ("all", TagStyle::All),
    ] {
        let options = RepresentOptions::new().with_tag_style(style);
        group.bench_function(label, |b| {
            let mut tags = TagLibrary::core();
            b.iter(|| represent(black_box(items.as_slice()), &mut tags, &options))
        });
    }
    group.finish();
}

fn benchmark_anchor_styles(c: &mut Criterion) {
    let mut group = c.benchmark_group("anchor_styles");
    let pool: Vec<Rc<RefCell<String>>> = (0..50)
        .map(|i| Rc::new(RefCell::new(format!("shared {}", i))))
        .collect();
    let refs: Vec<Rc<RefCell<String>>> = (0..500).map(|i| pool[i % pool.len()].clone()).collect();

    for (label, style) in [("tidy", AnchorStyle::Tidy), ("always", AnchorStyle::Always)] {
        let options = RepresentOptions::new().with_anchor_style(style);
        group.bench_function(label, |b| {
            let mut tags = TagLibrary::core();
            b.iter(|| represent(black_box(&refs), &mut tags, &options))
        });
    }
    group.finish();
}

fn benchmark_serde_bridge(c: &mut Criterion) {
    let mut group = c.benchmark_group("serde_bridge");
    let views: Vec<ProductView> = products(100)
        .into_iter()
        .map(|p| ProductView {
            sku: p.sku,
            name: p.name,
            price: p.price,
            quantity: p.quantity,
        })
        .collect();

    group.bench_function("to_events", |b| {
        let mut tags = TagLibrary::core();
        let options = RepresentOptions::new();
        b.iter(|| to_events(black_box(&views), &mut tags, &options))
    });

    let mut tags = TagLibrary::core();
    let events: Vec<Event> = to_events(&views, &mut tags, &RepresentOptions::new())
        .unwrap()
        .collect::<yaml_bind::Result<_>>()
        .unwrap();
    group.bench_function("from_events", |b| {
        b.iter(|| {
            let mut stream = EventStream::from_events(events.clone());
            from_events::<Vec<ProductView>>(black_box(&mut stream), &tags)
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_represent,
    benchmark_construct,
    benchmark_tag_styles,
    benchmark_anchor_styles,
    benchmark_serde_bridge
);
criterion_main!(benches);
