//! Benchmarks for filter composition and SQL rendering.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use lambda_sql::prelude::*;

#[derive(Entity)]
#[lambda_sql(rename_all = "PascalCase")]
pub struct Person {
    pub id: i32,
    pub name: String,
    pub last_name: String,
}

#[derive(Entity)]
#[lambda_sql(rename_all = "PascalCase")]
pub struct Passport {
    pub id: i32,
    pub person_id: i32,
}

/// A chain of `count` AND-ed comparisons.
fn build_chain(ctx: &SqlContext, count: usize) -> SqlFilter<Person> {
    let mut filter = ctx
        .filter(Person::ID)
        .and_then(|f| f.greater_than(0))
        .unwrap_or_else(|e| panic!("{e}"));
    for i in 0..count {
        filter = filter
            .and(Person::ID)
            .and_then(|f| f.not_equal_to(i as i32))
            .unwrap_or_else(|e| panic!("{e}"));
    }
    filter
}

fn bench_operators(c: &mut Criterion) {
    let mut group = c.benchmark_group("operators");
    let ctx = SqlContext::default();

    group.bench_function("is_null", |b| {
        b.iter(|| black_box(ctx.filter(black_box(Person::ID)).map(|f| f.is_null())))
    });

    group.bench_function("equal_to", |b| {
        b.iter(|| black_box(ctx.filter(Person::ID).and_then(|f| f.equal_to(black_box(5)))))
    });

    group.bench_function("like", |b| {
        b.iter(|| black_box(ctx.filter(Person::NAME).map(|f| f.like(black_box("%tmpl")))))
    });

    let last_name = ctx.field(Person::LAST_NAME).unwrap_or_else(|e| panic!("{e}"));
    group.bench_function("equal_to_field", |b| {
        b.iter(|| black_box(ctx.filter(Person::NAME).map(|f| f.equal_to_field(&last_name))))
    });

    for size in [2usize, 10, 100] {
        let values: Vec<i32> = (0..size as i32).collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("is_in", size), &values, |b, values| {
            b.iter(|| black_box(ctx.filter(Person::ID).and_then(|f| f.is_in(values.iter().copied()))))
        });
    }

    group.finish();
}

fn bench_composition(c: &mut Criterion) {
    let mut group = c.benchmark_group("composition");
    let ctx = SqlContext::default();

    for size in [1usize, 10, 50] {
        group.bench_with_input(BenchmarkId::new("and_chain", size), &size, |b, &size| {
            b.iter(|| black_box(build_chain(&ctx, size)))
        });
    }

    let left = build_chain(&ctx, 10);
    let right = build_chain(&ctx, 10);
    group.bench_function("and_group", |b| b.iter(|| black_box(left.and_group(black_box(&right)))));

    let passport = ctx
        .filter(Passport::PERSON_ID)
        .and_then(|f| f.equal_to(1))
        .unwrap_or_else(|e| panic!("{e}"));
    group.bench_function("or_group_combined", |b| {
        b.iter(|| black_box(left.or_group_combined(black_box(&passport))))
    });

    group.bench_function("without_aliases", |b| b.iter(|| black_box(left.without_aliases())));

    group.finish();
}

fn bench_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("rendering");
    let ctx = SqlContext::default();

    for size in [1usize, 10, 50] {
        let filter = build_chain(&ctx, size);
        group.throughput(Throughput::Elements(filter.tokens().len() as u64));
        group.bench_with_input(BenchmarkId::new("to_sql", size), &filter, |b, filter| {
            b.iter(|| black_box(filter.to_sql()))
        });
        let bare = filter.without_aliases();
        group.bench_with_input(BenchmarkId::new("to_sql_without_aliases", size), &bare, |b, filter| {
            b.iter(|| black_box(filter.to_sql()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_operators, bench_composition, bench_rendering);
criterion_main!(benches);
