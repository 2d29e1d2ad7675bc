use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use rand::prelude::*;
use rbtree::RBTree;
use std::collections::BTreeMap;
use std::ops::Range;
use tallywood::Tally;

fn init_random_data(count: usize, range_opt: Option<Range<usize>>) -> Vec<usize> {
    let mut rng = rand::thread_rng();
    let range = range_opt.unwrap_or(0..20000);
    let range = rand::distributions::Uniform::new(range.start, range.end);

    (0..count).map(|_| rng.sample(&range)).collect()
}

fn bench_baseline_counting(data: Vec<usize>) {
    let mut counts = BTreeMap::new();

    for i in data {
        *counts.entry(i).or_insert(0usize) += 1;
    }
}

fn bench_rbtree_counting(data: Vec<usize>) {
    let mut counts = RBTree::new();

    for i in data {
        match counts.get_mut(&i) {
            Some(count) => *count += 1,
            None => counts.insert(i, 1usize),
        }
    }
}

fn bench_counting(data: Vec<usize>) {
    let mut tally = Tally::natural();

    for i in data {
        tally.insert(i);
    }
}

fn bench_counting_hint(data: Vec<usize>) {
    let mut tally = Tally::with_capacity(
        data.len(),
        |out, v: &usize| write!(out, "{v}"),
        usize::cmp,
    );

    for i in data {
        tally.insert(i);
    }
}

fn init_large_btree() -> BTreeMap<usize, usize> {
    let mut counts = BTreeMap::new();

    for i in init_random_data(100000, None) {
        *counts.entry(i).or_insert(0) += 1;
    }

    counts
}

fn init_large_tally() -> Tally<usize> {
    let mut tally = Tally::natural();

    for i in init_random_data(100000, None) {
        tally.insert(i);
    }

    tally
}

fn bench_baseline_random_deletions(mut counts: BTreeMap<usize, usize>, indices: Vec<usize>) {
    for idx in indices {
        if let Some(count) = counts.get_mut(&idx) {
            *count -= 1;
            if *count == 0 {
                counts.remove(&idx);
            }
        }
    }
}

fn bench_random_deletions(mut tally: Tally<usize>, indices: Vec<usize>) {
    for idx in indices {
        let _ = tally.delete(&idx);
    }
}

fn bench_baseline_random_lookups(counts: BTreeMap<usize, usize>, indices: Vec<usize>) {
    for idx in indices {
        criterion::black_box(counts.get(&idx));
    }
}

fn bench_random_lookups(tally: Tally<usize>, indices: Vec<usize>) {
    for idx in indices {
        criterion::black_box(tally.find(&idx));
    }
}

fn tally_benchmark(c: &mut Criterion) {
    c.bench_function("baseline 100K counted insertions", |b| {
        b.iter_batched(
            || init_random_data(100000, None),
            |data| bench_baseline_counting(data),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("rbtree 100K counted insertions", |b| {
        b.iter_batched(
            || init_random_data(100000, None),
            |data| bench_rbtree_counting(data),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("tally 100K counted insertions", |b| {
        b.iter_batched(
            || init_random_data(100000, None),
            |data| bench_counting(data),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("tally 100K counted insertions with size hint", |b| {
        b.iter_batched(
            || init_random_data(100000, None),
            |data| bench_counting_hint(data),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("baseline random lookups", |b| {
        b.iter_batched(
            || (init_large_btree(), init_random_data(5000, None)),
            |(counts, indices)| bench_baseline_random_lookups(counts, indices),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("tally random lookups", |b| {
        b.iter_batched(
            || (init_large_tally(), init_random_data(5000, None)),
            |(tally, indices)| bench_random_lookups(tally, indices),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("baseline random deletions", |b| {
        b.iter_batched(
            || (init_large_btree(), init_random_data(50000, None)),
            |(counts, indices)| bench_baseline_random_deletions(counts, indices),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("tally random deletions", |b| {
        b.iter_batched(
            || (init_large_tally(), init_random_data(50000, None)),
            |(tally, indices)| bench_random_deletions(tally, indices),
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, tally_benchmark);
criterion_main!(benches);
