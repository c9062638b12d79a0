use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use quiver::{Collection, CollectionManager, MemoryStore, Searcher, VectorStore};

struct BenchEnv {
    searcher: Searcher,
    collection: Collection,
}

fn make_vector(seed: u64, dimension: usize) -> Vec<f32> {
    (0..dimension)
        .map(|i| ((seed as usize + i) % 10) as f32 / 10.0 - 0.5)
        .collect()
}

fn build_env(record_count: usize, dimension: usize) -> BenchEnv {
    let store: Arc<dyn VectorStore> = Arc::new(MemoryStore::new());
    let manager = CollectionManager::new(Arc::clone(&store));
    let searcher = Searcher::new(store);

    let collection = manager.create("bench", dimension).unwrap();
    let vectors: Vec<Vec<f32>> = (0..record_count as u64)
        .map(|seed| make_vector(seed, dimension))
        .collect();
    manager.batch_insert(&collection, &vectors).unwrap();

    BenchEnv {
        searcher,
        collection,
    }
}

fn bench_two_stage_search(c: &mut Criterion) {
    let dimension = 384;
    let counts = [1_000usize, 5_000, 10_000];
    let mut envs: Vec<(usize, BenchEnv)> = Vec::new();
    for &count in &counts {
        envs.push((count, build_env(count, dimension)));
    }

    let mut group = c.benchmark_group("two_stage_search");
    let query = make_vector(777, dimension);
    for (count, env) in envs.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), env, |b, env| {
            b.iter(|| {
                black_box(env.searcher.search(&env.collection, &query, 10).unwrap());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_two_stage_search);
criterion_main!(benches);
