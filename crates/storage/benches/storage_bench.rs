use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use pastelite_storage::{MemoryStore, NewPaste, Paste, PasteService, evaluate};

fn bench_evaluate(c: &mut Criterion) {
    let paste = Paste::new("x".repeat(1024), Some(3600), Some(1_000_000), 0);

    c.bench_function("evaluate_alive_1kb", |b| {
        b.iter(|| evaluate(black_box(&paste), black_box(1_000)))
    });
}

fn bench_fetch_unlimited(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("fetch_unlimited_10k", |b| {
        b.iter(|| {
            rt.block_on(async {
                let svc = PasteService::new(Arc::new(MemoryStore::new()));
                let new = NewPaste {
                    content: "value".into(),
                    ttl_seconds: None,
                    max_views: None,
                };
                let id = svc.create(new, 0).await.unwrap();
                for t in 0..10_000 {
                    black_box(svc.fetch(&id, t).await);
                }
            });
        })
    });
}

fn bench_create_and_exhaust(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("create_and_exhaust_1k", |b| {
        b.iter(|| {
            rt.block_on(async {
                let svc = PasteService::new(Arc::new(MemoryStore::new()));
                for _ in 0..1_000 {
                    let new = NewPaste {
                        content: "value".into(),
                        ttl_seconds: Some(60),
                        max_views: Some(2),
                    };
                    let id = svc.create(new, 0).await.unwrap();
                    black_box(svc.fetch(&id, 1).await);
                    black_box(svc.fetch(&id, 2).await);
                }
            });
        })
    });
}

fn bench_fetch_concurrent(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("fetch_concurrent_4_tasks_10k", |b| {
        b.iter(|| {
            rt.block_on(async {
                let svc = PasteService::new(Arc::new(MemoryStore::new()));
                let mut handles = Vec::new();

                for _ in 0..4 {
                    let svc = svc.clone();
                    handles.push(tokio::spawn(async move {
                        let new = NewPaste {
                            content: "value".into(),
                            ttl_seconds: None,
                            max_views: None,
                        };
                        let id = svc.create(new, 0).await.unwrap();
                        for t in 0..2_500 {
                            black_box(svc.fetch(&id, t).await);
                        }
                    }));
                }

                for h in handles {
                    h.await.unwrap();
                }
            });
        })
    });
}

criterion_group!(
    benches,
    bench_evaluate,
    bench_fetch_unlimited,
    bench_create_and_exhaust,
    bench_fetch_concurrent,
);
criterion_main!(benches);
