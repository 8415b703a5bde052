use chatd::state::{Connection, Features, PresenceCache, User, chunk_names};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::sync::Arc;

// Presence hot paths: admitting sockets into a populated room, and the
// listing rebuild that runs whenever the online set changes.

fn populated(users: u64) -> PresenceCache {
    let cache = PresenceCache::new();
    for id in 0..users {
        let user = Arc::new(User::new(id, format!("user{id}"), Features::SUBSCRIBER));
        cache.add(Arc::clone(&user));
        let (mut conn, _rx) = Connection::channel(Some(user), "lounge");
        cache.add_connection(&mut conn);
    }
    cache
}

fn room_churn_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("room");
    group.throughput(Throughput::Elements(1));

    for size in [10u64, 100, 1000] {
        let cache = populated(size);
        let user = Arc::new(User::new(size + 1, "churner", Features::empty()));
        group.bench_with_input(BenchmarkId::new("connect_disconnect", size), &size, |b, _| {
            b.iter(|| {
                let (mut conn, _rx) = Connection::channel(Some(Arc::clone(&user)), "lounge");
                cache.add_connection(&mut conn);
                cache.disconnect(&conn);
            })
        });
    }

    group.finish();
}

fn global_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("global");

    for size in [100u64, 1000] {
        let cache = populated(size);
        group.bench_with_input(BenchmarkId::new("reconnect", size), &size, |b, _| {
            b.iter(|| {
                cache.add(Arc::new(User::new(0, "user0", Features::SUBSCRIBER)));
                cache.release(0);
            })
        });
        group.bench_with_input(BenchmarkId::new("read_names", size), &size, |b, _| {
            b.iter(|| cache.names())
        });
    }

    group.finish();
}

fn listing_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("listing");
    let names: Vec<String> = (0..1000).map(|id| format!("+user{id}")).collect();
    group.throughput(Throughput::Elements(names.len() as u64));

    group.bench_function("chunk_1000", |b| {
        b.iter(|| chunk_names(names.iter().cloned(), 400))
    });

    group.finish();
}

criterion_group!(benches, room_churn_benchmark, global_benchmark, listing_benchmark);
criterion_main!(benches);
