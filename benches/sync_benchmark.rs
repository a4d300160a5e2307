/*!
 * Lock Backend Benchmarks
 *
 * Compare uncontended and contended cost of each native backend
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use harness_sync::core::sync::backend::{CriticalSection, ParkingMutex, ParkingRwLock};
use harness_sync::{ExclusiveLock, RawExclusive, RawShared, ReadWriteLock};
use std::thread;

fn uncontended_exclusive<R: RawExclusive>(c: &mut Criterion, name: &str) {
    let lock = ExclusiveLock::<R>::with_backend();
    c.bench_function(&format!("uncontended_exclusive/{}", name), |b| {
        b.iter(|| {
            lock.lock();
            unsafe { lock.unlock() };
            black_box(&lock);
        });
    });
}

fn uncontended_shared<R: RawShared>(c: &mut Criterion, name: &str) {
    let lock = ReadWriteLock::<R>::with_backend();
    c.bench_function(&format!("uncontended_read/{}", name), |b| {
        b.iter(|| {
            let guard = lock.read();
            black_box(&guard);
        });
    });
    c.bench_function(&format!("uncontended_write/{}", name), |b| {
        b.iter(|| {
            let guard = lock.write();
            black_box(&guard);
        });
    });
}

fn bench_uncontended(c: &mut Criterion) {
    uncontended_exclusive::<CriticalSection>(c, "critical_section");
    uncontended_exclusive::<ParkingMutex>(c, "parking_lot");
    #[cfg(unix)]
    uncontended_exclusive::<harness_sync::core::sync::backend::PthreadMutex>(c, "pthread");

    uncontended_shared::<ParkingRwLock>(c, "parking_lot");
    #[cfg(unix)]
    uncontended_shared::<harness_sync::core::sync::backend::PthreadRwLock>(c, "pthread");
}

fn contended_exclusive<R: RawExclusive>(threads: usize) {
    let lock = ExclusiveLock::<R>::with_backend();
    thread::scope(|s| {
        for _ in 0..threads {
            s.spawn(|| {
                for _ in 0..1_000 {
                    let guard = lock.guard();
                    black_box(&guard);
                }
            });
        }
    });
}

fn bench_contended(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended_exclusive");

    for threads in [2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("critical_section", threads),
            &threads,
            |b, &threads| b.iter(|| contended_exclusive::<CriticalSection>(threads)),
        );
        group.bench_with_input(
            BenchmarkId::new("parking_lot", threads),
            &threads,
            |b, &threads| b.iter(|| contended_exclusive::<ParkingMutex>(threads)),
        );
        #[cfg(unix)]
        group.bench_with_input(BenchmarkId::new("pthread", threads), &threads, |b, &threads| {
            b.iter(|| contended_exclusive::<harness_sync::core::sync::backend::PthreadMutex>(threads))
        });
    }

    group.finish();
}

fn read_heavy<R: RawShared>(readers: usize) {
    let lock = ReadWriteLock::<R>::with_backend();
    thread::scope(|s| {
        for _ in 0..readers {
            s.spawn(|| {
                for _ in 0..1_000 {
                    let guard = lock.read();
                    black_box(&guard);
                }
            });
        }
        s.spawn(|| {
            for _ in 0..100 {
                let guard = lock.write();
                black_box(&guard);
            }
        });
    });
}

fn bench_read_heavy(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_heavy");

    for readers in [2, 8] {
        group.bench_with_input(
            BenchmarkId::new("parking_lot", readers),
            &readers,
            |b, &readers| b.iter(|| read_heavy::<ParkingRwLock>(readers)),
        );
        #[cfg(unix)]
        group.bench_with_input(BenchmarkId::new("pthread", readers), &readers, |b, &readers| {
            b.iter(|| read_heavy::<harness_sync::core::sync::backend::PthreadRwLock>(readers))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_uncontended, bench_contended, bench_read_heavy);
criterion_main!(benches);
