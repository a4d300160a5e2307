/*!
 * Stress Scenarios
 *
 * Each scenario drives one lock type on one backend with scoped threads and
 * checks a mutual-exclusion property against state that is only safe to
 * touch while the lock is held. A scenario that breaks its property returns
 * the matching `StressError` instead of a report.
 */

use super::config::StressConfig;
use super::report::ScenarioReport;
use crate::core::errors::{StressError, StressResult};
use crate::core::sync::{ExclusiveLock, RawExclusive, RawShared, ReadWriteLock};
use crate::monitoring::{span_scenario, ScenarioSpan};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::cell::UnsafeCell;
use std::hint;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::thread::{self, ScopedJoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// The scenarios run by `run_all`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// N threads x K increments under an ExclusiveLock
    Counter,
    /// R readers and one writer contending for K iterations each
    ReaderWriter,
    /// R readers inside the read section at the same time
    ConcurrentReaders,
    /// Readers and a second writer wait out a held write lock
    WriteExclusion,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::Counter,
        Scenario::ReaderWriter,
        Scenario::ConcurrentReaders,
        Scenario::WriteExclusion,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Scenario::Counter => "counter",
            Scenario::ReaderWriter => "reader_writer",
            Scenario::ConcurrentReaders => "concurrent_readers",
            Scenario::WriteExclusion => "write_exclusion",
        }
    }

    /// Whether the scenario needs a reader/writer backend
    pub const fn is_shared(self) -> bool {
        !matches!(self, Scenario::Counter)
    }

    /// Run against a reader/writer backend
    ///
    /// `Counter` exercises an ExclusiveLock and is rejected here.
    pub fn run_shared<R: RawShared>(self, config: &StressConfig) -> StressResult<ScenarioReport> {
        match self {
            Scenario::Counter => Err(StressError::UnsupportedBackend {
                backend: R::new().name().to_string(),
                scenario: self.name().to_string(),
            }),
            Scenario::ReaderWriter => reader_writer::<R>(config),
            Scenario::ConcurrentReaders => concurrent_readers::<R>(config),
            Scenario::WriteExclusion => write_exclusion::<R>(config),
        }
    }
}

/// State that is deliberately unsynchronized; only the lock under test makes
/// access to it sound.
struct Unsynced<T>(UnsafeCell<T>);

// SAFETY: every access happens while the lock under test is held in the
// right mode; catching that it isn't is the point of the scenarios.
unsafe impl<T: Send> Sync for Unsynced<T> {}

impl<T> Unsynced<T> {
    fn new(value: T) -> Self {
        Self(UnsafeCell::new(value))
    }

    fn get(&self) -> *mut T {
        self.0.get()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn join_all<T>(handles: Vec<ScopedJoinHandle<'_, T>>) -> StressResult<Vec<T>> {
    handles
        .into_iter()
        .map(|h| {
            h.join()
                .map_err(|payload| StressError::WorkerPanicked(panic_message(payload.as_ref())))
        })
        .collect()
}

fn conclude(
    scenario: Scenario,
    backend: &'static str,
    span: ScenarioSpan,
    outcome: StressResult<ScenarioReport>,
) -> StressResult<ScenarioReport> {
    match outcome {
        Ok(mut report) => {
            report.elapsed_ms = span.finish(None).as_millis() as u64;
            info!(
                scenario = scenario.name(),
                backend,
                elapsed_ms = report.elapsed_ms,
                max_concurrent_readers = report.max_concurrent_readers,
                "scenario passed"
            );
            Ok(report)
        }
        Err(err) => {
            let message = err.to_string();
            span.finish(Some(&message));
            error!(scenario = scenario.name(), backend, error = %message, "scenario failed");
            Err(err)
        }
    }
}

/// No lost updates under an ExclusiveLock
///
/// `threads` workers each perform `iterations` lock/increment/unlock cycles on
/// a plain counter; the total must be exactly `threads * iterations`.
pub fn counter<R: RawExclusive>(config: &StressConfig) -> StressResult<ScenarioReport> {
    let lock = ExclusiveLock::<R>::with_backend();
    let backend = lock.backend_name();
    let span = span_scenario(Scenario::Counter.name(), backend);
    let parent = span.span();

    let count = Unsynced::new(0u64);
    let iterations = config.iterations;

    let outcome = thread::scope(|s| {
        let lock = &lock;
        let count = &count;
        let handles: Vec<_> = (0..config.threads)
            .map(|_| {
                s.spawn(move || {
                    let _entered = parent.enter();
                    for _ in 0..iterations {
                        lock.lock();
                        unsafe {
                            *count.get() += 1;
                            lock.unlock();
                        }
                    }
                })
            })
            .collect();
        join_all(handles)
    })
    .and_then(|_| {
        let observed = {
            let _guard = lock.guard();
            unsafe { *count.get() }
        };
        let expected = (config.threads * iterations) as u64;
        debug!(backend, expected, observed, "counter settled");

        if observed != expected {
            return Err(StressError::LostUpdates {
                backend: backend.to_string(),
                expected,
                observed,
            });
        }

        Ok(ScenarioReport {
            scenario: Scenario::Counter.name().to_string(),
            backend: backend.to_string(),
            threads: config.threads,
            iterations,
            elapsed_ms: 0,
            max_concurrent_readers: 0,
            violations: 0,
        })
    });

    conclude(Scenario::Counter, backend, span, outcome)
}

/// Readers never overlap the writer
///
/// `readers` threads and one writer each take the lock `iterations` times.
/// The writer stores the same value into both halves of a pair; readers must
/// never see the writer flag raised or a torn pair, and the writer must never
/// see an active reader.
pub fn reader_writer<R: RawShared>(config: &StressConfig) -> StressResult<ScenarioReport> {
    let lock = ReadWriteLock::<R>::with_backend();
    let backend = lock.backend_name();
    let span = span_scenario(Scenario::ReaderWriter.name(), backend);
    let parent = span.span();

    let pair = Unsynced::new([0u64; 2]);
    let writer_active = AtomicBool::new(false);
    let active_readers = AtomicUsize::new(0);
    let max_readers = AtomicUsize::new(0);
    let violations = AtomicU64::new(0);
    let iterations = config.iterations;

    let outcome = thread::scope(|s| {
        let lock = &lock;
        let pair = &pair;
        let writer_active = &writer_active;
        let active_readers = &active_readers;
        let max_readers = &max_readers;
        let violations = &violations;

        let mut handles: Vec<_> = (0..config.readers)
            .map(|_| {
                s.spawn(move || {
                    let _entered = parent.enter();
                    for _ in 0..iterations {
                        lock.lock_read();
                        let now = active_readers.fetch_add(1, Ordering::SeqCst) + 1;
                        max_readers.fetch_max(now, Ordering::Relaxed);

                        if writer_active.load(Ordering::SeqCst) {
                            violations.fetch_add(1, Ordering::Relaxed);
                        }
                        let [a, b] = unsafe { *pair.get() };
                        if a != b {
                            violations.fetch_add(1, Ordering::Relaxed);
                        }

                        active_readers.fetch_sub(1, Ordering::SeqCst);
                        unsafe { lock.unlock_read() };
                    }
                })
            })
            .collect();

        handles.push(s.spawn(move || {
            let _entered = parent.enter();
            for _ in 0..iterations {
                lock.lock_write();
                if writer_active.swap(true, Ordering::SeqCst)
                    || active_readers.load(Ordering::SeqCst) != 0
                {
                    violations.fetch_add(1, Ordering::Relaxed);
                }

                unsafe {
                    let p = &mut *pair.get();
                    p[0] += 1;
                    hint::spin_loop();
                    p[1] = p[0];
                }

                writer_active.store(false, Ordering::SeqCst);
                unsafe { lock.unlock_write() };
            }
        }));

        join_all(handles)
    })
    .and_then(|_| {
        let [writes, _] = {
            let _guard = lock.read();
            unsafe { *pair.get() }
        };
        let mut violations = violations.load(Ordering::Relaxed);
        if writes != iterations as u64 {
            violations += 1;
        }
        debug!(backend, writes, violations, "reader/writer settled");

        if violations > 0 {
            return Err(StressError::ReaderWriterOverlap {
                backend: backend.to_string(),
                violations,
            });
        }

        Ok(ScenarioReport {
            scenario: Scenario::ReaderWriter.name().to_string(),
            backend: backend.to_string(),
            threads: config.readers + 1,
            iterations,
            elapsed_ms: 0,
            max_concurrent_readers: max_readers.load(Ordering::Relaxed),
            violations: 0,
        })
    });

    conclude(Scenario::ReaderWriter, backend, span, outcome)
}

/// Shared acquisition admits all readers at once
///
/// Every reader takes the read lock, announces itself, and keeps holding the
/// lock until it has seen all `readers` announcements or the rendezvous
/// timeout passes. The count only grows, so it can reach `readers` only if
/// every reader was inside together.
pub fn concurrent_readers<R: RawShared>(config: &StressConfig) -> StressResult<ScenarioReport> {
    let lock = ReadWriteLock::<R>::with_backend();
    let backend = lock.backend_name();
    let span = span_scenario(Scenario::ConcurrentReaders.name(), backend);
    let parent = span.span();

    let readers = config.readers;
    let timeout = config.rendezvous_timeout;
    let arrived = AtomicUsize::new(0);

    let outcome = thread::scope(|s| {
        let lock = &lock;
        let arrived = &arrived;
        let handles: Vec<_> = (0..readers)
            .map(|_| {
                s.spawn(move || {
                    let _entered = parent.enter();
                    let _guard = lock.read();
                    arrived.fetch_add(1, Ordering::SeqCst);

                    let deadline = Instant::now() + timeout;
                    loop {
                        let seen = arrived.load(Ordering::SeqCst);
                        if seen >= readers || Instant::now() >= deadline {
                            break seen;
                        }
                        thread::yield_now();
                    }
                })
            })
            .collect();
        join_all(handles)
    })
    .and_then(|seen| {
        let reached = seen.iter().copied().min().unwrap_or(0);
        debug!(backend, reached, readers, "readers met");

        if reached < readers {
            return Err(StressError::ReadersSerialized {
                backend: backend.to_string(),
                reached,
                expected: readers,
            });
        }

        Ok(ScenarioReport {
            scenario: Scenario::ConcurrentReaders.name().to_string(),
            backend: backend.to_string(),
            threads: readers,
            iterations: 1,
            elapsed_ms: 0,
            max_concurrent_readers: reached,
            violations: 0,
        })
    });

    conclude(Scenario::ConcurrentReaders, backend, span, outcome)
}

/// A held write lock blocks both readers and writers
///
/// The writer takes the lock, sleeps for `writer_hold`, raises `released`
/// and unlocks. Contenders start only after the writer has acquired; each
/// one must see `released` already raised when its own lock call returns.
pub fn write_exclusion<R: RawShared>(config: &StressConfig) -> StressResult<ScenarioReport> {
    let lock = ReadWriteLock::<R>::with_backend();
    let backend = lock.backend_name();
    let span = span_scenario(Scenario::WriteExclusion.name(), backend);
    let parent = span.span();

    let hold = config.writer_hold;
    let acquired = AtomicBool::new(false);
    let released = AtomicBool::new(false);

    let outcome = thread::scope(|s| {
        let lock = &lock;
        let acquired = &acquired;
        let released = &released;

        let writer = s.spawn(move || {
            let _entered = parent.enter();
            lock.lock_write();
            acquired.store(true, Ordering::SeqCst);
            thread::sleep(hold);
            released.store(true, Ordering::SeqCst);
            unsafe { lock.unlock_write() };
            Duration::ZERO
        });

        let wait_for_writer = move || {
            while !acquired.load(Ordering::SeqCst) {
                thread::yield_now();
            }
        };

        let reader = s.spawn(move || {
            let _entered = parent.enter();
            wait_for_writer();
            let start = Instant::now();
            lock.lock_read();
            let ok = released.load(Ordering::SeqCst);
            unsafe { lock.unlock_read() };
            if ok {
                start.elapsed()
            } else {
                Duration::MAX
            }
        });

        let second_writer = s.spawn(move || {
            let _entered = parent.enter();
            wait_for_writer();
            let start = Instant::now();
            lock.lock_write();
            let ok = released.load(Ordering::SeqCst);
            unsafe { lock.unlock_write() };
            if ok {
                start.elapsed()
            } else {
                Duration::MAX
            }
        });

        join_all(vec![writer, reader, second_writer])
    })
    .and_then(|waits| {
        debug!(backend, ?waits, "contenders released");

        if waits.contains(&Duration::MAX) {
            return Err(StressError::WriterNotExclusive {
                backend: backend.to_string(),
            });
        }

        Ok(ScenarioReport {
            scenario: Scenario::WriteExclusion.name().to_string(),
            backend: backend.to_string(),
            threads: 3,
            iterations: 1,
            elapsed_ms: 0,
            max_concurrent_readers: 1,
            violations: 0,
        })
    });

    conclude(Scenario::WriteExclusion, backend, span, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sync::backend::{CriticalSection, ParkingMutex, ParkingRwLock};

    #[test]
    fn test_counter_on_critical_section() {
        let report = counter::<CriticalSection>(&StressConfig::quick()).unwrap();
        assert_eq!(report.backend, "critical_section");
        assert_eq!(report.violations, 0);
    }

    #[test]
    fn test_counter_on_parking() {
        let report = counter::<ParkingMutex>(&StressConfig::quick()).unwrap();
        assert_eq!(report.threads, 4);
    }

    #[test]
    fn test_shared_scenarios_on_parking() {
        let config = StressConfig::quick();
        for scenario in Scenario::ALL.iter().filter(|s| s.is_shared()) {
            let report = scenario.run_shared::<ParkingRwLock>(&config).unwrap();
            assert_eq!(report.scenario, scenario.name());
        }
    }

    #[test]
    fn test_counter_rejected_as_shared() {
        let err = Scenario::Counter
            .run_shared::<ParkingRwLock>(&StressConfig::quick())
            .unwrap_err();
        assert!(matches!(err, StressError::UnsupportedBackend { .. }));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
    }
}
