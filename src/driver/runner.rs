//! Timed mutation loops.

use core::cell::Cell;
use std::hint::black_box;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};

use crate::model::{chain_step, TestModel};
use crate::record::ChangeRecord;

/// The outcome of one timed loop (or of several loops run side by side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Measurement {
    /// Wall-clock time of the mutation loop(s).
    pub elapsed: Duration,
    /// Observer invocations.
    pub notifications: u64,
    /// Notifications whose chained relation did not hold.
    pub violations: u64,
}

impl Measurement {
    fn merge(self, other: Measurement) -> Measurement {
        Measurement {
            elapsed: self.elapsed.max(other.elapsed),
            notifications: self.notifications + other.notifications,
            violations: self.violations + other.violations,
        }
    }
}

/// The `X` value written on iteration `i`; consecutive values always differ.
#[inline]
#[allow(clippy::cast_possible_truncation)]
fn x_value(i: u64) -> i32 {
    i.wrapping_add(1) as i32
}

/// Subscribes the chained observer to a fresh `M` and writes `X` `loop_count`
/// times, each write cascading into `Y` and `Z`.
///
/// Relations are always evaluated; `violations` is only counted when `verify`
/// is set.
pub fn measure<M: TestModel>(loop_count: u64, verify: bool) -> Measurement {
    let model = M::default();
    let notifications = Rc::new(Cell::new(0u64));
    let violations = Rc::new(Cell::new(0u64));
    {
        let notifications = Rc::clone(&notifications);
        let violations = Rc::clone(&violations);
        model.subscribe(move |sender: &M, record: &dyn ChangeRecord| {
            notifications.set(notifications.get() + 1);
            let holds = chain_step(sender, record.property_name());
            if verify && !holds {
                violations.set(violations.get() + 1);
            }
        });
    }

    let start = Instant::now();
    for i in 0..loop_count {
        model.set_x(x_value(i));
    }
    let elapsed = start.elapsed();
    black_box(&model);

    Measurement {
        elapsed,
        notifications: notifications.get(),
        violations: violations.get(),
    }
}

/// Runs [`measure`] on `threads` threads at once, one model per thread.
///
/// `elapsed` is the slowest thread's loop time; counts are summed.
pub fn measure_concurrent<M: TestModel>(loop_count: u64, threads: usize, verify: bool) -> Result<Measurement> {
    if threads <= 1 {
        return Ok(measure::<M>(loop_count, verify));
    }
    run_workers::<M>(loop_count, threads, verify)
}

#[cfg(feature = "parallel")]
fn run_workers<M: TestModel>(loop_count: u64, threads: usize, verify: bool) -> Result<Measurement> {
    use rayon::prelude::*;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| anyhow!("failed to build benchmark thread pool: {e}"))?;
    let parts: Vec<Measurement> = pool.install(|| {
        (0..threads)
            .into_par_iter()
            .map(|_| measure::<M>(loop_count, verify))
            .collect()
    });
    Ok(parts.into_iter().fold(Measurement::default(), Measurement::merge))
}

#[cfg(not(feature = "parallel"))]
fn run_workers<M: TestModel>(loop_count: u64, threads: usize, verify: bool) -> Result<Measurement> {
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|_| scope.spawn(move || measure::<M>(loop_count, verify)))
            .collect();
        handles.into_iter().try_fold(Measurement::default(), |acc, handle| {
            let part = handle
                .join()
                .map_err(|_| anyhow!("benchmark worker thread panicked"))?;
            Ok(acc.merge(part))
        })
    })
}
