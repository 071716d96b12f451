use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::error::AppError;

/// Fixed-size worker pool running one call per unit.
///
/// Every dispatched call is joined before [`Pool::run`] returns. With `fail_fast`
/// units that have not started yet are skipped once any unit has failed.
pub struct Pool {
    pool: rayon::ThreadPool,
    fail_fast: bool,
}

#[derive(Debug)]
pub struct PoolReport<T> {
    pub outputs: Vec<T>,
    pub failed: Vec<AppError>,
    pub skipped: usize,
}

impl<T> PoolReport<T> {
    pub fn succeeded(&self) -> usize {
        self.outputs.len()
    }

    /// Fails with the first error when the run was stopped early.
    pub fn into_result(mut self, fail_fast: bool) -> Result<Self, AppError> {
        if fail_fast && !self.failed.is_empty() {
            let failed = self.failed.len();
            return Err(AppError::Aborted {
                failed,
                first: Box::new(self.failed.swap_remove(0)),
            });
        }
        Ok(self)
    }
}

enum Outcome<T> {
    Done(T),
    Failed(AppError),
    Skipped,
}

impl Pool {
    pub fn new(workers: usize, fail_fast: bool) -> Result<Self, AppError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("worker-{}", i))
            .build()?;
        Ok(Self { pool, fail_fast })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn run<U, T, F>(&self, units: &[U], f: F) -> PoolReport<T>
    where
        U: Sync,
        T: Send,
        F: Fn(&U) -> Result<T, AppError> + Sync,
    {
        let stop = AtomicBool::new(false);
        let outcomes: Vec<Outcome<T>> = self.pool.install(|| {
            units
                .par_iter()
                .map(|unit| {
                    if self.fail_fast && stop.load(Ordering::SeqCst) {
                        return Outcome::Skipped;
                    }
                    match f(unit) {
                        Ok(output) => Outcome::Done(output),
                        Err(e) => {
                            log::error!("{}", e);
                            stop.store(true, Ordering::SeqCst);
                            Outcome::Failed(e)
                        }
                    }
                })
                .collect()
        });

        let mut report = PoolReport {
            outputs: Vec::new(),
            failed: Vec::new(),
            skipped: 0,
        };
        for outcome in outcomes {
            match outcome {
                Outcome::Done(output) => report.outputs.push(output),
                Outcome::Failed(e) => report.failed.push(e),
                Outcome::Skipped => report.skipped += 1,
            }
        }
        report
    }
}
