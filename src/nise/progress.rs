//! Progress reporting hooks for the pipeline

use std::fmt;

/// Stages of a detection run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Filtering,
    Seeding,
    Expansion,
    Propagation,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Filtering => "filtering",
            Stage::Seeding => "seeding",
            Stage::Expansion => "seed expansion",
            Stage::Propagation => "propagation",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Receives pipeline checkpoints. Methods are called from the thread that
/// reached the checkpoint, so implementations must be `Sync`.
pub trait ProgressObserver: Sync {
    fn stage_started(&self, _stage: Stage) {}

    fn stage_finished(&self, _stage: Stage) {}

    /// `done` of `total` seeds have been expanded and inserted
    fn seed_expanded(&self, _done: usize, _total: usize) {}
}

/// Observer that ignores every checkpoint
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

/// Observer that reports through the `log` facade, at most `steps` times
/// per expansion stage
#[derive(Debug, Clone, Copy)]
pub struct LogProgress {
    steps: usize,
}

impl LogProgress {
    pub fn new(steps: usize) -> Self {
        Self { steps: steps.max(1) }
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ProgressObserver for LogProgress {
    fn stage_started(&self, stage: Stage) {
        log::info!("Starting {} phase", stage);
    }

    fn stage_finished(&self, stage: Stage) {
        log::info!("Finished {} phase", stage);
    }

    fn seed_expanded(&self, done: usize, total: usize) {
        let stride = (total / self.steps).max(1);
        if done % stride == 0 || done == total {
            log::info!("Expanded {}/{} seeds", done, total);
        } else {
            log::debug!("Expanded {}/{} seeds", done, total);
        }
    }
}
