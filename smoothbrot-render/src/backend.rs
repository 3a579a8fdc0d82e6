use std::ops::Range;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use smoothbrot_core::{iterate_point, Complex, IterationParams, OrbitState};

use crate::error::RenderError;

/// A strategy for running the escape-time recurrence over a flat point set.
///
/// Every backend advances points with the same step function as
/// [`OrbitState::step`] and returns one state per input point, in input
/// order. An empty input yields an empty output.
pub trait IterationBackend {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn iterate(
        &self,
        points: &[Complex],
        params: &IterationParams,
    ) -> crate::Result<Vec<OrbitState>>;

    /// Thread pool the backend runs on, if it owns one. The pipeline runs
    /// its CPU stages there too, so the worker count covers the whole render.
    fn pool(&self) -> Option<&rayon::ThreadPool> {
        None
    }
}

impl<B: IterationBackend + ?Sized> IterationBackend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn iterate(
        &self,
        points: &[Complex],
        params: &IterationParams,
    ) -> crate::Result<Vec<OrbitState>> {
        (**self).iterate(points, params)
    }

    fn pool(&self) -> Option<&rayon::ThreadPool> {
        (**self).pool()
    }
}

/// Which backend a pipeline is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    Cpu,
    Gpu,
}

/// Number of CPU workers to use.
///
/// With `reserve_orchestrator` one core is left for the calling thread,
/// never dropping below a single worker.
pub fn available_workers(reserve_orchestrator: bool) -> usize {
    let cores = num_cpus::get();
    if reserve_orchestrator {
        cores.saturating_sub(1).max(1)
    } else {
        cores
    }
}

/// Split `0..len` into at most `parts` contiguous ranges whose lengths
/// differ by at most one. Never yields an empty range unless `len == 0`.
pub fn partition(len: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.clamp(1, len.max(1));
    let base = len / parts;
    let extra = len % parts;
    let mut start = 0;
    (0..parts)
        .map(|i| {
            let size = base + usize::from(i < extra);
            let range = start..start + size;
            start += size;
            range
        })
        .collect()
}

// ---------------------------------------------------------------------------
// CPU backend
// ---------------------------------------------------------------------------

/// Multithreaded CPU backend.
///
/// Owns a dedicated Rayon pool with one thread per worker. Each call splits
/// the point set with [`partition`] and hands every worker exclusive write
/// access to its slice of a pre-allocated output buffer, so no locking is
/// needed and the result is independent of the worker count.
pub struct CpuBackend {
    workers: usize,
    pool: rayon::ThreadPool,
}

impl CpuBackend {
    pub fn new(workers: usize) -> crate::Result<Self> {
        if workers == 0 {
            return Err(RenderError::InvalidWorkerCount(workers));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("smoothbrot-worker-{i}"))
            .build()?;
        Ok(Self { workers, pool })
    }

    /// One worker per available core.
    pub fn auto() -> crate::Result<Self> {
        Self::new(available_workers(false))
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl IterationBackend for CpuBackend {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn iterate(
        &self,
        points: &[Complex],
        params: &IterationParams,
    ) -> crate::Result<Vec<OrbitState>> {
        let mut states = vec![OrbitState::INITIAL; points.len()];
        if points.is_empty() {
            return Ok(states);
        }

        let ranges = partition(points.len(), self.workers);
        debug!(
            points = points.len(),
            workers = self.workers,
            chunks = ranges.len(),
            "Iterating on CPU"
        );

        let mut chunks = Vec::with_capacity(ranges.len());
        let mut rest: &mut [OrbitState] = &mut states;
        for range in ranges {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(range.len());
            chunks.push((head, &points[range]));
            rest = tail;
        }

        self.pool.install(|| {
            chunks.into_par_iter().for_each(|(out, cs)| {
                for (state, &c) in out.iter_mut().zip(cs) {
                    *state = iterate_point(c, params);
                }
            });
        });

        Ok(states)
    }

    fn pool(&self) -> Option<&rayon::ThreadPool> {
        Some(&self.pool)
    }
}
