use std::time::{Duration, Instant};

use tracing::{debug, info};

use smoothbrot_core::{Grid, View};

use crate::backend::{available_workers, BackendKind, CpuBackend, IterationBackend};
use crate::buffer::ColorField;
use crate::color::{colorize, ColorRanges};
use crate::dwell::{smooth, DwellField};
use crate::orbit_field::OrbitField;

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Everything one render produced.
///
/// `colors` is the image; the axes, orbit field and dwell field are kept
/// for callers that label axes or shade the raw numbers differently.
#[derive(Debug, Clone)]
pub struct RenderResult {
    pub real_axis: Vec<f64>,
    pub imag_axis: Vec<f64>,
    pub orbits: OrbitField,
    pub dwell: DwellField,
    pub colors: ColorField,
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Grid → orbits → dwell → colors, over a backend fixed at construction.
///
/// Every [`render`](Pipeline::render) call allocates its own buffers, so a
/// pipeline can serve one view after another without state leaking between
/// them. Runs are synchronous and go to completion once started.
///
/// When the backend owns a thread pool, smoothing and coloring run on it as
/// well; otherwise they use Rayon's global pool.
pub struct Pipeline<B> {
    backend: B,
}

impl<B: IterationBackend> Pipeline<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn render(&self, view: &View, ranges: &ColorRanges) -> crate::Result<RenderResult> {
        let start = Instant::now();
        debug!(
            backend = self.backend.name(),
            resolution = view.resolution(),
            iteration_cap = view.iteration_cap(),
            escape_radius = view.escape_radius(),
            "Starting render"
        );

        let grid = Grid::generate(view);
        let resolution = grid.resolution();
        let states = self.backend.iterate(grid.points(), view.params())?;
        let orbits = OrbitField::new(resolution, *view.params(), states)?;
        let iterated = start.elapsed();

        let shade = || -> crate::Result<(DwellField, ColorField)> {
            let dwell = smooth(&orbits);
            let colors = colorize(&dwell, &orbits, ranges)?;
            Ok((dwell, colors))
        };
        let (dwell, colors) = match self.backend.pool() {
            Some(pool) => pool.install(shade)?,
            None => shade()?,
        };
        let (_, real_axis, imag_axis) = grid.into_parts();

        let elapsed = start.elapsed();
        info!(
            elapsed_ms = elapsed.as_millis(),
            iterate_ms = iterated.as_millis(),
            interior = orbits.interior_count(),
            points = orbits.states.len(),
            "Render complete"
        );

        Ok(RenderResult {
            real_axis,
            imag_axis,
            orbits,
            dwell,
            colors,
            elapsed,
        })
    }
}

/// Build a boxed backend of the requested kind.
///
/// `workers == 0` selects one worker per core, minus one when
/// `reserve_orchestrator` is set. The GPU kind needs the `gpu` feature.
pub fn create_backend(
    kind: BackendKind,
    workers: usize,
    reserve_orchestrator: bool,
) -> crate::Result<Box<dyn IterationBackend>> {
    match kind {
        BackendKind::Cpu => {
            let workers = if workers == 0 {
                available_workers(reserve_orchestrator)
            } else {
                workers
            };
            Ok(Box::new(CpuBackend::new(workers)?))
        }
        #[cfg(feature = "gpu")]
        BackendKind::Gpu => Ok(Box::new(crate::gpu::GpuBackend::new()?)),
        #[cfg(not(feature = "gpu"))]
        BackendKind::Gpu => Err(crate::RenderError::Gpu(
            "built without the `gpu` feature".to_string(),
        )),
    }
}

/// Render `view` on an automatically sized CPU backend.
pub fn render(view: &View, ranges: &ColorRanges) -> crate::Result<RenderResult> {
    Pipeline::new(CpuBackend::auto()?).render(view, ranges)
}
