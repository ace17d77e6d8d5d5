//! Staged construction: order -> triangulate -> dual -> clip
//!
//! Each stage consumes the previous stage's result and hands its own result
//! to the next, so a diagram can be built (and inspected, or tested) one
//! stage at a time. The typestate parameter makes running a stage out of
//! order a compile error.
//!
//! ```rust
//! use planar_voronoi::pipeline::Pipeline;
//! use planar_voronoi::{DiagramConfig, Rect};
//! use glam::DVec2;
//!
//! let sites = vec![DVec2::new(-1.0, 0.0), DVec2::new(1.0, 0.0), DVec2::new(0.0, 2.0)];
//! let rect = Rect::new(-5.0, -5.0, 10.0, 10.0);
//!
//! let ordered = Pipeline::new(&sites, rect, DiagramConfig::default()).order();
//! let triangulated = ordered.triangulate();
//! assert_eq!(triangulated.triangulation().triangles().len(), 1);
//!
//! let output = triangulated.dualize().clip();
//! assert_eq!(output.polygons.len(), 3);
//! ```

use glam::DVec2;
use std::thread::JoinHandle;

use crate::bounds::Rect;
use crate::config::DiagramConfig;
use crate::generation::{insertion_order, BoundaryClipper, DelaunayBuilder, Triangulation, VoronoiDual};
use crate::polygon::Polygon;

/// Nothing computed yet
#[derive(Debug)]
pub struct Start;

/// Insertion order fixed: lexicographically largest site last
#[derive(Debug)]
pub struct Ordered {
    order: Vec<usize>,
}

/// Delaunay triangulation built
#[derive(Debug)]
pub struct Triangulated {
    triangulation: Triangulation,
}

/// Voronoi dual built, not yet clipped
#[derive(Debug)]
pub struct Dualized {
    triangulation: Triangulation,
    dual: VoronoiDual,
}

/// Everything the full pipeline produces
#[derive(Debug, Clone)]
pub struct DiagramOutput {
    pub triangulation: Triangulation,
    pub dual: VoronoiDual,
    /// One polygon per site, in site order
    pub polygons: Vec<Polygon>,
}

/// Linear stage chain over borrowed sites
#[derive(Debug)]
pub struct Pipeline<'a, S> {
    sites: &'a [DVec2],
    rect: Rect,
    config: DiagramConfig,
    stage: S,
}

impl<'a, S> Pipeline<'a, S> {
    #[inline]
    pub fn sites(&self) -> &'a [DVec2] {
        self.sites
    }

    #[inline]
    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    #[inline]
    pub fn config(&self) -> &DiagramConfig {
        &self.config
    }

    fn advance<T>(self, stage: T) -> Pipeline<'a, T> {
        Pipeline {
            sites: self.sites,
            rect: self.rect,
            config: self.config,
            stage,
        }
    }
}

impl<'a> Pipeline<'a, Start> {
    /// The sites are only read; no stage reorders or mutates them
    pub fn new(sites: &'a [DVec2], rect: Rect, config: DiagramConfig) -> Self {
        Self {
            sites,
            rect,
            config,
            stage: Start,
        }
    }

    /// Stage 1: lexicographic swap, then the optional seeded shuffle
    pub fn order(self) -> Pipeline<'a, Ordered> {
        let order = insertion_order(self.sites, self.config.seed);
        tracing::debug!(sites = self.sites.len(), shuffled = self.config.seed.is_some(), "insertion order fixed");
        self.advance(Ordered { order })
    }
}

impl<'a> Pipeline<'a, Ordered> {
    #[inline]
    pub fn insertion_order(&self) -> &[usize] {
        &self.stage.order
    }

    /// Stage 2: incremental Delaunay construction
    ///
    /// Sites closer than `vertex_epsilon` to an inserted site are dropped
    /// as duplicates, since their cells would be thinner than a merged vertex.
    pub fn triangulate(self) -> Pipeline<'a, Triangulated> {
        let triangulation = DelaunayBuilder::new(self.sites, self.config.predicate_epsilon)
            .merge_distance(self.config.vertex_epsilon)
            .build(&self.stage.order);
        self.advance(Triangulated { triangulation })
    }
}

impl<'a> Pipeline<'a, Triangulated> {
    #[inline]
    pub fn triangulation(&self) -> &Triangulation {
        &self.stage.triangulation
    }

    /// Stage 3: circumcenters and cell boundaries
    pub fn dualize(self) -> Pipeline<'a, Dualized> {
        let dual = VoronoiDual::from_triangulation(self.sites, &self.stage.triangulation, self.config.vertex_epsilon);
        let triangulation = self.stage.triangulation;
        Pipeline {
            sites: self.sites,
            rect: self.rect,
            config: self.config,
            stage: Dualized { triangulation, dual },
        }
    }
}

impl<'a> Pipeline<'a, Dualized> {
    #[inline]
    pub fn triangulation(&self) -> &Triangulation {
        &self.stage.triangulation
    }

    #[inline]
    pub fn dual(&self) -> &VoronoiDual {
        &self.stage.dual
    }

    /// Stage 4: clip every cell to the rectangle
    pub fn clip(self) -> DiagramOutput {
        let clipper = BoundaryClipper::new(self.rect, self.config.boundary_epsilon);
        let polygons = clipper.clip_all(self.sites, &self.stage.dual);
        DiagramOutput {
            triangulation: self.stage.triangulation,
            dual: self.stage.dual,
            polygons,
        }
    }
}

/// Runs all four stages in sequence
pub fn run(sites: &[DVec2], rect: Rect, config: DiagramConfig) -> DiagramOutput {
    Pipeline::new(sites, rect, config).order().triangulate().dualize().clip()
}

/// Handle to a diagram computation running on its own thread
///
/// There is no cancellation: once scheduled, the computation runs to the
/// end. [`DiagramJob::complete`] blocks until it has.
#[derive(Debug)]
pub struct DiagramJob<T> {
    handle: JoinHandle<T>,
}

impl<T: Send + 'static> DiagramJob<T> {
    /// Starts `work` on a new thread
    pub fn spawn<F>(work: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        Self {
            handle: std::thread::spawn(work),
        }
    }

    /// Whether the computation has finished (never blocks)
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Blocks until the computation finishes and returns its result
    ///
    /// A panic inside the job (an internal invariant violation) is resumed
    /// on the calling thread.
    pub fn complete(self) -> T {
        match self.handle.join() {
            Ok(value) => value,
            Err(payload) => std::panic::resume_unwind(payload),
        }
    }
}

/// Schedules the full pipeline over owned sites
pub fn schedule(sites: Vec<DVec2>, rect: Rect, config: DiagramConfig) -> DiagramJob<DiagramOutput> {
    DiagramJob::spawn(move || run(&sites, rect, config))
}
