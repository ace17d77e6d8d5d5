//! VoronoiDiagram: the public façade over the construction pipeline

use glam::{DVec2, UVec2};

use crate::bounds::Rect;
use crate::config::DiagramConfig;
use crate::error::{Result, VoronoiError};
use crate::generation::Triangulation;
use crate::pipeline::{self, DiagramJob};
use crate::polygon::Polygon;
use crate::spatial::{self, SiteIndex};

/// A clipped planar Voronoi diagram with its Delaunay triangulation
///
/// Holds only the final products of construction: the triangulation, one
/// polygon per site, and the cell adjacency. Intermediate structures (the
/// history DAG, the dual half-edges) are dropped before `compute` returns.
///
/// # Examples
///
/// ```
/// use planar_voronoi::*;
/// use glam::DVec2;
///
/// let sites = vec![DVec2::new(-1.0, 0.0), DVec2::new(1.0, 0.0)];
/// let rect = Rect::new(-5.0, -5.0, 10.0, 10.0);
///
/// let diagram = VoronoiDiagram::compute_with_bounds(&sites, rect, DiagramConfig::default()).unwrap();
/// assert_eq!(diagram.polygons().len(), 2);
/// assert!((diagram.polygons()[0].area() - 50.0).abs() < 1e-9);
/// ```
#[derive(Clone)]
pub struct VoronoiDiagram {
    /// Configuration used to build this diagram
    config: DiagramConfig,

    /// Rectangle every polygon is clipped to
    rect: Rect,

    sites: Vec<DVec2>,

    triangulation: Triangulation,

    /// One polygon per site (indexed by site id)
    polygons: Vec<Polygon>,

    /// Sites sharing a Voronoi edge, per site
    neighbors: Vec<Vec<usize>>,

    /// Nearest-site lookups
    spatial_index: SiteIndex,
}

impl VoronoiDiagram {
    /// Compute the diagram clipped to the sites' bounding box grown by `config.margin`
    ///
    /// # Errors
    ///
    /// - `InsufficientSites` if fewer than two sites are given
    /// - `InvalidBounds` if the grown bounding box has no area (for example
    ///   collinear axis-aligned sites with a zero margin)
    pub fn compute(sites: &[DVec2], config: DiagramConfig) -> Result<Self> {
        check_sites(sites)?;
        config.validate()?;
        let rect = auto_bounds(sites, &config)?;
        Self::compute_with_bounds(sites, rect, config)
    }

    /// Compute the diagram clipped to an explicit rectangle
    ///
    /// # Errors
    ///
    /// - `InsufficientSites` if fewer than two sites are given
    /// - `InvalidBounds` if `rect` is empty or not finite
    /// - `InvalidConfig` if a tolerance in `config` is out of range
    pub fn compute_with_bounds(sites: &[DVec2], rect: Rect, config: DiagramConfig) -> Result<Self> {
        check_sites(sites)?;
        config.validate()?;
        rect.validate()?;
        Ok(Self::build(sites.to_vec(), rect, config))
    }

    /// Start the computation on a background thread
    ///
    /// Preconditions are checked before anything is scheduled, so usage
    /// errors come back immediately. `bounds == None` derives the rectangle
    /// from the sites as in [`VoronoiDiagram::compute`].
    ///
    /// # Example
    ///
    /// ```
    /// use planar_voronoi::*;
    /// use glam::DVec2;
    ///
    /// let sites = generation::random_sites(200, Rect::new(0.0, 0.0, 1.0, 1.0), 3);
    /// let job = VoronoiDiagram::schedule(sites, None, DiagramConfig::default()).unwrap();
    /// let diagram = job.complete();
    /// assert_eq!(diagram.site_count(), 200);
    /// ```
    pub fn schedule(sites: Vec<DVec2>, bounds: Option<Rect>, config: DiagramConfig) -> Result<DiagramJob<Self>> {
        check_sites(&sites)?;
        config.validate()?;
        let rect = match bounds {
            Some(rect) => rect,
            None => auto_bounds(&sites, &config)?,
        };
        rect.validate()?;
        Ok(DiagramJob::spawn(move || Self::build(sites, rect, config)))
    }

    fn build(sites: Vec<DVec2>, rect: Rect, config: DiagramConfig) -> Self {
        let output = pipeline::run(&sites, rect, config);
        let neighbors = (0..sites.len()).map(|s| output.dual.neighbors(s)).collect();
        let spatial_index = SiteIndex::new(&sites);

        tracing::debug!(
            sites = sites.len(),
            triangles = output.triangulation.triangles().len(),
            empty_polygons = output.polygons.iter().filter(|p| p.is_empty()).count(),
            "voronoi diagram computed"
        );

        Self {
            config,
            rect,
            sites,
            triangulation: output.triangulation,
            polygons: output.polygons,
            neighbors,
            spatial_index,
        }
    }

    #[inline]
    pub fn config(&self) -> &DiagramConfig {
        &self.config
    }

    #[inline]
    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    #[inline]
    pub fn sites(&self) -> &[DVec2] {
        &self.sites
    }

    #[inline]
    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    /// Delaunay triangles as counter-clockwise site index triples
    #[inline]
    pub fn triangles(&self) -> &[[usize; 3]] {
        self.triangulation.triangles()
    }

    #[inline]
    pub fn triangulation(&self) -> &Triangulation {
        &self.triangulation
    }

    /// One polygon per site, indexed by site id
    #[inline]
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Polygon of `site`, `None` if the id is out of range
    #[inline]
    pub fn polygon(&self, site: usize) -> Option<&Polygon> {
        self.polygons.get(site)
    }

    /// Site id of each polygon, parallel to [`VoronoiDiagram::polygons`]
    pub fn site_ids(&self) -> Vec<usize> {
        self.polygons.iter().map(|p| p.site).collect()
    }

    /// Sites whose cells share an edge with `site`'s cell
    ///
    /// Returns an empty slice for an invalid id or a duplicate site.
    pub fn neighbors(&self, site: usize) -> &[usize] {
        self.neighbors.get(site).map(|n| n.as_slice()).unwrap_or(&[])
    }

    /// Site whose cell contains `position` (the nearest site)
    ///
    /// # Example
    ///
    /// ```
    /// # use planar_voronoi::*;
    /// # use glam::DVec2;
    /// let sites = vec![DVec2::new(-1.0, 0.0), DVec2::new(1.0, 0.0)];
    /// let diagram = VoronoiDiagram::compute(&sites, DiagramConfig::default()).unwrap();
    /// assert_eq!(diagram.find_site_at(DVec2::new(0.7, 3.0)), 1);
    /// ```
    pub fn find_site_at(&self, position: DVec2) -> usize {
        self.spatial_index.find_nearest(position)
    }

    /// Sites within `hops` cell-adjacency steps of `site` (BFS), including `site`
    ///
    /// Returns an empty vec if `site` is out of range.
    pub fn find_sites_within_hops(&self, site: usize, hops: usize) -> Vec<usize> {
        if site >= self.sites.len() {
            return vec![];
        }

        let mut visited = vec![false; self.sites.len()];
        let mut found = vec![site];
        let mut current = vec![site];
        visited[site] = true;

        for _ in 0..hops {
            let mut next = Vec::new();
            for &s in &current {
                for &neighbor in self.neighbors(s) {
                    if !visited[neighbor] {
                        visited[neighbor] = true;
                        next.push(neighbor);
                    }
                }
            }
            found.extend_from_slice(&next);
            current = next;
        }

        found
    }

    /// All ring points concatenated, with the owning site id of each point
    pub fn flatten(&self) -> (Vec<DVec2>, Vec<usize>) {
        let total: usize = self.polygons.iter().map(Polygon::len).sum();
        let mut points = Vec::with_capacity(total);
        let mut ids = Vec::with_capacity(total);
        for polygon in &self.polygons {
            points.extend_from_slice(&polygon.points);
            ids.extend(std::iter::repeat(polygon.site).take(polygon.len()));
        }
        (points, ids)
    }

    /// Nearest-site grid over this diagram's rectangle
    pub fn lookup_table(&self, dimension: UVec2) -> Result<Vec<usize>> {
        check_dimension(dimension)?;
        Ok(spatial::lookup_table(&self.sites, &self.rect, dimension))
    }
}

/// Compute one polygon per site into a caller-owned buffer
///
/// `bounds == None` derives the rectangle from the sites grown by
/// `config.margin`.
///
/// # Errors
///
/// - `InsufficientSites` if fewer than two sites are given
/// - `LengthMismatch` if `polygons.len() != sites.len()`
/// - `InvalidBounds` if the rectangle is empty or not finite
pub fn compute_into(sites: &[DVec2], bounds: Option<Rect>, config: DiagramConfig, polygons: &mut [Polygon]) -> Result<()> {
    check_sites(sites)?;
    config.validate()?;
    if polygons.len() != sites.len() {
        return Err(VoronoiError::LengthMismatch {
            expected: sites.len(),
            actual: polygons.len(),
        });
    }
    let rect = match bounds {
        Some(rect) => rect,
        None => auto_bounds(sites, &config)?,
    };
    rect.validate()?;

    let output = pipeline::run(sites, rect, config);
    for (slot, polygon) in polygons.iter_mut().zip(output.polygons) {
        *slot = polygon;
    }
    Ok(())
}

/// Nearest-site grid (VoLT) without building the diagram
///
/// The table has `dimension.x * dimension.y` entries in row-major order;
/// see [`spatial::lookup_table`].
///
/// # Errors
///
/// - `InsufficientSites` if fewer than two sites are given
/// - `InvalidConfig` if either dimension is zero
/// - `InvalidBounds` if the rectangle is empty or not finite
///
/// # Example
///
/// ```
/// use planar_voronoi::*;
/// use glam::{DVec2, UVec2};
///
/// let sites = vec![DVec2::new(-1.0, 0.0), DVec2::new(1.0, 0.0)];
/// let rect = Rect::new(-5.0, -5.0, 10.0, 10.0);
/// let table = lookup_table(&sites, Some(rect), UVec2::new(4, 4), &DiagramConfig::default()).unwrap();
/// assert_eq!(table.len(), 16);
/// assert_eq!(&table[..4], &[0, 0, 1, 1]);
/// ```
pub fn lookup_table(sites: &[DVec2], bounds: Option<Rect>, dimension: UVec2, config: &DiagramConfig) -> Result<Vec<usize>> {
    check_sites(sites)?;
    config.validate()?;
    check_dimension(dimension)?;
    let rect = match bounds {
        Some(rect) => rect,
        None => auto_bounds(sites, config)?,
    };
    rect.validate()?;
    Ok(spatial::lookup_table(sites, &rect, dimension))
}

fn check_sites(sites: &[DVec2]) -> Result<()> {
    if sites.len() < 2 {
        return Err(VoronoiError::InsufficientSites(sites.len()));
    }
    Ok(())
}

fn check_dimension(dimension: UVec2) -> Result<()> {
    if dimension.x == 0 || dimension.y == 0 {
        return Err(VoronoiError::InvalidConfig(format!(
            "lookup table dimension must be non-zero (got {} x {})",
            dimension.x, dimension.y
        )));
    }
    Ok(())
}

fn auto_bounds(sites: &[DVec2], config: &DiagramConfig) -> Result<Rect> {
    let rect = Rect::from_points(sites, config.margin).ok_or(VoronoiError::InsufficientSites(0))?;
    rect.validate()?;
    Ok(rect)
}
