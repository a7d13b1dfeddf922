//! # PQC Classroom Visual Engine
//!
//! Renders the lattice sandbox as a static SVG: background grid, axes,
//! lattice points, both basis vectors, the target and the closest point
//! found by the brute-force search.
//!
//! Lattice coordinates map to the canvas with the origin in the centre and
//! y pointing up:
//!
//! ```text
//! x_canvas = width / 2  + x · scale
//! y_canvas = height / 2 − y · scale
//! ```

use std::path::Path;

use pqc_core::{closest_vector, lattice_points, Basis, ClosestPoint, Vec2};

/// Result type for visual operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from visual operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid canvas: {0}")]
    InvalidCanvas(String),

    #[error("Failed to write SVG: {0}")]
    Io(#[from] std::io::Error),
}

const GRID_COLOR: &str = "#e5e7eb";
const AXIS_COLOR: &str = "#9ca3af";
const POINT_COLOR: &str = "#1f2937";
const B1_COLOR: &str = "#2563eb";
const B2_COLOR: &str = "#16a34a";
const TARGET_COLOR: &str = "#dc2626";
const CLOSEST_COLOR: &str = "#0ea5e9";
const CONNECTOR_COLOR: &str = "#334155";

/// Everything drawn in one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatticeScene {
    pub basis: Basis,
    pub target: Vec2,
    pub closest: ClosestPoint,
}

impl LatticeScene {
    /// Build a scene, running the closest-vector search for `target`.
    pub fn new(basis: Basis, target: Vec2) -> Self {
        Self {
            basis,
            target,
            closest: closest_vector(&basis, target),
        }
    }
}

/// SVG renderer for lattice scenes
#[derive(Debug, Clone)]
pub struct LatticeRenderer {
    width: u32,
    height: u32,
    scale: u32,
    grid_radius: u32,
}

impl LatticeRenderer {
    /// Create a renderer. Draws the point grid for i, j ∈ [−10, 10] unless
    /// changed with [`with_grid_radius`](Self::with_grid_radius).
    pub fn new(width: u32, height: u32, scale: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidCanvas(format!("{width}x{height} has no area")));
        }
        if scale == 0 {
            return Err(Error::InvalidCanvas("scale must be positive".into()));
        }
        Ok(Self {
            width,
            height,
            scale,
            grid_radius: 10,
        })
    }

    pub fn with_grid_radius(mut self, radius: u32) -> Self {
        self.grid_radius = radius;
        self
    }

    /// Canvas position of a lattice-space vector
    pub fn to_canvas(&self, v: Vec2) -> (f64, f64) {
        let scale = self.scale as f64;
        (
            self.width as f64 / 2.0 + v.x as f64 * scale,
            self.height as f64 / 2.0 - v.y as f64 * scale,
        )
    }

    /// Render a scene to an SVG string
    pub fn render_svg(&self, scene: &LatticeScene) -> String {
        format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}">
  <rect width="100%" height="100%" fill="#ffffff"/>
  <g id="grid">
{grid}
  </g>
  <g id="axes">
{axes}
  </g>
  <g id="points">
{points}
  </g>
  <g id="basis">
{basis}
  </g>
  <g id="search">
{search}
  </g>
</svg>"##,
            w = self.width,
            h = self.height,
            grid = self.render_grid(),
            axes = self.render_axes(),
            points = self.render_points(&scene.basis),
            basis = self.render_basis(&scene.basis),
            search = self.render_search(scene),
        )
    }

    /// Render and write to `path`
    pub fn write_svg(&self, scene: &LatticeScene, path: &Path) -> Result<()> {
        std::fs::write(path, self.render_svg(scene))?;
        tracing::info!(path = %path.display(), "wrote lattice SVG");
        Ok(())
    }

    fn render_grid(&self) -> String {
        let step = self.scale as usize;
        let vertical = (0..=self.width).step_by(step).map(|x| {
            format!(
                r#"    <line x1="{x}" y1="0" x2="{x}" y2="{h}" stroke="{GRID_COLOR}" stroke-width="1"/>"#,
                h = self.height
            )
        });
        let horizontal = (0..=self.height).step_by(step).map(|y| {
            format!(
                r#"    <line x1="0" y1="{y}" x2="{w}" y2="{y}" stroke="{GRID_COLOR}" stroke-width="1"/>"#,
                w = self.width
            )
        });
        vertical.chain(horizontal).collect::<Vec<_>>().join("\n")
    }

    fn render_axes(&self) -> String {
        let cx = self.width as f64 / 2.0;
        let cy = self.height as f64 / 2.0;
        format!(
            r#"    <line x1="{cx:.1}" y1="0" x2="{cx:.1}" y2="{h}" stroke="{AXIS_COLOR}" stroke-width="1"/>
    <line x1="0" y1="{cy:.1}" x2="{w}" y2="{cy:.1}" stroke="{AXIS_COLOR}" stroke-width="1"/>"#,
            w = self.width,
            h = self.height,
        )
    }

    fn render_points(&self, basis: &Basis) -> String {
        lattice_points(basis, self.grid_radius)
            .map(|lp| {
                let (x, y) = self.to_canvas(lp.point);
                format!(r#"    <circle cx="{x:.1}" cy="{y:.1}" r="2" fill="{POINT_COLOR}"/>"#)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_basis(&self, basis: &Basis) -> String {
        let (ox, oy) = self.to_canvas(Vec2::ZERO);
        [(basis.b1, B1_COLOR), (basis.b2, B2_COLOR)]
            .iter()
            .map(|&(b, color)| {
                let (x, y) = self.to_canvas(b);
                format!(
                    r#"    <line x1="{ox:.1}" y1="{oy:.1}" x2="{x:.1}" y2="{y:.1}" stroke="{color}" stroke-width="2"/>"#
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_search(&self, scene: &LatticeScene) -> String {
        let (tx, ty) = self.to_canvas(scene.target);
        let (bx, by) = self.to_canvas(scene.closest.point);
        format!(
            r#"    <circle cx="{tx:.1}" cy="{ty:.1}" r="5" fill="{TARGET_COLOR}"/>
    <circle cx="{bx:.1}" cy="{by:.1}" r="5" fill="{CLOSEST_COLOR}"/>
    <line x1="{tx:.1}" y1="{ty:.1}" x2="{bx:.1}" y2="{by:.1}" stroke="{CONNECTOR_COLOR}" stroke-dasharray="4,4"/>"#
        )
    }
}
