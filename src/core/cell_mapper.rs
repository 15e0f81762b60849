//! Pointer → terminal cell mapping for grids drawn onto transformed surfaces.
//!
//! Mapping runs in two stages:
//!
//! 1. A [`RayIntersector`] resolves a viewport point into the surface's own UV space
//!    (`u, v ∈ [0, 1]`, origin bottom-left). This is where rotation, scale and perspective are
//!    undone; a 3D engine raycast, [`PlanarProjection`] or [`QuadProjection`] can fill the role.
//! 2. [`CellMapper`] applies linear grid math to the UV point: the nominal canvas is `W × H`
//!    abstract pixels with a padding inset `P` on every side, split into the live grid size.
//!
//! The second stage never sees the viewport, so it is testable without any renderer.

use crate::core::surface::{CellAddress, GridDimensions};

const DEGENERATE_EPSILON: f64 = 1e-12;

/// A point in the embedding viewport, in pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportPoint {
    pub x: f64,
    pub y: f64,
}

impl ViewportPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Normalized surface coordinate, origin bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceUv {
    pub u: f64,
    pub v: f64,
}

impl SurfaceUv {
    pub fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }

    fn is_on_surface(&self) -> bool {
        self.u.is_finite()
            && self.v.is_finite()
            && (0.0..=1.0).contains(&self.u)
            && (0.0..=1.0).contains(&self.v)
    }
}

/// Nominal size of the canvas the terminal content is laid out on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasGeometry {
    pub width: f64,
    pub height: f64,
    /// Inset on all four sides between the canvas edge and the first cell.
    pub padding: f64,
}

impl CanvasGeometry {
    pub fn new(width: f64, height: f64, padding: f64) -> Self {
        Self {
            width,
            height,
            padding,
        }
    }

    pub fn content_width(&self) -> f64 {
        self.width - self.padding * 2.0
    }

    pub fn content_height(&self) -> f64 {
        self.height - self.padding * 2.0
    }
}

impl Default for CanvasGeometry {
    fn default() -> Self {
        Self::new(1024.0, 768.0, 50.0)
    }
}

/// How a fractional cell coordinate becomes an integer cell index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisRounding {
    /// `round(x + 0.5)`: centering bias, then round-half-away-from-zero.
    BiasedNearest,
    /// `round(x)`.
    Nearest,
    /// `floor(x)`: the cell whose top/left edge precedes the point.
    Floor,
}

impl AxisRounding {
    pub fn apply(self, raw: f64) -> f64 {
        match self {
            AxisRounding::BiasedNearest => (raw + 0.5).round(),
            AxisRounding::Nearest => raw.round(),
            AxisRounding::Floor => raw.floor(),
        }
    }
}

/// Resolves a viewport point against the proxy surface the terminal is displayed on.
pub trait RayIntersector {
    /// `None` when the point misses the surface.
    fn intersect(&self, point: ViewportPoint) -> Option<SurfaceUv>;
}

impl<F> RayIntersector for F
where
    F: Fn(ViewportPoint) -> Option<SurfaceUv>,
{
    fn intersect(&self, point: ViewportPoint) -> Option<SurfaceUv> {
        self(point)
    }
}

/// Grid math from surface UV to cell address.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMapper {
    geometry: CanvasGeometry,
    column_rounding: AxisRounding,
    row_rounding: AxisRounding,
}

impl CellMapper {
    /// Columns snap to the nearer cell center, rows to the cell whose top edge precedes the point.
    pub fn new(geometry: CanvasGeometry) -> Self {
        Self {
            geometry,
            column_rounding: AxisRounding::BiasedNearest,
            row_rounding: AxisRounding::Floor,
        }
    }

    pub fn with_rounding(mut self, column: AxisRounding, row: AxisRounding) -> Self {
        self.column_rounding = column;
        self.row_rounding = row;
        self
    }

    pub fn geometry(&self) -> CanvasGeometry {
        self.geometry
    }

    /// Canvas position of a UV point; `v` is flipped because canvas content runs top-down.
    pub fn local_position(&self, uv: SurfaceUv) -> (f64, f64) {
        (uv.u * self.geometry.width, (1.0 - uv.v) * self.geometry.height)
    }

    /// `(cell_width, cell_height)` for the given grid, `None` for an empty grid or canvas.
    pub fn cell_size(&self, dims: GridDimensions) -> Option<(f64, f64)> {
        if dims.is_empty() {
            return None;
        }
        let cell_width = self.geometry.content_width() / dims.cols as f64;
        let cell_height = self.geometry.content_height() / dims.rows as f64;
        if cell_width <= 0.0 || cell_height <= 0.0 {
            return None;
        }
        Some((cell_width, cell_height))
    }

    /// Map a surface UV hit to a cell, clamped to the grid.
    ///
    /// `dims` must be queried live from the surface; `None` (surface not fitted) yields no cell.
    pub fn map_uv(&self, uv: SurfaceUv, dims: Option<GridDimensions>) -> Option<CellAddress> {
        let dims = dims?;
        if !uv.is_on_surface() {
            return None;
        }
        let (cell_width, cell_height) = self.cell_size(dims)?;
        let (local_x, local_y) = self.local_position(uv);
        let padding = self.geometry.padding;

        let col = self.column_rounding.apply((local_x - padding) / cell_width);
        let row = self.row_rounding.apply((local_y - padding) / cell_height);

        Some(CellAddress {
            col: clamp_index(col, dims.cols),
            row: clamp_index(row, dims.rows),
        })
    }

    /// Both stages: project the viewport point, then apply the grid math.
    pub fn map_pointer(
        &self,
        intersector: &dyn RayIntersector,
        point: ViewportPoint,
        dims: Option<GridDimensions>,
    ) -> Option<CellAddress> {
        let uv = intersector.intersect(point)?;
        self.map_uv(uv, dims)
    }

    /// UV of a cell's center, for debug overlays and for embedders that synthesize pointers.
    pub fn cell_center_uv(&self, cell: CellAddress, dims: GridDimensions) -> Option<SurfaceUv> {
        if !dims.contains(cell) {
            return None;
        }
        let (cell_width, cell_height) = self.cell_size(dims)?;
        let padding = self.geometry.padding;
        let local_x = padding + (cell.col as f64 + 0.5) * cell_width;
        let local_y = padding + (cell.row as f64 + 0.5) * cell_height;
        Some(SurfaceUv {
            u: local_x / self.geometry.width,
            v: 1.0 - local_y / self.geometry.height,
        })
    }
}

impl Default for CellMapper {
    fn default() -> Self {
        Self::new(CanvasGeometry::default())
    }
}

fn clamp_index(value: f64, len: usize) -> usize {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    (value as usize).min(len.saturating_sub(1))
}

/// An axis-aligned rectangle in the viewport showing the whole surface unwarped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarProjection {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlanarProjection {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

impl RayIntersector for PlanarProjection {
    fn intersect(&self, point: ViewportPoint) -> Option<SurfaceUv> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        let uv = SurfaceUv {
            u: (point.x - self.left) / self.width,
            v: 1.0 - (point.y - self.top) / self.height,
        };
        uv.is_on_surface().then_some(uv)
    }
}

/// The surface as a perspective-projected quadrilateral in the viewport.
///
/// Corners are the on-screen positions of the surface's top-left, top-right, bottom-right and
/// bottom-left. Points are pulled back through the inverse of the square-to-quad homography.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadProjection {
    inverse: [[f64; 3]; 3],
}

impl QuadProjection {
    /// `None` when the corners are degenerate (collinear or coincident).
    pub fn new(corners: [ViewportPoint; 4]) -> Option<Self> {
        let forward = square_to_quad(corners)?;
        let inverse = adjugate(&forward);
        let det = forward[0][0] * inverse[0][0]
            + forward[0][1] * inverse[1][0]
            + forward[0][2] * inverse[2][0];
        if det.abs() < DEGENERATE_EPSILON {
            return None;
        }
        Some(Self { inverse })
    }
}

impl RayIntersector for QuadProjection {
    fn intersect(&self, point: ViewportPoint) -> Option<SurfaceUv> {
        let m = &self.inverse;
        let s = m[0][0] * point.x + m[0][1] * point.y + m[0][2];
        let t = m[1][0] * point.x + m[1][1] * point.y + m[1][2];
        let w = m[2][0] * point.x + m[2][1] * point.y + m[2][2];
        if w.abs() < DEGENERATE_EPSILON {
            return None;
        }
        let uv = SurfaceUv {
            u: snap_unit(s / w),
            v: snap_unit(1.0 - t / w),
        };
        uv.is_on_surface().then_some(uv)
    }
}

/// Absorb rounding noise from the inverse transform at the surface edges.
fn snap_unit(value: f64) -> f64 {
    const EDGE_TOLERANCE: f64 = 1e-9;
    if (-EDGE_TOLERANCE..0.0).contains(&value) {
        0.0
    } else if value > 1.0 && value <= 1.0 + EDGE_TOLERANCE {
        1.0
    } else {
        value
    }
}

/// Homography taking the unit square (s right, t down) onto the quad.
fn square_to_quad(corners: [ViewportPoint; 4]) -> Option<[[f64; 3]; 3]> {
    let [p0, p1, p2, p3] = corners;
    let dx1 = p1.x - p2.x;
    let dx2 = p3.x - p2.x;
    let dx3 = p0.x - p1.x + p2.x - p3.x;
    let dy1 = p1.y - p2.y;
    let dy2 = p3.y - p2.y;
    let dy3 = p0.y - p1.y + p2.y - p3.y;

    let (g, h) = if dx3.abs() < DEGENERATE_EPSILON && dy3.abs() < DEGENERATE_EPSILON {
        (0.0, 0.0)
    } else {
        let den = dx1 * dy2 - dx2 * dy1;
        if den.abs() < DEGENERATE_EPSILON {
            return None;
        }
        (
            (dx3 * dy2 - dx2 * dy3) / den,
            (dx1 * dy3 - dx3 * dy1) / den,
        )
    };

    Some([
        [p1.x - p0.x + g * p1.x, p3.x - p0.x + h * p3.x, p0.x],
        [p1.y - p0.y + g * p1.y, p3.y - p0.y + h * p3.y, p0.y],
        [g, h, 1.0],
    ])
}

fn adjugate(m: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    [
        [
            m[1][1] * m[2][2] - m[1][2] * m[2][1],
            m[0][2] * m[2][1] - m[0][1] * m[2][2],
            m[0][1] * m[1][2] - m[0][2] * m[1][1],
        ],
        [
            m[1][2] * m[2][0] - m[1][0] * m[2][2],
            m[0][0] * m[2][2] - m[0][2] * m[2][0],
            m[0][2] * m[1][0] - m[0][0] * m[1][2],
        ],
        [
            m[1][0] * m[2][1] - m[1][1] * m[2][0],
            m[0][1] * m[2][0] - m[0][0] * m[2][1],
            m[0][0] * m[1][1] - m[0][1] * m[1][0],
        ],
    ]
}
