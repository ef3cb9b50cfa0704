use std::f64::consts::SQRT_2;
use std::fmt;

use thiserror::Error;

/// Subunits per logical pixel. Every stored coordinate is `pixels * UNIT`.
pub const UNIT: i32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("shape size must be non-negative, got {width}x{height}")]
    NegativeSize { width: i32, height: i32 },
    #[error("shape at ({x}, {y}) sized {width}x{height} overflows the coordinate range")]
    OutOfRange {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
}

/// Axis-aligned rectangle in subunits. `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    x: i32,
    y: i32,
    w: i32,
    h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Result<Self, ShapeError> {
        if w < 0 || h < 0 {
            return Err(ShapeError::NegativeSize {
                width: w,
                height: h,
            });
        }
        if x.checked_add(w).is_none() || y.checked_add(h).is_none() {
            return Err(ShapeError::OutOfRange {
                x,
                y,
                width: w,
                height: h,
            });
        }
        Ok(Self { x, y, w, h })
    }

    pub fn from_pixels(x: i32, y: i32, w: i32, h: i32) -> Result<Self, ShapeError> {
        match [x, y, w, h].map(|value| value.checked_mul(UNIT)) {
            [Some(sx), Some(sy), Some(sw), Some(sh)] => Self::new(sx, sy, sw, sh),
            _ => Err(ShapeError::OutOfRange {
                x,
                y,
                width: w,
                height: h,
            }),
        }
    }

    /// One-pixel rectangle at a pixel coordinate, pinned to the edge of the
    /// coordinate range when the pixel lies beyond it.
    pub fn unit_at(x_px: i32, y_px: i32) -> Self {
        let pin = |px: i32| px.saturating_mul(UNIT).clamp(i32::MIN, i32::MAX - UNIT);
        Self {
            x: pin(x_px),
            y: pin(y_px),
            w: UNIT,
            h: UNIT,
        }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn w(&self) -> i32 {
        self.w
    }

    pub fn h(&self) -> i32 {
        self.h
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Strict overlap: rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    pub fn to_pixels(&self) -> PixelRect {
        PixelRect {
            x: self.x.div_euclid(UNIT),
            y: self.y.div_euclid(UNIT),
            w: self.w.div_euclid(UNIT),
            h: self.h.div_euclid(UNIT),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

pub trait Shape: fmt::Debug {
    fn bounds(&self) -> Rect;
    fn translate(&mut self, dx: i32, dy: i32);

    fn width(&self) -> i32 {
        self.bounds().w()
    }

    fn height(&self) -> i32 {
        self.bounds().h()
    }

    fn overlaps(&self, other: &dyn Shape) -> bool {
        self.bounds().intersects(&other.bounds())
    }
}

impl Shape for Rect {
    fn bounds(&self) -> Rect {
        *self
    }

    fn translate(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelBounds {
    pub width_px: i32,
    pub height_px: i32,
}

impl LevelBounds {
    pub fn width(&self) -> i32 {
        self.width_px.saturating_mul(UNIT)
    }

    pub fn height(&self) -> i32 {
        self.height_px.saturating_mul(UNIT)
    }

    /// Positive and representable in subunits.
    pub fn is_valid(&self) -> bool {
        let fits = |px: i32| px > 0 && px.checked_mul(UNIT).is_some();
        fits(self.width_px) && fits(self.height_px)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn split(self, delta: i32) -> (i32, i32) {
        match self {
            Axis::X => (delta, 0),
            Axis::Y => (0, delta),
        }
    }
}

/// Divides both components by sqrt(2) when both are nonzero. The result is
/// truncated toward zero, so a diagonal is slightly slower than exact.
pub fn normalize_diagonal(ax: i32, ay: i32) -> (i32, i32) {
    if ax == 0 || ay == 0 {
        return (ax, ay);
    }
    ((ax as f64 / SQRT_2) as i32, (ay as f64 / SQRT_2) as i32)
}

/// Rescales `(vx, vy)` onto the `max` circle when its magnitude exceeds it.
pub fn clamp_magnitude(vx: i32, vy: i32, max: i32) -> (i32, i32) {
    if max <= 0 {
        return (0, 0);
    }
    let len_sq = vx as i64 * vx as i64 + vy as i64 * vy as i64;
    let max_sq = max as i64 * max as i64;
    if len_sq <= max_sq {
        return (vx, vy);
    }
    let scale = max as f64 / (len_sq as f64).sqrt();
    ((vx as f64 * scale) as i32, (vy as f64 * scale) as i32)
}

pub fn approach_zero(value: i32, step: i32) -> i32 {
    let step = step.max(0);
    if value > 0 {
        (value - step).max(0)
    } else {
        (value + step).min(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_sizes_are_rejected() {
        assert_eq!(
            Rect::new(0, 0, -1, 4),
            Err(ShapeError::NegativeSize {
                width: -1,
                height: 4
            })
        );
        assert!(Rect::new(0, 0, 0, 0).is_ok());
    }

    #[test]
    fn oversized_pixel_coordinates_are_rejected() {
        assert_eq!(
            Rect::from_pixels(200_000_000, 0, 16, 16),
            Err(ShapeError::OutOfRange {
                x: 200_000_000,
                y: 0,
                width: 16,
                height: 16
            })
        );
        assert!(matches!(
            Rect::new(i32::MAX - 4, 0, 8, 8),
            Err(ShapeError::OutOfRange { .. })
        ));
        assert!(Rect::from_pixels(i32::MAX / UNIT - 16, 0, 16, 16).is_ok());
    }

    #[test]
    fn unit_rect_is_pinned_inside_the_coordinate_range() {
        let far = Rect::unit_at(i32::MAX, i32::MIN);
        assert_eq!(far.right(), i32::MAX);
        assert_eq!(far.y(), i32::MIN);
        assert_eq!(Rect::unit_at(3, -2), Rect::new(48, -32, 16, 16).expect("unit"));
    }

    #[test]
    fn level_bounds_saturate_instead_of_overflowing() {
        let huge = LevelBounds {
            width_px: i32::MAX,
            height_px: 100,
        };
        assert_eq!(huge.width(), i32::MAX);
        assert_eq!(huge.height(), 100 * UNIT);
        assert!(!huge.is_valid());
        assert!(LevelBounds {
            width_px: 320,
            height_px: 240
        }
        .is_valid());
        assert!(!LevelBounds {
            width_px: 0,
            height_px: 240
        }
        .is_valid());
    }

    #[test]
    fn pixel_view_floors_negative_coordinates() {
        let rect = Rect::new(-1, 17, 40, 16).expect("rect");
        assert_eq!(
            rect.to_pixels(),
            PixelRect {
                x: -1,
                y: 1,
                w: 2,
                h: 1
            }
        );
    }

    #[test]
    fn shared_edges_do_not_intersect() {
        let a = Rect::from_pixels(0, 0, 16, 16).expect("a");
        let touching = Rect::from_pixels(16, 0, 16, 16).expect("touching");
        let overlapping = Rect::from_pixels(15, 15, 4, 4).expect("overlapping");

        assert!(!a.intersects(&touching));
        assert!(a.intersects(&overlapping));
        assert!(overlapping.intersects(&a));
    }

    #[test]
    fn diagonal_normalization_truncates() {
        assert_eq!(normalize_diagonal(10, 0), (10, 0));
        assert_eq!(normalize_diagonal(0, -10), (0, -10));
        assert_eq!(normalize_diagonal(10, 10), (7, 7));
        assert_eq!(normalize_diagonal(-10, 10), (-7, 7));
    }

    #[test]
    fn clamp_magnitude_keeps_direction() {
        let (vx, vy) = clamp_magnitude(300, 400, 50);
        assert_eq!((vx, vy), (30, 40));

        let (vx, vy) = clamp_magnitude(-90, 0, 32);
        assert_eq!((vx, vy), (-32, 0));

        assert_eq!(clamp_magnitude(3, 4, 5), (3, 4));
    }

    #[test]
    fn clamp_magnitude_stays_within_truncation_tolerance() {
        for (vx, vy) in [(77, 13), (-120, 55), (31, -31), (1000, -999)] {
            let (cx, cy) = clamp_magnitude(vx, vy, 40);
            let len = ((cx * cx + cy * cy) as f64).sqrt();
            assert!(len <= 40.0 && len >= 38.0, "len {len} for ({vx},{vy})");
            assert_eq!(cx.signum(), vx.signum());
            assert_eq!(cy.signum(), vy.signum());
        }
    }

    #[test]
    fn approach_zero_never_crosses() {
        assert_eq!(approach_zero(5, 2), 3);
        assert_eq!(approach_zero(1, 2), 0);
        assert_eq!(approach_zero(-5, 2), -3);
        assert_eq!(approach_zero(-1, 4), 0);
        assert_eq!(approach_zero(0, 4), 0);
    }
}
