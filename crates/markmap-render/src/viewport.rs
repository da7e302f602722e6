use crate::model::Bounds;
use markmap_core::geom::{Point, Size, point};
use serde::{Deserialize, Serialize};

/// Pan/zoom applied to the diagram group: `screen = diagram * k + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    pub fn apply(&self, p: Point) -> Point {
        point(p.x * self.k + self.x, p.y * self.k + self.y)
    }

    pub fn invert(&self, p: Point) -> Point {
        point((p.x - self.x) / self.k, (p.y - self.y) / self.k)
    }
}

/// Scale and centering that show `bounds` inside `viewport`, filling `fit_ratio` of it.
///
/// Returns `None` while the viewport has no area yet (e.g. before the surface is laid out).
pub fn fit_transform(
    bounds: &Bounds,
    viewport: Size,
    fit_ratio: f64,
    max_scale: f64,
) -> Option<ViewTransform> {
    if !(viewport.width > 0.0 && viewport.height > 0.0) {
        return None;
    }
    let natural_w = bounds.width().max(1.0);
    let natural_h = bounds.height().max(1.0);
    let k = (viewport.width / natural_w * fit_ratio)
        .min(viewport.height / natural_h * fit_ratio)
        .min(max_scale);
    Some(ViewTransform {
        x: (viewport.width - natural_w * k) / 2.0 - bounds.min_x * k,
        y: (viewport.height - natural_h * k) / 2.0 - bounds.min_y * k,
        k,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use markmap_core::geom::size;

    fn bounds(w: f64, h: f64) -> Bounds {
        Bounds {
            min_x: 10.0,
            min_y: -20.0,
            max_x: 10.0 + w,
            max_y: -20.0 + h,
        }
    }

    #[test]
    fn fit_centers_and_scales_to_ratio() {
        let t = fit_transform(&bounds(200.0, 100.0), size(400.0, 400.0), 0.5, 10.0).unwrap();
        assert_eq!(t.k, 1.0);
        // Diagram corners land symmetric around the viewport center.
        let tl = t.apply(point(10.0, -20.0));
        let br = t.apply(point(210.0, 80.0));
        assert_eq!((tl.x + br.x) / 2.0, 200.0);
        assert_eq!((tl.y + br.y) / 2.0, 200.0);
    }

    #[test]
    fn fit_respects_max_scale() {
        let t = fit_transform(&bounds(10.0, 10.0), size(1000.0, 1000.0), 0.9, 2.0).unwrap();
        assert_eq!(t.k, 2.0);
    }

    #[test]
    fn zero_sized_viewport_cannot_fit() {
        assert!(fit_transform(&bounds(10.0, 10.0), size(0.0, 400.0), 0.9, 2.0).is_none());
    }

    #[test]
    fn invert_undoes_apply() {
        let t = ViewTransform {
            x: 12.0,
            y: -4.0,
            k: 2.0,
        };
        let p = point(3.0, 5.0);
        assert_eq!(t.invert(t.apply(p)), p);
    }
}
