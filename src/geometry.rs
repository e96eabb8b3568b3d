//! World/screen coordinate spaces and the mapping between them.
//!
//! World coordinates are mathematical: y grows upward, headings are degrees
//! counterclockwise from east. Screen coordinates are raster: the origin at
//! the top-left, y growing downward. The two never mix outside [`WorldMap`];
//! the newtypes exist so the compiler enforces that.

use glam::DVec2;

/// A point in world (user) coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct WorldPoint(pub DVec2);

/// A point in screen (raster) coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ScreenPoint(pub DVec2);

pub fn wpt(x: f64, y: f64) -> WorldPoint {
    WorldPoint(DVec2::new(x, y))
}

pub fn spt(x: f64, y: f64) -> ScreenPoint {
    ScreenPoint(DVec2::new(x, y))
}

impl WorldPoint {
    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }
}

impl ScreenPoint {
    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }
}

/// Unit vector for a heading in degrees counterclockwise from east.
pub fn heading_vec(degrees: f64) -> DVec2 {
    let rad = degrees.to_radians();
    DVec2::new(rad.cos(), rad.sin())
}

/// The active world-to-screen mapping.
///
/// Constructed either centered (origin in the middle of the surface, one
/// world unit per pixel) or from explicit corner coordinates, which may
/// flip or stretch either axis independently.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldMap {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    scale_x: f64,
    scale_y: f64,
}

impl WorldMap {
    /// Map explicit world corners onto a `surface_w` x `surface_h` raster.
    pub fn new(
        left: f64,
        bottom: f64,
        right: f64,
        top: f64,
        surface_w: f64,
        surface_h: f64,
    ) -> WorldMap {
        WorldMap {
            left,
            right,
            top,
            bottom,
            scale_x: surface_w / (right - left),
            scale_y: surface_h / (top - bottom),
        }
    }

    /// The default mapping: origin centered, unit scale.
    pub fn centered(surface_w: f64, surface_h: f64) -> WorldMap {
        WorldMap::new(
            -surface_w / 2.0,
            -surface_h / 2.0,
            surface_w / 2.0,
            surface_h / 2.0,
            surface_w,
            surface_h,
        )
    }

    pub fn to_screen(&self, p: WorldPoint) -> ScreenPoint {
        spt(
            (p.x() - self.left) * self.scale_x,
            (self.top - p.y()) * self.scale_y,
        )
    }

    pub fn to_world(&self, p: ScreenPoint) -> WorldPoint {
        wpt(p.x() / self.scale_x + self.left, self.top - p.y() / self.scale_y)
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    pub fn scale_x(&self) -> f64 {
        self.scale_x
    }

    pub fn scale_y(&self) -> f64 {
        self.scale_y
    }

    /// Mean of the axis scale magnitudes, used for pen-width compensation.
    pub fn mean_scale(&self) -> f64 {
        (self.scale_x.abs() + self.scale_y.abs()) / 2.0
    }

    /// Larger of the axis scale magnitudes, used for saved-region margins.
    pub fn max_scale(&self) -> f64 {
        self.scale_x.abs().max(self.scale_y.abs())
    }

    pub fn same_bounds(&self, other: &WorldMap) -> bool {
        self.left == other.left
            && self.right == other.right
            && self.top == other.top
            && self.bottom == other.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_origin_maps_to_surface_middle() {
        let map = WorldMap::centered(400.0, 300.0);
        let s = map.to_screen(wpt(0.0, 0.0));
        assert_eq!(s, spt(200.0, 150.0));
        // y axis flips: world up is screen up
        let s = map.to_screen(wpt(0.0, 50.0));
        assert_eq!(s, spt(200.0, 100.0));
    }

    #[test]
    fn round_trip_through_screen() {
        let map = WorldMap::new(0.0, 0.0, 1000.0, 500.0, 400.0, 300.0);
        let w = wpt(250.0, 125.0);
        let back = map.to_world(map.to_screen(w));
        assert!((back.x() - w.x()).abs() < 1e-9);
        assert!((back.y() - w.y()).abs() < 1e-9);
    }

    #[test]
    fn asymmetric_bounds_scale_independently() {
        let map = WorldMap::new(-100.0, -50.0, 300.0, 100.0, 400.0, 300.0);
        assert_eq!(map.scale_x(), 1.0);
        assert_eq!(map.scale_y(), 2.0);
        assert_eq!(map.to_screen(wpt(-100.0, 100.0)), spt(0.0, 0.0));
        assert_eq!(map.to_screen(wpt(300.0, -50.0)), spt(400.0, 300.0));
    }

    #[test]
    fn heading_vectors() {
        let east = heading_vec(0.0);
        assert!((east.x - 1.0).abs() < 1e-12 && east.y.abs() < 1e-12);
        let north = heading_vec(90.0);
        assert!(north.x.abs() < 1e-12 && (north.y - 1.0).abs() < 1e-12);
    }
}
