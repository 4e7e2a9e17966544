//! Geographic helpers for the fleet map.
//!
//! Positions are projected with spherical Web Mercator into "world" units where
//! the whole map spans [0, 1] on both axes (x grows east, y grows south). A
//! `MapProjection` fits a set of bounds into a pixel viewport.

use std::f64::consts::PI;

/// Latitude limit of the square Web Mercator world.
pub const MERCATOR_MAX_LAT_DEG: f64 = 85.051_128_779_806_59;

/// Span used when all positions collapse onto a single point.
const MIN_SPAN_DEG: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    /// Smallest bounds containing every point, or `None` for no points.
    pub fn from_points<I>(points: I) -> Option<GeoBounds>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut iter = points.into_iter();
        let (lat, lon) = iter.next()?;
        let mut b = GeoBounds {
            south: lat,
            west: lon,
            north: lat,
            east: lon,
        };
        for (lat, lon) in iter {
            b.south = b.south.min(lat);
            b.north = b.north.max(lat);
            b.west = b.west.min(lon);
            b.east = b.east.max(lon);
        }
        Some(b)
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.south && lat <= self.north && lon >= self.west && lon <= self.east
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.south + self.north) / 2.0, (self.west + self.east) / 2.0)
    }

    /// Grow each side by `fraction` of the span, enforcing a minimum span so a
    /// single point still gets a usable viewport.
    pub fn padded(&self, fraction: f64) -> GeoBounds {
        let lat_span = (self.north - self.south).max(MIN_SPAN_DEG);
        let lon_span = (self.east - self.west).max(MIN_SPAN_DEG);
        let (c_lat, c_lon) = self.center();
        let half_lat = lat_span * (0.5 + fraction);
        let half_lon = lon_span * (0.5 + fraction);
        GeoBounds {
            south: (c_lat - half_lat).max(-MERCATOR_MAX_LAT_DEG),
            north: (c_lat + half_lat).min(MERCATOR_MAX_LAT_DEG),
            west: (c_lon - half_lon).max(-180.0),
            east: (c_lon + half_lon).min(180.0),
        }
    }
}

/// Longitude to world x in [0, 1].
pub fn mercator_x(lon_deg: f64) -> f64 {
    (lon_deg + 180.0) / 360.0
}

/// Latitude to world y in [0, 1], clamped to the Mercator limit.
pub fn mercator_y(lat_deg: f64) -> f64 {
    let lat = lat_deg
        .clamp(-MERCATOR_MAX_LAT_DEG, MERCATOR_MAX_LAT_DEG)
        .to_radians();
    (0.5 - (0.25 * PI + 0.5 * lat).tan().ln() / (2.0 * PI)).clamp(0.0, 1.0)
}

pub fn inverse_mercator_lon(x: f64) -> f64 {
    x * 360.0 - 180.0
}

pub fn inverse_mercator_lat(y: f64) -> f64 {
    let n = PI * (1.0 - 2.0 * y);
    n.sinh().atan().to_degrees()
}

/// Maps lat/lon to viewport pixels for a fixed viewport size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapProjection {
    /// World coordinate drawn at the viewport center.
    center_x: f64,
    center_y: f64,
    /// Pixels per world unit.
    scale: f64,
    pub width_px: f64,
    pub height_px: f64,
}

impl MapProjection {
    /// Fit `bounds` into a `width_px` x `height_px` viewport, keeping the aspect
    /// ratio and leaving `padding_px` on every side.
    pub fn fit(
        bounds: &GeoBounds,
        width_px: f64,
        height_px: f64,
        padding_px: f64,
    ) -> MapProjection {
        let x0 = mercator_x(bounds.west);
        let x1 = mercator_x(bounds.east);
        let y0 = mercator_y(bounds.north);
        let y1 = mercator_y(bounds.south);
        let world_w = (x1 - x0).max(f64::EPSILON);
        let world_h = (y1 - y0).max(f64::EPSILON);
        let usable_w = (width_px - 2.0 * padding_px).max(1.0);
        let usable_h = (height_px - 2.0 * padding_px).max(1.0);
        let scale = (usable_w / world_w).min(usable_h / world_h);
        MapProjection {
            center_x: (x0 + x1) / 2.0,
            center_y: (y0 + y1) / 2.0,
            scale,
            width_px,
            height_px,
        }
    }

    /// Lat/lon to viewport pixels.
    pub fn project(&self, lat: f64, lon: f64) -> (f64, f64) {
        let x = self.width_px / 2.0 + (mercator_x(lon) - self.center_x) * self.scale;
        let y = self.height_px / 2.0 + (mercator_y(lat) - self.center_y) * self.scale;
        (x, y)
    }

    /// Viewport pixels back to lat/lon.
    pub fn unproject(&self, x_px: f64, y_px: f64) -> (f64, f64) {
        let wx = self.center_x + (x_px - self.width_px / 2.0) / self.scale;
        let wy = self.center_y + (y_px - self.height_px / 2.0) / self.scale;
        let lat = inverse_mercator_lat(wy.clamp(0.0, 1.0));
        let lon = inverse_mercator_lon(wx.clamp(0.0, 1.0));
        (lat, lon)
    }

    /// Geographic bounds visible after a CSS `translate(pan) scale(zoom)` of the
    /// projected layer.
    pub fn visible_bounds(&self, zoom: f64, pan_x: f64, pan_y: f64) -> GeoBounds {
        let zoom = zoom.max(f64::EPSILON);
        let left = -pan_x / zoom;
        let top = -pan_y / zoom;
        let right = (self.width_px - pan_x) / zoom;
        let bottom = (self.height_px - pan_y) / zoom;
        let (north, west) = self.unproject(left, top);
        let (south, east) = self.unproject(right, bottom);
        GeoBounds {
            south,
            west,
            north,
            east,
        }
    }

    /// Pick a graticule step (degrees) giving a handful of lines across the
    /// view at the given zoom.
    pub fn graticule_step(&self, zoom: f64) -> f64 {
        let (north, west) = self.unproject(0.0, 0.0);
        let (south, east) = self.unproject(self.width_px, self.height_px);
        let span = (east - west).abs().max((north - south).abs()) / zoom.max(1.0);
        const STEPS: [f64; 9] = [0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0];
        STEPS
            .iter()
            .copied()
            .find(|s| span / s <= 8.0)
            .unwrap_or(30.0)
    }
}

/// Great-circle distance in meters.
pub fn haversine_m(a: (f64, f64), b: (f64, f64)) -> f64 {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;
    let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Format a coordinate pair as `52.37403, 4.88969`.
pub fn format_lat_lon(lat: f64, lon: f64) -> String {
    format!("{:.5}, {:.5}", lat, lon)
}

/// Compass label for a course in degrees.
pub fn course_label(course: f64) -> &'static str {
    const LABELS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let idx = ((course.rem_euclid(360.0) + 22.5) / 45.0) as usize % 8;
    LABELS[idx]
}
