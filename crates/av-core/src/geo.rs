//! Geodetic and local Cartesian coordinate types.
//!
//! Three representations are used throughout the simulator:
//!
//! - [`Lla`]: WGS-84 latitude / longitude in degrees, altitude in metres.
//! - [`Ned`]: a velocity (or offset) in the local tangent plane,
//!   north / east / down, metres (per second).
//! - [`Xyz`]: a position in a local Cartesian frame anchored at some origin:
//!   `x` east, `y` north, `z` up, metres.
//!
//! [`LocalFrame`] converts between `Lla` and `Xyz` using an equirectangular
//! projection about the frame origin.  At the tens-of-kilometres scale of an
//! urban air-mobility scenario the error is well under a metre.

use std::fmt;

/// Mean Earth radius, metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

// ── Lla ───────────────────────────────────────────────────────────────────────

/// A geodetic position.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lla {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
}

impl Lla {
    #[inline]
    pub const fn new(lat: f64, lon: f64, alt: f64) -> Self {
        Self { lat, lon, alt }
    }

    /// `true` when every component is (almost) zero, the value vehicles
    /// report before their first state update.
    #[inline]
    pub fn is_null(self) -> bool {
        self.lat.abs() + self.lon.abs() + self.alt.abs() < 1e-3
    }

    /// Haversine great-circle distance in metres, ignoring altitude.
    pub fn horizontal_distance_m(self, other: Lla) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Slant range in metres (great-circle distance combined with the
    /// altitude difference).
    pub fn distance_m(self, other: Lla) -> f64 {
        self.horizontal_distance_m(other).hypot(other.alt - self.alt)
    }

    #[inline]
    pub fn to_array(self) -> [f64; 3] {
        [self.lat, self.lon, self.alt]
    }
}

impl From<[f64; 3]> for Lla {
    fn from(v: [f64; 3]) -> Self {
        Lla::new(v[0], v[1], v[2])
    }
}

impl fmt::Display for Lla {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.7}, {:.7}, {:.1} m)", self.lat, self.lon, self.alt)
    }
}

// ── Ned ───────────────────────────────────────────────────────────────────────

/// North / east / down components, metres or metres per second.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ned {
    pub north: f64,
    pub east: f64,
    pub down: f64,
}

impl Ned {
    #[inline]
    pub const fn new(north: f64, east: f64, down: f64) -> Self {
        Self { north, east, down }
    }

    /// Decompose a track angle (degrees clockwise from north), ground speed
    /// and climb rate into NED components.
    pub fn from_track(track_deg: f64, speed: f64, climb_rate: f64) -> Self {
        let trk = track_deg.to_radians();
        Self {
            north: speed * trk.cos(),
            east:  speed * trk.sin(),
            down:  -climb_rate,
        }
    }

    /// Horizontal speed.
    #[inline]
    pub fn ground_speed(self) -> f64 {
        self.north.hypot(self.east)
    }

    #[inline]
    pub fn to_array(self) -> [f64; 3] {
        [self.north, self.east, self.down]
    }
}

impl From<[f64; 3]> for Ned {
    fn from(v: [f64; 3]) -> Self {
        Ned::new(v[0], v[1], v[2])
    }
}

// ── Xyz ───────────────────────────────────────────────────────────────────────

/// A position in a local Cartesian frame: `x` east, `y` north, `z` up.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Xyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Xyz {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Polar placement: `range` metres along `bearing_deg` (clockwise from
    /// north) at height `z`.
    pub fn from_polar(range: f64, bearing_deg: f64, z: f64) -> Self {
        let brg = bearing_deg.to_radians();
        Self {
            x: range * brg.sin(),
            y: range * brg.cos(),
            z,
        }
    }

    /// The same vector expressed as north / east / down.
    #[inline]
    pub fn to_ned(self) -> Ned {
        Ned::new(self.y, self.x, -self.z)
    }

    #[inline]
    pub fn from_ned(v: Ned) -> Self {
        Self::new(v.east, v.north, -v.down)
    }

    #[inline]
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl std::ops::Add for Xyz {
    type Output = Xyz;
    #[inline]
    fn add(self, rhs: Xyz) -> Xyz {
        Xyz::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Mul<f64> for Xyz {
    type Output = Xyz;
    #[inline]
    fn mul(self, k: f64) -> Xyz {
        Xyz::new(self.x * k, self.y * k, self.z * k)
    }
}

// ── LocalFrame ────────────────────────────────────────────────────────────────

/// An equirectangular local tangent frame anchored at `origin`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LocalFrame {
    pub origin: Lla,
}

impl LocalFrame {
    #[inline]
    pub fn new(origin: Lla) -> Self {
        Self { origin }
    }

    /// Project a geodetic position into this frame.
    pub fn to_local(&self, p: Lla) -> Xyz {
        let lat0 = self.origin.lat.to_radians();
        let d_lat = (p.lat - self.origin.lat).to_radians();
        let d_lon = (p.lon - self.origin.lon).to_radians();
        Xyz {
            x: EARTH_RADIUS_M * d_lon * lat0.cos(),
            y: EARTH_RADIUS_M * d_lat,
            z: p.alt - self.origin.alt,
        }
    }

    /// Inverse of [`to_local`][Self::to_local].
    pub fn to_lla(&self, p: Xyz) -> Lla {
        let lat0 = self.origin.lat.to_radians();
        let lat = self.origin.lat + (p.y / EARTH_RADIUS_M).to_degrees();
        let lon = if lat0.cos().abs() < 1e-12 {
            self.origin.lon
        } else {
            self.origin.lon + (p.x / (EARTH_RADIUS_M * lat0.cos())).to_degrees()
        };
        Lla::new(lat, lon, self.origin.alt + p.z)
    }
}
