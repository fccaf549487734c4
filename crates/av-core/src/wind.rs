//! Wind vectors and the per-tick wind profile.

/// A wind vector: the direction the wind blows *from* (degrees clockwise from
/// north) and its speed in m/s.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Wind {
    pub from_deg: f64,
    pub speed_mps: f64,
}

impl Wind {
    pub const CALM: Wind = Wind { from_deg: 0.0, speed_mps: 0.0 };

    #[inline]
    pub const fn new(from_deg: f64, speed_mps: f64) -> Self {
        Self { from_deg, speed_mps }
    }

    /// Air-mass velocity as (east, north) components.  Wind from the north
    /// pushes vehicles south.
    pub fn drift_en(self) -> (f64, f64) {
        let from = self.from_deg.to_radians();
        (-self.speed_mps * from.sin(), -self.speed_mps * from.cos())
    }
}

impl From<(f64, f64)> for Wind {
    fn from((from_deg, speed_mps): (f64, f64)) -> Self {
        Wind::new(from_deg, speed_mps)
    }
}

/// Wind vectors indexed by tick count.
///
/// Lookups past the end of the sequence return the last entry, so the
/// profile never runs out.  An empty profile is calm everywhere.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct WindProfile {
    entries: Vec<Wind>,
}

impl Default for WindProfile {
    fn default() -> Self {
        Self { entries: vec![Wind::CALM] }
    }
}

impl WindProfile {
    pub fn new(entries: Vec<Wind>) -> Self {
        Self { entries }
    }

    /// Wind at tick `count`, clamped to the last entry.
    pub fn at(&self, count: u64) -> Wind {
        let Some(last) = self.entries.len().checked_sub(1) else {
            return Wind::CALM;
        };
        let i = usize::try_from(count).map_or(last, |c| c.min(last));
        self.entries[i]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<(f64, f64)>> for WindProfile {
    fn from(v: Vec<(f64, f64)>) -> Self {
        WindProfile::new(v.into_iter().map(Wind::from).collect())
    }
}
