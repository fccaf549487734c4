//! Correlated, smoothed Gaussian noise for position and velocity reports.
//!
//! A vehicle's reported state is perturbed by
//!
//!   n_k = coeff * n_{k-1} + (1 - coeff) * L z,    z ~ N(0, I₃)
//!
//! where `L` is the lower Cholesky factor of the 3×3 covariance built from
//! the six `Uncertainty` entries.  Axes follow the local frame: x east,
//! y north, z up.

use rand_distr::{Distribution, StandardNormal};

use crate::{AvError, AvResult, SimRng};

/// Covariance entries (m² or m²/s²) plus the smoothing coefficient.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Uncertainty {
    pub xx: f64,
    pub yy: f64,
    pub zz: f64,
    pub xy: f64,
    pub xz: f64,
    pub yz: f64,
    pub coeff: f64,
}

impl Default for Uncertainty {
    fn default() -> Self {
        Self { xx: 0.0, yy: 0.0, zz: 0.0, xy: 0.0, xz: 0.0, yz: 0.0, coeff: 0.8 }
    }
}

impl Uncertainty {
    pub fn new(xx: f64, yy: f64, zz: f64, xy: f64, xz: f64, yz: f64, coeff: f64) -> Self {
        Self { xx, yy, zz, xy, xz, yz, coeff }
    }

    /// Lower-triangular Cholesky factor of the covariance.
    ///
    /// Zero-variance axes are allowed (their row is zero).  Fails when the
    /// matrix is not positive semi-definite.
    pub fn cholesky(&self) -> AvResult<[[f64; 3]; 3]> {
        const EPS: f64 = 1e-12;
        let a = [
            [self.xx, self.xy, self.xz],
            [self.xy, self.yy, self.yz],
            [self.xz, self.yz, self.zz],
        ];
        let mut l = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..=i {
                let sum: f64 = (0..j).map(|k| l[i][k] * l[j][k]).sum();
                if i == j {
                    let d = a[i][i] - sum;
                    if d < -EPS {
                        return Err(AvError::Config(format!(
                            "covariance is not positive semi-definite: {self:?}"
                        )));
                    }
                    l[i][j] = d.max(0.0).sqrt();
                } else if l[j][j] > EPS {
                    l[i][j] = (a[i][j] - sum) / l[j][j];
                } else if (a[i][j] - sum).abs() > EPS {
                    return Err(AvError::Config(format!(
                        "covariance is not positive semi-definite: {self:?}"
                    )));
                }
            }
        }
        Ok(l)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.xx == 0.0 && self.yy == 0.0 && self.zz == 0.0
    }
}

/// Stateful noise generator for one reported quantity of one vehicle.
#[derive(Clone, Debug)]
pub struct NoiseFilter {
    factor: [[f64; 3]; 3],
    coeff:  f64,
    state:  [f64; 3],
    rng:    SimRng,
}

impl NoiseFilter {
    pub fn new(uncertainty: Uncertainty, rng: SimRng) -> AvResult<Self> {
        if !(0.0..=1.0).contains(&uncertainty.coeff) {
            return Err(AvError::Config(format!(
                "smoothing coefficient must be in [0, 1], got {}",
                uncertainty.coeff
            )));
        }
        Ok(Self {
            factor: uncertainty.cholesky()?,
            coeff:  uncertainty.coeff,
            state:  [0.0; 3],
            rng,
        })
    }

    /// Draw the next smoothed noise sample.
    pub fn sample(&mut self) -> [f64; 3] {
        let z: [f64; 3] = [
            StandardNormal.sample(self.rng.inner()),
            StandardNormal.sample(self.rng.inner()),
            StandardNormal.sample(self.rng.inner()),
        ];
        for i in 0..3 {
            let n: f64 = (0..=i).map(|k| self.factor[i][k] * z[k]).sum();
            self.state[i] = self.coeff * self.state[i] + (1.0 - self.coeff) * n;
        }
        self.state
    }
}
