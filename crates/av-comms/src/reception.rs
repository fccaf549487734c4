//! Reception models: received power → delivered or lost.

use av_core::SimRng;
use rand_distr::{Distribution, Gamma};
use serde::{Deserialize, Serialize};

use crate::{CommsError, CommsResult};

/// Parameters for the reception models.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceptionParams {
    /// Receiver sensitivity, watts.  Default: -84 dBm.
    pub threshold_w: f64,
    /// Nakagami shape parameter `m` (`m = 1` is Rayleigh fading).
    pub m: f64,
}

impl Default for ReceptionParams {
    fn default() -> Self {
        Self {
            threshold_w: 3.98e-12,
            m:           1.0,
        }
    }
}

/// Decides whether a message arriving with a given power is decoded.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum ReceptionModel {
    /// Every message is received.
    #[default]
    Perfect,
    /// Received iff the mean received power reaches the threshold.
    Deterministic { threshold_w: f64 },
    /// Rayleigh fading: received with probability `exp(-threshold / power)`.
    Rayleigh { threshold_w: f64 },
    /// Nakagami-m fading: instantaneous power is Gamma(m, power / m).
    Nakagami { m: f64, threshold_w: f64 },
}

impl ReceptionModel {
    /// Build a model from its configuration name.
    ///
    /// Unknown names are an error; there is no fallback model.
    pub fn from_name(name: &str, params: &ReceptionParams) -> CommsResult<Self> {
        let model = match name {
            "Perfect"       => ReceptionModel::Perfect,
            "Deterministic" => ReceptionModel::Deterministic { threshold_w: params.threshold_w },
            "Rayleigh"      => ReceptionModel::Rayleigh { threshold_w: params.threshold_w },
            "Nakagami"      => ReceptionModel::Nakagami {
                m:           params.m,
                threshold_w: params.threshold_w,
            },
            other => return Err(CommsError::UnknownReception(other.to_owned())),
        };
        if !matches!(model, ReceptionModel::Perfect)
            && !(params.threshold_w.is_finite() && params.threshold_w >= 0.0)
        {
            return Err(CommsError::InvalidParameter {
                model:  model.name(),
                reason: format!("threshold_w must be non-negative, got {}", params.threshold_w),
            });
        }
        if let ReceptionModel::Nakagami { m, .. } = model {
            // m < 0.5 is outside the Nakagami family.
            if !(m >= 0.5 && m.is_finite()) {
                return Err(CommsError::InvalidParameter {
                    model:  "Nakagami",
                    reason: format!("m must be >= 0.5, got {m}"),
                });
            }
        }
        Ok(model)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ReceptionModel::Perfect            => "Perfect",
            ReceptionModel::Deterministic { .. } => "Deterministic",
            ReceptionModel::Rayleigh { .. }    => "Rayleigh",
            ReceptionModel::Nakagami { .. }    => "Nakagami",
        }
    }

    /// Decide whether a message received with mean power `power_w` decodes.
    pub fn receives(&self, power_w: f64, rng: &mut SimRng) -> bool {
        match *self {
            ReceptionModel::Perfect => true,
            ReceptionModel::Deterministic { threshold_w } => power_w >= threshold_w,
            ReceptionModel::Rayleigh { threshold_w } => {
                if power_w <= 0.0 {
                    return false;
                }
                rng.gen_bool((-threshold_w / power_w).exp())
            }
            ReceptionModel::Nakagami { m, threshold_w } => {
                if power_w <= 0.0 {
                    return false;
                }
                match Gamma::new(m, power_w / m) {
                    Ok(fading) => fading.sample(rng.inner()) >= threshold_w,
                    Err(_) => false,
                }
            }
        }
    }
}
