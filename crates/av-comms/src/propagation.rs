//! Signal propagation models: transmitted power → received power.

use std::f64::consts::PI;

use av_core::Lla;
use serde::{Deserialize, Serialize};

use crate::{CommsError, CommsResult};

const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Link-budget parameters shared by every propagation model.
///
/// Defaults describe a 1090 MHz ADS-B link with a 125 W transmitter and
/// unity-gain antennas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationParams {
    pub tx_power_w:   f64,
    pub tx_gain:      f64,
    pub rx_gain:      f64,
    pub frequency_hz: f64,
    /// System loss factor, `>= 1`.
    pub system_loss:  f64,
    /// Lower bound on antenna height above ground for the two-ray model, m.
    pub min_antenna_height_m: f64,
}

impl Default for PropagationParams {
    fn default() -> Self {
        Self {
            tx_power_w:           125.0,
            tx_gain:              1.0,
            rx_gain:              1.0,
            frequency_hz:         1.09e9,
            system_loss:          1.0,
            min_antenna_height_m: 1.0,
        }
    }
}

impl PropagationParams {
    fn validate(&self, model: &'static str) -> CommsResult<()> {
        let positive = [
            ("tx_power_w", self.tx_power_w),
            ("tx_gain", self.tx_gain),
            ("rx_gain", self.rx_gain),
            ("frequency_hz", self.frequency_hz),
            ("min_antenna_height_m", self.min_antenna_height_m),
        ];
        for (name, v) in positive {
            if !(v.is_finite() && v > 0.0) {
                return Err(CommsError::InvalidParameter {
                    model,
                    reason: format!("{name} must be positive, got {v}"),
                });
            }
        }
        if !(self.system_loss >= 1.0) {
            return Err(CommsError::InvalidParameter {
                model,
                reason: format!("system_loss must be >= 1, got {}", self.system_loss),
            });
        }
        Ok(())
    }

    #[inline]
    fn wavelength(&self) -> f64 {
        SPEED_OF_LIGHT / self.frequency_hz
    }
}

/// How much of the transmitted power reaches a receiver.
#[derive(Clone, Debug, PartialEq)]
pub enum PropagationModel {
    /// Received power equals transmitted power at any range.
    NoLoss(PropagationParams),
    /// Friis free-space path loss.
    FreeSpace(PropagationParams),
    /// Friis up to the crossover distance, ground-reflection (d⁻⁴) beyond.
    TwoRayGround(PropagationParams),
}

impl Default for PropagationModel {
    fn default() -> Self {
        PropagationModel::NoLoss(PropagationParams::default())
    }
}

impl PropagationModel {
    /// Build a model from its configuration name.
    ///
    /// Unknown names are an error; there is no fallback model.
    pub fn from_name(name: &str, params: PropagationParams) -> CommsResult<Self> {
        let model = match name {
            "NoLoss"       => PropagationModel::NoLoss(params),
            "FreeSpace"    => PropagationModel::FreeSpace(params),
            "TwoRayGround" => PropagationModel::TwoRayGround(params),
            other => return Err(CommsError::UnknownPropagation(other.to_owned())),
        };
        model.params().validate(model.name())?;
        Ok(model)
    }

    pub fn name(&self) -> &'static str {
        match self {
            PropagationModel::NoLoss(_)       => "NoLoss",
            PropagationModel::FreeSpace(_)    => "FreeSpace",
            PropagationModel::TwoRayGround(_) => "TwoRayGround",
        }
    }

    pub fn params(&self) -> &PropagationParams {
        match self {
            PropagationModel::NoLoss(p)
            | PropagationModel::FreeSpace(p)
            | PropagationModel::TwoRayGround(p) => p,
        }
    }

    /// Received power in watts for a transmission from `tx` heard at `rx`.
    pub fn received_power_w(&self, tx: Lla, rx: Lla) -> f64 {
        // Ranges below one metre are clamped so the Friis term stays finite.
        let d = tx.distance_m(rx).max(1.0);
        match self {
            PropagationModel::NoLoss(p) => p.tx_power_w,
            PropagationModel::FreeSpace(p) => friis(p, d),
            PropagationModel::TwoRayGround(p) => {
                let ht = tx.alt.max(p.min_antenna_height_m);
                let hr = rx.alt.max(p.min_antenna_height_m);
                let crossover = 4.0 * PI * ht * hr / p.wavelength();
                if d <= crossover {
                    friis(p, d)
                } else {
                    p.tx_power_w * p.tx_gain * p.rx_gain * ht * ht * hr * hr
                        / (d.powi(4) * p.system_loss)
                }
            }
        }
    }
}

fn friis(p: &PropagationParams, d: f64) -> f64 {
    let lambda = p.wavelength();
    p.tx_power_w * p.tx_gain * p.rx_gain * lambda * lambda
        / ((4.0 * PI * d).powi(2) * p.system_loss)
}
