//! Fluent builder for constructing an [`Environment`].

use std::path::PathBuf;

use av_comms::{ChannelConfig, ChannelHandle, ChannelModel};
use av_core::{Lla, SimConfig, WindProfile};

use crate::{Environment, SimResult};

/// Fluent builder for [`Environment`].
///
/// # Optional inputs (have defaults)
///
/// | Method              | Default                                 |
/// |---------------------|-----------------------------------------|
/// | `.channel(c)`       | `NoLoss` propagation, `Perfect` reception |
/// | `.wind(w)`          | Calm: `[(0, 0)]`                        |
/// | `.home(h)`          | Home of the first registered agent      |
/// | `.merge_fixes(p)`   | None                                    |
///
/// # Example
///
/// ```rust,ignore
/// let mut env = EnvironmentBuilder::new(config)
///     .channel(ChannelConfig { propagation: "FreeSpace".into(), ..Default::default() })
///     .wind(vec![(0.0, 5.0), (90.0, 10.0)].into())
///     .build()?;
/// ```
pub struct EnvironmentBuilder {
    config:      SimConfig,
    channel:     ChannelConfig,
    wind:        WindProfile,
    home:        Option<Lla>,
    merge_fixes: Option<PathBuf>,
}

impl EnvironmentBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            channel:     ChannelConfig::default(),
            wind:        WindProfile::default(),
            home:        None,
            merge_fixes: None,
        }
    }

    pub fn channel(mut self, channel: ChannelConfig) -> Self {
        self.channel = channel;
        self
    }

    pub fn wind(mut self, wind: WindProfile) -> Self {
        self.wind = wind;
        self
    }

    /// Fix the run's global home instead of taking the first agent's.
    pub fn home(mut self, home: Lla) -> Self {
        self.home = Some(home);
        self
    }

    pub fn merge_fixes(mut self, path: impl Into<PathBuf>) -> Self {
        self.merge_fixes = Some(path.into());
        self
    }

    /// Validate the configuration, build the shared channel and return an
    /// environment ready for registration.
    ///
    /// Unknown channel model names fail here; they are never replaced by a
    /// default.
    pub fn build(self) -> SimResult<Environment> {
        self.config.validate()?;
        let channel = ChannelHandle::new(ChannelModel::from_config(&self.channel, self.config.seed)?);
        Ok(Environment::new(self.config, channel, self.wind, self.home, self.merge_fixes))
    }
}
