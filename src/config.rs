//! Pad and publish configuration parsed from environment variables.
//!
//! Unset variables fall back to the defaults in [`crate::consts`]. A variable
//! that is set but does not parse is an error rather than a silent default.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;
use std::time::Duration;

use crate::consts::{DEFAULT_FRAME_CAP, DEFAULT_FRAME_INTERVAL_MS, HANDLE_RADIUS_PX, MAX_SCALE, MIN_SCALE};
use crate::geom::ScaleLimits;
use crate::hit::HitSlop;

pub const DEFAULT_PUBLISH_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PUBLISH_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set to something that does not parse.
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },

    #[error("scale range is empty or not positive: min {min}, max {max}")]
    ScaleRange { min: f64, max: f64 },

    #[error("{key} must be at least 1")]
    Zero { key: String },

    /// `PAD_PUBLISH_TOKEN_ENV` names a variable that is not set.
    #[error("missing publish token: env var {var} not set")]
    MissingToken { var: String },
}

/// Editing-core settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PadConfig {
    pub scale_limits: ScaleLimits,
    pub frame_cap: usize,
    pub handle_radius_px: f64,
    pub frame_interval_ms: u64,
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            scale_limits: ScaleLimits { min: MIN_SCALE, max: MAX_SCALE },
            frame_cap: DEFAULT_FRAME_CAP,
            handle_radius_px: HANDLE_RADIUS_PX,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
        }
    }
}

impl PadConfig {
    /// Build typed pad config from environment variables.
    ///
    /// Optional:
    /// - `PAD_MIN_SCALE`: default 0.25
    /// - `PAD_MAX_SCALE`: default 3.0
    /// - `PAD_FRAME_CAP`: default 50
    /// - `PAD_HANDLE_RADIUS_PX`: default 12
    /// - `PAD_FRAME_INTERVAL_MS`: default 800
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a variable does not parse or the
    /// resulting values are inconsistent.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            scale_limits: ScaleLimits {
                min: env_parse("PAD_MIN_SCALE", MIN_SCALE)?,
                max: env_parse("PAD_MAX_SCALE", MAX_SCALE)?,
            },
            frame_cap: env_parse("PAD_FRAME_CAP", DEFAULT_FRAME_CAP)?,
            handle_radius_px: env_parse("PAD_HANDLE_RADIUS_PX", HANDLE_RADIUS_PX)?,
            frame_interval_ms: env_parse("PAD_FRAME_INTERVAL_MS", DEFAULT_FRAME_INTERVAL_MS)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a non-positive or inverted scale range,
    /// a zero frame cap, or a non-positive handle radius.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ScaleLimits { min, max } = self.scale_limits;
        if !min.is_finite() || !max.is_finite() || min <= 0.0 || min > max {
            return Err(ConfigError::ScaleRange { min, max });
        }
        if self.frame_cap == 0 {
            return Err(ConfigError::Zero { key: "PAD_FRAME_CAP".into() });
        }
        if !self.handle_radius_px.is_finite() || self.handle_radius_px <= 0.0 {
            return Err(ConfigError::Invalid {
                key: "PAD_HANDLE_RADIUS_PX".into(),
                value: self.handle_radius_px.to_string(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn hit_slop(&self) -> HitSlop {
        HitSlop { handle_radius_px: self.handle_radius_px, ..HitSlop::default() }
    }

    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

/// Where and how to send the publish payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishConfig {
    /// Backend base URL without a trailing slash.
    pub base_url: String,
    pub token: Option<String>,
    pub timeouts: PublishTimeouts,
}

impl PublishConfig {
    /// Build publish config from environment variables. Returns `None` when
    /// `PAD_PUBLISH_URL` is unset.
    ///
    /// Optional:
    /// - `PAD_PUBLISH_TOKEN_ENV`: names the env var holding a bearer token
    /// - `PAD_PUBLISH_TIMEOUT_SECS`: default 30
    /// - `PAD_PUBLISH_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the token variable is named but unset,
    /// or a timeout does not parse.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let Ok(raw_url) = std::env::var("PAD_PUBLISH_URL") else {
            return Ok(None);
        };
        let base_url = raw_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ConfigError::Invalid { key: "PAD_PUBLISH_URL".into(), value: raw_url });
        }

        let token = match std::env::var("PAD_PUBLISH_TOKEN_ENV") {
            Ok(var) => match std::env::var(&var) {
                Ok(token) => Some(token),
                Err(_) => return Err(ConfigError::MissingToken { var }),
            },
            Err(_) => None,
        };

        let timeouts = PublishTimeouts {
            request_secs: env_parse("PAD_PUBLISH_TIMEOUT_SECS", DEFAULT_PUBLISH_REQUEST_TIMEOUT_SECS)?,
            connect_secs: env_parse("PAD_PUBLISH_CONNECT_TIMEOUT_SECS", DEFAULT_PUBLISH_CONNECT_TIMEOUT_SECS)?,
        };

        Ok(Some(Self { base_url, token, timeouts }))
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(value) => Ok(value),
        Err(_) => Err(ConfigError::Invalid { key: key.to_string(), value: raw }),
    }
}
