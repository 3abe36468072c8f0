use std::fmt::{Display, Formatter};

/// The threshold used when none is given: a tenth of the element must be on screen.
pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// An error produced while building a [`TrackerConfig`].
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The threshold was NaN or fell outside of `0.0..=1.0`.
    #[error("visibility threshold must be within 0.0..=1.0, got {0}")]
    ThresholdOutOfRange(f64),
}

/// Options for a single visibility subscription.
///
/// A tracker treats its config as immutable while a subscription is live. Handing it a config
/// that differs in either field releases the current watcher and creates a new one.
///
/// ```rust
/// use dioxus_visibility::TrackerConfig;
///
/// let config = TrackerConfig::default()
///     .with_threshold(0.5)
///     .unwrap()
///     .with_trigger_once(false);
///
/// assert_eq!(config.threshold(), 0.5);
/// assert!(!config.trigger_once());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialize",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "SerializedTrackerConfig")
)]
pub struct TrackerConfig {
    threshold: f64,
    trigger_once: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            trigger_once: true,
        }
    }
}

impl TrackerConfig {
    /// Create a new config, validating the threshold.
    pub fn new(threshold: f64, trigger_once: bool) -> Result<Self, ConfigError> {
        Ok(Self {
            threshold: validate_threshold(threshold)?,
            trigger_once,
        })
    }

    /// Replace the fraction of the element's area that has to be visible to count as intersecting.
    pub fn with_threshold(self, threshold: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            threshold: validate_threshold(threshold)?,
            ..self
        })
    }

    /// Stop watching after the element is seen for the first time.
    pub fn with_trigger_once(self, trigger_once: bool) -> Self {
        Self {
            trigger_once,
            ..self
        }
    }

    /// The fraction of the element's area that has to be visible, in `0.0..=1.0`.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether the subscription is dropped after the first intersecting notification.
    pub fn trigger_once(&self) -> bool {
        self.trigger_once
    }
}

impl Display for TrackerConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "threshold={} trigger_once={}",
            self.threshold, self.trigger_once
        )
    }
}

fn validate_threshold(threshold: f64) -> Result<f64, ConfigError> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(ConfigError::ThresholdOutOfRange(threshold))
    }
}

/// The wire shape of a [`TrackerConfig`]. Missing fields fall back to the defaults and the
/// threshold is validated on the way in.
#[cfg(feature = "serialize")]
#[derive(serde::Deserialize)]
#[serde(default)]
struct SerializedTrackerConfig {
    threshold: f64,
    trigger_once: bool,
}

#[cfg(feature = "serialize")]
impl Default for SerializedTrackerConfig {
    fn default() -> Self {
        let config = TrackerConfig::default();
        Self {
            threshold: config.threshold,
            trigger_once: config.trigger_once,
        }
    }
}

#[cfg(feature = "serialize")]
impl TryFrom<SerializedTrackerConfig> for TrackerConfig {
    type Error = ConfigError;

    fn try_from(value: SerializedTrackerConfig) -> Result<Self, Self::Error> {
        TrackerConfig::new(value.threshold, value.trigger_once)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_lazy_loading_use() {
        let config = TrackerConfig::default();
        assert_eq!(config.threshold(), 0.1);
        assert!(config.trigger_once());
    }

    #[test]
    fn threshold_bounds_are_inclusive() {
        assert!(TrackerConfig::new(0.0, true).is_ok());
        assert!(TrackerConfig::new(1.0, false).is_ok());
    }

    #[test]
    fn rejects_thresholds_outside_the_unit_range() {
        assert_eq!(
            TrackerConfig::new(1.5, true),
            Err(ConfigError::ThresholdOutOfRange(1.5))
        );
        assert_eq!(
            TrackerConfig::default().with_threshold(-0.01),
            Err(ConfigError::ThresholdOutOfRange(-0.01))
        );
        assert!(TrackerConfig::new(f64::NAN, true).is_err());
    }

    #[test]
    fn builder_keeps_the_other_field() {
        let config = TrackerConfig::default().with_trigger_once(false);
        assert_eq!(config.threshold(), DEFAULT_THRESHOLD);

        let config = config.with_threshold(0.75).unwrap();
        assert!(!config.trigger_once());
        assert_eq!(config.threshold(), 0.75);
    }
}
