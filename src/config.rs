//! Session configuration.
//!
//! All values are fixed for the lifetime of a session. Every field has a
//! default matching the reference deployment, so a YAML file only needs to
//! name what it changes:
//!
//! ```yaml
//! entry_line:
//!   start: { x: 170, y: 50 }
//!   end: { x: 260, y: 50 }
//! blocking_dwell_secs: 300
//! recognized_classes: [car, truck]
//! tracker:
//!   min_hits: 3
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::LineSegment;
use crate::tracker::TrackerConfig;
use crate::vehicle::VehicleClass;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub entry_line: LineSegment,
    pub exit_line: LineSegment,
    /// Detections must score strictly above this to reach the tracker.
    pub confidence_threshold: f32,
    pub recognized_classes: Vec<VehicleClass>,
    /// Seconds of continuous presence after which a track is blocking.
    ///
    /// The deployed value is 100 s even though its accompanying note speaks
    /// of five minutes; the number is kept as is and left to configuration.
    pub blocking_dwell_secs: f64,
    /// Process every n-th frame, starting with the first.
    pub frame_stride: u32,
    /// Evict records idle for longer than this, for trackers that never
    /// report retired identities.
    ///
    /// Must cover the tracker's lost-track window (see
    /// [`SessionConfig::lost_window_secs`]): a record evicted while its track
    /// is only temporarily lost restarts from a fresh baseline and could be
    /// counted again.
    pub record_ttl_secs: Option<f64>,
    pub tracker: TrackerConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            entry_line: LineSegment::new((170.0, 50.0), (260.0, 50.0)),
            exit_line: LineSegment::new((300.0, 50.0), (450.0, 50.0)),
            confidence_threshold: 0.5,
            recognized_classes: VehicleClass::RECOGNIZED.to_vec(),
            blocking_dwell_secs: 100.0,
            frame_stride: 4,
            record_ttl_secs: None,
            tracker: TrackerConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Read and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_line("entry", &self.entry_line)?;
        validate_line("exit", &self.exit_line)?;

        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::ConfidenceThreshold(self.confidence_threshold));
        }
        if self.recognized_classes.is_empty() {
            return Err(ConfigError::NoRecognizedClasses);
        }
        if self.recognized_classes.contains(&VehicleClass::Unknown) {
            return Err(ConfigError::UnknownClassRecognized);
        }
        validate_duration("blocking_dwell_secs", self.blocking_dwell_secs)?;
        if self.frame_stride == 0 {
            return Err(ConfigError::ZeroFrameStride);
        }
        if self.tracker.min_hits == 0 {
            return Err(ConfigError::ZeroMinHits);
        }
        if !(self.tracker.frame_rate.is_finite() && self.tracker.frame_rate > 0.0) {
            return Err(ConfigError::FrameRate(self.tracker.frame_rate));
        }
        if let Some(ttl) = self.record_ttl_secs {
            validate_duration("record_ttl_secs", ttl)?;
            let window = self.lost_window_secs();
            if ttl < window {
                return Err(ConfigError::RecordTtlTooShort { ttl, window });
            }
        }
        Ok(())
    }

    /// Seconds of input a lost track is kept before the tracker retires it.
    ///
    /// The tracker only sees admitted frames, so its frame budget is stretched
    /// by the stride; `tracker.frame_rate` is the input frame rate.
    pub fn lost_window_secs(&self) -> f64 {
        let frames = self.tracker.max_time_lost() as f64 * self.frame_stride as f64;
        frames / self.tracker.frame_rate as f64
    }

    pub fn is_recognized(&self, class: VehicleClass) -> bool {
        self.recognized_classes.contains(&class)
    }
}

fn validate_line(gate: &'static str, line: &LineSegment) -> Result<(), ConfigError> {
    if !line.start.is_finite() || !line.end.is_finite() {
        return Err(ConfigError::NonFiniteLine { gate });
    }
    if line.is_degenerate() {
        return Err(ConfigError::DegenerateLine {
            gate,
            x: line.start.x,
            y: line.start.y,
        });
    }
    Ok(())
}

fn validate_duration(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Duration { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SessionConfig::default();
        config.validate().unwrap();
        assert_eq!(config.blocking_dwell_secs, 100.0);
        assert_eq!(config.frame_stride, 4);
        assert_eq!(config.tracker.min_hits, 3);
        assert!(config.is_recognized(VehicleClass::Ambulance));
        assert!(!config.is_recognized(VehicleClass::Unknown));
    }

    #[test]
    fn test_degenerate_line_rejected() {
        let config = SessionConfig {
            exit_line: LineSegment::new((300.0, 50.0), (300.0, 50.0)),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DegenerateLine { gate: "exit", .. })
        ));
    }

    #[test]
    fn test_non_finite_line_rejected() {
        let config = SessionConfig {
            entry_line: LineSegment::new((f32::NAN, 50.0), (10.0, 50.0)),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFiniteLine { gate: "entry" })
        ));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let bad_conf = SessionConfig {
            confidence_threshold: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            bad_conf.validate(),
            Err(ConfigError::ConfidenceThreshold(_))
        ));

        let bad_dwell = SessionConfig {
            blocking_dwell_secs: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            bad_dwell.validate(),
            Err(ConfigError::Duration {
                name: "blocking_dwell_secs",
                ..
            })
        ));

        let no_stride = SessionConfig {
            frame_stride: 0,
            ..Default::default()
        };
        assert!(matches!(
            no_stride.validate(),
            Err(ConfigError::ZeroFrameStride)
        ));

        let bad_rate = SessionConfig {
            tracker: TrackerConfig {
                frame_rate: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(bad_rate.validate(), Err(ConfigError::FrameRate(_))));

        let unknown = SessionConfig {
            recognized_classes: vec![VehicleClass::Car, VehicleClass::Unknown],
            ..Default::default()
        };
        assert!(matches!(
            unknown.validate(),
            Err(ConfigError::UnknownClassRecognized)
        ));
    }

    #[test]
    fn test_record_ttl_must_cover_lost_window() {
        // 30 tracker frames at stride 4 of a 30 fps input.
        let config = SessionConfig::default();
        assert_eq!(config.lost_window_secs(), 4.0);

        let short = SessionConfig {
            record_ttl_secs: Some(2.0),
            ..Default::default()
        };
        assert!(matches!(
            short.validate(),
            Err(ConfigError::RecordTtlTooShort { ttl, window }) if ttl == 2.0 && window == 4.0
        ));

        let covering = SessionConfig {
            record_ttl_secs: Some(4.0),
            ..Default::default()
        };
        covering.validate().unwrap();
    }
}
