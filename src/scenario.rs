//! # Scenario Catalogue
//!
//! Four interchangeable load shapes for the favorite endpoint. Each [`Scenario`] is an
//! ordered list of ramp [`Stage`]s plus the [`Threshold`]s the run is judged against.
//! Exactly one scenario is active per run, chosen through [`Profile`].
//!
//! | Profile  | Shape                                   | Peak users |
//! |----------|-----------------------------------------|------------|
//! | `smoke`  | 1m at 10 users                          | 10         |
//! | `load`   | ramp 50 → hold → ramp 100 → hold → 0    | 100        |
//! | `stress` | 100 → 200 → 300 → 400 → 0 over 8m       | 400        |
//! | `spike`  | 50, burst to 500, back to 50, then 0    | 500        |
//!
//! Stages map one-to-one onto Goose test-plan steps: each step ramps the user count
//! linearly to `target` over `duration`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Named load shape selecting one entry of the catalogue.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Verify the system works under minimal load
    Smoke,
    /// Normal load performance
    Load,
    /// Find the breaking point
    #[default]
    Stress,
    /// Sudden traffic increase
    Spike,
}

impl Profile {
    /// Every profile, in catalogue order.
    pub const ALL: [Profile; 4] = [
        Profile::Smoke,
        Profile::Load,
        Profile::Stress,
        Profile::Spike,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Profile::Smoke => "smoke",
            Profile::Load => "load",
            Profile::Stress => "stress",
            Profile::Spike => "spike",
        }
    }

    /// Build the stages and thresholds for this profile.
    pub fn scenario(self) -> Scenario {
        let (stages, thresholds) = match self {
            Profile::Smoke => (
                vec![Stage::new(mins(1), 10)],
                vec![
                    Threshold::duration(95, Duration::from_millis(500)),
                    Threshold::failed_rate(0.01),
                ],
            ),
            Profile::Load => (
                vec![
                    Stage::new(secs(30), 50),
                    Stage::new(mins(1), 50),
                    Stage::new(secs(30), 100),
                    Stage::new(mins(1), 100),
                    Stage::new(secs(30), 0),
                ],
                vec![
                    Threshold::duration(95, Duration::from_millis(1000)),
                    Threshold::duration(99, Duration::from_millis(2000)),
                    Threshold::failed_rate(0.05),
                ],
            ),
            Profile::Stress => (
                vec![
                    Stage::new(mins(1), 100),
                    Stage::new(mins(2), 200),
                    Stage::new(mins(2), 300),
                    Stage::new(mins(2), 400),
                    Stage::new(mins(1), 0),
                ],
                vec![
                    Threshold::duration(95, Duration::from_millis(2000)),
                    Threshold::failed_rate(0.1),
                ],
            ),
            Profile::Spike => (
                vec![
                    Stage::new(secs(10), 50),
                    Stage::new(mins(1), 50),
                    Stage::new(secs(10), 500),
                    Stage::new(mins(1), 500),
                    Stage::new(secs(10), 50),
                    Stage::new(mins(1), 50),
                    Stage::new(secs(10), 0),
                ],
                Vec::new(),
            ),
        };

        Scenario {
            profile: self,
            stages,
            thresholds,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Profile::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| ConfigError::InvalidProfile {
                value: s.to_string(),
            })
    }
}

/// One ramp segment: move to `target` virtual users over `duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    #[serde(with = "duration_secs")]
    pub duration: Duration,
    pub target: usize,
}

impl Stage {
    pub const fn new(duration: Duration, target: usize) -> Self {
        Self { duration, target }
    }
}

/// Pass condition over aggregated run metrics, judged in [`crate::verdict`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "metric", rename_all = "snake_case")]
pub enum Threshold {
    /// `http_req_duration`: the given percentile must stay below `max`
    Duration {
        percentile: u8,
        #[serde(rename = "max_ms", with = "duration_millis")]
        max: Duration,
    },
    /// `http_req_failed`: the failed-request ratio must stay below `max`
    FailedRate { max: f64 },
}

impl Threshold {
    pub const fn duration(percentile: u8, max: Duration) -> Self {
        Threshold::Duration { percentile, max }
    }

    pub const fn failed_rate(max: f64) -> Self {
        Threshold::FailedRate { max }
    }

    /// Metric the threshold applies to.
    pub fn metric(&self) -> &'static str {
        match self {
            Threshold::Duration { .. } => "http_req_duration",
            Threshold::FailedRate { .. } => "http_req_failed",
        }
    }

    /// Condition in the conventional `p(95)<2000` / `rate<0.1` notation.
    pub fn condition(&self) -> String {
        match self {
            Threshold::Duration { percentile, max } => {
                format!("p({})<{}", percentile, max.as_millis())
            }
            Threshold::FailedRate { max } => format!("rate<{}", max),
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.metric(), self.condition())
    }
}

/// Immutable stage schedule plus thresholds for a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub profile: Profile,
    pub stages: Vec<Stage>,
    pub thresholds: Vec<Threshold>,
}

impl Scenario {
    /// Sum of all stage durations.
    pub fn total_duration(&self) -> Duration {
        self.stages.iter().map(|s| s.duration).sum()
    }

    /// Highest virtual-user target reached by any stage.
    pub fn peak_users(&self) -> usize {
        self.stages.iter().map(|s| s.target).max().unwrap_or(0)
    }

    /// Render the stages as a Goose `--test-plan` (`"100,1m;200,2m;..."`).
    pub fn test_plan(&self) -> String {
        self.stages
            .iter()
            .map(|s| format!("{},{}", s.target, format_timespan(s.duration)))
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Whole minutes render as `Nm`, everything else as `Ns`.
fn format_timespan(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs > 0 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

const fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

const fn mins(n: u64) -> Duration {
    Duration::from_secs(n * 60)
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
