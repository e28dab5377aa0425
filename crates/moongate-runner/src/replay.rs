//! Scripted host sessions: a TOML list of host events with timestamps,
//! fed into the driver as if a live client produced them.
//!
//! ```toml
//! run_for_ms = 3000
//! scripts = ["guard_caller"]
//!
//! [[events]]
//! at_ms = 0
//! event = { type = "journal_line", text = "Welcome to the shard" }
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use moongate_events::HostEvent;
use serde::Deserialize;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::error::DriverError;

/// How long a replay keeps ticking after its last event, unless told otherwise
pub const DEFAULT_TAIL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Scripts to launch before the first event
    #[serde(default)]
    pub scripts: Vec<String>,
    /// Total run time measured from the start; defaults to the last event plus one second
    #[serde(default)]
    pub run_for_ms: Option<u64>,
    #[serde(default)]
    pub events: Vec<ScenarioEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioEvent {
    /// Offset from the start of the replay
    pub at_ms: u64,
    pub event: HostEvent,
}

impl Scenario {
    pub fn parse(content: &str) -> Result<Self, DriverError> {
        let scenario: Scenario = toml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: &Path) -> Result<Self, DriverError> {
        if !path.exists() {
            return Err(DriverError::ScenarioNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|source| DriverError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scenario = Self::parse(&content)?;
        info!(
            "Loaded scenario {} ({} event(s))",
            path.display(),
            scenario.events.len()
        );
        Ok(scenario)
    }

    fn validate(&self) -> Result<(), DriverError> {
        for (index, pair) in self.events.windows(2).enumerate() {
            if pair[1].at_ms < pair[0].at_ms {
                return Err(DriverError::OutOfOrder { index: index + 1 });
            }
        }
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        match self.run_for_ms {
            Some(ms) => Duration::from_millis(ms),
            None => {
                let last = self.events.last().map(|e| e.at_ms).unwrap_or(0);
                Duration::from_millis(last) + DEFAULT_TAIL
            }
        }
    }
}

/// Send each event at its offset, then signal shutdown once the scenario's
/// duration has passed.
///
/// Returns how many events were delivered; stops early if the driver is gone.
pub async fn replay(
    scenario: Scenario,
    event_tx: mpsc::UnboundedSender<HostEvent>,
    shutdown_tx: watch::Sender<bool>,
) -> usize {
    let start = tokio::time::Instant::now();
    let end = start + scenario.duration();
    let mut delivered = 0;

    for entry in scenario.events {
        tokio::time::sleep_until(start + Duration::from_millis(entry.at_ms)).await;
        debug!("Replaying event at {}ms", entry.at_ms);
        if event_tx.send(entry.event).is_err() {
            info!("Driver went away, ending replay early");
            return delivered;
        }
        delivered += 1;
    }

    tokio::time::sleep_until(end).await;
    info!("Replay finished after {} event(s)", delivered);
    let _ = shutdown_tx.send(true);
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use moongate_events::{Serial, TargetResult, TargetSession};

    const SCENARIO: &str = r#"
scripts = ["guard_caller", "fish_mover"]

[[events]]
at_ms = 0
event = { type = "player_updated", mobile = { serial = 1, graphic = 400, location = { x = 100, y = 200 } } }

[[events]]
at_ms = 250
event = { type = "journal_line", text = "You see: a troll" }

[[events]]
at_ms = 900
event = { type = "target_result", session = 3, result = { kind = "object", serial = 66 } }
"#;

    #[test]
    fn test_parse_scenario() {
        let scenario = Scenario::parse(SCENARIO).unwrap();

        assert_eq!(scenario.scripts, vec!["guard_caller", "fish_mover"]);
        assert_eq!(scenario.events.len(), 3);
        assert_eq!(scenario.events[1].event, HostEvent::journal("You see: a troll"));
        assert_eq!(
            scenario.events[2].event,
            HostEvent::TargetResult {
                session: TargetSession(3),
                result: TargetResult::Object { serial: Serial(66) },
            }
        );
        assert_eq!(scenario.duration(), Duration::from_millis(1900));
    }

    #[test]
    fn test_explicit_duration_wins() {
        let scenario = Scenario::parse("run_for_ms = 5000").unwrap();
        assert!(scenario.events.is_empty());
        assert_eq!(scenario.duration(), Duration::from_secs(5));
    }

    #[test]
    fn test_out_of_order_events_are_rejected() {
        let content = r#"
[[events]]
at_ms = 500
event = { type = "journal_line", text = "second" }

[[events]]
at_ms = 100
event = { type = "journal_line", text = "first" }
"#;
        assert!(matches!(
            Scenario::parse(content),
            Err(DriverError::OutOfOrder { index: 1 })
        ));
    }

    #[test]
    fn test_unknown_event_type_is_parse_error() {
        let content = r#"
[[events]]
at_ms = 0
event = { type = "teleport" }
"#;
        assert!(matches!(Scenario::parse(content), Err(DriverError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(
            Scenario::load(&path),
            Err(DriverError::ScenarioNotFound(p)) if p == path
        ));
    }
}
