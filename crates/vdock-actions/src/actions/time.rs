//! Clock faces: world clock, timer, countdown and stopwatch.
//!
//! Only the world clock is computed here. The other modes hand their
//! settings back for the client to animate.

use std::fmt::Display;

use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};
use serde_json::{json, Value};
use vdock_core::{ActionConfig, ActionResult};

use crate::error::ActionError;
use crate::handler::{title_case, ActionHandler};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClockMode {
    WorldClock,
    Timer,
    Countdown,
    Stopwatch,
}

impl ClockMode {
    const ALL: [ClockMode; 4] = [
        ClockMode::WorldClock,
        ClockMode::Timer,
        ClockMode::Countdown,
        ClockMode::Stopwatch,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClockMode::WorldClock => "world_clock",
            ClockMode::Timer => "timer",
            ClockMode::Countdown => "countdown",
            ClockMode::Stopwatch => "stopwatch",
        }
    }
}

/// Where the world clock reads its time from.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Zone {
    Local,
    Utc,
    Fixed(FixedOffset),
}

impl Zone {
    /// `local`, `UTC`, or a fixed `+HH:MM` / `-HH:MM` offset.
    fn parse(name: &str) -> Option<Self> {
        match name {
            "local" => return Some(Zone::Local),
            _ if name.eq_ignore_ascii_case("utc") || name == "Z" => return Some(Zone::Utc),
            _ => {}
        }

        let (sign, rest) = match name.as_bytes().first()? {
            b'+' => (1, &name[1..]),
            b'-' => (-1, &name[1..]),
            _ => return None,
        };
        let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
        let hours: i32 = hours.parse().ok()?;
        let minutes: i32 = minutes.parse().ok()?;
        if !(0..=14).contains(&hours) || !(0..60).contains(&minutes) {
            return None;
        }
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).map(Zone::Fixed)
    }
}

pub struct TimeAction {
    config: ActionConfig,
}

impl TimeAction {
    pub fn new(config: ActionConfig) -> Self {
        Self { config }
    }

    fn mode(&self) -> Result<ClockMode, ActionError> {
        match self.config.get("action_type") {
            None => Ok(ClockMode::WorldClock),
            Some(Value::String(name)) => ClockMode::parse(name).ok_or_else(|| {
                ActionError::InvalidConfig(format!("unknown time action {name}"))
            }),
            Some(other) => Err(ActionError::InvalidConfig(format!(
                "action_type must be a string, got {other}"
            ))),
        }
    }

    fn zone(&self) -> Result<(Zone, String), ActionError> {
        let name = match self.config.get("timezone") {
            None => "local",
            Some(Value::String(name)) => name.as_str(),
            Some(other) => {
                return Err(ActionError::InvalidConfig(format!(
                    "timezone must be a string, got {other}"
                )))
            }
        };
        let zone = Zone::parse(name)
            .ok_or_else(|| ActionError::InvalidConfig(format!("unsupported timezone {name}")))?;
        let label = match zone {
            Zone::Local => "Local Time".to_string(),
            _ => name.to_string(),
        };
        Ok((zone, label))
    }

    fn world_clock(&self) -> Result<ActionResult, ActionError> {
        let (zone, label) = self.zone()?;
        let font_size = self.config.get("font_size").cloned().unwrap_or(json!(1.0));
        let result = match zone {
            Zone::Local => clock_face(Local::now()),
            Zone::Utc => clock_face(Utc::now()),
            Zone::Fixed(offset) => clock_face(Utc::now().with_timezone(&offset)),
        };
        Ok(result
            .with_entry("timezone", label)
            .with_entry("font_size", font_size)
            .with_entry("display_type", ClockMode::WorldClock.as_str()))
    }

    fn client_mode(&self, mode: ClockMode) -> ActionResult {
        let result = match mode {
            ClockMode::Timer => {
                let duration = self.config.get("duration").cloned().unwrap_or(json!(300));
                ActionResult::ok("Timer ready").with_entry("duration", duration)
            }
            ClockMode::Countdown => {
                let target = self
                    .config
                    .get("target_time")
                    .filter(|t| !t.is_null() && t.as_str() != Some(""));
                match target {
                    Some(target) => {
                        ActionResult::ok("Countdown active").with_entry("target_time", target.clone())
                    }
                    None => return ActionResult::failure("Target time not specified for countdown"),
                }
            }
            _ => ActionResult::ok("Stopwatch ready"),
        };
        result
            .with_entry("display_type", mode.as_str())
            .with_entry("frontend_handled", true)
    }
}

fn clock_face<Tz: TimeZone>(now: DateTime<Tz>) -> ActionResult
where
    Tz::Offset: Display,
{
    let time = now.format("%H:%M:%S").to_string();
    ActionResult::ok(time.clone())
        .with_entry("time", time)
        .with_entry("date", now.format("%a, %b %d, %Y").to_string())
        .with_entry("timestamp", now.to_rfc3339())
}

impl ActionHandler for TimeAction {
    fn validate(&self) -> Result<(), ActionError> {
        if self.mode()? == ClockMode::WorldClock {
            self.zone()?;
        }
        Ok(())
    }

    fn execute(&self) -> ActionResult {
        match self.mode() {
            Ok(ClockMode::WorldClock) => self
                .world_clock()
                .unwrap_or_else(|e| ActionResult::failure(format!("Failed to get time: {e}"))),
            Ok(mode) => self.client_mode(mode),
            Err(e) => e.into(),
        }
    }

    fn describe(&self) -> String {
        let mode = self
            .config
            .get("action_type")
            .and_then(Value::as_str)
            .unwrap_or("world_clock");
        format!("Time: {}", title_case(mode))
    }
}
