use chrono::{DateTime, NaiveDate, NaiveTime};
use dioxus::prelude::*;
use serde::Deserialize;
use thiserror::Error;

use crate::countdown::{CountdownSettings, CountdownTarget, DurationStyle, HolidaySet, SchoolZone};
use crate::reveal::RevealEffect;

const DEFAULT_TARGET: &str = "2025-07-04T11:30:00+05:30";
const DEFAULT_SCHOOL_TIME: &str = "11:30:00";
const DEFAULT_HOLIDAYS: &[&str] = &["2025-07-06", "2025-07-15"];
const DEFAULT_ARRIVED: &str = "It's time! School has started! 🎉";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid countdown target `{value}`: {source}")]
    InvalidTarget {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("invalid school time `{value}`: {source}")]
    InvalidSchoolTime {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("invalid time zone `{value}`: {reason}")]
    InvalidTimezone { value: String, reason: String },
    #[error("invalid holiday `{value}`: {source}")]
    InvalidHoliday {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownMode {
    Fixed,
    #[default]
    School,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleName {
    Days,
    Hours,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CountdownConfig {
    pub mode: CountdownMode,
    pub target: String,
    pub school_time: String,
    pub holidays: Vec<String>,
    /// IANA zone name for the school time; the viewer's zone when absent.
    pub timezone: Option<String>,
    pub style: Option<StyleName>,
    pub arrived_message: String,
    pub hold_seconds: u32,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            mode: CountdownMode::default(),
            target: DEFAULT_TARGET.to_string(),
            school_time: DEFAULT_SCHOOL_TIME.to_string(),
            holidays: DEFAULT_HOLIDAYS.iter().map(|day| day.to_string()).collect(),
            timezone: None,
            style: None,
            arrived_message: DEFAULT_ARRIVED.to_string(),
            hold_seconds: 5,
        }
    }
}

impl CountdownConfig {
    pub fn settings(&self) -> Result<CountdownSettings, ConfigError> {
        let target = match self.mode {
            CountdownMode::Fixed => {
                let target = DateTime::parse_from_rfc3339(&self.target).map_err(|source| {
                    ConfigError::InvalidTarget {
                        value: self.target.clone(),
                        source,
                    }
                })?;
                CountdownTarget::Fixed(target)
            }
            CountdownMode::School => {
                let at = NaiveTime::parse_from_str(&self.school_time, "%H:%M:%S").map_err(
                    |source| ConfigError::InvalidSchoolTime {
                        value: self.school_time.clone(),
                        source,
                    },
                )?;
                let holidays = parse_holidays(&self.holidays)?;
                let zone = match self.timezone.as_deref().map(str::trim) {
                    None | Some("") => SchoolZone::Local,
                    Some(name) => SchoolZone::Named(name.parse().map_err(|err| {
                        ConfigError::InvalidTimezone {
                            value: name.to_string(),
                            reason: format!("{err}"),
                        }
                    })?),
                };
                CountdownTarget::School {
                    at,
                    holidays,
                    zone,
                }
            }
        };
        // School countdowns never span more than a long weekend, so hours read better.
        let style = match (self.style, self.mode) {
            (Some(StyleName::Days), _) => DurationStyle::DaysAndHours,
            (Some(StyleName::Hours), _) => DurationStyle::TotalHours,
            (None, CountdownMode::Fixed) => DurationStyle::DaysAndHours,
            (None, CountdownMode::School) => DurationStyle::TotalHours,
        };
        Ok(CountdownSettings {
            target,
            style,
            arrived_message: self.arrived_message.clone(),
            hold_ms: i64::from(self.hold_seconds) * 1_000,
        })
    }
}

pub fn parse_holidays<S: AsRef<str>>(days: &[S]) -> Result<HolidaySet, ConfigError> {
    days.iter()
        .map(|day| {
            let day = day.as_ref().trim();
            NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|source| {
                ConfigError::InvalidHoliday {
                    value: day.to_string(),
                    source,
                }
            })
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub name: String,
    pub countdown: CountdownConfig,
    pub theme_refresh_minutes: u32,
    pub storm: bool,
    /// Fade-and-scale card text instead of typing it out.
    pub fade_cards: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            name: "Reechita".to_string(),
            countdown: CountdownConfig::default(),
            theme_refresh_minutes: 10,
            storm: false,
            fade_cards: false,
        }
    }
}

impl RuntimeConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Falls back to the built-in countdown when the configured one does not parse.
    pub fn countdown_settings(&self) -> CountdownSettings {
        match self.countdown.settings() {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!("config: {err}, using default countdown");
                default_countdown()
            }
        }
    }

    pub fn card_effect(&self) -> RevealEffect {
        if self.fade_cards {
            RevealEffect::fade_scale()
        } else {
            RevealEffect::card_text()
        }
    }

    pub fn theme_refresh_ms(&self) -> i64 {
        i64::from(self.theme_refresh_minutes.max(1)) * 60_000
    }
}

fn default_countdown() -> CountdownSettings {
    let fallback = CountdownConfig::default();
    let at = NaiveTime::from_hms_opt(11, 30, 0).unwrap_or(NaiveTime::MIN);
    fallback.settings().unwrap_or(CountdownSettings {
        target: CountdownTarget::School {
            at,
            holidays: HolidaySet::default(),
            zone: SchoolZone::Local,
        },
        style: DurationStyle::TotalHours,
        arrived_message: fallback.arrived_message,
        hold_ms: 5_000,
    })
}

pub fn use_runtime_config() -> Resource<RuntimeConfig> {
    use_resource(|| async move { fetch_runtime_config().await })
}

#[cfg(target_arch = "wasm32")]
const CONFIG_PATHS: [&str; 2] = ["/config.json", "/assets/config.json"];

#[cfg(target_arch = "wasm32")]
async fn fetch_runtime_config() -> RuntimeConfig {
    let mut failures = Vec::new();
    for path in CONFIG_PATHS {
        match load_config(path).await {
            Ok(config) => return config,
            Err(reason) => failures.push(format!("{path}: {reason}")),
        }
    }
    tracing::warn!("config: {}; using defaults", failures.join("; "));
    RuntimeConfig::default()
}

#[cfg(target_arch = "wasm32")]
async fn load_config(path: &str) -> Result<RuntimeConfig, String> {
    let response = gloo_net::http::Request::get(path)
        .send()
        .await
        .map_err(|err| err.to_string())?;
    match response.status() {
        200..=299 => {}
        status => return Err(format!("HTTP {status}")),
    }
    let raw = response.text().await.map_err(|err| err.to_string())?;
    RuntimeConfig::from_json(&raw).map_err(|err| format!("bad JSON: {err}"))
}

#[cfg(not(target_arch = "wasm32"))]
async fn fetch_runtime_config() -> RuntimeConfig {
    let Ok(raw) = std::env::var("GREETING_CARD_CONFIG") else {
        return RuntimeConfig::default();
    };
    RuntimeConfig::from_json(&raw).unwrap_or_else(|err| {
        tracing::warn!("config: GREETING_CARD_CONFIG decode failed: {err}; using defaults");
        RuntimeConfig::default()
    })
}
