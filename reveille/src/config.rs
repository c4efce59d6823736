//! Daemon configuration from `REVEILLE_*` environment variables.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::alarm::AlarmConfig;
use crate::dispatch::DEFAULT_DISPATCH_TIMEOUT;
use crate::error::{Error, Result};
use crate::input::DEFAULT_DEBOUNCE;
use crate::types::AlarmTime;

pub const ENV_TICK_MS: &str = "REVEILLE_TICK_MS";
pub const ENV_DEBOUNCE_MS: &str = "REVEILLE_DEBOUNCE_MS";
pub const ENV_ALARM: &str = "REVEILLE_ALARM";
pub const ENV_ALARM_ENABLED: &str = "REVEILLE_ALARM_ENABLED";
pub const ENV_DISPATCH_TIMEOUT_SECS: &str = "REVEILLE_DISPATCH_TIMEOUT_SECS";
pub const ENV_AUTO_DISMISS: &str = "REVEILLE_AUTO_DISMISS";
pub const ENV_API_ADDR: &str = "REVEILLE_API_ADDR";
pub const ENV_MESSAGE_URL: &str = "REVEILLE_MESSAGE_URL";
pub const ENV_SPEAK_COMMAND: &str = "REVEILLE_SPEAK_COMMAND";
pub const ENV_BUTTON_HOLD_MS: &str = "REVEILLE_BUTTON_HOLD_MS";

/// Port the API listens on by default.
pub const DEFAULT_API_PORT: u16 = 7790;

#[derive(Debug, Clone, PartialEq)]
pub struct ClockConfig {
    /// Polling interval. Every tick reads buttons, checks the alarm, and
    /// redraws, so keep it well under a second.
    pub tick: Duration,

    /// Raw button levels must hold this long to count.
    pub debounce: Duration,

    /// Alarm time and armed flag at startup. Not persisted.
    pub alarm: AlarmConfig,

    /// Bound on fetching and delivering one wake-up message.
    pub dispatch_timeout: Duration,

    /// Return to idle as soon as a dispatch finishes, instead of ringing
    /// until silenced.
    pub auto_dismiss: bool,

    pub api_addr: SocketAddr,

    /// Plain-text endpoint for the wake-up message. Built-in greetings
    /// are used when unset.
    pub message_url: Option<String>,

    /// Text-to-speech command line. Messages are only logged when unset.
    pub speak_command: Option<String>,

    /// How long a virtual (keyboard/API) press holds the raw level.
    pub button_hold: Duration,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            debounce: DEFAULT_DEBOUNCE,
            alarm: AlarmConfig::default(),
            dispatch_timeout: DEFAULT_DISPATCH_TIMEOUT,
            auto_dismiss: false,
            api_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_API_PORT)),
            message_url: None,
            speak_command: None,
            button_hold: Duration::from_millis(120),
        }
    }
}

impl ClockConfig {
    /// Read the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Unset or blank variables
    /// keep their defaults; anything else must parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(ms) = parse::<u64>(ENV_TICK_MS, get(ENV_TICK_MS))? {
            if ms == 0 {
                return Err(Error::config(ENV_TICK_MS, "must be positive"));
            }
            config.tick = Duration::from_millis(ms);
        }
        if let Some(ms) = parse::<u64>(ENV_DEBOUNCE_MS, get(ENV_DEBOUNCE_MS))? {
            config.debounce = Duration::from_millis(ms);
        }
        if let Some(time) = get(ENV_ALARM) {
            config.alarm.time = time.parse::<AlarmTime>()?;
        }
        if let Some(enabled) = get(ENV_ALARM_ENABLED) {
            config.alarm.enabled = parse_bool(ENV_ALARM_ENABLED, &enabled)?;
        }
        if let Some(secs) =
            parse::<u64>(ENV_DISPATCH_TIMEOUT_SECS, get(ENV_DISPATCH_TIMEOUT_SECS))?
        {
            config.dispatch_timeout = Duration::from_secs(secs);
        }
        if let Some(auto) = get(ENV_AUTO_DISMISS) {
            config.auto_dismiss = parse_bool(ENV_AUTO_DISMISS, &auto)?;
        }
        if let Some(addr) = parse::<SocketAddr>(ENV_API_ADDR, get(ENV_API_ADDR))? {
            config.api_addr = addr;
        }
        config.message_url = get(ENV_MESSAGE_URL).map(|v| v.trim().to_string());
        config.speak_command = get(ENV_SPEAK_COMMAND).map(|v| v.trim().to_string());
        if let Some(ms) = parse::<u64>(ENV_BUTTON_HOLD_MS, get(ENV_BUTTON_HOLD_MS))? {
            config.button_hold = Duration::from_millis(ms);
        }

        config.validate()?;
        Ok(config)
    }

    /// Virtual presses are sampled once per tick; the press must still be
    /// held on the first sample past the debounce window.
    fn validate(&self) -> Result<()> {
        let ticks_to_confirm = self.debounce.as_nanos().div_ceil(self.tick.as_nanos()).max(1);
        let needed = self.tick.as_nanos() * ticks_to_confirm;
        if self.button_hold.as_nanos() <= needed {
            return Err(Error::config(
                ENV_BUTTON_HOLD_MS,
                format!(
                    "{:?} is too short to survive a {:?} debounce at a {:?} tick",
                    self.button_hold, self.debounce, self.tick
                ),
            ));
        }
        Ok(())
    }
}

fn parse<T>(key: &'static str, value: Option<String>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|e| Error::config(key, format!("{v:?}: {e}")))
        })
        .transpose()
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::config(key, format!("{other:?} is not a boolean"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use test_case::test_case;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<ClockConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClockConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(from_pairs(&[]).unwrap(), ClockConfig::default());
    }

    #[test]
    fn defaults_match_hardware_behaviour() {
        let config = ClockConfig::default();
        assert_eq!(config.tick, Duration::from_millis(100));
        assert_eq!(config.debounce, Duration::from_millis(50));
        assert_eq!(config.alarm.time, AlarmTime::new(7, 30).unwrap());
        assert!(config.alarm.enabled);
        assert!(!config.auto_dismiss);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reads_every_variable() {
        let config = from_pairs(&[
            (ENV_TICK_MS, "50"),
            (ENV_DEBOUNCE_MS, "30"),
            (ENV_ALARM, "06:45"),
            (ENV_ALARM_ENABLED, "off"),
            (ENV_DISPATCH_TIMEOUT_SECS, "4"),
            (ENV_AUTO_DISMISS, "yes"),
            (ENV_API_ADDR, "0.0.0.0:8080"),
            (ENV_MESSAGE_URL, " http://news.local/today "),
            (ENV_SPEAK_COMMAND, "espeak -s 140"),
            (ENV_BUTTON_HOLD_MS, "200"),
        ])
        .unwrap();

        assert_eq!(config.tick, Duration::from_millis(50));
        assert_eq!(config.debounce, Duration::from_millis(30));
        assert_eq!(config.alarm.time, AlarmTime::new(6, 45).unwrap());
        assert!(!config.alarm.enabled);
        assert_eq!(config.dispatch_timeout, Duration::from_secs(4));
        assert!(config.auto_dismiss);
        assert_eq!(config.api_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.message_url.as_deref(), Some("http://news.local/today"));
        assert_eq!(config.speak_command.as_deref(), Some("espeak -s 140"));
        assert_eq!(config.button_hold, Duration::from_millis(200));
    }

    #[test]
    fn blank_values_keep_defaults() {
        let config = from_pairs(&[(ENV_ALARM, "  "), (ENV_MESSAGE_URL, "")]).unwrap();
        assert_eq!(config.alarm.time, AlarmTime::DEFAULT);
        assert_eq!(config.message_url, None);
    }

    #[test_case(ENV_TICK_MS, "fast")]
    #[test_case(ENV_TICK_MS, "0")]
    #[test_case(ENV_ALARM, "25:00")]
    #[test_case(ENV_ALARM_ENABLED, "maybe")]
    #[test_case(ENV_API_ADDR, "localhost")]
    #[test_case(ENV_BUTTON_HOLD_MS, "40")]
    fn rejects_malformed(key: &str, value: &str) {
        assert!(from_pairs(&[(key, value)]).is_err());
    }

    #[test]
    fn hold_must_outlast_debounce_in_ticks() {
        // 50 ms debounce at a 100 ms tick confirms on the next sample.
        assert!(from_pairs(&[(ENV_BUTTON_HOLD_MS, "100")]).is_err());
        assert!(from_pairs(&[(ENV_BUTTON_HOLD_MS, "101")]).is_ok());

        // 150 ms debounce needs two ticks.
        assert!(from_pairs(&[(ENV_DEBOUNCE_MS, "150"), (ENV_BUTTON_HOLD_MS, "200")]).is_err());
        assert!(from_pairs(&[(ENV_DEBOUNCE_MS, "150"), (ENV_BUTTON_HOLD_MS, "250")]).is_ok());
    }
}
