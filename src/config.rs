use std::env;
use std::fmt::Debug;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{config_error, Error};

pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api";

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base: String,
    pub session_dir: PathBuf,
    pub request_timeout: Duration,
    pub polling: PollConfig,
}

/// Cadence of the trip status polling loop.
///
/// The defaults poll every five seconds forever without backoff. A failed poll
/// multiplies the delay before the next one by `backoff` up to `max_interval`,
/// and a successful poll resets it. When `max_duration` is set the loop gives
/// up once that much time has passed since the trip was requested.
#[derive(Clone, Debug, PartialEq)]
pub struct PollConfig {
    pub interval: Duration,
    pub backoff: f64,
    pub max_interval: Duration,
    pub max_duration: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            backoff: 1.0,
            max_interval: Duration::from_secs(60),
            max_duration: None,
        }
    }
}

impl PollConfig {
    /// Delay before the next poll after `failures` consecutive failed polls.
    pub fn delay_after(&self, failures: u32) -> Duration {
        if failures == 0 || self.backoff <= 1.0 {
            return self.interval;
        }

        let factor = self.backoff.powi(failures.min(32) as i32);
        let delay = self.interval.as_secs_f64() * factor;

        Duration::from_secs_f64(delay.min(self.max_interval.as_secs_f64()))
    }
}

impl Config {
    #[tracing::instrument(name = "Config::load")]
    pub fn load() -> Result<Self, Error> {
        dotenv::dotenv().ok();

        let defaults = PollConfig::default();

        let polling = PollConfig {
            interval: Duration::from_secs(try_load(
                "CABMATCH_POLL_INTERVAL_SECS",
                defaults.interval.as_secs(),
            )?),
            backoff: try_load("CABMATCH_POLL_BACKOFF", defaults.backoff)?,
            max_interval: Duration::from_secs(try_load(
                "CABMATCH_POLL_MAX_INTERVAL_SECS",
                defaults.max_interval.as_secs(),
            )?),
            max_duration: try_load_optional::<u64>("CABMATCH_POLL_MAX_SECS")?
                .map(Duration::from_secs),
        };

        if polling.interval.is_zero() || !(polling.backoff >= 1.0) {
            return Err(config_error("poll interval must be positive and backoff at least 1"));
        }

        Ok(Self {
            api_base: env::var("CABMATCH_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.into())
                .trim_end_matches('/')
                .to_string(),
            session_dir: env::var("CABMATCH_SESSION_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".cabmatch")),
            request_timeout: Duration::from_secs(try_load("CABMATCH_REQUEST_TIMEOUT_SECS", 10)?),
            polling,
        })
    }
}

fn try_load<T>(key: &str, default: T) -> Result<T, Error>
where
    T: FromStr + Debug,
    T::Err: Debug,
{
    match try_load_optional(key)? {
        Some(value) => Ok(value),
        None => {
            tracing::debug!("{} not set, using default: {:?}", key, default);
            Ok(default)
        }
    }
}

fn try_load_optional<T>(key: &str) -> Result<Option<T>, Error>
where
    T: FromStr,
    T::Err: Debug,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|err| {
            tracing::warn!("invalid {} value: {:?}", key, err);
            config_error(err)
        }),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

#[test]
fn default_polling_has_no_backoff() {
    let config = PollConfig::default();

    assert_eq!(config.delay_after(0), Duration::from_secs(5));
    assert_eq!(config.delay_after(7), Duration::from_secs(5));
    assert_eq!(config.max_duration, None);
}

#[test]
fn backoff_grows_until_ceiling() {
    let config = PollConfig {
        interval: Duration::from_secs(5),
        backoff: 2.0,
        max_interval: Duration::from_secs(30),
        max_duration: None,
    };

    assert_eq!(config.delay_after(1), Duration::from_secs(10));
    assert_eq!(config.delay_after(2), Duration::from_secs(20));
    assert_eq!(config.delay_after(3), Duration::from_secs(30));
    assert_eq!(config.delay_after(10), Duration::from_secs(30));
}
