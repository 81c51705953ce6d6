use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ids::Timestamp;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled key: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_lookup(
    profile: &str,
    key: &str,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = lookup(&prefixed) {
            return Some(v);
        }
    }
    lookup(key)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ── Catch-up policy ───────────────────────────────────────────

/// How a periodic timer reports periods that elapsed within a single clock advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CatchUpPolicy {
    /// One activation per matching fact per elapsed period.
    #[default]
    EveryPeriod,
    /// At most one activation per timer per evaluation, however many periods elapsed.
    Coalesce,
}

impl fmt::Display for CatchUpPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatchUpPolicy::EveryPeriod => write!(f, "every-period"),
            CatchUpPolicy::Coalesce => write!(f, "coalesce"),
        }
    }
}

impl FromStr for CatchUpPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "every-period" | "every_period" => Ok(CatchUpPolicy::EveryPeriod),
            "coalesce" => Ok(CatchUpPolicy::Coalesce),
            other => Err(format!("unknown catch-up policy: '{}'", other)),
        }
    }
}

// ── Session config ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Active profile name (empty = default).
    pub profile: String,
    /// Pseudo-clock origin in milliseconds.
    pub clock_start: Timestamp,
    pub catch_up: CatchUpPolicy,
    /// Reject unregistering an unknown timer handle instead of treating it as a no-op.
    pub strict_handles: bool,
    /// Drain the agenda on every clock advance.
    pub timed_execution: bool,
    /// Default firing limit for `fire_all`. `None` = unbounded.
    pub fire_limit: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            profile: String::new(),
            clock_start: 0,
            catch_up: CatchUpPolicy::EveryPeriod,
            strict_handles: false,
            timed_execution: false,
            fire_limit: None,
        }
    }
}

impl SessionConfig {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `TEMPO_PROFILE`. When set (e.g. `REPLAY`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("TEMPO_PROFILE", "").to_uppercase();
        Self::from_lookup(&profile, env_opt)
    }

    /// Build config for a profile from an arbitrary key lookup.
    ///
    /// Unparseable values fall back to the default and are logged.
    pub fn from_lookup(profile: &str, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        let defaults = Self::default();

        let clock_start = match profiled_lookup(p, "TEMPO_CLOCK_START", &lookup) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "invalid TEMPO_CLOCK_START, using default");
                defaults.clock_start
            }),
            None => defaults.clock_start,
        };

        let catch_up = match profiled_lookup(p, "TEMPO_CATCH_UP", &lookup) {
            Some(raw) => raw.parse().unwrap_or_else(|e: String| {
                tracing::warn!(error = %e, "invalid TEMPO_CATCH_UP, using default");
                defaults.catch_up
            }),
            None => defaults.catch_up,
        };

        let strict_handles = profiled_lookup(p, "TEMPO_STRICT_HANDLES", &lookup)
            .and_then(|v| parse_bool(&v))
            .unwrap_or(defaults.strict_handles);

        let timed_execution = profiled_lookup(p, "TEMPO_TIMED_EXECUTION", &lookup)
            .and_then(|v| parse_bool(&v))
            .unwrap_or(defaults.timed_execution);

        // 0 means unbounded.
        let fire_limit = profiled_lookup(p, "TEMPO_FIRE_LIMIT", &lookup)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|n| *n > 0);

        Self {
            profile: p.to_string(),
            clock_start,
            catch_up,
            strict_handles,
            timed_execution,
            fire_limit,
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Session config loaded (profile: {}):", self.profile_label());
        tracing::info!("  clock:       start={}", self.clock_start);
        tracing::info!("  timers:      catch_up={}, strict_handles={}", self.catch_up, self.strict_handles);
        tracing::info!(
            "  firing:      timed_execution={}, fire_limit={}",
            self.timed_execution,
            self.fire_limit.map(|n| n.to_string()).unwrap_or_else(|| "unbounded".to_string())
        );
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_lookup_yields_defaults() {
        let config = SessionConfig::from_lookup("", lookup_from(&[]));
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.profile_label(), "default");
    }

    #[test]
    fn reads_all_keys() {
        let config = SessionConfig::from_lookup(
            "",
            lookup_from(&[
                ("TEMPO_CLOCK_START", "1700000000000"),
                ("TEMPO_CATCH_UP", "coalesce"),
                ("TEMPO_STRICT_HANDLES", "true"),
                ("TEMPO_TIMED_EXECUTION", "yes"),
                ("TEMPO_FIRE_LIMIT", "25"),
            ]),
        );
        assert_eq!(config.clock_start, 1_700_000_000_000);
        assert_eq!(config.catch_up, CatchUpPolicy::Coalesce);
        assert!(config.strict_handles);
        assert!(config.timed_execution);
        assert_eq!(config.fire_limit, Some(25));
    }

    #[test]
    fn profiled_key_wins_over_plain_key() {
        let config = SessionConfig::from_lookup(
            "replay",
            lookup_from(&[
                ("TEMPO_CATCH_UP", "every-period"),
                ("REPLAY_TEMPO_CATCH_UP", "coalesce"),
                ("TEMPO_STRICT_HANDLES", "1"),
            ]),
        );
        assert_eq!(config.profile, "REPLAY");
        assert_eq!(config.catch_up, CatchUpPolicy::Coalesce);
        assert!(config.strict_handles);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let config = SessionConfig::from_lookup(
            "",
            lookup_from(&[
                ("TEMPO_CLOCK_START", "soon"),
                ("TEMPO_CATCH_UP", "sometimes"),
                ("TEMPO_STRICT_HANDLES", "maybe"),
            ]),
        );
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn zero_fire_limit_means_unbounded() {
        let config = SessionConfig::from_lookup("", lookup_from(&[("TEMPO_FIRE_LIMIT", "0")]));
        assert_eq!(config.fire_limit, None);
    }

    #[test]
    fn catch_up_policy_round_trips_through_display() {
        for policy in [CatchUpPolicy::EveryPeriod, CatchUpPolicy::Coalesce] {
            assert_eq!(policy.to_string().parse::<CatchUpPolicy>(), Ok(policy));
        }
    }
}
