//! Post-mutation wait conditions
//!
//! Only the data side lives here. Evaluating the conditions against the
//! cluster is the job of a [`ConditionWaiter`] supplied by the host.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

use crate::client::ResourceTarget;
use crate::error::{ProviderError, Result};

pub use crdform_schema::DEFAULT_WAIT_TIMEOUT;

/// One `wait_for` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitFor {
    /// JSONPath of the property to watch
    pub jsonpath: String,
    /// Expected value; any value satisfies the condition when unset
    #[serde(default)]
    pub value: Option<String>,
    /// `null` and absent both mean the default
    #[serde(default = "default_timeout", deserialize_with = "timeout_or_default")]
    pub timeout: String,
}

fn default_timeout() -> String {
    DEFAULT_WAIT_TIMEOUT.to_string()
}

fn timeout_or_default<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_timeout))
}

impl WaitFor {
    pub fn new(jsonpath: impl Into<String>) -> Self {
        Self {
            jsonpath: jsonpath.into(),
            value: None,
            timeout: default_timeout(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: impl Into<String>) -> Self {
        self.timeout = timeout.into();
        self
    }

    pub fn parsed_timeout(&self) -> Result<WaitTimeout> {
        WaitTimeout::parse(&self.timeout)
    }
}

/// How long a waiter may poll for one condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitTimeout {
    /// Check once, never poll
    Once,
    Within(Duration),
}

impl WaitTimeout {
    /// Upper bound used for negative timeouts
    pub const MAX: Duration = Duration::from_secs(7 * 24 * 60 * 60);

    /// Parse a duration string such as `30s`, `5m`, or `1h30m`
    ///
    /// Zero means check once; a negative duration means wait up to [`Self::MAX`].
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let (negative, magnitude) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };

        let duration = humantime::parse_duration(magnitude).map_err(|e| {
            ProviderError::InvalidState(format!("invalid wait_for timeout '{}': {}", raw, e))
        })?;

        Ok(if duration.is_zero() {
            Self::Once
        } else if negative {
            Self::Within(Self::MAX)
        } else {
            Self::Within(duration)
        })
    }

    /// Total time budget
    pub fn budget(self) -> Duration {
        match self {
            Self::Once => Duration::ZERO,
            Self::Within(d) => d,
        }
    }
}

/// Evaluates `wait_for` conditions against a live object
#[async_trait]
pub trait ConditionWaiter: Send + Sync {
    /// Block until every condition holds or its timeout elapses
    async fn wait(&self, target: &ResourceTarget, conditions: &[WaitFor]) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeout() {
        let entry: WaitFor = serde_json::from_str(r#"{"jsonpath": "$.status.phase"}"#).unwrap();
        assert_eq!(entry.timeout, "30s");
        assert_eq!(entry.value, None);
        assert_eq!(WaitFor::new("$.x").timeout, "30s");

        let entry: WaitFor =
            serde_json::from_str(r#"{"jsonpath": "$.x", "value": null, "timeout": null}"#).unwrap();
        assert_eq!(entry, WaitFor::new("$.x"));
    }

    #[test]
    fn test_parse_timeouts() {
        assert_eq!(
            WaitTimeout::parse("30s").unwrap(),
            WaitTimeout::Within(Duration::from_secs(30))
        );
        assert_eq!(
            WaitTimeout::parse("1h 30m").unwrap(),
            WaitTimeout::Within(Duration::from_secs(5400))
        );
        assert_eq!(WaitTimeout::parse("0s").unwrap(), WaitTimeout::Once);
        assert_eq!(
            WaitTimeout::parse("-1s").unwrap(),
            WaitTimeout::Within(WaitTimeout::MAX)
        );
        assert!(WaitTimeout::parse("soon").is_err());
    }

    #[test]
    fn test_budget() {
        assert_eq!(WaitTimeout::Once.budget(), Duration::ZERO);
        assert_eq!(
            WaitFor::new("$.x")
                .with_timeout("2m")
                .parsed_timeout()
                .unwrap()
                .budget(),
            Duration::from_secs(120)
        );
    }
}
