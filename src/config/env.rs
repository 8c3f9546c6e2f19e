//! Environment variable lookup.
//!
//! Environment variables are read-only for this crate. Lookups go through
//! [`EnvSource`] so callers can hand in an explicit table instead of the
//! process environment.

use std::collections::HashMap;
use std::fmt::Debug;

pub const REGION_VARS: &[&str] = &["AWS_REGION", "AWS_DEFAULT_REGION"];

/// Read-only view over environment variables.
pub trait EnvSource: Send + Sync + Debug {
    /// Raw value of `key`, if set.
    fn var(&self, key: &str) -> Option<String>;

    /// Value of `key`, treating empty strings as unset.
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key).filter(|v| !v.trim().is_empty())
    }

    /// First non-empty value among `keys`.
    fn first_of(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.non_empty(key))
    }

    /// Whether any of `keys` is set to a non-empty value.
    fn any_set(&self, keys: &[&str]) -> bool {
        self.first_of(keys).is_some()
    }

    /// Parse a boolean flag: "1" or "true" (case-insensitive).
    fn flag(&self, key: &str) -> bool {
        self.var(key)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<E: EnvSource + ?Sized> EnvSource for &E {
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}

impl<E: EnvSource + ?Sized> EnvSource for std::sync::Arc<E> {
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}

/// Build a lookup table from key/value pairs.
pub fn env_table<'a>(
    pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> HashMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_of_skips_empty() {
        let env = env_table([("AWS_REGION", ""), ("AWS_DEFAULT_REGION", "eu-west-1")]);
        assert_eq!(env.first_of(REGION_VARS), Some("eu-west-1".to_string()));
    }

    #[test]
    fn test_first_of_prefers_earlier_key() {
        let env = env_table([("AWS_REGION", "us-east-1"), ("AWS_DEFAULT_REGION", "eu-west-1")]);
        assert_eq!(env.first_of(REGION_VARS), Some("us-east-1".to_string()));
    }

    #[test]
    fn test_flag() {
        let env = env_table([("A", "1"), ("B", "TRUE"), ("C", "false"), ("D", "0")]);
        assert!(env.flag("A"));
        assert!(env.flag("B"));
        assert!(!env.flag("C"));
        assert!(!env.flag("D"));
        assert!(!env.flag("MISSING"));
    }

    #[test]
    fn test_process_env_missing() {
        assert_eq!(ProcessEnv.var("BEDROCK_CREDENTIALS_TEST_UNSET_VAR"), None);
    }
}
