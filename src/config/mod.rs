//! Configuration structures and loading utilities.
//!
//! Every structure loads from environment variables and falls back to its
//! `Default` when a variable is missing or malformed. `from_lookup` takes the
//! variable source as a closure so tests can feed plain maps.

pub mod budget;
pub mod database;
pub mod metrics;
pub mod server;

pub use budget::*;
pub use database::*;
pub use metrics::*;
pub use server::*;

use std::str::FromStr;

/// Look up `key` and parse it, falling back to `default` when the variable is
/// absent or cannot be parsed.
pub(crate) fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(key, value = %raw, "Ignoring malformed configuration value");
                default
            }
        },
        None => default,
    }
}

/// Read a boolean flag; accepts `true`/`false` in any case plus `1`/`0`.
pub(crate) fn flag_or<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_lowercase()) {
        Some(v) if v == "true" || v == "1" => true,
        Some(v) if v == "false" || v == "0" => false,
        Some(v) => {
            tracing::warn!(key, value = %v, "Ignoring malformed boolean flag");
            default
        }
        None => default,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;

    /// Build a lookup closure over a fixed set of variables.
    pub fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }
}
