//! Cache entry encoding: one JSON rate plan per line.

use super::types::RatePlan;

/// Serializes a hotel's full plan set. An empty set encodes to `""`.
pub fn encode(plans: &[RatePlan]) -> Result<String, serde_json::Error> {
    let mut value = String::new();
    for plan in plans {
        value.push_str(&serde_json::to_string(plan)?);
        value.push('\n');
    }
    Ok(value)
}

/// Parses a cache entry back into plans. Any bad line fails the whole entry.
pub fn decode(value: &str) -> Result<Vec<RatePlan>, serde_json::Error> {
    value
        .split('\n')
        .filter(|line| !line.is_empty())
        .map(serde_json::from_str)
        .collect()
}
