use serde::Deserialize;

use crate::error::PipelineResult;
use crate::seed::SeedSet;

pub const SEED_ENV: &str = "PIPELINE_SEED";
pub const KEEP_GOING_ENV: &str = "PIPELINE_KEEP_GOING";

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Deals the store starts with.
    #[serde(default)]
    pub seed: SeedSet,
    /// Whether a replay skips failing commands instead of stopping.
    #[serde(default)]
    pub keep_going: bool,
}

impl PipelineConfig {
    pub fn load() -> PipelineResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PipelineResult<Self> {
        let seed = match lookup(SEED_ENV) {
            Some(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => SeedSet::default(),
        };
        let keep_going = lookup(KEEP_GOING_ENV)
            .map(|val| matches!(val.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        Ok(Self { seed, keep_going })
    }
}
