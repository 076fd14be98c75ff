//! Joins world-boundary features to country attribute records.

pub mod alias;
pub mod matcher;
pub mod special;

pub use alias::{ALIAS_GROUPS, AliasTable};
pub use matcher::{
    Confidence, MIN_SUBSTRING_CHARS, MatchTier, ReconciledCountry, reconcile, tier_counts,
};
pub use special::{is_special, special_attributes};
