//! Page identity across runs
//!
//! Nodes are matched to existing pages in three tiers, first success wins:
//! identity label, case-insensitive title, then collision-suffixed title.

mod label;
mod resolver;

pub use label::{IdentityLabel, LABEL_NAMESPACE};
pub use resolver::{IdentityResolver, MatchTier, Resolution, Resolutions, is_collision_variant};
