//! Deterministic rule-based classification of content-creator profiles.
//!
//! `bucket-core` scores creator profiles against an immutable, versioned
//! [`rules::RuleSet`] (manual overrides, zone bonuses, name-pattern bonuses
//! and capped weighted keywords), groups them into topical buckets, and
//! replays human correction passes over the result. Every operation is
//! deterministic: identical inputs produce identical, identically ordered
//! outputs.

pub mod cascade;
pub mod classify;
pub mod profile;
pub mod rules;
pub mod store;
pub mod types;
