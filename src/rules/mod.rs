pub mod definition;
pub mod rule_set;

pub use crate::types::identifiers::RuleSetVersion;
pub use definition::{KeywordRule, NamePattern, NamePatternRule, RuleSetDefinition, ScoringConfig};
pub use rule_set::{RuleSet, RuleSetError};
