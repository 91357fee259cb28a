pub mod assignment;
pub mod identifiers;

pub use assignment::{
    AssignmentMove, CategoryAssignment, CategoryCount, CategoryMapping, CategoryScore,
    MappingSummary, ScoreBreakdown,
};
pub use identifiers::{CreatorId, RuleSetVersion};
