pub mod profile;

pub use crate::types::identifiers::CreatorId;
pub use profile::{CreatorProfile, FIELD_SEPARATOR};
