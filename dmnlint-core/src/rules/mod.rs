// Semantic checks over an extracted DmnDocument
// - engine.rs: CheckEngine, the DocumentCheck trait and gating
// - literal.rs: literal kinds and declared-type compatibility
// - overlap.rs: pairwise rule overlap detection
// - hit_policy.rs, description.rs, type_consistency.rs, rule_gap.rs: the checks

pub mod description;
pub mod engine;
pub mod hit_policy;
pub mod literal;
pub mod overlap;
pub mod rule_gap;
pub mod type_consistency;

pub use engine::*;
