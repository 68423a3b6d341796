//! # Tandem Skills
//!
//! The two stage functions of the review pipeline.
//!
//! ## Architecture
//!
//! ```text
//! StageContext (client + resolution + model)
//!   ├── ArchitectSkill  - "Architect: <input>"
//!   └── ReviewerSkill   - "Reviewer: review and improve ...<architect output>"
//! ```
//!
//! Each skill issues exactly one completion and performs no retries.

pub mod architect_skill;
pub mod context;
pub mod prompts;
pub mod reviewer_skill;

pub use architect_skill::ArchitectSkill;
pub use context::StageContext;
pub use reviewer_skill::ReviewerSkill;
