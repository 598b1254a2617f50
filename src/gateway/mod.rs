//! Gateway: the rotation orchestrator and its builder

mod builder;
mod orchestrator;

pub use builder::{Lectio, LectioBuilder, PrimaryKind};
pub use orchestrator::{DEFAULT_CALL_TIMEOUT, Generated, Outcome, StudyGateway};
