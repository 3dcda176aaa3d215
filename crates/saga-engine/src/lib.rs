pub mod engine;
pub mod error;
pub mod observe;
pub mod session;
pub mod task;

pub use engine::{Engine, PumpOutcome};
pub use error::EngineError;
pub use observe::{EngineObserver, Severity};
pub use session::{RepoInfo, SessionState};
pub use task::TaskState;
