pub mod cache;
pub mod correlate;
pub mod event;
pub mod reconcile;
pub mod record;
pub mod run;
pub mod store;

pub use cache::ViewModel;
pub use correlate::Correlator;
pub use event::RawEvent;
pub use record::{LifecyclePhase, ProcessedEvent, RecordKey, RecordKind, ToolCallRecord, ToolStatus};
pub use run::RunContext;
pub use store::EventStore;
