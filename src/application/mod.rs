//! Application layer - Use cases and port interfaces
//!
//! Contains the session coordinator, the comparison and import/export
//! use cases, and the trait definitions for external systems.

pub mod compare;
pub mod coordinator;
pub mod library;
pub mod ports;
pub mod storage;

// Re-export use cases
pub use compare::{CompareError, CompareOutcome, MatchVerdict, PhraseComparator};
pub use coordinator::{Coordinator, SessionNotice, SessionStatus};
pub use library::{export_clip, import_clip};
pub use storage::ClipStore;
