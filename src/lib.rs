pub mod cli;
pub mod config;
pub mod engine;
pub mod entity;
pub mod error;
pub mod lifecycle;
pub mod notify;
pub mod session;
pub mod storage;
pub mod warnings;

pub use config::Config;
pub use engine::{EngineConfig, ReminderEngine, ScanReport};
pub use error::{FloatnotesError, Result, StoreError};
pub use lifecycle::{NewNote, NoteController, RearmPolicy, ToggleOutcome};
pub use session::Session;
pub use storage::NoteStore;
