use thiserror::Error;

/// Failures of the persisted note collection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Stored notes are unreadable: {0}")]
    Corrupt(String),

    #[error("Stored notes could not be read: {0}")]
    Unreadable(String),

    #[error("Failed to write notes: {0}")]
    WriteFailed(String),
}

#[derive(Error, Debug)]
pub enum FloatnotesError {
    #[error("Not in a floatnotes directory. Run 'floatnotes init' first.")]
    NotInitialized,

    #[error("Already initialized. Remove .floatnotes/ to reinitialize.")]
    AlreadyInitialized,

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Ambiguous note id '{0}': matches more than one note")]
    AmbiguousId(String),

    #[error("A note with the same title and content already exists ({existing_id})")]
    Duplicate { existing_id: String },

    #[error("A note needs a title or some content")]
    EmptyNote,

    #[error("Invalid reminder: {0}")]
    InvalidReminder(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, FloatnotesError>;
