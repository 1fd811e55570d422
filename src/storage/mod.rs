mod backend;
mod note_store;
mod record;

pub use backend::{Backend, FileBackend, MemoryBackend};
pub use note_store::{NoteStore, DEFAULT_STORAGE_KEY};
pub use record::{decode_notes, encode_notes, NoteRecord};
