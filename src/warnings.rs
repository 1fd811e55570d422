//! Size threshold warnings.
//!
//! Every mutation rewrites the whole collection, which is only cheap while
//! the collection stays small. These warnings tell the user when it no
//! longer is.

/// Note count above which whole-collection writes get noticeably slow.
pub const NOTE_WARNING_THRESHOLD: usize = 1000;

/// Serialized collection size above which a warning is shown (1 MiB).
pub const BLOB_SIZE_WARNING_THRESHOLD: u64 = 1024 * 1024;

/// A warning about potential performance issues.
#[derive(Debug, Clone)]
pub enum Warning {
    /// Note count exceeds recommended threshold.
    HighNoteCount { count: usize, threshold: usize },
    /// Serialized collection exceeds recommended size.
    LargeCollection { size_kb: f64, threshold_kb: f64 },
}

/// Check thresholds and return any warnings.
///
/// # Arguments
/// * `note_count` - Number of notes in the collection
/// * `blob_size` - Size of the serialized collection in bytes
pub fn check_thresholds(note_count: usize, blob_size: u64) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if note_count > NOTE_WARNING_THRESHOLD {
        warnings.push(Warning::HighNoteCount {
            count: note_count,
            threshold: NOTE_WARNING_THRESHOLD,
        });
    }

    if blob_size > BLOB_SIZE_WARNING_THRESHOLD {
        warnings.push(Warning::LargeCollection {
            size_kb: blob_size as f64 / 1024.0,
            threshold_kb: BLOB_SIZE_WARNING_THRESHOLD as f64 / 1024.0,
        });
    }

    warnings
}

/// Format a warning for display.
pub fn format_warning(warning: &Warning) -> String {
    match warning {
        Warning::HighNoteCount { count, threshold } => {
            format!(
                "Warning: {} notes exceeds recommended {} - every change rewrites all of them",
                count, threshold
            )
        }
        Warning::LargeCollection {
            size_kb,
            threshold_kb,
        } => {
            format!(
                "Warning: stored notes ({:.1}KB) exceed recommended {:.0}KB",
                size_kb, threshold_kb
            )
        }
    }
}
