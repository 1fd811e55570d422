use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "floatnotes")]
#[command(version, about = "Short notes with one-shot reminders")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a floatnotes directory here
    Init,

    /// Create a note, optionally with a reminder
    Add {
        /// Note title (may be empty if content is given)
        title: String,

        /// Note content
        #[arg(long, short = 'c', conflicts_with = "stdin")]
        content: Option<String>,

        /// Read content from stdin
        #[arg(long)]
        stdin: bool,

        /// Reminder date
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<String>,

        /// Reminder time (24-hour)
        #[arg(long, value_name = "HH:MM")]
        time: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List notes, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single note
    Get {
        /// Note ID or a unique prefix of it
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a note
    Delete {
        /// Note ID or a unique prefix of it
        id: String,
    },

    /// Arm or disarm a note's reminder
    Toggle {
        /// Note ID or a unique prefix of it
        id: String,
    },

    /// Run a single reminder scan now
    Check {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Keep scanning for due reminders until interrupted
    Watch,
}
