mod commands;
mod handlers;

pub use commands::{Cli, Commands};
pub use handlers::{
    handle_add, handle_check, handle_delete, handle_get, handle_init, handle_list, handle_toggle,
    handle_watch,
};
