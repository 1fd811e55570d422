use clap::Parser;
use floatnotes::cli::{
    handle_add, handle_check, handle_delete, handle_get, handle_init, handle_list, handle_toggle,
    handle_watch, Cli, Commands,
};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Long-running watch logs fired reminders; one-shot commands stay quiet.
    let default_level = match cli.command {
        Commands::Watch => "info",
        _ => "warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Init => handle_init(),
        Commands::Add {
            title,
            content,
            stdin,
            date,
            time,
            json,
        } => handle_add(title, content, stdin, date, time, json),
        Commands::List { json } => handle_list(json),
        Commands::Get { id, json } => handle_get(id, json),
        Commands::Delete { id } => handle_delete(id),
        Commands::Toggle { id } => handle_toggle(id),
        Commands::Check { json } => handle_check(json),
        Commands::Watch => handle_watch(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
