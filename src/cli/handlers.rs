use std::env;
use std::io::{self, Read};
use std::path::PathBuf;

use chrono::{Local, NaiveDate, NaiveTime};

use crate::config::{Config, NotificationBackend, NotificationConfig};
use crate::engine::{EngineConfig, ReminderEngine};
use crate::entity::{parse_reminder_date, parse_reminder_time, Note};
use crate::error::{FloatnotesError, Result};
use crate::lifecycle::{NewNote, NoteController, ToggleOutcome};
use crate::notify::{request_permission_once, DisabledGateway, NotificationGateway, TerminalGateway};
use crate::session::{self, Session};
use crate::storage::{encode_notes, FileBackend, NoteRecord, NoteStore};
use crate::warnings::{check_thresholds, format_warning};

const FLOATNOTES_DIR: &str = ".floatnotes";

/// Find the project root by looking for .floatnotes/
fn find_project_root() -> PathBuf {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let mut current = cwd.as_path();
    loop {
        if current.join(FLOATNOTES_DIR).is_dir() {
            return current.to_path_buf();
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return cwd,
        }
    }
}

fn open_workspace() -> Result<(Config, NoteController<FileBackend>)> {
    let dir = find_project_root().join(FLOATNOTES_DIR);
    if !dir.is_dir() {
        return Err(FloatnotesError::NotInitialized);
    }

    let config = Config::load(&dir)?;
    let store = NoteStore::open(FileBackend::new(&dir), config.storage_key.clone());
    if let Some(e) = store.load_error() {
        return Err(e.clone().into());
    }
    let controller = NoteController::new(store, config.rearm_policy);
    Ok((config, controller))
}

/// A CLI process exits right after its mutation, so an unsaved change is
/// lost: report it as an error here.
fn ensure_saved(controller: &NoteController<FileBackend>) -> Result<()> {
    match controller.store().last_save_error() {
        Some(e) => Err(e.clone().into()),
        None => Ok(()),
    }
}

fn build_gateway(config: &NotificationConfig) -> Box<dyn NotificationGateway + Send> {
    match config.backend {
        NotificationBackend::Terminal => Box::new(TerminalGateway::stdout(config.app_name.clone())),
        #[cfg(feature = "desktop")]
        NotificationBackend::Desktop => Box::new(crate::notify::DesktopGateway::new(
            config.app_name.clone(),
            config.icon.clone(),
        )),
        #[cfg(not(feature = "desktop"))]
        NotificationBackend::Desktop => {
            tracing::warn!("built without the 'desktop' feature; using terminal notifications");
            Box::new(TerminalGateway::stdout(config.app_name.clone()))
        }
        NotificationBackend::None => Box::new(DisabledGateway),
    }
}

fn describe_reminder(note: &Note) -> Option<String> {
    note.reminder.as_ref().map(|r| {
        format!(
            "{} {}, {}",
            r.date_label(),
            r.time_label(),
            if note.reminder_active { "armed" } else { "off" }
        )
    })
}

fn print_json(note: &Note) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&NoteRecord::from(note))?);
    Ok(())
}

pub fn handle_init() -> Result<()> {
    let root = env::current_dir()?;
    let dir = root.join(FLOATNOTES_DIR);

    if dir.exists() {
        return Err(FloatnotesError::AlreadyInitialized);
    }

    let config = Config::default();
    config.save(&dir)?;
    let mut store = NoteStore::open(FileBackend::new(&dir), config.storage_key.clone());
    store.save()?;

    println!("Initialized floatnotes in {}", root.display());
    Ok(())
}

pub fn handle_add(
    title: String,
    content: Option<String>,
    stdin: bool,
    date: Option<String>,
    time: Option<String>,
    json: bool,
) -> Result<()> {
    let (_config, mut controller) = open_workspace()?;

    let mut content = content.unwrap_or_default();
    if stdin {
        io::stdin().read_to_string(&mut content)?;
    }

    let reminder_date: Option<NaiveDate> = date
        .as_deref()
        .map(parse_reminder_date)
        .transpose()
        .map_err(FloatnotesError::InvalidReminder)?;
    let reminder_time: Option<NaiveTime> = time
        .as_deref()
        .map(parse_reminder_time)
        .transpose()
        .map_err(FloatnotesError::InvalidReminder)?;

    let note = controller.create_note(NewNote {
        title,
        content,
        reminder_date,
        reminder_time,
    })?;
    ensure_saved(&controller)?;

    if json {
        print_json(&note)?;
    } else {
        println!("Created note {} - {}", note.id, note.title);
        if let Some(reminder) = describe_reminder(&note) {
            println!("  Reminder: {}", reminder);
        }
    }

    Ok(())
}

pub fn handle_list(json: bool) -> Result<()> {
    let (config, controller) = open_workspace()?;
    let notes = controller.notes();

    let blob_size = encode_notes(notes)?.len() as u64;
    for warning in check_thresholds(notes.len(), blob_size) {
        eprintln!("{}", format_warning(&warning));
    }

    if json {
        let records: Vec<NoteRecord> = notes.iter().map(NoteRecord::from).collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if notes.is_empty() {
        println!("No notes.");
        return Ok(());
    }

    for note in notes {
        match describe_reminder(note) {
            Some(reminder) => println!("{}  {}  [{}]", note.id, note.title, reminder),
            None => println!("{}  {}", note.id, note.title),
        }
    }

    let engine_config: EngineConfig = config.engine_config()?;
    if let Some((note, at)) = engine_config.next_due(notes, Local::now()) {
        println!("\nNext reminder: {} at {}", note.title, at.format("%Y-%m-%d %H:%M"));
    }

    Ok(())
}

pub fn handle_get(id: String, json: bool) -> Result<()> {
    let (_config, controller) = open_workspace()?;
    let id = controller.resolve_id(&id)?;
    let note = controller
        .store()
        .get(&id)
        .ok_or_else(|| FloatnotesError::NoteNotFound(id.clone()))?;

    if json {
        return print_json(note);
    }

    println!("{}", note.title);
    println!("  id:       {}", note.id);
    println!(
        "  created:  {}",
        note.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
    );
    if let Some(reminder) = describe_reminder(note) {
        println!("  reminder: {}", reminder);
    }
    if !note.content.is_empty() {
        println!();
        println!("{}", note.content);
    }

    Ok(())
}

pub fn handle_delete(id: String) -> Result<()> {
    let (_config, mut controller) = open_workspace()?;

    let resolved = match controller.resolve_id(&id) {
        Ok(resolved) => resolved,
        Err(FloatnotesError::NoteNotFound(_)) => {
            println!("No note matching '{}'; nothing to delete.", id);
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    if let Some(note) = controller.delete_note(&resolved) {
        ensure_saved(&controller)?;
        println!("Deleted note {} - {}", note.id, note.title);
    }

    Ok(())
}

pub fn handle_toggle(id: String) -> Result<()> {
    let (_config, mut controller) = open_workspace()?;
    let id = controller.resolve_id(&id)?;

    match controller.toggle_reminder(&id, Local::now()) {
        ToggleOutcome::Armed => println!("Reminder armed for {}", id),
        ToggleOutcome::Disarmed => println!("Reminder disarmed for {}", id),
        ToggleOutcome::NoReminder => println!("Note {} has no reminder; nothing to toggle.", id),
        ToggleOutcome::Expired => println!(
            "Reminder for {} has already passed; not re-armed (rearm_policy: {}).",
            id,
            controller.policy()
        ),
        ToggleOutcome::NotFound => return Err(FloatnotesError::NoteNotFound(id)),
    }
    ensure_saved(&controller)
}

pub fn handle_check(json: bool) -> Result<()> {
    let (config, mut controller) = open_workspace()?;
    let mut engine = ReminderEngine::new(
        build_gateway(&config.notifications),
        config.engine_config()?,
    );
    request_permission_once(engine.gateway_mut());

    let report = engine.scan(controller.store_mut());
    ensure_saved(&controller)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.is_empty() {
        println!("No reminders due.");
    } else {
        println!(
            "Fired {} reminder(s), {} delivered.",
            report.fired.len(),
            report.delivered
        );
    }

    Ok(())
}

pub fn handle_watch() -> Result<()> {
    let (config, controller) = open_workspace()?;
    let engine = ReminderEngine::new(
        build_gateway(&config.notifications),
        config.engine_config()?,
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(watch(controller, engine))
}

async fn watch(
    controller: NoteController<FileBackend>,
    engine: ReminderEngine<Box<dyn NotificationGateway + Send>>,
) -> Result<()> {
    println!(
        "Watching reminders every {}s. Press Ctrl-C to stop.",
        engine.config().poll_interval.as_secs()
    );

    let session = Session::start(session::shared(controller), engine);
    tokio::signal::ctrl_c().await?;
    session.shutdown().await;

    Ok(())
}
