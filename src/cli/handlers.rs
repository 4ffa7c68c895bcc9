use std::io::{self, Write};
use std::path::PathBuf;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;

use super::host::HeadlessShell;
use super::script::{parse_line, ScriptLine};
use crate::config::StickiesConfig;
use crate::entity::{Note, NoteId, WorkArea};
use crate::error::{Result, StickiesError};
use crate::extension::StickyNotes;
use crate::manager::NoteManager;
use crate::shell::Event;
use crate::storage::NoteStore;

const PREVIEW_CHARS: usize = 40;

type StdinLines = Lines<BufReader<Stdin>>;

enum Flow {
    Continue,
    Quit,
}

#[derive(Serialize)]
struct NoteView<'a> {
    #[serde(flatten)]
    note: &'a Note,
    text_color: String,
}

#[derive(Serialize)]
struct Listing<'a> {
    notes: Vec<NoteView<'a>>,
    /// State records past the first gap, never loaded
    unreachable: &'a [NoteId],
    /// Records that will be reset to defaults on the next run
    malformed: &'a [NoteId],
}

/// Resolve the config file and the notes directory. `--data-dir` beats the
/// config file, which beats the platform default.
fn load_config(
    config_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
) -> Result<(StickiesConfig, PathBuf)> {
    let config = match config_path.or_else(StickiesConfig::default_path) {
        Some(path) => {
            debug!(path = %path.display(), "reading config");
            StickiesConfig::load(&path)?
        }
        None => StickiesConfig::default(),
    };
    let data_dir = match data_dir {
        Some(dir) => dir,
        None => config.resolve_data_dir()?,
    };
    Ok((config, data_dir))
}

pub fn handle_run(
    config_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    yes: bool,
    screen: WorkArea,
) -> Result<()> {
    let (config, data_dir) = load_config(config_path, data_dir)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_session(config, data_dir, yes, screen))
}

async fn run_session(
    config: StickiesConfig,
    data_dir: PathBuf,
    yes: bool,
    screen: WorkArea,
) -> Result<()> {
    let interactive = atty::is(atty::Stream::Stdin);

    let mut notes = StickyNotes::new(config, data_dir);
    let manager = notes.activate(HeadlessShell::new(screen))?;
    let mut deferred = manager
        .take_deferred_receiver()
        .ok_or_else(|| StickiesError::Shell("deferred queue already taken".to_string()))?;
    println!("{} note(s) loaded", manager.len());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt(interactive);

    let result: Result<()> = loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break Ok(()),
                    Err(e) => break Err(e.into()),
                };
                let Some(manager) = notes.manager_mut() else {
                    break Ok(());
                };
                match process_line(manager, &line, &mut lines, yes, interactive).await {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Quit) => break Ok(()),
                    Err(e) => eprintln!("Error: {}", e),
                }
                prompt(interactive);
            }
            Some(message) = deferred.recv() => {
                if let Some(manager) = notes.manager_mut() {
                    manager.handle_deferred(message);
                }
            }
        }
    };

    notes.deactivate();
    result
}

async fn process_line(
    manager: &mut NoteManager<HeadlessShell>,
    line: &str,
    lines: &mut StdinLines,
    yes: bool,
    interactive: bool,
) -> Result<Flow> {
    let event = match parse_line(line)? {
        ScriptLine::Blank => return Ok(Flow::Continue),
        ScriptLine::Quit => return Ok(Flow::Quit),
        ScriptLine::List => {
            print_notes(manager.notes());
            return Ok(Flow::Continue);
        }
        ScriptLine::Event(event) => event,
    };

    if let Event::DeleteRequested(id) = event {
        if manager.get(id).is_none() {
            return Err(StickiesError::NoteNotFound(id));
        }
        if !yes && !confirm_delete(id, lines, interactive).await? {
            println!("Cancelled.");
            return Ok(Flow::Continue);
        }
    }

    let report = match &event {
        Event::CreateRequested => Some(manager.len()),
        _ => None,
    };
    manager.dispatch(event)?;
    if let Some(index) = report {
        println!("Created note {}", index);
    }
    Ok(Flow::Continue)
}

async fn confirm_delete(id: NoteId, lines: &mut StdinLines, interactive: bool) -> Result<bool> {
    if !interactive {
        return Err(StickiesError::InvalidCommand(
            "Use --yes to delete in non-interactive mode".to_string(),
        ));
    }

    eprint!("Delete note {}? [y/N] ", id);
    let _ = io::stderr().flush();
    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Print what `run` would load. Nothing in the notes directory is created,
/// repaired, or rewritten.
pub fn handle_list(
    config_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    json: bool,
    screen: WorkArea,
) -> Result<()> {
    let (config, data_dir) = load_config(config_path, data_dir)?;
    let store = NoteStore::open_read_only(&data_dir, screen, config.seed());

    let mut notes = Vec::new();
    let mut malformed = Vec::new();
    let mut unreachable = Vec::new();
    if data_dir.is_dir() {
        let mut id = NoteId(0);
        while store.has_state(id) {
            match store.peek_state(id) {
                Ok(Some(state)) => {
                    let body = store.peek_text(id)?.unwrap_or_default();
                    notes.push(Note::new(id, state, body));
                }
                Ok(None) => break,
                Err(e) => {
                    debug!(note = %id, error = %e, "malformed state record");
                    malformed.push(id);
                }
            }
            id = id.next();
        }

        unreachable = store
            .list_ids()?
            .into_iter()
            .filter(|other| other.index() >= id.index())
            .collect();
    }

    if json {
        let listing = Listing {
            notes: notes.iter().map(view).collect(),
            unreachable: &unreachable,
            malformed: &malformed,
        };
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    if notes.is_empty() && malformed.is_empty() {
        println!("No notes in {}", data_dir.display());
    } else {
        print_notes(&notes);
    }
    if !malformed.is_empty() {
        println!(
            "Warning: malformed records will be reset on the next run: {}",
            join_ids(&malformed)
        );
    }
    if !unreachable.is_empty() {
        println!(
            "Warning: records past the first gap are not loaded: {}",
            join_ids(&unreachable)
        );
    }
    Ok(())
}

fn join_ids(ids: &[NoteId]) -> String {
    ids.iter().map(NoteId::to_string).collect::<Vec<_>>().join(", ")
}

fn view(note: &Note) -> NoteView<'_> {
    NoteView {
        note,
        text_color: note.text_color().to_string(),
    }
}

fn print_notes(notes: &[Note]) {
    for note in notes {
        let state = &note.state;
        let mut flags = Vec::new();
        if state.bold {
            flags.push("bold");
        }
        if !state.text_visible {
            flags.push("collapsed");
        }

        println!(
            "{:>3}  at {:.0},{:.0}  {:.0}x{:.0}  color {} ({} text)  {}pt{}  {}",
            note.id.0,
            state.position.x,
            state.position.y,
            state.size.width,
            state.size.height,
            state.color,
            note.text_color(),
            state.font_size,
            if flags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", flags.join(", "))
            },
            preview(&note.body),
        );
    }
}

fn preview(body: &str) -> String {
    let first = body.lines().next().unwrap_or("");
    let mut preview: String = first.chars().take(PREVIEW_CHARS).collect();
    if first.chars().count() > PREVIEW_CHARS || body.lines().count() > 1 {
        preview.push('…');
    }
    preview
}

fn prompt(interactive: bool) {
    if interactive {
        print!("> ");
        let _ = io::stdout().flush();
    }
}
