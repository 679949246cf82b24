//! Command-line front end for MindScribe.
//!
//! Every invocation opens the store, loads the four collections, runs one
//! command and prints a plain-text view of the result.

mod render;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use clap::{Args, Parser, Subcommand};
use log::info;
use mindscribe_core::{
    init_logging, open_db, open_db_in_memory, AppConfig, BookmarkDraft, BookmarkManager,
    BookmarkSortField, CalendarCursor, Clock, Connection, DashboardSummary, Entity, EntityId,
    EntityManager, EventDraft, EventManager, EventSortField, NoteCategory, NoteDraft,
    NoteManager, NotePatch, NoteSortField, Priority, SqliteKvRepository, Storage, SystemClock,
    TaskDraft, TaskManager, TaskSortField,
};
use mindscribe_core::text::parse_tags;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "mindscribe", version, about = "Notes, tasks and calendar in one store.")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Database file; overrides `storage.path` from the config.
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Counters across every collection.
    Dashboard,
    #[command(subcommand)]
    Notes(NotesCommand),
    #[command(subcommand)]
    Tasks(TasksCommand),
    #[command(subcommand)]
    Events(EventsCommand),
    /// Month grid with event markers.
    Calendar(CalendarArgs),
    #[command(subcommand)]
    Bookmarks(BookmarksCommand),
    #[command(subcommand)]
    Storage(StorageCommand),
}

#[derive(Debug, Subcommand)]
enum NotesCommand {
    List {
        /// Only notes in this category ("All" disables the filter).
        #[arg(long)]
        category: Option<String>,
        /// Only notes carrying this tag.
        #[arg(long)]
        tag: Option<String>,
        /// `title`, `category`, `createdAt` or `updatedAt`.
        #[arg(long)]
        sort: Option<NoteSortField>,
        #[arg(long)]
        desc: bool,
    },
    Add {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        category: Option<NoteCategory>,
        #[arg(long)]
        content: Option<String>,
        /// Comma-separated tags.
        #[arg(long)]
        tags: Option<String>,
    },
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        category: Option<NoteCategory>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        tags: Option<String>,
    },
    Delete {
        id: String,
    },
    Search {
        query: String,
    },
    /// Distinct tags in use.
    Tags,
}

#[derive(Debug, Subcommand)]
enum TasksCommand {
    List {
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        pending: bool,
        #[arg(long)]
        sort: Option<TaskSortField>,
        #[arg(long)]
        desc: bool,
    },
    Add {
        title: String,
        /// `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM`, local time.
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
    },
    Toggle {
        id: String,
    },
    Delete {
        id: String,
    },
    Overdue,
    Today,
}

#[derive(Debug, Subcommand)]
enum EventsCommand {
    List {
        #[arg(long)]
        sort: Option<EventSortField>,
        #[arg(long)]
        desc: bool,
    },
    Add {
        title: String,
        /// `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM`, local time.
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: String,
    },
    Today,
}

#[derive(Debug, Args)]
struct CalendarArgs {
    /// Month number, 1 = January.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,
    #[arg(long)]
    year: Option<i32>,
}

#[derive(Debug, Subcommand)]
enum BookmarksCommand {
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        sort: Option<BookmarkSortField>,
        #[arg(long)]
        desc: bool,
    },
    Add {
        url: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        tags: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug, Subcommand)]
enum StorageCommand {
    /// Estimated size of the stored collections.
    Usage,
    /// Removes every MindScribe collection from the store.
    Clear,
}

type Repo<'conn> = SqliteKvRepository<'conn>;

struct Workspace<'conn> {
    notes: NoteManager<Repo<'conn>, SystemClock>,
    tasks: TaskManager<Repo<'conn>, SystemClock>,
    events: EventManager<Repo<'conn>, SystemClock>,
    bookmarks: BookmarkManager<Repo<'conn>, SystemClock>,
}

impl<'conn> Workspace<'conn> {
    fn open(conn: &'conn Connection, config: &AppConfig) -> Self {
        let storage =
            || Storage::with_prefix(SqliteKvRepository::new(conn), config.storage.prefix.as_str());
        let seed = config.storage.seed_samples;
        Self {
            notes: open_manager(storage(), seed),
            tasks: open_manager(storage(), seed),
            events: open_manager(storage(), seed),
            bookmarks: open_manager(storage(), seed),
        }
    }
}

fn open_manager<'conn, E: Entity>(
    storage: Storage<Repo<'conn>>,
    seed: bool,
) -> EntityManager<E, Repo<'conn>, SystemClock> {
    let mut manager = EntityManager::new(storage, SystemClock).with_seed_samples(seed);
    manager.load();
    manager
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    if let Some(dir) = &config.logging.dir {
        init_logging(&config.logging.level, dir).context("failed to initialize logging")?;
    }

    let conn = open_store(&config)?;
    info!(
        "event=cli_start module=cli status=ok persistent={}",
        config.storage.database_path().is_some()
    );

    let mut workspace = Workspace::open(&conn, &config);
    run(cli.command, &mut workspace)
}

/// Config file values with command-line overrides applied.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(db) = &cli.db {
        config.storage.path = db.clone();
        config.storage.in_memory = false;
    }
    Ok(config)
}

fn open_store(config: &AppConfig) -> Result<Connection> {
    match config.storage.database_path() {
        Some(path) => open_db(path)
            .with_context(|| format!("failed to open database `{}`", path.display())),
        None => open_db_in_memory().context("failed to open in-memory database"),
    }
}

fn run(command: Command, ws: &mut Workspace<'_>) -> Result<()> {
    match command {
        Command::Dashboard => {
            let summary =
                DashboardSummary::collect(&ws.notes, &ws.tasks, &ws.events, &ws.bookmarks);
            print!("{}", render::dashboard(&summary));
            print!("{}", render::event_list("Upcoming", &ws.events.upcoming(5)));
            let recent = ws.notes.recent(3);
            print!("{}", render::note_list("Recent notes", &recent, SystemClock.now()));
        }
        Command::Notes(command) => run_notes(command, &mut ws.notes)?,
        Command::Tasks(command) => run_tasks(command, &mut ws.tasks)?,
        Command::Events(command) => run_events(command, &mut ws.events)?,
        Command::Calendar(args) => {
            let today = SystemClock.today();
            let mut cursor = CalendarCursor::containing(today);
            let month0 = args.month.map_or(cursor.month(), |month| month - 1);
            let year = args.year.unwrap_or(cursor.year());
            if !cursor.set(month0, year) {
                bail!("month {} of year {year} is not representable", month0 + 1);
            }
            print!("{}", render::month_grid(&cursor, &ws.events.month_grid(cursor)));
        }
        Command::Bookmarks(command) => run_bookmarks(command, &mut ws.bookmarks)?,
        Command::Storage(StorageCommand::Usage) => {
            let storage = ws.notes.storage();
            println!(
                "{} bytes ({:.2} MB) under prefix `{}`",
                storage.usage(),
                storage.usage_megabytes(),
                storage.prefix()
            );
        }
        Command::Storage(StorageCommand::Clear) => {
            if !ws.notes.storage().clear_all() {
                bail!("failed to clear stored collections");
            }
            println!("storage cleared");
        }
    }
    Ok(())
}

fn run_notes(
    command: NotesCommand,
    notes: &mut NoteManager<Repo<'_>, SystemClock>,
) -> Result<()> {
    let now = SystemClock.now();
    match command {
        NotesCommand::List {
            category,
            tag,
            sort,
            desc,
        } => {
            let mut listed = match sort {
                Some(field) => notes.sort(field, !desc),
                None => notes.get_all(),
            };
            let in_category = notes.filter_by_category(category.as_deref());
            let tagged = notes.filter_by_tag(tag.as_deref());
            listed.retain(|note| {
                in_category.iter().any(|other| other.id == note.id)
                    && tagged.iter().any(|other| other.id == note.id)
            });
            print!("{}", render::note_list("Notes", &listed, now));
        }
        NotesCommand::Add {
            title,
            category,
            content,
            tags,
        } => {
            let note = notes.create(NoteDraft {
                title,
                category,
                content,
                tags: tags.as_deref().map(parse_tags).unwrap_or_default(),
            })?;
            println!("created note {}", note.id);
        }
        NotesCommand::Edit {
            id,
            title,
            category,
            content,
            tags,
        } => {
            let note = notes.update(
                &EntityId::from(id),
                NotePatch {
                    title,
                    category,
                    content,
                    tags: tags.as_deref().map(parse_tags),
                },
            )?;
            println!("updated note {}", note.id);
        }
        NotesCommand::Delete { id } => {
            let deleted = notes.delete(&EntityId::from(id.as_str()));
            report_delete("note", &id, deleted)?;
        }
        NotesCommand::Search { query } => {
            print!("{}", render::note_list("Search results", &notes.search(&query), now));
        }
        NotesCommand::Tags => {
            for tag in notes.all_tags() {
                println!("#{tag}");
            }
        }
    }
    report_dirty(notes.is_dirty());
    Ok(())
}

fn run_tasks(
    command: TasksCommand,
    tasks: &mut TaskManager<Repo<'_>, SystemClock>,
) -> Result<()> {
    let now = SystemClock.now();
    match command {
        TasksCommand::List {
            priority,
            pending,
            sort,
            desc,
        } => {
            let mut listed = match sort {
                Some(field) => tasks.sort(field, !desc),
                None => tasks.get_all(),
            };
            if let Some(priority) = priority {
                listed.retain(|task| task.priority == priority);
            }
            if pending {
                listed.retain(|task| !task.completed);
            }
            print!("{}", render::task_list("Tasks", &listed, now));
        }
        TasksCommand::Add {
            title,
            due,
            priority,
        } => {
            let due_date = due.as_deref().map(parse_local_instant).transpose()?;
            let task = tasks.create(TaskDraft {
                title: Some(title),
                due_date,
                priority,
                completed: false,
            })?;
            println!("created task {}", task.id);
        }
        TasksCommand::Toggle { id } => {
            let task = tasks.toggle_completion(&EntityId::from(id))?;
            let state = if task.completed { "done" } else { "open" };
            println!("task {} is now {state}", task.id);
        }
        TasksCommand::Delete { id } => {
            let deleted = tasks.delete(&EntityId::from(id.as_str()));
            report_delete("task", &id, deleted)?;
        }
        TasksCommand::Overdue => {
            print!("{}", render::task_list("Overdue", &tasks.overdue(), now));
        }
        TasksCommand::Today => {
            print!("{}", render::task_list("Due today", &tasks.due_today(), now));
        }
    }
    report_dirty(tasks.is_dirty());
    Ok(())
}

fn run_events(
    command: EventsCommand,
    events: &mut EventManager<Repo<'_>, SystemClock>,
) -> Result<()> {
    match command {
        EventsCommand::List { sort, desc } => {
            let listed = events.sort(sort.unwrap_or(EventSortField::Start), !desc);
            print!("{}", render::event_list("Events", &listed));
        }
        EventsCommand::Add {
            title,
            start,
            end,
            category,
            description,
        } => {
            let start = parse_local_instant(&start)?;
            let end = end.as_deref().map(parse_local_instant).transpose()?;
            let event = events.create(EventDraft {
                title: Some(title),
                start: Some(start),
                end,
                category,
                description,
            })?;
            println!("created event {}", event.id);
        }
        EventsCommand::Delete { id } => {
            let deleted = events.delete(&EntityId::from(id.as_str()));
            report_delete("event", &id, deleted)?;
        }
        EventsCommand::Today => print!("{}", render::event_list("Today", &events.events_today())),
    }
    report_dirty(events.is_dirty());
    Ok(())
}

fn run_bookmarks(
    command: BookmarksCommand,
    bookmarks: &mut BookmarkManager<Repo<'_>, SystemClock>,
) -> Result<()> {
    match command {
        BookmarksCommand::List {
            category,
            sort,
            desc,
        } => {
            let mut listed = match sort {
                Some(field) => bookmarks.sort(field, !desc),
                None => bookmarks.get_all(),
            };
            let allowed = bookmarks.filter_by_category(category.as_deref());
            listed.retain(|bookmark| allowed.iter().any(|other| other.id == bookmark.id));
            print!("{}", render::bookmark_list(&listed));
        }
        BookmarksCommand::Add {
            url,
            title,
            category,
            tags,
        } => {
            let bookmark = bookmarks.create(BookmarkDraft {
                title,
                url,
                category,
                tags: tags.as_deref().map(parse_tags).unwrap_or_default(),
            })?;
            println!("created bookmark {}", bookmark.id);
        }
        BookmarksCommand::Delete { id } => {
            let deleted = bookmarks.delete(&EntityId::from(id.as_str()));
            report_delete("bookmark", &id, deleted)?;
        }
    }
    report_dirty(bookmarks.is_dirty());
    Ok(())
}

fn report_delete(kind: &str, id: &str, deleted: bool) -> Result<()> {
    if !deleted {
        bail!("{kind} not found: {id}");
    }
    println!("deleted {kind} {id}");
    Ok(())
}

fn report_dirty(dirty: bool) {
    if dirty {
        eprintln!("warning: changes are kept in memory only; saving to storage failed");
    }
}

/// Parses `YYYY-MM-DD` (midnight) or `YYYY-MM-DDTHH:MM` as local time.
fn parse_local_instant(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .with_context(|| format!("invalid date `{value}`; expected YYYY-MM-DD[THH:MM]"))?;

    match Local.from_local_datetime(&naive).earliest() {
        Some(local) => Ok(local.with_timezone(&Utc)),
        None => bail!("`{value}` does not exist in the local time zone"),
    }
}

#[cfg(test)]
mod tests {
    use super::{open_store, parse_local_instant, resolve_config, run, Cli, Workspace};
    use chrono::{Local, TimeZone, Utc};
    use clap::{CommandFactory, Parser};
    use mindscribe_core::DEFAULT_DB_FILE;
    use std::path::Path;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_nested_subcommands() {
        let cli = Cli::try_parse_from([
            "mindscribe", "--db", "/tmp/ms.sqlite3", "tasks", "add", "Ship", "--priority", "high",
        ])
        .unwrap();
        assert!(cli.db.is_some());
        assert!(matches!(cli.command, super::Command::Tasks(_)));
    }

    #[test]
    fn calendar_month_is_range_checked() {
        assert!(Cli::try_parse_from(["mindscribe", "calendar", "--month", "13"]).is_err());
    }

    #[test]
    fn parses_date_and_datetime_inputs() {
        let date = parse_local_instant("2023-11-14").unwrap();
        let expected = Local
            .with_ymd_and_hms(2023, 11, 14, 0, 0, 0)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(date, expected);

        let datetime = parse_local_instant("2023-11-14T09:30").unwrap();
        assert_eq!(datetime - date, chrono::Duration::minutes(9 * 60 + 30));
        assert!(parse_local_instant("14/11/2023").is_err());
    }

    #[test]
    fn default_store_is_a_database_file() {
        let cli = Cli::try_parse_from(["mindscribe", "dashboard"]).unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(
            config.storage.database_path(),
            Some(Path::new(DEFAULT_DB_FILE))
        );
    }

    #[test]
    fn db_flag_overrides_in_memory_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("mindscribe.toml");
        std::fs::write(&config_path, "[storage]\nin_memory = true\n").unwrap();
        let db_path = dir.path().join("override.db");

        let cli = Cli::try_parse_from([
            "mindscribe".to_string(),
            "--config".to_string(),
            config_path.display().to_string(),
            "--db".to_string(),
            db_path.display().to_string(),
            "dashboard".to_string(),
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.storage.database_path(), Some(db_path.as_path()));
    }

    #[test]
    fn mutations_survive_reopening_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("store.db");
        let args = |command: &[&str]| {
            let mut argv = vec!["mindscribe".to_string(), "--db".to_string()];
            argv.push(db_path.display().to_string());
            argv.extend(command.iter().map(|part| part.to_string()));
            Cli::try_parse_from(argv).unwrap()
        };

        let cli = args(&["tasks", "add", "Renew passport"]);
        let config = resolve_config(&cli).unwrap();
        {
            let conn = open_store(&config).unwrap();
            let mut workspace = Workspace::open(&conn, &config);
            run(cli.command, &mut workspace).unwrap();
        }

        let cli = args(&["tasks", "list"]);
        let config = resolve_config(&cli).unwrap();
        let conn = open_store(&config).unwrap();
        let workspace = Workspace::open(&conn, &config);
        assert!(workspace
            .tasks
            .get_all()
            .iter()
            .any(|task| task.title == "Renew passport"));
    }
}
