use std::fmt;

use chrono::{DateTime, Duration, Utc};
use course_core::model::{CalendarEvent, CourseCatalog, EventId, Task, TaskId, UserId};
use storage::repository::{
    CompletionRepository, EventRepository, MilestoneRepository, Storage, TaskRepository,
};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    user: UserId,
    tasks: u32,
    events: u32,
    complete: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidTasks { raw: String },
    InvalidEvents { raw: String },
    InvalidComplete { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidTasks { raw } => write!(f, "invalid --tasks value: {raw}"),
            ArgsError::InvalidEvents { raw } => write!(f, "invalid --events value: {raw}"),
            ArgsError::InvalidComplete { raw } => write!(f, "invalid --complete value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("LEARNPATH_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut user = UserId::new(
            std::env::var("LEARNPATH_USER").unwrap_or_else(|_| "demo-user".into()),
        );
        let mut tasks = std::env::var("LEARNPATH_TASKS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(3);
        let mut events = std::env::var("LEARNPATH_EVENTS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(2);
        let mut complete = std::env::var("LEARNPATH_COMPLETE")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(2);
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--user" => {
                    let value = require_value(&mut args, "--user")?;
                    user = UserId::new(value);
                }
                "--tasks" => {
                    let value = require_value(&mut args, "--tasks")?;
                    tasks = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidTasks { raw: value.clone() })?;
                }
                "--events" => {
                    let value = require_value(&mut args, "--events")?;
                    events = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidEvents { raw: value.clone() })?;
                }
                "--complete" => {
                    let value = require_value(&mut args, "--complete")?;
                    complete = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidComplete { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            user,
            tasks,
            events,
            complete,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>    SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --user <id>          User id to seed for (default: demo-user)");
    eprintln!("  --tasks <n>          Number of sample tasks (default: 3)");
    eprintln!("  --events <n>         Number of sample events (default: 2)");
    eprintln!("  --complete <n>       Videos of the first sample course to mark complete (default: 2)");
    eprintln!("  --now <rfc3339>      Fixed current time for deterministic seeding");
    eprintln!("  -h, --help           Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  LEARNPATH_DB_URL, LEARNPATH_USER, LEARNPATH_TASKS, LEARNPATH_EVENTS, LEARNPATH_COMPLETE");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);
    let catalog = CourseCatalog::sample();

    let course = &catalog.courses()[0];
    let completions: std::collections::BTreeSet<_> = course
        .video_ids()
        .take(args.complete as usize)
        .cloned()
        .collect();
    let completed = completions.len();
    storage
        .completions
        .put_completions(&args.user, course.id(), &completions)
        .await?;
    if completed == course.total_videos() {
        storage
            .milestones
            .record_first_earned(&args.user, course.id(), now)
            .await?;
    }

    let mut tasks = Vec::with_capacity(args.tasks as usize);
    for i in 0..args.tasks {
        let due = now + Duration::days(i64::from(i));
        tasks.push(Task::new(
            TaskId::generate(),
            format!("Review chapter {}", i + 1),
            due,
        )?);
    }
    storage.tasks.put_tasks(&args.user, &tasks).await?;

    let mut events = Vec::with_capacity(args.events as usize);
    for i in 0..args.events {
        let date = (now + Duration::days(i64::from(i) * 7)).date_naive();
        events.push(CalendarEvent::new(
            EventId::generate(),
            format!("Study group #{}", i + 1),
            date,
            None,
        )?);
    }
    storage.events.put_events(&args.user, &events).await?;

    println!(
        "Seeded user {} with {}/{} videos of '{}', {} tasks and {} events into {}",
        args.user,
        completed,
        course.total_videos(),
        course.title(),
        args.tasks,
        args.events,
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
