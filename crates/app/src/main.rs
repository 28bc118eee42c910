use std::path::Path;

use lms_core::GateSummary;
use lms_core::model::Chapter;
use serde::Serialize;
use services::{AppConfig, AppServices, Clock, ProjectDiscovery};
use tracing_subscriber::EnvFilter;

mod args;

use args::{ArgsError, Command, normalize_sqlite_url, parse, print_usage};

#[derive(Serialize)]
struct ChaptersView {
    visible: Vec<Chapter>,
    summary: GateSummary,
}

#[derive(Serialize)]
struct UnenrollView {
    removed: u64,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let invocation = parse(std::env::args().skip(1), AppConfig::from_env()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let mut config = invocation.config;

    if !invocation.command.needs_database() {
        return run_offline(invocation.command, config);
    }

    // Open + migrate SQLite only for commands that touch course data.
    config.db_url = normalize_sqlite_url(config.db_url);
    prepare_sqlite_file(&config.db_url)?;
    let services = AppServices::new_sqlite(&config, Clock::default()).await?;
    let course_progress = services.course_progress();

    match invocation.command {
        Command::Chapters { learner, course } => {
            let visible = course_progress.visible_chapters(learner, course).await?;
            let summary = course_progress.summary(learner, course).await?;
            print_json(&ChaptersView { visible, summary })
        }
        Command::Complete {
            learner,
            course,
            chapter,
        } => {
            let summary = course_progress
                .complete_chapter(learner, course, chapter)
                .await?;
            print_json(&summary)
        }
        Command::AddChapter {
            course,
            chapter,
            title,
            order,
            kind,
        } => {
            let chapter = course_progress
                .define_chapter(course, chapter, &title, order, kind)
                .await?;
            print_json(&chapter)
        }
        Command::Unenroll { learner, course } => {
            let removed = course_progress.unenroll(learner, course).await?;
            print_json(&UnenrollView { removed })
        }
        Command::Help | Command::Projects | Command::Project { .. } => Ok(()),
    }
}

fn run_offline(command: Command, config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let discovery = ProjectDiscovery::new(config.projects);
    match command {
        Command::Projects => print_json(&discovery.discover()),
        Command::Project { id } => match discovery.find_by_id(&id) {
            Some(project) => print_json(&project),
            None => Err(format!("project not found: {id}").into()),
        },
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url.starts_with("sqlite::memory:") || db_url.starts_with("sqlite:file:") {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    // The pool creates the file itself but not missing parent directories.
    if let Some(parent) = Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        tracing::error!(%err, "command failed");
        std::process::exit(2);
    }
}
