use std::fmt;
use std::path::PathBuf;

use lms_core::model::{ChapterId, ChapterKind, CourseId, LearnerId};
use services::AppConfig;

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingCommand,
    UnknownCommand(String),
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    MissingProjectId,
    UnknownArg(String),
    InvalidNumber { flag: &'static str, raw: String },
    InvalidKind { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingCommand => write!(f, "a subcommand is required"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required"),
            ArgsError::MissingProjectId => write!(f, "project requires an <id>"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidKind { raw } => {
                write!(f, "invalid --kind value (expected regular|assessment): {raw}")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Projects,
    Project { id: String },
    Chapters { learner: LearnerId, course: CourseId },
    Complete { learner: LearnerId, course: CourseId, chapter: ChapterId },
    AddChapter {
        course: CourseId,
        chapter: ChapterId,
        title: String,
        order: i64,
        kind: Option<ChapterKind>,
    },
    Unenroll { learner: LearnerId, course: CourseId },
    Help,
}

impl Command {
    #[must_use]
    pub fn needs_database(&self) -> bool {
        !matches!(self, Command::Projects | Command::Project { .. } | Command::Help)
    }
}

#[derive(Debug)]
pub struct Invocation {
    pub command: Command,
    pub config: AppConfig,
}

/// Raw flag values before the subcommand decides which are required.
#[derive(Default)]
struct Flags {
    positional: Vec<String>,
    learner: Option<u64>,
    course: Option<u64>,
    chapter: Option<u64>,
    id: Option<u64>,
    order: Option<i64>,
    title: Option<String>,
    kind: Option<ChapterKind>,
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  lms projects [--root <dir>]");
    eprintln!("  lms project <id> [--root <dir>]");
    eprintln!("  lms chapters --learner <id> --course <id> [--db <sqlite_url>]");
    eprintln!("  lms complete --learner <id> --course <id> --chapter <id> [--db <sqlite_url>]");
    eprintln!(
        "  lms add-chapter --course <id> --id <id> --title <title> --order <n> [--kind regular|assessment] [--db <sqlite_url>]"
    );
    eprintln!("  lms unenroll --learner <id> --course <id> [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  LMS_DB_URL, LMS_PROJECTS_ROOT, RUST_LOG");
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_number<T: std::str::FromStr>(flag: &'static str, raw: String) -> Result<T, ArgsError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn required<T>(value: Option<T>, flag: &'static str) -> Result<T, ArgsError> {
    value.ok_or(ArgsError::MissingFlag { flag })
}

/// Parses the process arguments (without the program name) over a base config.
pub fn parse(
    args: impl IntoIterator<Item = String>,
    mut config: AppConfig,
) -> Result<Invocation, ArgsError> {
    let mut args = args.into_iter();
    let name = args.next().ok_or(ArgsError::MissingCommand)?;
    let mut flags = Flags::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => {
                let value = require_value(&mut args, "--db")?;
                if value.trim().is_empty() {
                    return Err(ArgsError::InvalidDbUrl { raw: value });
                }
                config.db_url = value;
            }
            "--root" => {
                config.projects.root = PathBuf::from(require_value(&mut args, "--root")?);
            }
            "--learner" => {
                flags.learner = Some(parse_number("--learner", require_value(&mut args, "--learner")?)?);
            }
            "--course" => {
                flags.course = Some(parse_number("--course", require_value(&mut args, "--course")?)?);
            }
            "--chapter" => {
                flags.chapter = Some(parse_number("--chapter", require_value(&mut args, "--chapter")?)?);
            }
            "--id" => {
                flags.id = Some(parse_number("--id", require_value(&mut args, "--id")?)?);
            }
            "--order" => {
                flags.order = Some(parse_number("--order", require_value(&mut args, "--order")?)?);
            }
            "--title" => flags.title = Some(require_value(&mut args, "--title")?),
            "--kind" => {
                let raw = require_value(&mut args, "--kind")?;
                flags.kind = Some(
                    raw.parse::<ChapterKind>()
                        .map_err(|_| ArgsError::InvalidKind { raw })?,
                );
            }
            "--help" | "-h" => {
                return Ok(Invocation {
                    command: Command::Help,
                    config,
                });
            }
            _ if arg.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
            _ => flags.positional.push(arg),
        }
    }

    let command = match name.as_str() {
        "projects" => Command::Projects,
        "project" => Command::Project {
            id: flags
                .positional
                .first()
                .cloned()
                .ok_or(ArgsError::MissingProjectId)?,
        },
        "chapters" => Command::Chapters {
            learner: LearnerId::new(required(flags.learner, "--learner")?),
            course: CourseId::new(required(flags.course, "--course")?),
        },
        "complete" => Command::Complete {
            learner: LearnerId::new(required(flags.learner, "--learner")?),
            course: CourseId::new(required(flags.course, "--course")?),
            chapter: ChapterId::new(required(flags.chapter, "--chapter")?),
        },
        "add-chapter" => Command::AddChapter {
            course: CourseId::new(required(flags.course, "--course")?),
            chapter: ChapterId::new(required(flags.id, "--id")?),
            title: required(flags.title, "--title")?,
            order: required(flags.order, "--order")?,
            kind: flags.kind,
        },
        "unenroll" => Command::Unenroll {
            learner: LearnerId::new(required(flags.learner, "--learner")?),
            course: CourseId::new(required(flags.course, "--course")?),
        },
        "help" | "--help" | "-h" => Command::Help,
        _ => return Err(ArgsError::UnknownCommand(name)),
    };

    let consumed = usize::from(matches!(command, Command::Project { .. }));
    if let Some(extra) = flags.positional.into_iter().nth(consumed) {
        return Err(ArgsError::UnknownArg(extra));
    }

    Ok(Invocation { command, config })
}

/// Turns relative `sqlite:` paths into absolute `sqlite://` URLs.
pub fn normalize_sqlite_url(raw: String) -> String {
    if raw.starts_with("sqlite::memory:")
        || raw.starts_with("sqlite://")
        || raw.starts_with("sqlite:file:")
    {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn parses_project_lookup_with_root_override() {
        let inv = parse(argv(&["project", "Snake", "--root", "/tmp/p"]), AppConfig::default()).unwrap();
        assert_eq!(inv.command, Command::Project { id: "Snake".into() });
        assert_eq!(inv.config.projects.root, PathBuf::from("/tmp/p"));
        assert!(!inv.command.needs_database());
    }

    #[test]
    fn parses_complete_command() {
        let inv = parse(
            argv(&["complete", "--learner", "4", "--course", "2", "--chapter", "9"]),
            AppConfig::default(),
        )
        .unwrap();
        assert_eq!(
            inv.command,
            Command::Complete {
                learner: LearnerId::new(4),
                course: CourseId::new(2),
                chapter: ChapterId::new(9),
            }
        );
        assert!(inv.command.needs_database());
    }

    #[test]
    fn add_chapter_accepts_explicit_kind() {
        let inv = parse(
            argv(&[
                "add-chapter", "--course", "1", "--id", "3", "--title", "Capstone", "--order", "3",
                "--kind", "assessment",
            ]),
            AppConfig::default(),
        )
        .unwrap();
        assert!(matches!(
            inv.command,
            Command::AddChapter { kind: Some(ChapterKind::Assessment), .. }
        ));
    }

    #[test]
    fn reports_missing_and_invalid_flags() {
        assert_eq!(
            parse(argv(&["chapters", "--course", "1"]), AppConfig::default()).unwrap_err(),
            ArgsError::MissingFlag { flag: "--learner" }
        );
        assert_eq!(
            parse(argv(&["chapters", "--learner", "x"]), AppConfig::default()).unwrap_err(),
            ArgsError::InvalidNumber { flag: "--learner", raw: "x".into() }
        );
        assert_eq!(
            parse(argv(&["projects", "--bogus"]), AppConfig::default()).unwrap_err(),
            ArgsError::UnknownArg("--bogus".into())
        );
        assert_eq!(
            parse(argv(&["projects", "extra"]), AppConfig::default()).unwrap_err(),
            ArgsError::UnknownArg("extra".into())
        );
        assert_eq!(
            parse(Vec::<String>::new(), AppConfig::default()).unwrap_err(),
            ArgsError::MissingCommand
        );
    }

    #[test]
    fn normalizes_relative_sqlite_paths() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(normalize_sqlite_url("sqlite:///var/db.sqlite3".into()), "sqlite:///var/db.sqlite3");
        assert!(normalize_sqlite_url("sqlite:lms.sqlite3".into()).starts_with("sqlite:///"));
    }
}
