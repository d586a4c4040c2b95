use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    ClientError, HttpTaskApi, PriorityFilter, StatusFilter, TaskApi, TaskFilter,
    TaskListController,
};
use session::{default_vault_dir, FileVault, Session, SessionStore};
use shared::{
    domain::{Priority, TaskId},
    protocol::{Credentials, DragOutcome, Registration, TaskDraft, TaskPatch},
};
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "tasks", about = "Todo-list client for the remote task service")]
struct Args {
    /// Base URL of the task service.
    #[arg(long, env = "TASKS_SERVER_URL")]
    server_url: String,
    /// Where the session token and identity are kept between runs.
    #[arg(long, env = "TASKS_STATE_DIR")]
    state_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and start a session.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
    },
    /// Exchange credentials for a session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Drop the stored session.
    Logout,
    #[command(flatten)]
    Task(TaskCommand),
}

/// Subcommands that need an established session.
#[derive(Subcommand, Debug)]
enum TaskCommand {
    /// Show the task list, optionally filtered.
    List {
        #[arg(long)]
        search: Option<String>,
        /// all, active or completed.
        #[arg(long, default_value = "all")]
        status: String,
        /// all, low, medium or high.
        #[arg(long, default_value = "all")]
        priority: String,
    },
    /// Create a task.
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
    },
    /// Edit a task's fields.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
    },
    /// Toggle a task's completed flag.
    Done { id: String },
    /// Delete a task.
    Rm { id: String },
    /// Move a task to another slot in the list (0-based).
    Move { id: String, to: usize },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let state_dir = match args.state_dir {
        Some(dir) => dir,
        None => default_vault_dir("tasks-cli")
            .ok_or_else(|| anyhow!("could not determine a config directory"))?,
    };
    let mut store = SessionStore::new(FileVault::new(state_dir));
    let api = HttpTaskApi::new(args.server_url.as_str())?;

    match args.command {
        Command::Register {
            email,
            password,
            name,
        } => {
            let auth = api
                .register(&Registration {
                    email,
                    password,
                    name,
                })
                .await?;
            store.establish(auth.user.clone(), auth.token)?;
            println!("Registered and logged in as {}", auth.user.name);
        }
        Command::Login { email, password } => {
            let auth = api.login(&Credentials { email, password }).await?;
            store.establish(auth.user.clone(), auth.token)?;
            println!("Logged in as {}", auth.user.name);
        }
        Command::Logout => {
            store.clear();
            println!("Logged out");
        }
        Command::Task(command) => {
            let session = store
                .restore()
                .ok_or_else(|| anyhow!("no session; run `tasks login` first"))?;
            if let Err(err) = run_task_command(api, session, command).await {
                if err.is_unauthenticated() {
                    // The token was rejected; the stored session is dead.
                    warn!("session: token rejected by the server, clearing stored state");
                    store.clear();
                    bail!("session expired; run `tasks login` again");
                }
                return Err(err).context("task command failed");
            }
        }
    }

    Ok(())
}

async fn run_task_command(
    api: HttpTaskApi,
    session: Session,
    command: TaskCommand,
) -> Result<(), ClientError> {
    let mut controller = TaskListController::new(api, session);
    controller.load().await?;

    match command {
        TaskCommand::List {
            search,
            status,
            priority,
        } => {
            let filter = TaskFilter {
                text: search,
                status: parse_status(&status)?,
                priority: parse_priority_filter(&priority)?,
            };
            let stats = controller.stats();
            println!(
                "{} total, {} active, {} completed",
                stats.total, stats.active, stats.completed
            );
            for task in controller.filter(&filter) {
                let mark = if task.completed { "x" } else { " " };
                let description = task
                    .description
                    .as_deref()
                    .map(|d| format!(" - {d}"))
                    .unwrap_or_default();
                println!(
                    "[{mark}] {} ({}) {}{description}",
                    task.title,
                    task.priority.as_str(),
                    task.id
                );
            }
        }
        TaskCommand::Add {
            title,
            description,
            priority,
        } => {
            let mut draft = TaskDraft::new(title);
            draft.description = description;
            draft.priority = priority;
            let task = controller.create(draft).await?;
            println!("Created {}", task.id);
        }
        TaskCommand::Edit {
            id,
            title,
            description,
            priority,
        } => {
            let patch = TaskPatch {
                title,
                description,
                priority,
                ..TaskPatch::default()
            };
            controller.update(&TaskId(id), patch).await?;
            println!("Updated");
        }
        TaskCommand::Done { id } => {
            controller.toggle_completed(&TaskId(id)).await?;
            println!("Toggled");
        }
        TaskCommand::Rm { id } => {
            controller.delete(&TaskId(id)).await?;
            println!("Deleted");
        }
        TaskCommand::Move { id, to } => {
            let task_id = TaskId(id);
            let source = controller
                .tasks()
                .iter()
                .position(|task| task.id == task_id)
                .ok_or_else(|| ClientError::validation(format!("unknown task id {task_id}")))?;
            controller
                .drag(DragOutcome {
                    source,
                    destination: Some(to),
                    task_id,
                })
                .await?;
            println!("Moved");
        }
    }

    Ok(())
}

fn parse_status(raw: &str) -> Result<StatusFilter, ClientError> {
    match raw {
        "all" => Ok(StatusFilter::All),
        "active" => Ok(StatusFilter::Active),
        "completed" => Ok(StatusFilter::Completed),
        other => Err(ClientError::validation(format!(
            "unknown status filter: {other}"
        ))),
    }
}

fn parse_priority_filter(raw: &str) -> Result<PriorityFilter, ClientError> {
    if raw == "all" {
        return Ok(PriorityFilter::All);
    }
    raw.parse::<Priority>()
        .map(PriorityFilter::Only)
        .map_err(ClientError::validation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn session_commands_parse_into_their_own_enum() {
        let args = Args::try_parse_from(["tasks", "--server-url", "http://x", "list"])
            .expect("parse list");
        assert!(matches!(args.command, Command::Task(TaskCommand::List { .. })));

        let args = Args::try_parse_from([
            "tasks",
            "--server-url",
            "http://x",
            "move",
            "t1",
            "2",
        ])
        .expect("parse move");
        let Command::Task(TaskCommand::Move { id, to }) = args.command else {
            panic!("expected a move command");
        };
        assert_eq!(id, "t1");
        assert_eq!(to, 2);
    }

    #[test]
    fn auth_commands_stay_outside_the_session_enum() {
        let args = Args::try_parse_from(["tasks", "--server-url", "http://x", "logout"])
            .expect("parse logout");
        assert!(matches!(args.command, Command::Logout));
    }
}
