//! CLI driver for `todo_core`.
//!
//! # Responsibility
//! - Stand in for the presentation layer during local sanity checks.
//! - Configure through `TODO_*` environment variables only.

use clap::{Parser, Subcommand};
use crossbeam_channel::{unbounded, Receiver};
use std::process::ExitCode;
use std::time::Duration;
use todo_core::{init_logging, CoreConfig, CoreResult, MainContext, SyncReport, Task, TodoCore};

const WAIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Local-first to-do list backed by SQLite.
#[derive(Parser)]
#[command(name = "todo_cli", about)]
struct Cli {
    /// Subcommand to run; defaults to `start`.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show local tasks, run the first seed sync, then list again.
    Start,
    /// List every task, newest first.
    List,
    /// Create a task.
    Add {
        title: String,
        #[arg(default_value = "")]
        description: String,
    },
    /// Replace title and description of a task.
    Edit {
        id: String,
        title: String,
        #[arg(default_value = "")]
        description: String,
    },
    /// Toggle completion of a task.
    Done { id: String },
    /// Delete a task.
    Rm { id: String },
    /// Search title and description; an empty query lists everything.
    Find {
        #[arg(default_value = "")]
        query: String,
    },
    /// Fetch seed tasks and merge the new ones.
    Sync,
    /// Delete every task.
    Reset,
    /// Print the core library version.
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command.unwrap_or(Command::Start)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), String> {
    if matches!(command, Command::Version) {
        println!("todo_core version={}", todo_core::core_version());
        return Ok(());
    }

    let config = CoreConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir).map_err(|err| err.to_string())?;
    }

    let (core, main) = TodoCore::open(&config).map_err(|err| err.to_string())?;
    let outcome = dispatch(&core, &main, command);
    let closed = core.shutdown().map_err(|err| err.to_string());
    outcome.and(closed)
}

fn dispatch(core: &TodoCore, main: &MainContext, command: Command) -> Result<(), String> {
    let service = core.service();
    match command {
        Command::Start => {
            let (tx, rx) = unbounded();
            let sync_tx = tx.clone();
            core.sync().start(
                move |local| {
                    let _ = tx.send(local.map(|tasks| format!("{} local task(s)", tasks.len())));
                },
                move |report| {
                    let _ = sync_tx.send(report.map(|r| describe_sync(&r)));
                },
            );
            for _ in 0..2 {
                match drain_one(main, &rx)? {
                    Ok(line) => println!("{line}"),
                    Err(err) => eprintln!("warning: {err}"),
                }
            }
            print_tasks(&wait(main, |done| service.list(done))?);
        }
        Command::List => print_tasks(&wait(main, |done| service.list(done))?),
        Command::Add { title, description } => {
            let task = wait(main, |done| service.create(title, description, done))?;
            println!("created {}", task.id);
        }
        Command::Edit {
            id,
            title,
            description,
        } => report_optional(wait(main, |done| service.edit(id, title, description, done))?),
        Command::Done { id } => {
            report_optional(wait(main, |done| service.toggle_completion(id, done))?)
        }
        Command::Rm { id } => {
            let removed = wait(main, |done| service.remove(id, done))?;
            println!("{}", if removed { "removed" } else { "not found" });
        }
        Command::Find { query } => print_tasks(&wait(main, |done| service.find(query, done))?),
        Command::Sync => {
            let report = wait(main, |done| core.sync().sync_once(done))?;
            println!("{}", describe_sync(&report));
        }
        Command::Reset => {
            let removed = wait(main, |done| service.clear_all(done))?;
            println!("removed {removed} task(s)");
        }
        Command::Version => println!("todo_core version={}", todo_core::core_version()),
    }
    Ok(())
}

type Completion<T> = Box<dyn FnOnce(CoreResult<T>) + Send>;

// Runs one asynchronous core call and blocks this (main) thread on its completion.
fn wait<T: Send + 'static>(
    main: &MainContext,
    submit: impl FnOnce(Completion<T>),
) -> Result<T, String> {
    let (tx, rx) = unbounded();
    submit(Box::new(move |result| {
        let _ = tx.send(result);
    }));
    drain_one(main, &rx)?.map_err(|err| err.to_string())
}

fn drain_one<T>(main: &MainContext, rx: &Receiver<T>) -> Result<T, String> {
    let mut slot = None;
    main.run_until(
        || {
            if slot.is_none() {
                slot = rx.try_recv().ok();
            }
            slot.is_some()
        },
        WAIT_TIMEOUT,
    );
    slot.ok_or_else(|| "timed out waiting for completion".to_string())
}

fn describe_sync(report: &SyncReport) -> String {
    format!(
        "seed sync: fetched={} inserted={} skipped={}",
        report.fetched, report.inserted, report.skipped
    )
}

fn report_optional(task: Option<Task>) {
    match task {
        Some(task) => println!("updated {}", task.id),
        None => println!("not found"),
    }
}

fn print_tasks(tasks: &[Task]) {
    for task in tasks {
        let mark = if task.is_completed { 'x' } else { ' ' };
        println!("[{mark}] {}  {}", task.id, task.title);
    }
    println!("{} task(s)", tasks.len());
}
