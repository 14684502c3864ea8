//! Interactive helper for everyday git operations.
//!
//! Each subcommand maps to one operation in [`githelper::ops`]. Successful
//! operations are recorded in `~/.git_helper_history.json` (last 100 commands).

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use crossterm::style::Stylize;

use githelper::exit_codes;
use githelper::io::config::{default_config_path, load_config_or_default};
use githelper::io::history::HistoryStore;
use githelper::io::process::GitRunner;
use githelper::io::prompt::TerminalPrompter;
use githelper::logging;
use githelper::ops::{Operations, Report};

const START_HINT: &str = "Use the \"init\" command to start a new repository!";

#[derive(Parser)]
#[command(
    name = "git-helper",
    version,
    about = "Interactive helper for everyday git operations"
)]
struct Cli {
    /// Config file (defaults to `<config dir>/git-helper/config.toml`).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Run as if started in DIR.
    #[arg(short = 'C', long = "directory", global = true, value_name = "DIR")]
    directory: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Initialize a new Git repository.
    Init,
    /// Create and switch to a new branch.
    Branch { name: String },
    /// Stage and commit changes.
    Commit {
        /// Commit message; prompted for when omitted.
        message: Option<String>,
    },
    /// Push changes to a remote repository.
    Push,
    /// Show repository status.
    Status,
    /// Show recent Git commands.
    History {
        /// Forget all recorded commands.
        #[arg(long)]
        clear: bool,
    },
}

fn main() {
    logging::init();
    if !std::io::stdout().is_terminal() {
        crossterm::style::force_color_output(false);
    }
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() {
                exit_codes::USAGE
            } else {
                exit_codes::OK
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };
    std::process::exit(run(cli));
}

fn run(cli: Cli) -> i32 {
    let Some(command) = cli.command else {
        print_usage();
        return exit_codes::OK;
    };

    let config_path = cli.config.or_else(default_config_path);
    let cfg = load_config_or_default(config_path.as_deref());
    let workdir = cli.directory.unwrap_or_else(|| PathBuf::from("."));
    let history = match &cfg.history_file {
        Some(path) => HistoryStore::new(Some(path.clone()), cfg.history_limit),
        None => HistoryStore::in_home_dir(cfg.history_limit),
    };

    let runner = GitRunner::new(cfg.git_program.clone(), &workdir);
    let mut ops = Operations::new(runner, TerminalPrompter::stdio(), history)
        .with_workdir(&workdir)
        .with_ignore_contents(cfg.ignore_file_contents());

    let result = match command {
        Command::Init => ops.init(),
        Command::Branch { name } => ops.branch(&name),
        Command::Commit { message } => ops.commit(message.as_deref()),
        Command::Push => ops.push(),
        Command::Status => ops.status(),
        Command::History { clear: true } => Ok(ops.clear_history()),
        Command::History { clear: false } => Ok(ops.history()),
    };

    match result {
        Ok(report) => {
            print_report(&report);
            exit_codes::OK
        }
        Err(err) => {
            eprintln!("{}", err.to_string().red());
            exit_codes::FAILED
        }
    }
}

fn print_report(report: &Report) {
    println!("{}", report.headline.as_str().green());
    if let Some(body) = &report.body {
        println!("{body}");
    }
    for warning in &report.warnings {
        println!("{}", warning.as_str().yellow());
    }
}

fn print_usage() {
    let mut cmd = Cli::command();
    let _ = cmd.print_help();
    println!();
    println!("{}", START_HINT.cyan());
}
