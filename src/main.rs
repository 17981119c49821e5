mod cli;
mod commands;
mod config;
mod git;

use anyhow::Result;
use clap::Parser;

use cli::PushArgs;
use commands::PushCommand;
use git::{Git, GitFailure};

#[derive(Parser)]
#[command(name = "gap")]
#[command(about = "Stage, branch, commit, and push in one command")]
#[command(version)]
#[command(after_help = cli::USAGE)]
struct Cli {
    /// Branch to commit and push to
    #[arg(short, long)]
    branch: Option<String>,

    /// Commit message; collects every word up to the next flag
    #[arg(short, long, num_args = 1.., value_name = "MESSAGE")]
    message: Option<Vec<String>>,

    /// Echo each git invocation and pass its output through
    #[arg(short, long)]
    debug: bool,

    /// Commit even when there are no staged changes
    #[arg(short = 'e', long)]
    allow_empty: bool,

    /// Show configuration paths and status, then exit
    #[arg(long)]
    config_show: bool,

    /// Print a sample configuration, then exit
    #[arg(long)]
    config_init: bool,

    /// Positional form: <branch> <message words>...
    #[arg(value_name = "ARGS")]
    args: Vec<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        report_failure(&err);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Config inspection flags short-circuit the push sequence
    if cli.config_show || cli.config_init {
        return handle_config_flags(cli.config_show, cli.config_init);
    }

    let args = PushArgs::resolve(
        cli.branch,
        cli.message,
        cli.args,
        cli.debug,
        cli.allow_empty,
    )?;

    let config = config::Config::load()?;

    // CLI flags override config values where appropriate
    let effective = PushArgs {
        debug: args.debug || config.behavior.debug,
        allow_empty: args.allow_empty || config.push.allow_empty,
        ..args
    };

    if effective.debug {
        println!("🔧 Pushing to {}/{}...", config.push.remote, effective.branch);
    }

    let git = Git::new(effective.debug);
    PushCommand::new(&config.push).execute(&effective, &git).await
}

/// Handle --config-show and --config-init
fn handle_config_flags(show: bool, init: bool) -> Result<()> {
    if init {
        let sample = config::Config::create_sample_config()?;
        println!("# Sample gap configuration");
        println!("# Copy this to ~/.config/gap/config.yaml or .gap.yaml");
        println!();
        println!("{}", sample);
        return Ok(());
    }

    if show {
        println!("🔍 gap configuration status:");
        println!();

        let repo_config_path = std::path::PathBuf::from(".gap.yaml");
        if repo_config_path.exists() {
            println!("✅ Repository config: .gap.yaml");
        } else {
            println!("❌ Repository config: .gap.yaml (not found)");
        }

        if let Some(user_config_path) = config::Config::user_config_path() {
            if user_config_path.exists() {
                println!("✅ User config: {}", user_config_path.display());
            } else {
                println!("❌ User config: {} (not found)", user_config_path.display());
            }
        } else {
            println!("❌ User config: Unable to determine config directory");
        }

        println!();
        println!("💡 To create a sample config: gap --config-init > ~/.config/gap/config.yaml");
    }

    Ok(())
}

/// Forward a failed git subcommand's exit code; everything else exits 1.
fn report_failure(err: &anyhow::Error) -> ! {
    eprintln!("{}", err);

    if let Some(failure) = err.downcast_ref::<GitFailure>() {
        std::process::exit(failure.code.max(1));
    }
    std::process::exit(1);
}
