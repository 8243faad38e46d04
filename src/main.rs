use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use std::path::PathBuf;

use prepare_release::cli::{Mode, ReleaseOrchestrator};
use prepare_release::config;
use prepare_release::descriptor::CommandDescriptor;
use prepare_release::files::Workspace;
use prepare_release::ui;

#[derive(clap::Parser)]
#[command(
    name = "prepare-release",
    version,
    about = "Promote a snapshot to a release or advance to the next snapshot"
)]
struct Args {
    #[arg(help = "Workflow to run: 'release' or 'snapshot'")]
    mode: Mode,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(
        short = 'C',
        long,
        default_value = ".",
        help = "Project root containing the documents"
    )]
    directory: PathBuf,

    #[arg(long, help = "Release date for the changelog (YYYY-MM-DD), defaults to today")]
    date: Option<NaiveDate>,

    #[arg(long, help = "Preview what would happen without making changes")]
    dry_run: bool,

    #[arg(short, long, help = "Only print warnings, errors and the summary")]
    quiet: bool,

    #[arg(
        long,
        env = "GITHUB_OUTPUT",
        help = "Also append the summary to this file"
    )]
    github_output: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref(), &args.directory)
        .context("Error loading config")?;

    let workspace = Workspace::new(&args.directory, args.dry_run);
    let mut descriptor = CommandDescriptor::new(&config.descriptor, &args.directory);
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());

    if !args.quiet {
        ui::display_status(&format!(
            "Running {} mode in {}",
            args.mode,
            args.directory.display()
        ));
    }

    let mut orchestrator = ReleaseOrchestrator::new(&config, &workspace, &mut descriptor);
    let summary = match orchestrator.execute(args.mode, date) {
        Ok(summary) => summary,
        Err(e) => {
            let stage = orchestrator.stage();
            return Err(e).context(format!("{} mode aborted after stage '{}'", args.mode, stage));
        }
    };
    let result = orchestrator.into_result(args.mode, summary);

    ui::display_result(&result, args.quiet);
    ui::print_summary(&result.summary)?;

    if let Some(path) = args.github_output.as_deref().filter(|_| !args.dry_run) {
        ui::append_summary(path, &result.summary)?;
    }

    Ok(())
}
