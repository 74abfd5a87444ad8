use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;
use std::path::PathBuf;
use std::process;

use faro_runner::engine::{run_scenarios, RunOptions};
use faro_runner::parser::{collect_scenario_files, parse_scenario_file};
use faro_runner::report;
use faro_runner::RunnerConfig;

#[derive(Parser)]
#[command(name = "faro-runner")]
#[command(version = "0.1.0")]
#[command(about = "Web UI scenario automation runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (debug level)
    #[arg(short, long, global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run scenario file(s) or a directory of scenarios
    Run {
        /// Path to a scenario file or directory
        path: PathBuf,

        /// Filter scenarios by tags (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        tag: Vec<String>,

        /// One browser session per scenario, all at once
        #[arg(long, default_value = "false")]
        parallel: bool,

        /// Run with a visible browser window
        #[arg(long, default_value = "false")]
        headed: bool,

        /// Base URL joined with relative scenario URLs
        #[arg(short, long)]
        base_url: Option<String>,

        /// Settle delay before each element action, in milliseconds
        #[arg(long)]
        settle_delay_ms: Option<u64>,

        /// Write the JSON report to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse scenarios and report problems without running them
    Validate {
        /// Path to a scenario file or directory
        path: PathBuf,
    },

    /// Print the summary of a saved JSON report
    Report {
        /// Path to a report produced by `run --output`
        results: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    match cli.command {
        Commands::Run {
            path,
            tag,
            parallel,
            headed,
            base_url,
            settle_delay_ms,
            output,
        } => {
            println!(
                "{} Running scenarios from: {}",
                "▶".green().bold(),
                path.display()
            );
            if !tag.is_empty() {
                println!("  Tags: {}", tag.join(", ").yellow());
            }
            if parallel {
                println!("  Parallel: {}", "Enabled".yellow());
            }

            let mut config = RunnerConfig::default().apply_env();
            if headed {
                config.headless = false;
            }
            if let Some(base) = base_url {
                config.base_url = Some(base);
            }
            if let Some(settle) = settle_delay_ms {
                config.settle_delay_ms = settle;
            }

            let options = RunOptions {
                tags: tag,
                parallel,
            };

            let run_report = run_scenarios(&path, &options, config).await?;

            if output.is_some() {
                report::json::generate(&run_report, output.as_deref()).await?;
            }
            report::print_summary(&run_report);

            process::exit(run_report.exit_code());
        }

        Commands::Validate { path } => {
            let files = collect_scenario_files(&path)?;
            if files.is_empty() {
                anyhow::bail!("No scenario files found under {}", path.display());
            }

            let mut problems = 0;
            for file in &files {
                match parse_scenario_file(file) {
                    Ok(scenario) => println!(
                        "  {} {} ({} steps)",
                        "✓".green(),
                        scenario.name,
                        scenario.steps.len()
                    ),
                    Err(e) => {
                        problems += 1;
                        println!("  {} {:#}", "✗".red(), e);
                    }
                }
            }

            println!(
                "\n  {} files checked, {} with problems",
                files.len(),
                problems
            );
            if problems > 0 {
                process::exit(1);
            }
        }

        Commands::Report { results } => {
            let run_report = report::load_report(&results)?;
            report::print_summary(&run_report);
        }
    }

    Ok(())
}
