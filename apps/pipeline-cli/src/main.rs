use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use platform_obs::{LogFormat, ObsConfig};
use products_crm::replay::{ReplayReport, parse_script};
use products_crm::{
    Board, DealStore, Highlight, PipelineConfig, Replayer, SeedSet, Stage, StageChange, stage,
};
use serde::Serialize;

mod render;

#[derive(Parser, Debug)]
#[command(name = "pipeline", version, about = "Sales pipeline board from the command line")]
struct Cli {
    /// Deals the board starts with (demo|empty); defaults to $PIPELINE_SEED or demo
    #[arg(long, global = true)]
    seed: Option<SeedSet>,
    /// Output format
    #[arg(long, value_enum, default_value_t = Output::Text, global = true)]
    output: Output,
    /// Log filter directive; falls back to RUST_LOG
    #[arg(long, env = "PIPELINE_LOG", global = true)]
    log: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List pipeline stages in board order
    Stages,
    /// Print the board with its rollups
    Board,
    /// Apply a JSON command script to the board, then print it
    Replay {
        script: PathBuf,
        /// Skip failing commands instead of stopping at the first one
        #[arg(long)]
        keep_going: bool,
        /// Also print the stage-change log
        #[arg(long)]
        history: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Output {
    Text,
    Json,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FailureView {
    index: usize,
    command: &'static str,
    code: &'static str,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplayView<'a> {
    board: Board<'a>,
    highlight: Highlight,
    applied: usize,
    failures: Vec<FailureView>,
    history: &'a [StageChange],
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    platform_obs::init_tracing(ObsConfig {
        service_name: "pipeline-cli",
        env_filter: cli.log.clone(),
        format: LogFormat::Compact,
        with_target: false,
    })?;

    let config = PipelineConfig::load().context("failed to read pipeline configuration")?;
    let seed = cli.seed.unwrap_or(config.seed);
    tracing::debug!(%seed, output = ?cli.output, "starting");

    match cli.command {
        Commands::Stages => print_stages(cli.output)?,
        Commands::Board => {
            let store = seed.store().context("failed to seed deal store")?;
            print_board(&store, cli.output)?;
        }
        Commands::Replay {
            script,
            keep_going,
            history,
        } => {
            let raw = std::fs::read_to_string(&script)
                .with_context(|| format!("failed to read {}", script.display()))?;
            let commands = parse_script(&raw)?;
            let store = seed.store().context("failed to seed deal store")?;
            let mut replayer = Replayer::new(store).keep_going(keep_going || config.keep_going);
            let report = replayer
                .run(commands)
                .with_context(|| format!("replay of {} aborted", script.display()))?;
            print_replay(&replayer, &report, history, cli.output)?;
        }
    }

    Ok(())
}

fn print_stages(output: Output) -> anyhow::Result<()> {
    match output {
        Output::Text => print!("{}", render::StageTable),
        Output::Json => {
            let stages: &[Stage] = stage::all();
            println!("{}", serde_json::to_string_pretty(stages)?);
        }
    }
    Ok(())
}

fn print_board(store: &DealStore, output: Output) -> anyhow::Result<()> {
    let board = Board::project(store.list());
    match output {
        Output::Text => print!(
            "{}",
            render::BoardView {
                board: &board,
                highlight: Highlight::default(),
            }
        ),
        Output::Json => println!("{}", serde_json::to_string_pretty(&board)?),
    }
    Ok(())
}

fn print_replay(
    replayer: &Replayer,
    report: &ReplayReport,
    history: bool,
    output: Output,
) -> anyhow::Result<()> {
    let store = replayer.store();
    let highlight = Highlight::of(replayer.session());
    let view = ReplayView {
        board: Board::project(store.list()),
        highlight,
        applied: report.applied,
        failures: report
            .failures
            .iter()
            .map(|f| FailureView {
                index: f.index,
                command: f.command,
                code: f.error.code(),
                message: f.error.to_string(),
            })
            .collect(),
        history: store.stage_history(),
    };

    match output {
        Output::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        Output::Text => {
            print!(
                "{}",
                render::BoardView {
                    board: &view.board,
                    highlight,
                }
            );
            println!("\napplied {} command(s)", view.applied);
            for failure in &view.failures {
                println!(
                    "  command {} ({}) failed [{}]: {}",
                    failure.index, failure.command, failure.code, failure.message
                );
            }
            if history {
                println!("\nstage changes:");
                print!("{}", render::History(view.history));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use products_crm::{DealId, StageId};

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_replay_flags() {
        let cli = Cli::parse_from([
            "pipeline",
            "--seed",
            "empty",
            "--output",
            "json",
            "replay",
            "script.json",
            "--keep-going",
        ]);
        assert_eq!(cli.seed, Some(SeedSet::Empty));
        assert_eq!(cli.output, Output::Json);
        assert!(matches!(
            cli.command,
            Commands::Replay {
                keep_going: true,
                history: false,
                ..
            }
        ));
    }

    #[test]
    fn bundled_script_replays_cleanly() {
        let commands = parse_script(include_str!("../scripts/close-quarter.json")).unwrap();
        let mut replayer = Replayer::new(SeedSet::Demo.store().unwrap());
        let report = replayer.run(commands).unwrap();
        assert_eq!(report.applied, 11);

        let store = replayer.store();
        assert_eq!(store.len(), 5);
        assert!(store.get(DealId::new(3)).is_err());
        assert_eq!(store.get(DealId::new(5)).unwrap().stage, StageId::Qualified);
        assert_eq!(store.get(DealId::new(4)).unwrap().stage, StageId::Lead);
        assert_eq!(store.get(DealId::new(2)).unwrap().probability, 90);
        assert_eq!(store.list()[0].title, "Support Renewal");
    }
}
