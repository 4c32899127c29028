use clap::{Parser, Subcommand};

mod commands;

use commands::{EvaluateArgs, GradeArgs, ReportArgs};

#[derive(Parser)]
#[command(name = "betedge")]
#[command(about = "Betting analytics and quality-gate engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate market lines against model estimates and emit picks
    Evaluate(EvaluateArgs),
    /// Settle picks against game results
    Grade(GradeArgs),
    /// Build a performance report from settlements
    Report(ReportArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Evaluate(args) => {
            commands::run_evaluate(&args)?;
        }
        Commands::Grade(args) => {
            commands::run_grade(&args)?;
        }
        Commands::Report(args) => {
            commands::run_report(&args)?;
        }
    }

    Ok(())
}
