mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "judgekit")]
#[command(about = "judgekit CLI - Generate, run and inspect automated test harnesses", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wrap user code and test cases into a runnable program
    Generate {
        /// Target language (javascript, python, java, cpp)
        #[arg(short, long)]
        language: String,

        /// File containing the user's solution
        #[arg(short, long)]
        code: PathBuf,

        /// JSON file with an array of {input, expected} test cases
        #[arg(short, long)]
        tests: PathBuf,

        /// Entry point name (inferred from the code when omitted)
        #[arg(short, long)]
        function: Option<String>,

        /// Write the program here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print the entry point inferred from a solution file
    Infer {
        /// Target language
        #[arg(short, long)]
        language: String,

        /// File containing the user's solution
        #[arg(short, long)]
        code: PathBuf,
    },

    /// Extract the result block from captured program output
    Parse {
        /// Output file (reads stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Run a solution against test cases on the configured Judge0
    Run {
        /// Target language
        #[arg(short, long)]
        language: String,

        /// File containing the user's solution
        #[arg(short, long)]
        code: PathBuf,

        /// JSON file with an array of {input, expected} test cases
        #[arg(short, long)]
        tests: PathBuf,

        /// Entry point name (inferred from the code when omitted)
        #[arg(short, long)]
        function: Option<String>,

        /// Print the full report as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// List supported languages
    Languages,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so generated programs and JSON can be piped
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            language,
            code,
            tests,
            function,
            out,
        } => {
            commands::generate(&language, &code, &tests, function.as_deref(), out.as_deref())?;
        }
        Commands::Infer { language, code } => {
            commands::infer(&language, &code)?;
        }
        Commands::Parse { input } => {
            commands::parse(input.as_deref())?;
        }
        Commands::Run {
            language,
            code,
            tests,
            function,
            json,
        } => {
            commands::run(&language, &code, &tests, function.as_deref(), json).await?;
        }
        Commands::Languages => {
            commands::languages()?;
        }
    }

    Ok(())
}
