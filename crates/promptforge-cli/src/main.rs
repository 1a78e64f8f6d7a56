use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "promptforge")]
#[command(about = "PromptForge CLI - guided prompt enhancement", long_about = None)]
struct Cli {
    /// Output language code (e.g. "en", "ja"); detected from the input if omitted
    #[arg(long, global = true)]
    language: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enhance a rough prompt without any questions (super-lazy mode)
    Enhance {
        /// The rough prompt to polish
        input: String,
    },
    /// Run the five-question guided flow
    Guided {
        /// The rough prompt to polish
        input: String,
    },
    /// Run the three-round topic flow with preliminary results
    Topics {
        /// The rough prompt to polish
        input: String,
    },
    /// Run the analysis-driven iterative flow
    Analyze {
        /// The rough prompt to polish
        input: String,
    },
    /// Work with the saved prompt library
    Library {
        #[command(subcommand)]
        action: LibraryAction,
    },
}

#[derive(Subcommand)]
enum LibraryAction {
    /// List all versions of a prompt family
    List { root_id: String },
    /// Search saved prompts
    Search { query: String },
    /// Delete a saved prompt (family roots delete their whole family)
    Delete { id: String },
    /// Show how many prompts are saved
    Count,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let language = commands::language_from_flag(cli.language);

    match cli.command {
        Commands::Enhance { input } => commands::run::enhance(&input).await?,
        Commands::Guided { input } => commands::run::guided(&input, language).await?,
        Commands::Topics { input } => commands::run::topics(&input, language).await?,
        Commands::Analyze { input } => commands::run::analyze(&input, language).await?,
        Commands::Library { action } => match action {
            LibraryAction::List { root_id } => commands::library::list(&root_id).await?,
            LibraryAction::Search { query } => commands::library::search(&query).await?,
            LibraryAction::Delete { id } => commands::library::delete(&id).await?,
            LibraryAction::Count => commands::library::count().await?,
        },
    }

    Ok(())
}
