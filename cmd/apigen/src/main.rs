//! Apigen CLI - natural language to Apigee proxy bundles.
//!
//! Commands:
//! - `apigen preview` - Show the generated configuration as Markdown
//! - `apigen bundle` - Write the proxy bundle as a zip (or directory tree)
//! - `apigen deploy` - Import the bundle into an Apigee organization
//! - `apigen chat` - One chat exchange in ask or agent mode, JSON out
//! - `apigen confirm` - Approve or decline a saved pending action
//! - `apigen health` - Report what is configured

use anyhow::Result;
use apigen_deploy::{DEFAULT_BASE_URL, DEFAULT_ENVIRONMENT};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "apigen")]
#[command(about = "Generate Apigee API proxy bundles from plain-language requests")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// How request text becomes a descriptor.
#[derive(Clone, Copy, ValueEnum)]
pub enum ExtractorKind {
    /// Ordered pattern tables
    Regex,
    /// Language model, falling back to patterns
    Llm,
}

/// Chat handling mode.
#[derive(Clone, Copy, ValueEnum)]
pub enum Mode {
    /// Documentation answers
    Ask,
    /// Proxy creation with confirmation
    Agent,
}

/// Language model settings.
#[derive(Args, Clone)]
pub struct ModelArgs {
    /// Anthropic API key
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

/// Apigee management API settings.
#[derive(Args, Clone)]
pub struct DeployArgs {
    /// Apigee organization
    #[arg(long, env = "APIGEE_ORG")]
    pub org: Option<String>,

    /// Apigee access token
    #[arg(long, env = "APIGEE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Environment used for the test URL
    #[arg(long, env = "APIGEE_ENVIRONMENT", default_value = DEFAULT_ENVIRONMENT)]
    pub environment: String,

    /// Management API root
    #[arg(long, env = "APIGEE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the configuration a request would produce
    Preview {
        /// Plain-language proxy request
        request: String,

        /// Extraction strategy
        #[arg(short, long, value_enum, default_value_t = ExtractorKind::Regex)]
        extractor: ExtractorKind,

        /// Write the preview here instead of stdout
        #[arg(short, long)]
        output: Option<String>,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Write the proxy bundle for a request
    Bundle {
        /// Plain-language proxy request
        request: String,

        /// Extraction strategy
        #[arg(short, long, value_enum, default_value_t = ExtractorKind::Regex)]
        extractor: ExtractorKind,

        /// Zip output path (default: <name>.zip)
        #[arg(short, long)]
        output: Option<String>,

        /// Also write the unpacked tree into this directory
        #[arg(long)]
        dir: Option<String>,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Generate a bundle and import it into Apigee
    Deploy {
        /// Plain-language proxy request
        request: String,

        /// Extraction strategy
        #[arg(short, long, value_enum, default_value_t = ExtractorKind::Regex)]
        extractor: ExtractorKind,

        #[command(flatten)]
        model: ModelArgs,

        #[command(flatten)]
        deploy: DeployArgs,
    },

    /// Send one chat message and print the JSON response
    Chat {
        /// Message text
        message: String,

        /// Handling mode
        #[arg(short, long, value_enum, default_value_t = Mode::Ask)]
        mode: Mode,

        /// Save a confirmation payload here when an action is pending
        #[arg(long)]
        save: Option<String>,

        #[command(flatten)]
        model: ModelArgs,

        #[command(flatten)]
        deploy: DeployArgs,
    },

    /// Approve or decline a saved pending action
    Confirm {
        /// Path to the payload written by `chat --save`
        payload: String,

        /// Decline instead of approving
        #[arg(long)]
        decline: bool,

        #[command(flatten)]
        deploy: DeployArgs,
    },

    /// Report which services are configured
    Health {
        #[command(flatten)]
        model: ModelArgs,

        #[command(flatten)]
        deploy: DeployArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    match cli.log_format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }

    match cli.command {
        Commands::Preview {
            request,
            extractor,
            output,
            model,
        } => commands::preview::run(&request, extractor, &model, output.as_deref()).await,
        Commands::Bundle {
            request,
            extractor,
            output,
            dir,
            model,
        } => {
            commands::bundle::run(
                &request,
                extractor,
                &model,
                output.as_deref(),
                dir.as_deref(),
            )
            .await
        }
        Commands::Deploy {
            request,
            extractor,
            model,
            deploy,
        } => commands::deploy::run(&request, extractor, &model, &deploy).await,
        Commands::Chat {
            message,
            mode,
            save,
            model,
            deploy,
        } => commands::chat::run(&message, mode, save.as_deref(), &model, &deploy).await,
        Commands::Confirm {
            payload,
            decline,
            deploy,
        } => commands::confirm::run(&payload, decline, &deploy).await,
        Commands::Health { model, deploy } => commands::health::run(&model, &deploy),
    }
}
