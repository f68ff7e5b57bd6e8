use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;
use crate::config::Config;

#[derive(Parser)]
#[command(
    name = "finadvisor",
    version,
    about = "Client for the financial document analyzer",
    long_about = "Upload financial reports, run the analysis crew on them, and query the results\nfrom your terminal."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the backend address for this invocation
    #[arg(long, global = true, value_name = "URL")]
    pub api_endpoint: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload a document and run the analysis crew on it
    Analyze {
        /// PDF or DOCX file to analyze
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Field to extract (e.g. "Total gross profit")
        #[arg(short, long)]
        input_field: Option<String>,

        /// Question about the document
        #[arg(short = 'q', long = "query")]
        user_query: Option<String>,

        /// Open the dashboard link in a browser when one is returned
        #[arg(long)]
        open: bool,
    },

    /// Ask a question about an uploaded document
    Query {
        /// Document ID (see `finadvisor document list`)
        #[arg(value_name = "ID", conflicts_with = "pdf_path")]
        id: Option<String>,

        /// Query a file by its path on the server instead of by ID
        #[arg(long, conflicts_with = "id")]
        pdf_path: Option<String>,

        /// Keyword to search for
        #[arg(short, long)]
        input_field: Option<String>,

        /// Question about the document
        #[arg(short = 'q', long = "query")]
        user_query: Option<String>,
    },

    /// Manage documents
    Document {
        #[command(subcommand)]
        action: DocumentAction,
    },

    /// Authenticate with the analyzer backend
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Configure finadvisor settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },
    /// Reset configuration to defaults
    Reset,
}

#[derive(Subcommand)]
pub enum AuthAction {
    /// Log in and store the session token
    Login {
        /// Username (prompted for if omitted)
        #[arg(short, long)]
        username: Option<String>,
        /// Password (only needed when the backend checks it)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        username: Option<String>,
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Forget the stored session token
    Logout,
    /// Check whether the stored session is still accepted
    Status,
}

#[derive(Subcommand)]
pub enum DocumentAction {
    /// Upload a document without analysis
    Upload {
        /// Path to the document to upload
        file: Option<PathBuf>,
    },
    /// List all documents
    List,
    /// Start background analysis of an uploaded document
    Analyze {
        /// Document ID
        id: String,
        /// Wait for the job to finish and print its results
        #[arg(short, long)]
        wait: bool,
        /// Give up waiting after this many seconds
        #[arg(long, default_value = "600")]
        timeout: u64,
    },
    /// Show status and results of a background analysis
    Results {
        /// Document ID
        id: String,
    },
}

impl Cli {
    /// Load configuration, applying the command-line endpoint override.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(endpoint) = &self.api_endpoint {
            config.set("api_endpoint", endpoint)?;
        }
        if !config.color_output {
            colored::control::set_override(false);
        }
        Ok(config)
    }

    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Analyze {
                file,
                input_field,
                user_query,
                open,
            } => {
                let config = self.load_config()?;
                commands::analyze::execute(
                    &config,
                    file.as_deref(),
                    input_field.as_deref(),
                    user_query.as_deref(),
                    *open,
                )
                .await
            }
            Commands::Query {
                id,
                pdf_path,
                input_field,
                user_query,
            } => {
                let config = self.load_config()?;
                commands::query::execute(
                    &config,
                    id.as_deref(),
                    pdf_path.as_deref(),
                    input_field.as_deref(),
                    user_query.as_deref(),
                )
                .await
            }
            Commands::Document { action } => {
                let config = self.load_config()?;
                commands::document::execute(&config, action).await
            }
            Commands::Auth { action } => {
                let config = self.load_config()?;
                commands::auth::execute(&config, action).await
            }
            Commands::Config { action } => {
                commands::config::execute(self.config.as_deref(), action).await
            }
            Commands::Completions { shell } => commands::completions::execute(*shell),
        }
    }
}
