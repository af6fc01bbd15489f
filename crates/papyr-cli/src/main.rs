//! Papyr CLI - OCR documents into searchable, exportable tables

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Papyr - OCR documents into searchable, exportable tables
#[derive(Parser)]
#[command(name = "papyr")]
#[command(version)]
#[command(about = "OCR scans, photos and PDFs, then export the text as tables", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Act as this user (defaults to general.default_user)
    #[arg(short, long, global = true, env = "PAPYR_USER")]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Papyr (create config, database and upload directories)
    Init,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Show tool availability, storage and record counts
    Status,

    /// Run the HTTP API
    Serve {
        /// Address to bind (default: from config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (default: from config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// OCR a file and store it
    Upload {
        /// Path to a jpg, png, heic or pdf file
        path: String,

        /// Chat to associate the document with
        #[arg(long)]
        chat: Option<String>,

        /// Message to associate the document with
        #[arg(short, long)]
        message: Option<String>,

        /// Free-text tags
        #[arg(short, long)]
        tags: Option<String>,
    },

    /// Show details of a document
    Show {
        /// Document ID
        id: String,

        /// Print the full extracted text
        #[arg(long)]
        text: bool,
    },

    /// List recent documents
    Recent {
        /// Maximum number of documents to show
        #[arg(short, long, default_value = "10")]
        limit: i64,
    },

    /// Replace the tags of a document
    Tag {
        /// Document ID
        id: String,

        /// New tags
        tags: String,
    },

    /// Export the extracted text as a table
    Export {
        /// Document ID
        id: String,

        /// Format: csv, json, xlsx or xls
        format: String,

        /// Output file or directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Save the original upload
    Download {
        /// Document ID
        id: String,

        /// Output file or directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the document attached to a chat message
    Message {
        /// Message ID
        message_id: String,

        /// Print the full extracted text
        #[arg(long)]
        text: bool,
    },

    /// Delete a document and its original upload
    Delete {
        /// Document ID
        id: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print the config file location
    Path,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., ocr.language)
        key: String,

        /// Value to set
        value: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("papyr=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("papyr=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Ok((config, _)) = commands::load() {
        if !config.ui.color {
            colored::control::set_override(false);
        }
    }

    let user = cli.user;

    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::show(),
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Set { key, value } => commands::config::set(&key, &value),
        },
        Commands::Status => commands::status::run(user),
        Commands::Serve { host, port } => commands::serve::run(host, port),
        Commands::Upload {
            path,
            chat,
            message,
            tags,
        } => commands::upload::run(user, &path, chat, message, tags),
        Commands::Show { id, text } => commands::show::run(user, &id, text),
        Commands::Recent { limit } => commands::recent::run(user, limit),
        Commands::Tag { id, tags } => commands::tag::run(user, &id, &tags),
        Commands::Export { id, format, output } => {
            commands::export::run(user, &id, &format, output)
        }
        Commands::Download { id, output } => commands::download::run(user, &id, output),
        Commands::Message { message_id, text } => commands::message::run(user, &message_id, text),
        Commands::Delete { id } => commands::delete::run(user, &id),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
