use std::path::PathBuf;

use audiocare_protocol::stage::Stage;
use clap::{Args, Parser, Subcommand, ValueEnum};
use jiff::civil::Date;

use crate::config::LogFormat;

/// Hearing-aid fitting sessions: checklists, audiometry and exports.
#[derive(Parser, Debug)]
#[command(name = "audiocare")]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to the platform config directory).
    #[arg(long, global = true, env = "AUDIOCARE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Overrides the data directory from the config file.
    #[arg(long, global = true, env = "AUDIOCARE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Overrides the log format from the config file.
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct VisitRef {
    #[arg(long)]
    pub customer: String,
    #[arg(long)]
    pub visit: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a session, pre-filled from the customer's earlier audiograms.
    New {
        #[arg(long)]
        customer: String,
        /// Generated when omitted.
        #[arg(long)]
        visit: Option<String>,
        /// HA_1, HA_2, HA_3 or AFTERCARE_3MO.
        #[arg(long)]
        stage: Stage,
        /// Visit date, YYYY-MM-DD.
        #[arg(long)]
        date: Option<Date>,
    },
    /// Print a session as JSON.
    Show(VisitRef),
    /// List a customer's sessions, oldest first.
    List {
        #[arg(long)]
        customer: String,
    },
    /// Print derived figures for a session.
    Summary(VisitRef),
    /// List required checklist items not yet done.
    Missing(VisitRef),
    /// Apply edits given as JSON (one object or an array) and save.
    Apply {
        #[command(flatten)]
        target: VisitRef,
        /// Inline JSON; reads stdin when omitted.
        #[arg(long)]
        json: Option<String>,
    },
    /// Write sessions as flat rows.
    Export {
        /// Only this customer's sessions.
        #[arg(long)]
        customer: Option<String>,
        #[arg(long, value_enum, default_value_t = ExportFormat::Tsv)]
        format: ExportFormat,
        /// File or directory; a directory gets a file named after the clinic.
        /// Writes to stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Write every session to a backup bundle.
    Backup {
        /// Defaults to `backups/<timestamp>.json` under the data directory.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Restore sessions from a backup bundle.
    Restore {
        input: PathBuf,
        /// Keep sessions not in the bundle.
        #[arg(long)]
        merge: bool,
        /// Only print what the bundle contains.
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the effective configuration.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Tsv,
    Json,
}
