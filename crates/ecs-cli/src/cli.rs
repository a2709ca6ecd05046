//! CLI argument definitions for the ECS field mapper.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use ecs_client::{BASE_URL_ENV_VAR, ClientConfig};

#[derive(Parser)]
#[command(
    name = "ecs-mapper",
    version,
    about = "ECS Field Mapper - Map log fields to the Elastic Common Schema",
    long_about = "Extract field paths from sample log events, ask the mapping service to \
                  classify them against the Elastic Common Schema, and review or correct \
                  the persisted mappings."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// JSON settings file (base_url, sourcetype, model, limit, max_depth, page_size).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Mapping service origin (overrides the settings file).
    #[arg(
        long = "base-url",
        value_name = "URL",
        env = BASE_URL_ENV_VAR,
        global = true
    )]
    pub base_url: Option<String>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Log raw sample values at trace level.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Preview the field paths a batch would submit.
    Fields(FieldsArgs),

    /// Submit sample events for mapping and show the decisions.
    Map(MapArgs),

    /// Review persisted mappings.
    #[command(subcommand)]
    Mappings(MappingsCommand),
}

/// Batch settings shared by `fields` and `map`.
#[derive(Args)]
pub struct BatchArgs {
    /// Sample events: a JSON object or array of objects. `-` reads stdin.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Source type stamped on every submitted field.
    #[arg(long = "sourcetype", value_name = "NAME")]
    pub sourcetype: Option<String>,

    /// Deepest nesting level to extract (top-level keys are level 0).
    #[arg(long = "max-depth", value_name = "N")]
    pub max_depth: Option<usize>,
}

impl BatchArgs {
    pub fn apply(&self, config: &mut ClientConfig) {
        if let Some(sourcetype) = &self.sourcetype {
            config.sourcetype.clone_from(sourcetype);
        }
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
    }
}

#[derive(Args)]
pub struct FieldsArgs {
    #[command(flatten)]
    pub batch: BatchArgs,

    /// Print nothing on invalid input instead of reporting the error.
    #[arg(long = "silent")]
    pub silent: bool,
}

#[derive(Args)]
pub struct MapArgs {
    #[command(flatten)]
    pub batch: BatchArgs,

    /// Classifier model identifier.
    #[arg(long = "model", value_name = "MODEL")]
    pub model: Option<String>,

    /// Retrieval candidates per field.
    #[arg(long = "limit", value_name = "N")]
    pub limit: Option<u32>,

    /// Write the raw decisions as JSON (default: ecs-mappings-batch.json).
    #[arg(long = "export", value_name = "PATH", num_args = 0..=1)]
    pub export: Option<Option<PathBuf>>,
}

#[derive(Subcommand)]
pub enum MappingsCommand {
    /// Show one page of persisted mappings.
    List(ListArgs),

    /// Correct the ECS field of one mapping on the selected page.
    Edit(EditArgs),
}

/// Page selection shared by `mappings list` and `mappings edit`.
#[derive(Args)]
pub struct PageArgs {
    /// Filter on source type, source field or ECS field.
    #[arg(long = "search", value_name = "TEXT", default_value = "")]
    pub search: String,

    /// 1-based page number.
    #[arg(long = "page", value_name = "N", default_value_t = 1)]
    pub page: u32,

    /// Rows per page (default from settings).
    #[arg(long = "page-size", value_name = "N")]
    pub page_size: Option<u32>,
}

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// Write the visible rows as CSV (default: ecs-mappings.csv).
    #[arg(long = "csv", value_name = "PATH", num_args = 0..=1)]
    pub csv: Option<Option<PathBuf>>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Mapping identifier.
    #[arg(value_name = "ID")]
    pub id: String,

    /// New ECS field name.
    #[arg(long = "mapped-field-name", value_name = "NAME")]
    pub mapped_field_name: String,

    /// Mark the mapping as reviewed (true) or unreviewed (false).
    #[arg(long = "verified", value_name = "BOOL")]
    pub verified: Option<bool>,

    #[command(flatten)]
    pub page: PageArgs,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
