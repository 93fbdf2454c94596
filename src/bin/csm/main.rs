//! csm CLI tool
//!
//! Command-line interface for inspecting query responses that carry a Content Source Map.
//!
//! ## Commands
//!
//! - `path to-expression <studio-path>`: Convert a studio path to a path expression
//! - `path to-studio <expression>`: Convert a path expression to a studio path
//! - `edit-url --response <file> --path <studio-path>`: Print the edit URL for one result value
//! - `edit-urls --response <file>`: Print the edit URL of every mapped result value
//! - `apply --response <file> --documents <file>`: Print the result with cached documents applied
//!
//! A response file is the JSON body returned by the query API:
//!
//! ```json
//! { "result": { "title": "Hello" }, "resultSourceMap": { "documents": [], "paths": [], "mappings": {} } }
//! ```
//!
//! The studio URL and perspective fall back to a TOML config file (`--config`, default
//! `csm.toml`) when not given on the command line.

use clap::{Parser, Subcommand};
use content_source_map::{
    config::{get_content, ConfigProvider, CsmConfig, TomlConfigProvider},
    edit::{create_edit_url, resolve_edit_info, resolve_edit_url, StudioUrl},
    patch::apply_source_documents,
    paths::{
        parse_expression, parse_studio_path_to_parsed, parsed_to_studio_string, to_expression,
    },
    perspective::Perspective,
    sourcemap::ContentSourceMap,
    walk::walk,
    CsmError,
};
use serde::Deserialize;
use serde_json::Value;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[command(name = "csm")]
#[command(author, version, about = "A tool for working with Content Source Maps", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "csm.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert between path notations
    Path {
        #[command(subcommand)]
        command: PathCommands,
    },

    /// Print the edit URL for a single value in a query result
    EditUrl {
        /// Query response JSON file
        #[arg(long)]
        response: PathBuf,

        /// Studio path of the value inside `result`, e.g. `sections[_key=="a"].title`
        #[arg(long)]
        path: String,

        /// Studio base URL (overrides the config file)
        #[arg(long)]
        studio_url: Option<String>,
    },

    /// Print the edit URL for every mapped value in a query result
    EditUrls {
        /// Query response JSON file
        #[arg(long)]
        response: PathBuf,

        /// Studio base URL (overrides the config file)
        #[arg(long)]
        studio_url: Option<String>,
    },

    /// Apply cached documents to a query result and print the patched result
    Apply {
        /// Query response JSON file
        #[arg(long)]
        response: PathBuf,

        /// JSON array of cached documents, each with an `_id`
        #[arg(long)]
        documents: PathBuf,

        /// Perspective: raw, published, drafts, or a comma separated release stack
        #[arg(long)]
        perspective: Option<String>,
    },
}

#[derive(Subcommand)]
enum PathCommands {
    /// Studio path to path expression
    ToExpression { path: String },
    /// Path expression to studio path
    ToStudio { expression: String },
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    result: Value,
    #[serde(rename = "resultSourceMap", default)]
    result_source_map: Option<ContentSourceMap>,
}

fn read_response(path: &Path) -> Result<QueryResponse, CsmError> {
    Ok(serde_json::from_str(&get_content(path)?)?)
}

fn read_documents(path: &Path) -> Result<BTreeMap<String, Value>, CsmError> {
    let documents: Vec<Value> = serde_json::from_str(&get_content(path)?)?;
    let mut cache = BTreeMap::new();
    for document in documents {
        let id = document
            .get("_id")
            .and_then(Value::as_str)
            .ok_or_else(|| CsmError::MissingField("_id".to_string()))?
            .to_string();
        cache.insert(id, document);
    }
    tracing::debug!("Loaded {} cached documents", cache.len());
    Ok(cache)
}

fn studio_url(arg: Option<String>, config: &CsmConfig) -> Result<StudioUrl, CsmError> {
    arg.map(StudioUrl::Url)
        .or_else(|| config.studio_url.clone())
        .ok_or_else(|| CsmError::MissingField("studioUrl".to_string()))
}

fn perspective(arg: Option<String>, config: &CsmConfig) -> Result<Perspective, CsmError> {
    match arg {
        Some(raw) if raw.contains(',') => Ok(Perspective::Stack(
            raw.split(',').map(|name| name.trim().to_string()).collect(),
        )),
        Some(raw) => raw.parse(),
        None => Ok(config.perspective()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = TomlConfigProvider::new(&cli.config).get_config()?;

    match cli.command {
        Commands::Path { command } => match command {
            PathCommands::ToExpression { path } => {
                println!("{}", to_expression(&parse_studio_path_to_parsed(&path)?));
            }
            PathCommands::ToStudio { expression } => {
                println!("{}", parsed_to_studio_string(&parse_expression(&expression))?);
            }
        },

        Commands::EditUrl {
            response,
            path,
            studio_url: url,
        } => {
            let response = read_response(&response)?;
            let Some(csm) = response.result_source_map else {
                eprintln!("Error: response has no resultSourceMap");
                std::process::exit(1);
            };
            let studio = studio_url(url, &config)?;
            match resolve_edit_url(&csm, &path, &studio)? {
                Some(url) => println!("{url}"),
                None => {
                    eprintln!("No edit URL for {path}");
                    std::process::exit(2);
                }
            }
        }

        Commands::EditUrls {
            response,
            studio_url: url,
        } => {
            let response = read_response(&response)?;
            let Some(csm) = response.result_source_map else {
                eprintln!("Error: response has no resultSourceMap");
                std::process::exit(1);
            };
            let studio = studio_url(url, &config)?;

            let mut lines = Vec::new();
            walk(&response.result, |value, path| {
                if let Some(info) = resolve_edit_info(&csm, path, &studio) {
                    lines.push((parsed_to_studio_string(path), create_edit_url(&info)));
                }
                value.clone()
            });
            for (path, url) in lines {
                println!("{}\t{}", path?, url?);
            }
        }

        Commands::Apply {
            response,
            documents,
            perspective: raw,
        } => {
            let response = read_response(&response)?;
            let cache = read_documents(&documents)?;
            let perspective = perspective(raw, &config)?;
            tracing::info!("Applying {} documents with perspective {}", cache.len(), perspective);
            let patched = apply_source_documents(
                &response.result,
                response.result_source_map.as_ref(),
                &cache,
                &perspective,
            )?;
            println!("{}", serde_json::to_string_pretty(&patched)?);
        }
    }

    Ok(())
}
