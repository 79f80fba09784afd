//! wirebind CLI - convert single values in either direction
//!
//! Commands:
//!   wirebind inbound --type <type> <wire>  - Convert tagged wire text to a host value
//!   wirebind outbound <json>               - Generate script for a JSON document

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wirebind::{
    convert_params, convert_returns, ConverterRegistry, HostType, HostValue, MarshalConfig,
    TypedParameter, WireBatch, WireValue,
};

#[derive(Parser)]
#[command(name = "wirebind")]
#[command(about = "Convert values between host types and the remoting wire format", long_about = None)]
struct Cli {
    /// JSON file with marshalling settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one tagged wire value (e.g. `number:42`) to a host value
    Inbound {
        /// Target type, e.g. `s32`, `list<string>`, `option<f64>`
        #[arg(long = "type", short = 't')]
        ty: String,

        /// Tagged wire text of the parameter
        wire: String,

        /// Additional wire values the parameter may reference
        #[arg(long = "ref", value_name = "ID=WIRE")]
        refs: Vec<String>,
    },

    /// Convert a JSON document to generated script
    Outbound {
        /// JSON text of the value to convert
        json: String,

        /// Function the result expression is passed to
        #[arg(long, default_value = "handle")]
        callback: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => MarshalConfig::from_path(path)?,
        None => MarshalConfig::default(),
    };
    let registry = ConverterRegistry::with_defaults();

    match cli.command {
        Commands::Inbound { ty, wire, refs } => {
            inbound_command(&registry, &config, &ty, &wire, &refs)
        }
        Commands::Outbound { json, callback } => {
            outbound_command(&registry, &config, &json, &callback)
        }
    }
}

fn inbound_command(
    registry: &ConverterRegistry,
    config: &MarshalConfig,
    ty: &str,
    wire: &str,
    refs: &[String],
) -> anyhow::Result<()> {
    let target: HostType = ty.parse()?;

    let mut batch = WireBatch::new();
    batch.push_param(WireBatch::param_id(0, 0), WireValue::parse(wire));
    for entry in refs {
        let (id, text) = entry
            .split_once('=')
            .with_context(|| format!("--ref {:?} is not ID=WIRE", entry))?;
        batch.insert(id.trim(), WireValue::parse(text));
    }

    let values = convert_params(registry, config, &batch, &[TypedParameter::new(target)])
        .map_err(|err| anyhow::anyhow!(err.remote_message()))?;
    for value in &values {
        println!("{}", serde_json::to_string_pretty(&value.to_json())?);
    }
    Ok(())
}

fn outbound_command(
    registry: &ConverterRegistry,
    config: &MarshalConfig,
    json: &str,
    callback: &str,
) -> anyhow::Result<()> {
    let document: serde_json::Value =
        serde_json::from_str(json).context("Failed to parse JSON input")?;
    let value = HostValue::from_json(&document);
    let response = convert_returns(registry, config, std::slice::from_ref(&value))?;
    println!("{}", response.to_script(callback));
    Ok(())
}
