//! CLI for the pointline line-protocol writer.
//!
//! Encodes points locally, sends single points or batch files to a v2 write
//! endpoint, and checks credentials against the health endpoint.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use pointline::error::ValidationError;
use pointline::transport::DEFAULT_BASE_URL;
use pointline::transport::http::HttpTransport;
use pointline::{
    Client, Clock, Config, Credentials, Device, FieldValue, Measurement, PointlineError,
    SystemClock, TagSet, TimeUnit, line,
};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

/// pointline — Line-protocol point writer for sensor devices.
#[derive(Parser)]
#[command(name = "pointline", version, about)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Print the encoded line for a point without sending it.
    Encode {
        #[command(flatten)]
        point: PointArgs,
    },

    /// Send one point.
    Write {
        #[command(flatten)]
        connect: ConnectArgs,

        #[command(flatten)]
        point: PointArgs,
    },

    /// Send every measurement in a JSON file as one batch.
    Batch {
        #[command(flatten)]
        connect: ConnectArgs,

        /// File holding `{ "device": {...}, "measurements": [...] }`.
        file: PathBuf,
    },

    /// Check the token against the health endpoint.
    Health {
        #[command(flatten)]
        connect: ConnectArgs,
    },
}

/// Destination and client settings.
#[derive(Args)]
struct ConnectArgs {
    /// Base URL of the store.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    url: String,

    /// Organization name.
    #[arg(long)]
    org: String,

    /// Bucket name.
    #[arg(long)]
    bucket: String,

    /// API token.
    #[arg(long)]
    token: String,

    /// JSON config file. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Retries after the first attempt.
    #[arg(long)]
    max_retries: Option<u32>,

    /// Per-request timeout in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,
}

/// One point described on the command line.
#[derive(Args)]
struct PointArgs {
    /// Measurement name.
    measurement: String,

    /// Field key.
    field: String,

    /// Field value.
    value: String,

    /// How to interpret the value.
    #[arg(long = "type", value_enum, default_value = "auto")]
    kind: ValueKind,

    /// Tag in `key=value` form. Repeatable; order is kept.
    #[arg(long = "tag", value_parser = parse_tag)]
    tags: Vec<(String, String)>,

    /// Explicit timestamp. Omit to use the current time.
    #[arg(long)]
    timestamp: Option<u64>,

    /// Unit of `--timestamp`, and precision of the current time otherwise.
    #[arg(long, default_value = "ms")]
    unit: TimeUnit,
}

/// Field value interpretation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ValueKind {
    /// Integer if it parses as one, then float, else string.
    Auto,
    /// Always a quoted string.
    String,
    /// Signed 64-bit integer.
    Int,
    /// Finite float.
    Float,
}

/// Contents of a `batch` file.
#[derive(Deserialize)]
struct BatchFile {
    #[serde(default)]
    device: Option<Device>,
    measurements: Vec<Measurement>,
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Encode { point } => cmd_encode(&point),
        Commands::Write { connect, point } => cmd_write(&connect, &point),
        Commands::Batch { connect, file } => cmd_batch(&connect, &file),
        Commands::Health { connect } => cmd_health(&connect),
    };

    if let Err(e) = result {
        match e.downcast_ref::<PointlineError>() {
            Some(err) => eprintln!("Error [{}]: {err}", err.code()),
            None => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }
}

/// Installs the log subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Implements `pointline encode`.
fn cmd_encode(point: &PointArgs) -> CliResult {
    let value = parse_value(&point.value, point.kind)?;
    let measurement = Measurement::new(&point.measurement, &point.field, value);
    measurement.validate().map_err(PointlineError::from)?;

    let mut tags = TagSet::new();
    for (key, value) in &point.tags {
        tags.add(key.as_str(), value.as_str())
            .map_err(PointlineError::from)?;
    }

    let (timestamp, unit) = match point.timestamp {
        Some(t) if t != 0 => (t, point.unit),
        _ => (point.unit.units_in(SystemClock.now()), point.unit),
    };
    let timestamp_ns = unit.to_nanos(timestamp).ok_or_else(|| {
        PointlineError::from(ValidationError::TimestampOverflow { timestamp, unit })
    })?;

    let fields = [(measurement.field.as_str(), measurement.value.clone())];
    println!(
        "{}",
        line::encode(&measurement.name, tags.as_slice(), &fields, timestamp_ns)
    );
    Ok(())
}

/// Implements `pointline write`.
fn cmd_write(connect: &ConnectArgs, point: &PointArgs) -> CliResult {
    let value = parse_value(&point.value, point.kind)?;
    let mut client = connect_client(connect)?;
    client.set_time_unit(point.unit);
    for (key, value) in &point.tags {
        client.add_tag(key, value)?;
    }

    client.write_point_at(
        &point.measurement,
        &point.field,
        value,
        point.timestamp.unwrap_or(0),
        point.unit,
    )?;
    println!("wrote 1 point");
    Ok(())
}

/// Implements `pointline batch <file>`.
fn cmd_batch(connect: &ConnectArgs, path: &Path) -> CliResult {
    let data = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read '{}': {e}", path.display()))?;
    let batch: BatchFile = serde_json::from_str(&data)
        .map_err(|e| format!("failed to parse '{}': {e}", path.display()))?;

    let mut client = connect_client(connect)?;
    if let Some(device) = batch.device {
        if let Err(e) = device.validate() {
            tracing::warn!("device in '{}' is incomplete: {e}", path.display());
        }
        client.set_device(device);
    }

    client.write_measurements(&batch.measurements)?;
    println!("wrote {} points", batch.measurements.len());
    Ok(())
}

/// Implements `pointline health`.
fn cmd_health(connect: &ConnectArgs) -> CliResult {
    let mut client = connect_client(connect)?;
    client.validate_credentials()?;
    println!("credentials OK");
    Ok(())
}

/// Builds a started client over HTTP with epoch timestamps.
fn connect_client(connect: &ConnectArgs) -> Result<Client<HttpTransport>, PointlineError> {
    let config = resolve_config(connect)?;
    let credentials = Credentials::new(&connect.token, &connect.org, &connect.bucket);

    let mut client = Client::new(credentials, HttpTransport::new()?).with_clock(SystemClock);
    client.set_config(config)?;
    client.begin(&connect.url)?;
    tracing::info!(url = client.write_url().unwrap_or_default(), "client ready");
    Ok(client)
}

/// File config (or defaults) with flag overrides applied.
fn resolve_config(connect: &ConnectArgs) -> Result<Config, PointlineError> {
    let mut config = match &connect.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(max_retries) = connect.max_retries {
        config = config.with_max_retries(max_retries);
    }
    if let Some(ms) = connect.timeout_ms {
        config = config.with_timeout(Duration::from_millis(ms));
    }
    config.validate()?;
    Ok(config)
}

/// Parses a `key=value` tag argument. The value may contain `=`.
fn parse_tag(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() && !value.is_empty() => {
            Ok((key.to_string(), value.to_string()))
        }
        _ => Err(format!("invalid tag '{s}': expected key=value")),
    }
}

/// Interprets a raw value according to `kind`.
fn parse_value(raw: &str, kind: ValueKind) -> Result<FieldValue, String> {
    match kind {
        ValueKind::String => Ok(FieldValue::String(raw.to_string())),
        ValueKind::Int => raw
            .parse::<i64>()
            .map(FieldValue::Integer)
            .map_err(|e| format!("invalid integer '{raw}': {e}")),
        ValueKind::Float => match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(FieldValue::Float(v)),
            Ok(_) => Err(format!("float '{raw}' is not finite")),
            Err(e) => Err(format!("invalid float '{raw}': {e}")),
        },
        ValueKind::Auto => {
            if let Ok(v) = raw.parse::<i64>() {
                return Ok(FieldValue::Integer(v));
            }
            match raw.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(FieldValue::Float(v)),
                _ => Ok(FieldValue::String(raw.to_string())),
            }
        }
    }
}
