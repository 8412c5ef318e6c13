//! CLI for the influxline line-protocol encoder.
//!
//! Reads points as JSON and either prints them as line protocol or writes
//! them to an InfluxDB `/write` endpoint.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use influxline::{
    Batch, BatchWriter, EncodeOptions, EncodeReport, IoSink, Point, PointsReport, WriteConfig,
    WriteMode,
};
use tracing_subscriber::EnvFilter;

/// influxline — encode points as InfluxDB line protocol and write them.
#[derive(Parser)]
#[command(name = "influxline", version, about)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` wins if set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Encode points and print the line-protocol batch to stdout.
    Encode {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Encode points and write them to an InfluxDB write endpoint.
    Write {
        #[command(flatten)]
        input: InputArgs,

        /// JSON config file with server, database, auth, timeout and mode.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Server base URL (e.g., "http://localhost:8086").
        #[arg(long)]
        server: Option<String>,

        /// Target database.
        #[arg(long)]
        database: Option<String>,

        /// User name for HTTP Basic auth.
        #[arg(long)]
        username: Option<String>,

        /// Password for HTTP Basic auth.
        #[arg(long, env = "INFLUX_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Send one request per point instead of one request for all points.
        #[arg(long)]
        per_point: bool,

        /// Request timeout in seconds.
        #[arg(long)]
        timeout: Option<u64>,

        /// Output format for the write summary.
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Point input options shared by all commands.
#[derive(clap::Args)]
struct InputArgs {
    /// JSON file holding an array of points, or "-" for stdin.
    input: PathBuf,

    /// Read one JSON point per line instead of a JSON array.
    #[arg(long)]
    ndjson: bool,

    /// Filter out null/empty fields as intended (logged at trace level only).
    #[arg(long)]
    exclude_empty_fields: bool,
}

/// Output format for write summaries.
#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable text.
    Text,
    /// JSON object.
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Encode { input } => cmd_encode(&input),
        Commands::Write {
            input,
            config,
            server,
            database,
            username,
            password,
            per_point,
            timeout,
            format,
        } => {
            let overrides = ConfigOverrides {
                server,
                database,
                username,
                password,
                per_point,
                timeout,
            };
            build_config(config.as_deref(), overrides)
                .and_then(|config| cmd_write(&input, &config, &format))
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Installs a stderr `fmt` subscriber so stdout stays clean line protocol.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Implements `influxline encode <input>`.
fn cmd_encode(input: &InputArgs) -> Result<(), Box<dyn std::error::Error>> {
    let points = read_points(&input.input, input.ndjson)?;
    let report = Batch::encode_points(&points, &encode_options(input));
    report_drops(&report);

    let stdout = io::stdout();
    let mut writer = BatchWriter::new(IoSink::new(stdout.lock()));
    let result = writer.write(&report.batch, WriteMode::Bulk);
    if let Some(error) = result.failures().find_map(|o| o.error.as_deref()) {
        return Err(format!("failed to write to stdout: {error}").into());
    }

    Ok(())
}

/// Implements `influxline write <input>`.
fn cmd_write(
    input: &InputArgs,
    config: &WriteConfig,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let points = read_points(&input.input, input.ndjson)?;

    tracing::info!(
        server = %config.server,
        database = %config.database,
        mode = %config.mode,
        points = points.len(),
        "writing points"
    );

    let mut writer = BatchWriter::from_config(config)?;
    let report = writer.encode_and_write(&points, &encode_options(input), config.mode);

    print_summary(&report, points.len(), format)?;

    let failed = report.result.failures().count();
    if failed > 0 {
        return Err(format!(
            "{failed} of {} requests failed",
            report.result.requests()
        )
        .into());
    }

    Ok(())
}

/// Command-line values that take precedence over a config file.
struct ConfigOverrides {
    server: Option<String>,
    database: Option<String>,
    username: Option<String>,
    password: Option<String>,
    per_point: bool,
    timeout: Option<u64>,
}

/// Builds the write config from an optional file plus command-line overrides.
fn build_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<WriteConfig, Box<dyn std::error::Error>> {
    let mut config = match path {
        Some(path) => WriteConfig::load(path)?,
        None => {
            let server = overrides
                .server
                .clone()
                .ok_or("--server is required without --config")?;
            let database = overrides
                .database
                .clone()
                .ok_or("--database is required without --config")?;
            WriteConfig::new(server, database)
        }
    };

    if let Some(server) = overrides.server {
        config.server = server;
    }
    if let Some(database) = overrides.database {
        config.database = database;
    }
    match (overrides.username, overrides.password) {
        (Some(username), password) => {
            config = config.with_auth(username, password.unwrap_or_default());
        }
        (None, Some(password)) => match config.auth.as_mut() {
            Some(auth) => auth.password = password,
            None => return Err("--password given without --username".into()),
        },
        (None, None) => {}
    }
    if overrides.per_point {
        config.mode = WriteMode::PerPoint;
    }
    if let Some(secs) = overrides.timeout {
        config.timeout = Duration::from_secs(secs);
    }

    config.validate()?;
    Ok(config)
}

fn encode_options(input: &InputArgs) -> EncodeOptions {
    EncodeOptions {
        exclude_empty_fields: input.exclude_empty_fields,
    }
}

/// Reads points from a file or stdin, as a JSON array or NDJSON.
fn read_points(path: &Path, ndjson: bool) -> Result<Vec<Point>, Box<dyn std::error::Error>> {
    let data = if path == Path::new("-") {
        let mut data = String::new();
        io::stdin().read_to_string(&mut data)?;
        data
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read '{}': {e}", path.display()))?
    };

    if !ndjson {
        return Ok(serde_json::from_str(&data)?);
    }

    data.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str::<Point>(line)
                .map_err(|e| Box::<dyn std::error::Error>::from(format!("line {}: {e}", i + 1)))
        })
        .collect()
}

/// Reports points that produced no line on stderr.
fn report_drops(report: &EncodeReport) {
    for dropped in &report.dropped {
        eprintln!("dropped point {}: {}", dropped.index, dropped.error);
    }
}

/// Prints the per-request outcome of a write.
fn print_summary(
    report: &PointsReport,
    total_points: usize,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = &report.result;

    match format {
        OutputFormat::Text => {
            println!("Mode: {}", result.mode);
            println!("Points: {total_points} ({} dropped)", report.dropped.len());
            println!("Rejected tags: {}", report.rejected_tags);
            println!("Skipped fields: {}", report.skipped_fields);
            println!("Requests: {}", result.requests());
            println!("Lines written: {}", result.lines_written());

            for dropped in &report.dropped {
                println!("  dropped point {}: {}", dropped.index, dropped.error);
            }
            for (i, outcome) in result.outcomes.iter().enumerate() {
                if let Some(error) = &outcome.error {
                    println!("  request {i} ({} lines) failed: {error}", outcome.lines);
                }
            }
        }
        OutputFormat::Json => {
            let dropped: Vec<serde_json::Value> = report
                .dropped
                .iter()
                .map(|d| {
                    serde_json::json!({
                        "index": d.index,
                        "error": d.error.to_string(),
                    })
                })
                .collect();

            let output = serde_json::json!({
                "points": total_points,
                "dropped": dropped,
                "rejected_tags": report.rejected_tags,
                "skipped_fields": report.skipped_fields,
                "lines_written": result.lines_written(),
                "result": result,
            });

            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
