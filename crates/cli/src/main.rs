//! `fauna` command-line entry point.
//!
//! This binary is the composition root. It:
//!
//! 1. **Parses arguments** with `clap`.
//! 2. **Wires logging**: a `tracing-subscriber` text or JSON layer on stderr,
//!    filtered by `RUST_LOG` (default `warn`).
//! 3. **Runs one subcommand**:
//!    - `extract` reads a response document and prints the value found at a
//!      path, decoded as a chosen kind.
//!    - `query` loads [`client::ClientConfig`], connects, and prints the
//!      `resource` returned for a raw JSON expression. `--endpoint` and
//!      `--secret` fall back to `FAUNA_ENDPOINT` and `FAUNA_SECRET`.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use client::{Client, ClientConfig};
use query::Expr;
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use types::codec::{self, Codec};
use types::{Field, Path, Value};

#[derive(Parser)]
#[command(name = "fauna", version, about = "Extract values from responses and send queries")]
struct Cli {
    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the value at a path of a response document
    Extract {
        /// Slash-separated path; all-digit segments are array indexes. Defaults to the whole document.
        #[arg(long)]
        path: Option<Path>,

        /// Kind to decode the value as.
        #[arg(long = "as", value_enum, default_value_t = Kind::Value)]
        kind: Kind,

        /// Treat the value at `--path` as an array and extract this path from each element.
        #[arg(long)]
        each: Option<Path>,

        /// Response document; standard input when omitted.
        file: Option<PathBuf>,
    },
    /// Evaluate a JSON query expression and print the result
    Query {
        /// JSON config file with endpoint, secret and timeouts.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Overrides the config file's endpoint.
        #[arg(long, env = client::config::ENDPOINT_VAR)]
        endpoint: Option<String>,

        /// Overrides the config file's secret.
        #[arg(long, env = client::config::SECRET_VAR, hide_env_values = true)]
        secret: Option<String>,

        /// The expression, e.g. '{"get": {"@ref": "classes/spells/1"}}'.
        expr: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Kind {
    Value,
    String,
    Long,
    Double,
    Boolean,
    Ref,
    Timestamp,
    Date,
    Array,
    Object,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match run(cli.command).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry.with(fmt::layer().with_writer(std::io::stderr)).init(),
        LogFormat::Json => registry.with(fmt::layer().json().with_writer(std::io::stderr)).init(),
    }
}

async fn run(command: Command) -> anyhow::Result<Value> {
    match command {
        Command::Extract { path, kind, each, file } => {
            let text = read_input(file.as_ref())?;
            let root = Value::parse(&text).context("input is not a valid response document")?;
            let path = path.unwrap_or_else(Path::empty);
            debug!(%path, ?kind, "Extracting");
            extract(&root, &path, kind, each.as_ref())
        }
        Command::Query { config, endpoint, secret, expr } => {
            let mut config = match &config {
                Some(path) => ClientConfig::from_file(path)?,
                None => ClientConfig::default(),
            };
            if endpoint.is_some() {
                config.endpoint = endpoint;
            }
            if secret.is_some() {
                config.secret = secret;
            }

            let expr = Value::parse(&expr).context("expression is not valid JSON")?;
            let client = Client::new(config.builder().build()?);
            Ok(client.query(Expr::raw(expr)).await?)
        }
    }
}

fn read_input(file: Option<&PathBuf>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text).context("failed to read standard input")?;
            Ok(text)
        }
    }
}

fn extract(root: &Value, path: &Path, kind: Kind, each: Option<&Path>) -> anyhow::Result<Value> {
    match kind {
        Kind::Value => extract_with(root, path, each, codec::VALUE),
        Kind::String => extract_with(root, path, each, codec::STRING),
        Kind::Long => extract_with(root, path, each, codec::LONG),
        Kind::Double => extract_with(root, path, each, codec::DOUBLE),
        Kind::Boolean => extract_with(root, path, each, codec::BOOLEAN),
        Kind::Ref => extract_with(root, path, each, codec::REF),
        Kind::Timestamp => extract_with(root, path, each, codec::TIMESTAMP),
        Kind::Date => extract_with(root, path, each, codec::DATE),
        Kind::Array => extract_with(root, path, each, codec::ARRAY),
        Kind::Object => extract_with(root, path, each, codec::OBJECT),
    }
}

/// Decodes with `codec` and re-encodes, so the output shows exactly what was accepted.
fn extract_with<T, C>(root: &Value, path: &Path, each: Option<&Path>, codec: C) -> anyhow::Result<Value>
where
    T: 'static,
    C: Codec<T> + Copy + 'static,
{
    let field = Field::at_path(path.clone());
    match each {
        None => {
            let decoded = field.to(codec).get(root)?;
            Ok(codec.encode(&decoded)?)
        }
        Some(each) => {
            let items = field.collect(&Field::at_path(each.clone()).to(codec)).get(root)?;
            let encoded = items
                .iter()
                .map(|item| codec.encode(item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(encoded))
        }
    }
}
