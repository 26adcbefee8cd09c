use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use restful_client::{ClientError, Response, RestClient};
use serde_json::Value;

#[derive(Debug, Parser)]
#[command(
    name = "rest-cli",
    version,
    about = "Small blocking CLI for calling JSON REST APIs"
)]
struct Cli {
    /// Base URL prepended verbatim to every endpoint.
    #[arg(long, env = "REST_BASE_URL")]
    base_url: String,

    /// Extra request header in form key=value. Repeat as needed.
    #[arg(long = "header", value_name = "KEY=VALUE")]
    header: Vec<String>,

    /// Token sent as `Authorization: Bearer <token>`.
    #[arg(long, env = "REST_BEARER_TOKEN", conflicts_with = "basic_user")]
    bearer_token: Option<String>,

    /// Username for basic authentication.
    #[arg(long, env = "REST_BASIC_USER", requires = "basic_password")]
    basic_user: Option<String>,

    /// Password for basic authentication.
    #[arg(long, env = "REST_BASIC_PASSWORD", requires = "basic_user")]
    basic_password: Option<String>,

    /// Emit compact JSON instead of pretty-printed output.
    #[arg(long)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send a GET request.
    Get { endpoint: String },
    /// Send a POST request with a JSON body.
    Post(BodyArgs),
    /// Send a PUT request with a JSON body.
    Put(BodyArgs),
    /// Send a DELETE request.
    Delete { endpoint: String },
}

#[derive(Debug, Args)]
struct BodyArgs {
    /// Endpoint appended to the base URL (for example: /posts/1).
    endpoint: String,

    #[command(flatten)]
    body: BodyInput,
}

#[derive(Debug, Args)]
struct BodyInput {
    /// JSON request body literal.
    #[arg(long, conflicts_with = "body_file")]
    body_json: Option<String>,

    /// Path to a file containing a JSON request body.
    #[arg(long, value_name = "PATH", conflicts_with = "body_json")]
    body_file: Option<PathBuf>,
}

/// Entry point for the CLI.
///
/// Builds a configured client, dispatches the verb subcommand, and prints the
/// status code to stderr and the JSON body to stdout.
fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let client = build_client(&cli).context("failed to configure client")?;

    let response = match &cli.command {
        Command::Get { endpoint } => client
            .get(endpoint)
            .map_err(|error| describe(&error, "GET", endpoint))?,
        Command::Post(args) => {
            let body = parse_body(&args.body).context("failed to parse request body input")?;
            client
                .post(&args.endpoint, &body)
                .map_err(|error| describe(&error, "POST", &args.endpoint))?
        }
        Command::Put(args) => {
            let body = parse_body(&args.body).context("failed to parse request body input")?;
            client
                .put(&args.endpoint, &body)
                .map_err(|error| describe(&error, "PUT", &args.endpoint))?
        }
        Command::Delete { endpoint } => client
            .del(endpoint)
            .map_err(|error| describe(&error, "DELETE", endpoint))?,
    };

    print_response(&response, cli.compact).context("failed to print JSON output")?;
    Ok(())
}

/// Applies headers and credentials from CLI args to a new client.
fn build_client(cli: &Cli) -> Result<RestClient> {
    let mut client = RestClient::new(&cli.base_url);

    for (key, value) in parse_pairs(&cli.header, "--header")? {
        client.add_header(key, value);
    }

    if let Some(token) = &cli.bearer_token {
        client.set_bearer_token(token);
    } else if let (Some(user), Some(password)) = (&cli.basic_user, &cli.basic_password) {
        client.set_basic_auth(user, password);
    }

    Ok(client)
}

/// Turns a client error into a CLI error that names the failed request.
fn describe(error: &ClientError, method: &str, endpoint: &str) -> anyhow::Error {
    match error.status_code() {
        Some(status) => anyhow::anyhow!("{method} {endpoint} failed with status {status}"),
        None => anyhow::anyhow!("{method} {endpoint} failed: {error}"),
    }
}

/// Parses repeated `key=value` arguments into owned key/value pairs.
///
/// Returns an error when a value does not include `=` or has an empty key.
fn parse_pairs(values: &[String], flag_name: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::with_capacity(values.len());
    for item in values {
        let Some((key, value)) = item.split_once('=') else {
            bail!("invalid {flag_name} value '{item}': expected key=value");
        };
        if key.is_empty() {
            bail!("invalid {flag_name} value '{item}': empty key");
        }
        pairs.push((key.to_owned(), value.to_owned()));
    }
    Ok(pairs)
}

/// Parses the JSON body from inline text or a file path.
///
/// Exactly one of `--body-json` or `--body-file` must be set.
fn parse_body(body: &BodyInput) -> Result<Value> {
    match (&body.body_json, &body.body_file) {
        (Some(raw), None) => {
            serde_json::from_str(raw).context("failed to parse JSON from --body-json")
        }
        (None, Some(path)) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read --body-file '{}'", path.display()))?;
            serde_json::from_str(&raw).with_context(|| {
                format!("failed to parse JSON in --body-file '{}'", path.display())
            })
        }
        (None, None) => bail!("a request body is required: use --body-json or --body-file"),
        (Some(_), Some(_)) => bail!("use only one of --body-json or --body-file"),
    }
}

fn print_response(response: &Response, compact: bool) -> Result<()> {
    eprintln!("Status Code: {}", response.status_code());
    let rendered = if compact {
        serde_json::to_string(response.json())
    } else {
        serde_json::to_string_pretty(response.json())
    };
    println!("{}", rendered.context("Failed to render JSON")?);
    Ok(())
}
