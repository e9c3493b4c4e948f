//! Command Line Interface (CLI) arguments.

use crate::models::FilterMap;
use crate::query::DEFAULT_RECORD_LIMIT;

use clap::{Parser, Subcommand};

/// edustats command line interface
#[derive(Clone, Debug, Parser)]
#[command(version, about)]
pub struct CommandLineArgs {
    /// Resource endpoint of the establishments dataset
    #[arg(
        long,
        default_value = "https://www.datos.gov.co/resource/qijw-htwa.json",
        env = "EDUSTATS_API_URL"
    )]
    pub api_url: String,
    /// Maximum number of records requested per query
    #[arg(long, default_value_t = DEFAULT_RECORD_LIMIT, env = "EDUSTATS_RECORD_LIMIT")]
    pub record_limit: usize,
    /// Socrata application token
    #[arg(long, env = "EDUSTATS_APP_TOKEN")]
    pub app_token: Option<String>,
    /// The IP address on which the server should listen
    #[arg(long, default_value = "0.0.0.0", env = "EDUSTATS_HOST")]
    pub host: String,
    /// The port to which the server should bind
    #[arg(long, default_value_t = 8080, env = "EDUSTATS_PORT")]
    pub port: u16,
    /// Flag indicating whether HTTPS should be used
    #[arg(long, default_value_t = false, env = "EDUSTATS_HTTPS")]
    pub https: bool,
    /// Path to the certificate file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/edustats/certs/cert.pem",
        env = "EDUSTATS_CERT_FILE"
    )]
    pub cert_file: String,
    /// Path to the key file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/edustats/certs/key.pem",
        env = "EDUSTATS_KEY_FILE"
    )]
    pub key_file: String,
    /// Maximum time in seconds to wait for requests to complete upon receiving `ctrl+c` signal.
    #[arg(long, default_value_t = 60, env = "EDUSTATS_SHUTDOWN_TIMEOUT")]
    pub graceful_shutdown_timeout: u64,
    /// Whether to enable sending traces to Jaeger.
    #[arg(long, default_value_t = false, env = "EDUSTATS_ENABLE_JAEGER")]
    pub enable_jaeger: bool,
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands
#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Serve the dashboard API (default)
    Serve,
    /// Render a view once and print it as JSON
    Render {
        /// View to render, e.g. `zonas` or `servicio-y-propiedad`
        view: String,
        /// Filter as `field=value`. May be repeated.
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },
    /// List the filter options and print them as JSON
    Options,
}

/// Collect the `--filter` arguments of a `render` command.
pub fn filter_map(filters: &[(String, String)]) -> FilterMap {
    filters
        .iter()
        .map(|(field, value)| (field.clone(), value.as_str()))
        .collect()
}

/// Parse a `field=value` filter argument.
fn parse_filter(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected `field=value`, got `{arg}`")),
    }
}

/// Returns parsed command line arguments.
pub fn parse() -> CommandLineArgs {
    CommandLineArgs::parse()
}
