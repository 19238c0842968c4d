use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use percentages_core::{
    load_config, validate_config, ConfigOverrides, Enricher, LogProgress, OutputFraming,
    PercentagesRunner, ProductOpenerClient, SanitizedConfig,
};

/// Estimate ingredient percentages for a dataset through openfoodfacts.net
#[derive(Parser, Debug)]
#[command(
    name = "po-percentages",
    version,
    about,
    after_help = "Credential flags also accept the single-dash form, e.g. -basic_auth_username=off"
)]
struct Cli {
    /// Username when creating products on openfoodfacts.net
    #[arg(long = "productopener_username", value_name = "USER")]
    productopener_username: Option<String>,

    /// Password when creating products on openfoodfacts.net
    #[arg(long = "productopener_password", value_name = "PASSWORD")]
    productopener_password: Option<String>,

    /// Basic auth username when accessing openfoodfacts.net
    #[arg(long = "basic_auth_username", value_name = "USER")]
    basic_auth_username: Option<String>,

    /// Basic auth password when accessing openfoodfacts.net
    #[arg(long = "basic_auth_password", value_name = "PASSWORD")]
    basic_auth_password: Option<String>,

    /// TOML config file (default: percentages.toml if present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Input dataset, a JSON array of products
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Output file for the enriched products
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Output framing
    #[arg(long, value_enum)]
    framing: Option<FramingArg>,

    /// Per-request timeout in seconds (default: none)
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FramingArg {
    /// Trailing separator, no closing bracket
    Legacy,
    /// Well-formed JSON array
    JsonArray,
}

impl From<FramingArg> for OutputFraming {
    fn from(arg: FramingArg) -> Self {
        match arg {
            FramingArg::Legacy => OutputFraming::Legacy,
            FramingArg::JsonArray => OutputFraming::JsonArray,
        }
    }
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            productopener_username: self.productopener_username.clone(),
            productopener_password: self.productopener_password.clone(),
            basic_auth_username: self.basic_auth_username.clone(),
            basic_auth_password: self.basic_auth_password.clone(),
            input_path: self.input.clone(),
            output_path: self.output.clone(),
            framing: self.framing.map(OutputFraming::from),
            timeout_secs: self.timeout_secs,
        }
    }
}

/// Credential flags older invocations pass Go `flag` style, with one dash.
const SINGLE_DASH_FLAGS: [&str; 4] = [
    "productopener_username",
    "productopener_password",
    "basic_auth_username",
    "basic_auth_password",
];

/// Rewrite `-name` and `-name=value` for the credential flags to `--name`.
fn normalize_single_dash_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| match arg.to_str() {
            Some(text) if is_single_dash_flag(text) => OsString::from(format!("-{}", text)),
            _ => arg,
        })
        .collect()
}

fn is_single_dash_flag(arg: &str) -> bool {
    let Some(rest) = arg.strip_prefix('-') else {
        return false;
    };
    if rest.starts_with('-') {
        return false;
    }
    let name = rest.split_once('=').map_or(rest, |(name, _)| name);
    SINGLE_DASH_FLAGS.contains(&name)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse_from(normalize_single_dash_flags(std::env::args_os()));

    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Progress and diagnostics go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = load_config(cli.config.as_deref()).context("Failed to load config")?;
    cli.overrides().apply(&mut config);
    validate_config(&config).context("Configuration validation failed")?;

    let sanitized = serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default();
    info!("Configuration: {}", sanitized);
    if config.credentials.productopener_username.is_empty() {
        warn!("No Product Opener username configured, product writes will likely be rejected");
    }

    let client = ProductOpenerClient::new(config.credentials.clone(), &config.remote)
        .context("Failed to create Product Opener client")?;
    let runner = PercentagesRunner::new(config.dataset.clone(), Enricher::new(client));

    let summary = runner
        .run(&LogProgress::new())
        .await
        .with_context(|| {
            format!(
                "Run aborted, {} is incomplete",
                config.dataset.output_path.display()
            )
        })?;

    info!(
        "Done: {} products written to {}",
        summary.records_written,
        config.dataset.output_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use percentages_core::Config;

    #[test]
    fn test_cli_accepts_credential_flags() {
        let cli = Cli::try_parse_from([
            "po-percentages",
            "--productopener_username",
            "alice",
            "--productopener_password",
            "s3cret",
            "--basic_auth_username",
            "off",
            "--basic_auth_password",
            "off",
        ])
        .unwrap();

        let mut config = Config::default();
        cli.overrides().apply(&mut config);
        assert_eq!(config.credentials.productopener_username, "alice");
        assert_eq!(config.credentials.productopener_password, "s3cret");
        assert_eq!(config.credentials.basic_auth_username, "off");
        assert_eq!(config.credentials.basic_auth_password, "off");
    }

    #[test]
    fn test_cli_defaults_leave_config_untouched() {
        let cli = Cli::try_parse_from(["po-percentages"]).unwrap();

        let mut config = Config::default();
        cli.overrides().apply(&mut config);
        assert_eq!(config.credentials.productopener_username, "");
        assert_eq!(config.dataset.framing, OutputFraming::Legacy);
        assert!(config.remote.timeout_secs.is_none());
    }

    #[test]
    fn test_cli_dataset_options() {
        let cli = Cli::try_parse_from([
            "po-percentages",
            "--input",
            "in.json",
            "--output",
            "out.json",
            "--framing",
            "json-array",
            "--timeout-secs",
            "30",
        ])
        .unwrap();

        let mut config = Config::default();
        cli.overrides().apply(&mut config);
        assert_eq!(config.dataset.input_path, PathBuf::from("in.json"));
        assert_eq!(config.dataset.output_path, PathBuf::from("out.json"));
        assert_eq!(config.dataset.framing, OutputFraming::JsonArray);
        assert_eq!(config.remote.timeout_secs, Some(30));
    }

    #[test]
    fn test_cli_accepts_single_dash_credential_flags() {
        let args = normalize_single_dash_flags(
            [
                "po-percentages",
                "-productopener_username=alice",
                "-productopener_password",
                "s3cret",
                "-basic_auth_username=off",
                "--basic_auth_password=off",
            ]
            .map(OsString::from),
        );
        let cli = Cli::try_parse_from(args).unwrap();

        let mut config = Config::default();
        cli.overrides().apply(&mut config);
        assert_eq!(config.credentials.productopener_username, "alice");
        assert_eq!(config.credentials.productopener_password, "s3cret");
        assert_eq!(config.credentials.basic_auth_username, "off");
        assert_eq!(config.credentials.basic_auth_password, "off");
    }

    #[test]
    fn test_single_dash_rewrite_leaves_other_args_alone() {
        let args = normalize_single_dash_flags(
            ["po-percentages", "-h", "-input", "-", "--output", "out.json"].map(OsString::from),
        );
        assert_eq!(
            args,
            ["po-percentages", "-h", "-input", "-", "--output", "out.json"].map(OsString::from)
        );
    }

    #[test]
    fn test_cli_rejects_unknown_framing() {
        let result = Cli::try_parse_from(["po-percentages", "--framing", "ndjson"]);
        assert!(result.is_err());
    }
}
