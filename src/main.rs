use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use fxsync::core::setting::{MAX_EXCHANGE_RATE, RateMode, SettingStatus, UpdateRequest};
use fxsync::log::init_logging;
use fxsync::registry::ListParams;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Manual,
    Auto,
}

impl From<ModeArg> for RateMode {
    fn from(mode: ModeArg) -> RateMode {
        match mode {
            ModeArg::Manual => RateMode::Manual,
            ModeArg::Auto => RateMode::Auto,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Enable,
    Disable,
}

impl From<StatusArg> for SettingStatus {
    fn from(status: StatusArg) -> SettingStatus {
        match status {
            StatusArg::Enable => SettingStatus::Enable,
            StatusArg::Disable => SettingStatus::Disable,
        }
    }
}

/// Boundary validation: rates must fall inside 0..=999999.
fn parse_rate(s: &str) -> Result<f64, String> {
    let rate: f64 = s.parse().map_err(|_| format!("Invalid rate: {s}"))?;
    if !rate.is_finite() || rate < 0.0 || rate > MAX_EXCHANGE_RATE {
        return Err(format!("Rate must be between 0 and {MAX_EXCHANGE_RATE}"));
    }
    Ok(rate)
}

/// Boundary validation: currency codes are 1-6 characters, stored lowercase.
fn parse_code(s: &str) -> Result<String, String> {
    let code = s.trim().to_lowercase();
    if code.is_empty() || code.len() > 6 {
        return Err(format!("Currency code must be 1-6 characters: {s}"));
    }
    Ok(code)
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Recompute catalog prices from the current exchange rates
    Sync,
    /// Enable one or more currencies for price propagation
    Enable {
        #[arg(required = true, value_parser = parse_code)]
        codes: Vec<String>,
    },
    /// Update an exchange setting
    Update {
        /// Setting id (see `list`)
        id: String,
        #[arg(long)]
        mode: Option<ModeArg>,
        #[arg(long = "rate", value_parser = parse_rate)]
        exchange_rate: Option<f64>,
        #[arg(long)]
        status: Option<StatusArg>,
    },
    /// Show configured exchange settings
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
}

impl From<Commands> for fxsync::AppCommand {
    fn from(cmd: Commands) -> fxsync::AppCommand {
        match cmd {
            Commands::Sync => fxsync::AppCommand::Sync,
            Commands::Enable { codes } => fxsync::AppCommand::Enable {
                currency_codes: codes,
            },
            Commands::Update {
                id,
                mode,
                exchange_rate,
                status,
            } => fxsync::AppCommand::Update {
                id,
                request: UpdateRequest {
                    status: status.map(Into::into),
                    mode: mode.map(Into::into),
                    exchange_rate,
                },
            },
            Commands::List { limit, offset } => fxsync::AppCommand::List {
                params: ListParams { limit, offset },
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => fxsync::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = fxsync::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
default_currency: "usd"

provider:
  base_url: "https://api.frankfurter.dev"

catalog_path: "catalog.json"
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_bounds() {
        assert!(parse_rate("0").is_ok());
        assert!(parse_rate("0.92").is_ok());
        assert!(parse_rate("999999").is_ok());
        assert!(parse_rate("-0.1").is_err());
        assert!(parse_rate("1000000").is_err());
        assert!(parse_rate("nan").is_err());
        assert!(parse_rate("abc").is_err());
    }

    #[test]
    fn test_code_bounds() {
        assert_eq!(parse_code("EUR").unwrap(), "eur");
        assert_eq!(parse_code("x").unwrap(), "x");
        assert!(parse_code("").is_err());
        assert!(parse_code("toolong7").is_err());
    }
}
