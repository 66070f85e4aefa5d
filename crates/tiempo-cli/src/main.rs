mod error;
mod provinces;

use std::process::ExitCode;

use clap::Parser;
use tiempo_aemet::{render_forecast, AemetClient, MunicipalityCode};
use tiempo_core::Config;

use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(name = "tiempo")]
#[command(about = "Daily municipal forecast from AEMET OpenData")]
struct Cli {
    /// Five-digit municipality code, e.g. 28079
    #[arg(long, conflicts_with_all = ["province", "community"])]
    code: Option<String>,

    /// Province name, e.g. "Málaga"
    #[arg(long)]
    province: Option<String>,

    /// Autonomous community; without --province its first province is used
    #[arg(long)]
    community: Option<String>,

    /// AEMET OpenData API key (overrides the config file)
    #[arg(long, env = "AEMET_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// List known provinces and exit
    #[arg(long)]
    list: bool,
}

/// Quiet by default so stderr carries only the user-facing message.
const DEFAULT_LOG_FILTER: &str = "warn";

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = tiempo_core::init_with_default(DEFAULT_LOG_FILTER) {
        eprintln!("{}", e);
    }

    let cli = Cli::parse();

    if cli.list {
        print_provinces();
        return ExitCode::SUCCESS;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "{}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let (mut config, _) = Config::load_validated()?;
    if let Some(key) = cli.api_key.filter(|k| !k.trim().is_empty()) {
        config.aemet.api_key = key;
    }

    let code = resolve_code(
        cli.code.as_deref(),
        cli.province.as_deref(),
        cli.community.as_deref(),
    )?;
    tracing::info!(code = %code, "Requesting forecast");

    let client = AemetClient::new(&config.aemet)?;
    let days = client.forecast(&code).await?;

    if days.is_empty() {
        println!("No forecast days available.");
    } else {
        println!("{}", render_forecast(&days));
    }

    Ok(())
}

/// A code wins over a province, which wins over a community.
fn resolve_code(
    code: Option<&str>,
    province: Option<&str>,
    community: Option<&str>,
) -> Result<MunicipalityCode, CliError> {
    let province = match (code, province, community) {
        (Some(code), _, _) => return Ok(code.trim().parse()?),
        (None, Some(name), _) => {
            provinces::find(name).ok_or_else(|| CliError::UnknownProvince(name.to_string()))?
        }
        (None, None, Some(name)) => provinces::first_in_community(name)
            .ok_or_else(|| CliError::UnknownCommunity(name.to_string()))?,
        (None, None, None) => return Err(CliError::NoLocation),
    };

    tracing::debug!("{} ({}) -> {}", province.name, province.community, province.code);
    Ok(province.code.parse()?)
}

fn print_provinces() {
    for (community, provinces) in provinces::by_community() {
        println!("{}", community);
        for province in provinces {
            println!("  {:<24} {}", province.name, province.code);
        }
    }
}
