//! `stealth status` -- show provider and service configuration.
//!
//! # Example
//!
//! ```text
//! stealth status
//! stealth status --config ./stealth.json
//! ```

use std::path::PathBuf;

use clap::Args;
use comfy_table::{Table, presets::UTF8_FULL};
use stealth_llm::{GeminiProvider, LlmProviderConfig, OpenRouterProvider, ScoringProvider};
use stealth_types::config::{Config, ProviderConfig};

use super::{default_config_path, load_config};

/// Arguments for the `stealth status` subcommand.
#[derive(Args)]
pub struct StatusArgs {
    /// Config file path (overrides auto-discovery).
    #[arg(short, long)]
    pub config: Option<String>,
}

/// Run the status command.
pub async fn run(args: StatusArgs) -> anyhow::Result<()> {
    println!("stealth status");
    println!("==============");
    println!();

    match args.config.as_deref().map(PathBuf::from).or_else(default_config_path) {
        Some(path) => println!("Config: {}", path.display()),
        None => {
            println!("Config: not found");
            println!("  Searched: ~/.stealth/config.json");
            println!("  Set STEALTH_CONFIG env var to override");
            println!();
            println!("Using defaults:");
        }
    }

    let config = load_config(args.config.as_deref()).await?;

    println!();
    println!("{}", provider_table(&config));

    println!();
    println!("Scoring:");
    println!("  Mock label:         {}", config.scoring.mock_label);
    println!();
    println!("Auth:");
    println!(
        "  JWT verification:   {}",
        if config.auth.resolve_secret().is_some() {
            "configured"
        } else {
            "not configured (all callers anonymous)"
        }
    );
    println!("  Audience:           {}", config.auth.audience);
    println!();
    println!("Credits:");
    println!("  Default balance:    {}", config.credits.default_credits);
    println!("  Default tier:       {}", config.credits.default_tier);
    println!("  Cost per analysis:  {}", config.credits.cost_per_analysis);
    println!();
    println!("Server:");
    println!("  Listen:             {}:{}", config.server.host, config.server.port);
    if config.server.cors_origins.is_empty() {
        println!("  CORS:               permissive");
    } else {
        println!("  CORS:               {}", config.server.cors_origins.join(", "));
    }

    Ok(())
}

/// One row per provider slot. Never prints key material.
pub fn provider_table(config: &Config) -> Table {
    let primary = OpenRouterProvider::from_settings(&config.providers.primary);
    let fallback = GeminiProvider::from_settings(&config.providers.fallback);

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(["SLOT", "PROVIDER", "MODEL", "BASE URL", "API KEY", "STATUS"]);
    add_row(
        &mut table,
        "primary",
        primary.config(),
        &config.providers.primary,
        primary.is_configured(),
    );
    add_row(
        &mut table,
        "fallback",
        fallback.config(),
        &config.providers.fallback,
        fallback.is_configured(),
    );
    table
}

fn add_row(
    table: &mut Table,
    slot: &str,
    settings: &LlmProviderConfig,
    overrides: &ProviderConfig,
    configured: bool,
) {
    let key_source = if !overrides.api_key.is_empty() {
        "config file".to_owned()
    } else {
        format!("${}", settings.api_key_env)
    };
    let status = if configured { "ready" } else { "missing key" };
    table.add_row([
        slot,
        settings.name.as_str(),
        settings.model.as_str(),
        settings.base_url.as_str(),
        key_source.as_str(),
        status,
    ]);
}
