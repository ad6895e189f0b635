//! `stealth` -- CLI binary for the Stealth Code scoring service.
//!
//! Provides the following subcommands:
//!
//! - `stealth serve` -- Start the HTTP scoring API.
//! - `stealth status` -- Show provider and service configuration.
//! - `stealth seal` -- Encrypt a pitch file into a `/score` request body.
//! - `stealth verify-receipt` -- Recompute a receipt from a request and response.

use clap::{Parser, Subcommand};

mod commands;

/// Stealth Code encrypted pitch-scoring CLI.
#[derive(Parser)]
#[command(name = "stealth", about = "Stealth Code encrypted pitch-scoring CLI", version)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP scoring API.
    Serve(commands::serve::ServeArgs),

    /// Show provider and service configuration.
    Status(commands::status::StatusArgs),

    /// Encrypt a pitch into a request body with a fresh key and nonce.
    Seal(commands::seal::SealArgs),

    /// Check a response's receipt against the request that produced it.
    VerifyReceipt(commands::verify::VerifyArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve(args) => commands::serve::run(args).await?,
        Commands::Status(args) => commands::status::run(args).await?,
        Commands::Seal(args) => commands::seal::run(args).await?,
        Commands::VerifyReceipt(args) => commands::verify::run(args).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_without_error() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_has_all_subcommands() {
        let cmd = Cli::command();
        let names: Vec<&str> = cmd.get_subcommands().map(|s| s.get_name()).collect();
        assert!(names.contains(&"serve"));
        assert!(names.contains(&"status"));
        assert!(names.contains(&"seal"));
        assert!(names.contains(&"verify-receipt"));
    }

    #[test]
    fn cli_verbose_flag_is_global() {
        let cli = Cli::try_parse_from(["stealth", "status", "--verbose"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn cli_serve_parses_overrides() {
        let cli = Cli::try_parse_from([
            "stealth", "serve", "--config", "/tmp/c.json", "--host", "127.0.0.1", "--port", "9001",
        ])
        .unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.config.as_deref(), Some("/tmp/c.json"));
                assert_eq!(args.host.as_deref(), Some("127.0.0.1"));
                assert_eq!(args.port, Some(9001));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn cli_seal_parses_flags() {
        let cli = Cli::try_parse_from(["stealth", "seal", "pitch.txt", "--fallback", "-o", "req.json"])
            .unwrap();
        match cli.command {
            Commands::Seal(args) => {
                assert_eq!(args.input.to_str(), Some("pitch.txt"));
                assert!(args.fallback);
                assert_eq!(args.output.as_deref().and_then(|p| p.to_str()), Some("req.json"));
            }
            _ => panic!("expected seal"),
        }
    }

    #[test]
    fn cli_verify_requires_both_files() {
        assert!(Cli::try_parse_from(["stealth", "verify-receipt", "--request", "a.json"]).is_err());
        assert!(
            Cli::try_parse_from([
                "stealth", "verify-receipt", "--request", "a.json", "--response", "b.json"
            ])
            .is_ok()
        );
    }
}
