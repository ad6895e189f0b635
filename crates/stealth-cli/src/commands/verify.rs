//! `stealth verify-receipt` -- check a response's receipt.
//!
//! Recomputes `SHA-256(ciphertext|model|timestamp|canonical scores)` from the
//! request body and the service's response and compares it with the receipt
//! the service returned. This proves the response was not edited after the
//! fact. It does not prove who produced it: the receipt is unkeyed.
//!
//! # Example
//!
//! ```text
//! stealth verify-receipt --request request.json --response response.json
//! ```

use std::path::{Path, PathBuf};

use clap::Args;
use serde_json::Value;
use stealth_core::Receipt;
use stealth_types::ScoringResult;

/// Arguments for the `stealth verify-receipt` subcommand.
#[derive(Args)]
pub struct VerifyArgs {
    /// The request body that was sent to `/score`.
    #[arg(long)]
    pub request: PathBuf,

    /// The JSON the service answered with.
    #[arg(long)]
    pub response: PathBuf,
}

/// Run the verify-receipt command.
pub async fn run(args: VerifyArgs) -> anyhow::Result<()> {
    let request = read_json(&args.request).await?;
    let response = read_json(&args.response).await?;

    let result: ScoringResult = serde_json::from_value(response)
        .map_err(|e| anyhow::anyhow!("response is not a scoring result: {e}"))?;
    if check_receipt(&request, &result)? {
        println!("Receipt OK");
        println!("  Model:     {}", result.model);
        println!("  Timestamp: {}", result.timestamp);
        println!("  Scores:    {}", result.scores.canonical_json());
        Ok(())
    } else {
        anyhow::bail!("receipt mismatch: response does not match the request it claims to answer")
    }
}

async fn read_json(path: &Path) -> anyhow::Result<Value> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))
}

/// Whether `result.receipt` matches the request's ciphertext and the
/// result's own fields.
///
/// Only `ciphertext` is read from the request, so a body with the key
/// removed verifies just as well.
pub fn check_receipt(request: &Value, result: &ScoringResult) -> anyhow::Result<bool> {
    let ciphertext = request
        .get("ciphertext")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("request has no ciphertext field"))?;
    let receipt = Receipt::from_hex(&result.receipt)
        .ok_or_else(|| anyhow::anyhow!("receipt is not a 64-character hex digest"))?;
    Ok(receipt.verify(ciphertext, &result.model, &result.timestamp, &result.scores))
}
