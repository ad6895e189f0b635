//! `stealth seal` -- encrypt a pitch into a `/score` request body.
//!
//! This is the client half of the envelope: a fresh 256-bit key and 96-bit
//! nonce per invocation, AES-256-GCM over the UTF-8 text, everything base64.
//! The output contains the key. Treat it like the plaintext.
//!
//! # Example
//!
//! ```text
//! stealth seal pitch.txt > request.json
//! stealth seal pitch.txt --fallback -o request.json
//! curl -d @request.json -H 'content-type: application/json' localhost:8000/score
//! ```

use std::path::PathBuf;

use clap::Args;
use serde_json::{Value, json};
use stealth_core::envelope::{MIN_PLAINTEXT_CHARS, seal};
use stealth_types::ScoreRequest;
use tracing::warn;

/// Arguments for the `stealth seal` subcommand.
#[derive(Args)]
pub struct SealArgs {
    /// Pitch text file. Use `-` for stdin.
    pub input: PathBuf,

    /// Ask the service to skip the primary provider.
    #[arg(long)]
    pub fallback: bool,

    /// Requested model identifier.
    #[arg(long)]
    pub model: Option<String>,

    /// Write the request body here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Run the seal command.
pub async fn run(args: SealArgs) -> anyhow::Result<()> {
    let text = if args.input.as_os_str() == "-" {
        let mut buf = String::new();
        tokio::io::AsyncReadExt::read_to_string(&mut tokio::io::stdin(), &mut buf).await?;
        buf
    } else {
        tokio::fs::read_to_string(&args.input)
            .await
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", args.input.display()))?
    };

    if text.trim().chars().count() < MIN_PLAINTEXT_CHARS {
        warn!(
            min = MIN_PLAINTEXT_CHARS,
            "pitch is shorter than the service accepts; it will be rejected"
        );
    }

    let mut request = seal(&text).map_err(|e| anyhow::anyhow!("{e}"))?;
    request.use_fallback = args.fallback;
    request.model = args.model;

    let body = serde_json::to_string_pretty(&request_body(&request))?;
    match args.output {
        Some(path) => {
            tokio::fs::write(&path, body)
                .await
                .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{body}"),
    }
    Ok(())
}

/// The wire form of a sealed request, key and nonce included.
///
/// [`ScoreRequest`]'s own `Serialize` blanks secret fields, so the body is
/// built by hand here.
pub fn request_body(request: &ScoreRequest) -> Value {
    let mut body = json!({
        "ciphertext": request.ciphertext,
        "aes_key": request.aes_key.expose(),
        "iv": request.iv.expose(),
        "use_fallback": request.use_fallback,
    });
    if let Some(model) = &request.model {
        body["model"] = json!(model);
    }
    body
}
