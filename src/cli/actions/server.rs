use crate::{
    cli::telemetry,
    gate::{self, GateConfig},
};
use anyhow::Result;
use secrecy::SecretString;
use tracing::{info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub access_code: Option<SecretString>,
    pub secure_cookies: bool,
    pub payload: String,
    pub favicon_links: bool,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let config = GateConfig::new()
        .with_access_code(args.access_code)
        .with_secure_cookies(args.secure_cookies)
        .with_payload_path(args.payload)
        .with_favicon_links(args.favicon_links);

    if config.access_code().is_none() {
        warn!("Access code is not set, every access attempt will fail with a configuration error");
    }

    let result = gate::new(args.port, config).await;

    telemetry::shutdown_tracer();

    result
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        (
            "access_code",
            if args.access_code.is_some() {
                "set".to_string()
            } else {
                "unset".to_string()
            },
        ),
        ("secure_cookies", args.secure_cookies.to_string()),
        ("payload", args.payload.clone()),
        ("favicon_links", args.favicon_links.to_string()),
    ];
    log_entries("Startup configuration", &entries);
}

fn log_entries(title: &str, entries: &[(&str, String)]) {
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!("{}\n\n{title}:", gamegate_banner());
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn gamegate_banner() -> String {
    let short_hash = short_commit(crate::GIT_COMMIT_HASH);
    GAMEGATE_BANNER.replace(
        "{VERSION}",
        &format!(" - {} - {}", env!("CARGO_PKG_VERSION"), short_hash),
    )
}

fn short_commit(hash: &str) -> String {
    let trimmed = hash.trim();
    if trimmed.len() > 7 {
        trimmed[..7].to_string()
    } else {
        trimmed.to_string()
    }
}

const GAMEGATE_BANNER: &str = r"
  +---------+
  |  _____  |
  | |     | |
  | |  o  | |  G A M E G A T E {VERSION}
  | |_____| |
  +---------+";
