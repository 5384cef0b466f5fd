use crate::cli::actions::{server::Args, Action};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let access_code = matches
        .get_one::<String>("access-code")
        .filter(|code| !code.is_empty())
        .cloned()
        .map(SecretString::from);
    let secure_cookies = matches.get_flag("secure-cookies");
    let payload = matches
        .get_one::<String>("payload")
        .cloned()
        .context("missing required argument: --payload")?;
    let favicon_links = matches.get_flag("favicon-links");

    Ok(Action::Server(Args {
        port,
        access_code,
        secure_cookies,
        payload,
        favicon_links,
    }))
}
