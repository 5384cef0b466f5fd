use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        FalseyValueParser, ValueParser,
    },
    Arg, ArgAction, ColorChoice, Command,
};

use crate::gate::state::DEFAULT_PAYLOAD_PATH;

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    Command::new("gamegate")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("GAMEGATE_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("access-code")
                .long("access-code")
                .help("Shared access code that unlocks the game")
                .long_help(
                    "Shared access code that unlocks the game. When unset, the service still starts but every access attempt fails with a server configuration error.",
                )
                .env("GAMEGATE_ACCESS_CODE")
                .hide_env_values(true),
        )
        .arg(
            Arg::new("secure-cookies")
                .long("secure-cookies")
                .help("Mark the session cookie Secure (production, HTTPS only)")
                .env("GAMEGATE_SECURE_COOKIES")
                .action(ArgAction::SetTrue)
                .value_parser(FalseyValueParser::new()),
        )
        .arg(
            Arg::new("payload")
                .long("payload")
                .help("Path of the protected game file")
                .default_value(DEFAULT_PAYLOAD_PATH)
                .env("GAMEGATE_PAYLOAD"),
        )
        .arg(
            Arg::new("favicon-links")
                .long("favicon-links")
                .help("Inject favicon links into the served game when missing")
                .env("GAMEGATE_FAVICON_LINKS")
                .action(ArgAction::SetTrue)
                .value_parser(FalseyValueParser::new()),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("GAMEGATE_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}
