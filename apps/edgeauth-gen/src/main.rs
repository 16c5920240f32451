//! edgeauth-gen - generate edge authorization tokens from the command line.
//!
//! Reads the generator configuration from environment variables and prints a
//! single token on stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```text
//! EDGEAUTH_KEY=abcdef0123456789 EDGEAUTH_WINDOW_SECONDS=300 edgeauth-gen url /videos/intro.mp4
//! EDGEAUTH_KEY=abcdef0123456789 EDGEAUTH_WINDOW_SECONDS=300 edgeauth-gen acl '/videos/*' '/images/*'
//! ```
//!
//! Pass `--pair` before the mode to print `<token_name>=<token>` instead of the
//! bare token, ready for a query string or `Cookie` header.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `EDGEAUTH_KEY` | *(required)* | Hex-encoded shared secret |
//! | `EDGEAUTH_ALGORITHM` | `sha256` | `sha256`, `sha1` or `md5` |
//! | `EDGEAUTH_WINDOW_SECONDS` | *(unset)* | Token lifetime |
//! | `EDGEAUTH_*` | | See `TokenConfig::from_env` for the full list |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use anyhow::{Context, Result, bail};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use edgeauth_token::{TokenConfig, TokenGenerator};

const USAGE: &str = "usage: edgeauth-gen [--pair] (url <path> | acl <pattern>...)";

/// What to generate a token for.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Url(String),
    Acl(Vec<String>),
}

/// Parsed command-line invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Invocation {
    command: Command,
    pair: bool,
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to `LOG_LEVEL`.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn parse_args<I>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter().peekable();
    let pair = args.next_if(|a| a == "--pair").is_some();

    let command = match args.next().as_deref() {
        Some("url") => {
            let url = args.next().context(USAGE)?;
            if args.next().is_some() {
                bail!("url mode takes exactly one path\n{USAGE}");
            }
            Command::Url(url)
        }
        Some("acl") => {
            let patterns: Vec<String> = args.collect();
            if patterns.is_empty() {
                bail!("acl mode needs at least one pattern\n{USAGE}");
            }
            Command::Acl(patterns)
        }
        Some(other) => bail!("unknown mode: {other}\n{USAGE}"),
        None => bail!(USAGE),
    };

    Ok(Invocation { command, pair })
}

fn run(invocation: &Invocation, generator: &TokenGenerator) -> Result<String> {
    let token = match &invocation.command {
        Command::Url(url) => generator.generate_url_token(url),
        Command::Acl(patterns) => generator.generate_acl_token(patterns),
    }
    .context("failed to generate token")?;

    Ok(if invocation.pair {
        token.to_pair()
    } else {
        token.into_string()
    })
}

fn main() -> Result<()> {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_owned());
    init_tracing(&log_level)?;

    let invocation = parse_args(std::env::args().skip(1))?;
    let config = TokenConfig::from_env().context("invalid EDGEAUTH_* configuration")?;

    debug!(
        algorithm = %config.algorithm,
        token_name = %config.token_name,
        escape_early = config.escape_early,
        "loaded token configuration"
    );

    let generator = TokenGenerator::new(config)?;
    println!("{}", run(&invocation, &generator)?);

    Ok(())
}
