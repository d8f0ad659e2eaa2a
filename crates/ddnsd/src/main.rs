// # ddnsd - DDNS Daemon
//
// Thin integration layer: all update logic lives in ddns-core.
//
// The ddnsd daemon is responsible for:
// 1. Parsing command-line flags and reading the environment
// 2. Initializing logging and the runtime
// 3. Wiring the HTTP IP checker and the Cloudflare client into the engine
// 4. Running the poll loop until it finishes or a signal arrives
//
// ## Configuration
//
// ### Environment (required)
// - `CF_TOKEN`: Cloudflare API token (Zone:DNS:Edit)
// - `CF_ZONE_ID`: Zone ID
// - `CF_HOST`: Hostname whose A/AAAA record is updated
//
// ### Environment (optional)
// - `DDNS_LOG_LEVEL`: trace, debug, info (default), warn, error
// - `DDNS_MODE`: set to `dry-run` to log updates instead of sending them
//
// ### Flags
// - `--duration <DURATION>`: update interval (ex. 15s, 1m, 6h); 0s runs once
// - `--ipv4[=<BOOL>]`: update the A record (default true)
// - `--ipv6[=<BOOL>]`: update the AAAA record (default false)
//
// ## Example
//
// ```bash
// export CF_TOKEN=your_token
// export CF_ZONE_ID=your_zone_id
// export CF_HOST=home.example.com
//
// ddnsd --duration 5m --ipv6
// ```

use anyhow::Result;
use clap::{ArgAction, Parser};
use ddns_core::{Credentials, DdnsEngine, Families, UpdaterConfig};
use ddns_ip_http::HttpIpChecker;
use ddns_provider_cloudflare::CloudflareClient;
use std::env;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// - 0: Single-shot run finished, or clean shutdown on signal
/// - 1: Configuration error
/// - 2: Runtime setup error
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Keep a Cloudflare DNS record pointed at this host's public address
#[derive(Parser, Debug)]
#[command(name = "ddnsd", version, about)]
struct Args {
    /// Update interval (ex. 15s, 1m, 6h); if not specified or set to 0s, run only once and exit
    #[arg(long, value_name = "DURATION", default_value = "0s", value_parser = parse_interval)]
    duration: Duration,

    /// Update the A record
    #[arg(
        long,
        value_name = "BOOL",
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    ipv4: bool,

    /// Update the AAAA record
    #[arg(
        long,
        value_name = "BOOL",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    ipv6: bool,
}

fn parse_interval(value: &str) -> std::result::Result<Duration, String> {
    ddns_core::parse_duration(value).map_err(|e| e.to_string())
}

/// Settings read from the environment
struct Settings {
    credentials: Credentials,
    dry_run: bool,
}

impl Settings {
    /// Load settings from environment variables
    fn from_env() -> Result<Self> {
        let credentials = Credentials::from_env()?;
        let dry_run = env::var("DDNS_MODE")
            .unwrap_or_default()
            .to_lowercase()
            == "dry-run";

        Ok(Self {
            credentials,
            dry_run,
        })
    }
}

/// Read `DDNS_LOG_LEVEL`, defaulting to info
fn log_level_from_env() -> Result<Level> {
    let level = env::var("DDNS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "DDNS_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            // --help and --version land here too
            return if e.use_stderr() {
                DdnsExitCode::ConfigError.into()
            } else {
                DdnsExitCode::CleanShutdown.into()
            };
        }
    };

    let log_level = match log_level_from_env() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::RuntimeError.into();
    }

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("{}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let config = UpdaterConfig::new(
        settings.credentials.clone(),
        Families::new(args.ipv4, args.ipv6),
        args.duration,
    );

    let client = match CloudflareClient::new(&settings.credentials, settings.dry_run) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create Cloudflare client: {}", e);
            return if e.is_fatal() {
                DdnsExitCode::ConfigError.into()
            } else {
                DdnsExitCode::RuntimeError.into()
            };
        }
    };

    if settings.dry_run {
        warn!("Cloudflare client running in DRY-RUN mode - no changes will be made");
    }

    info!("Starting ddnsd for {}", config.credentials.host());
    info!(
        "IPv4 updates: {}, IPv6 updates: {}",
        config.families.ipv4, config.families.ipv6
    );

    // The loop is strictly sequential; one thread is enough.
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let engine = DdnsEngine::new(Box::new(HttpIpChecker::new()), Box::new(client), &config);

    rt.block_on(run_daemon(engine));

    DdnsExitCode::CleanShutdown.into()
}

/// Run the poll loop
///
/// Single-shot mode returns after one tick and never installs signal
/// handlers. Periodic mode returns once SIGINT or SIGTERM arrives.
async fn run_daemon(engine: DdnsEngine) {
    let last = engine.run_until(shutdown_signal()).await;

    info!(
        "Poll loop finished (last IPv4: {:?}, last IPv6: {:?})",
        last.ipv4, last.ipv6
    );
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// If the handlers cannot be installed, this never resolves and the process
/// is left to the default signal disposition.
#[cfg(unix)]
async fn shutdown_signal() {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            warn!("Failed to setup SIGTERM handler: {}", e);
            return std::future::pending().await;
        }
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(stream) => stream,
        Err(e) => {
            warn!("Failed to setup SIGINT handler: {}", e);
            return std::future::pending().await;
        }
    };

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    info!("Received shutdown signal: {}", name);
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal: SIGINT"),
        Err(e) => {
            warn!("Failed to wait for CTRL-C: {}", e);
            std::future::pending::<()>().await
        }
    }
}
