use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::{bail, eyre};
use procscope::config::{Config, load_config, load_config_from_path};
use procscope::logging;
use procscope::monitor::Monitor;
use procscope::report;
use procscope::system::collector::Collector;
use procscope::system::snapshot::Snapshot;
use tokio::signal;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "procscope",
    about = "Sample per-process CPU and memory, grouped by category and ranked"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sampling interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Number of processes in each ranking
    #[arg(long)]
    top: Option<usize>,

    /// Log filter directive, e.g. `debug` or `procscope=trace` (RUST_LOG wins)
    #[arg(long)]
    log_level: Option<String>,

    /// Print each snapshot as a single JSON line instead of a table.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Take two samples one interval apart, print the second and exit.
    #[arg(long, default_value_t = false)]
    once: bool,

    /// Exit after printing this many snapshots.
    #[arg(long)]
    cycles: Option<u64>,

    /// Ask PID to exit (SIGTERM) and report whether the signal was accepted.
    #[arg(long, value_name = "PID", conflicts_with = "force_quit")]
    terminate: Option<u32>,

    /// Kill PID unconditionally (SIGKILL).
    #[arg(long, value_name = "PID")]
    force_quit: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);
    config.validate()?;
    logging::init(&config.logging)?;

    let monitor = Monitor::new(
        Collector::new(config.collector_options()),
        config.interval(),
    );

    if let Some(pid) = cli.terminate {
        return signal_pid(&monitor, pid, false).await;
    }
    if let Some(pid) = cli.force_quit {
        return signal_pid(&monitor, pid, true).await;
    }
    if cli.once {
        return run_once(&monitor, cli.json).await;
    }
    run(&monitor, &cli).await
}

async fn run(monitor: &Monitor, cli: &Cli) -> Result<()> {
    let mut updates = monitor.subscribe();
    monitor.start_monitoring();

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut printed = 0u64;
    let result = loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let snapshot = Arc::clone(&updates.borrow_and_update());
                if let Err(err) = emit(&snapshot, cli.json) {
                    break Err(err);
                }
                printed += 1;
                if cli.cycles.is_some_and(|limit| printed >= limit) {
                    break Ok(());
                }
            }
            _ = &mut shutdown => {
                info!("shutdown requested");
                break Ok(());
            }
        }
    };

    monitor.stop_monitoring().await;
    result
}

async fn run_once(monitor: &Monitor, json: bool) -> Result<()> {
    // the first cycle only establishes CPU baselines
    monitor.refresh().await;
    tokio::time::sleep(monitor.interval()).await;
    let snapshot = monitor.refresh().await;
    emit(&snapshot, json)
}

async fn signal_pid(monitor: &Monitor, pid: u32, force: bool) -> Result<()> {
    let snapshot = monitor.refresh().await;
    let Some(record) = snapshot.record(pid) else {
        bail!("no process with PID {pid}");
    };
    let accepted = if force {
        monitor.force_quit(record)
    } else {
        monitor.terminate(record)
    };
    if !accepted {
        bail!("signal to PID {pid} ({}) was not accepted", record.name);
    }
    println!(
        "{} sent to PID {pid} ({})",
        if force { "SIGKILL" } else { "SIGTERM" },
        record.name
    );
    Ok(())
}

fn emit(snapshot: &Snapshot, json: bool) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    if json {
        let line = serde_json::to_string(snapshot)
            .map_err(|e| eyre!("failed to serialize snapshot: {e}"))?;
        writeln!(stdout, "{line}")?;
    } else {
        writeln!(stdout, "{}", report::render(snapshot))?;
    }
    stdout.flush()?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

fn load_config_for_cli(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(interval) = cli.interval_ms {
        config.sampling.interval_ms = interval;
    }
    if let Some(top) = cli.top {
        config.sampling.top_n = top;
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_config_values() {
        let cli = Cli::parse_from([
            "procscope",
            "--config",
            "/nonexistent/procscope.toml",
            "--interval-ms",
            "750",
            "--top",
            "3",
            "--log-level",
            "debug",
        ]);
        let config = load_config_for_cli(&cli);
        assert_eq!(config.sampling.interval_ms, 750);
        assert_eq!(config.sampling.top_n, 3);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn terminate_and_force_quit_conflict() {
        let parsed = Cli::try_parse_from(["procscope", "--terminate", "1", "--force-quit", "1"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn default_path_is_under_config_dir() {
        if let Some(path) = procscope::config::config_path() {
            assert!(path.ends_with("procscope/config.toml"));
        }
    }
}
