use blazer::cli::{MenuChoice, Prompt};
use blazer::config::LoggingConfig;
use blazer::context::AppContext;
use blazer::error::{BlazerError, Result};
use blazer::services::Checker;
use blazer::signing::Wallet;
use blazer::strategy::{random_sleep, RubyscoreModule, RunSummary, WrapModule};
use std::path::Path;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Console plus daily rolling file logging.
///
/// `RUST_LOG` wins over the configured level. File logging is skipped with
/// a warning when the directory is not writable.
pub fn init_logging(log_dir: &Path, logging: &LoggingConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(&logging.level)));

    // `rolling::daily` panics if it cannot create the first file, so
    // preflight writability.
    let file_layer = if std::fs::create_dir_all(log_dir).is_ok() {
        let test_path = log_dir.join(".blazer_write_test");
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&test_path)
        {
            Ok(_) => {
                let _ = std::fs::remove_file(&test_path);

                let file_appender = tracing_appender::rolling::daily(log_dir, "blazer.log");
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

                // Keep the guard alive for the whole process
                Box::leak(Box::new(guard));

                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(true),
                )
            }
            Err(e) => {
                eprintln!(
                    "Warning: Could not write to log directory {} ({}), file logging disabled",
                    log_dir.display(),
                    e
                );
                None
            }
        }
    } else {
        eprintln!(
            "Warning: Could not create log directory {}, file logging disabled",
            log_dir.display()
        );
        None
    };

    let console_text = (!logging.json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
    });
    let console_json = logging
        .json
        .then(|| tracing_subscriber::fmt::layer().json().with_target(true));

    let file_logging_enabled = file_layer.is_some();
    tracing_subscriber::registry()
        .with(filter)
        .with(console_text)
        .with(console_json)
        .with(file_layer)
        .init();

    if file_logging_enabled {
        eprintln!("Logging to: {}/blazer.log", log_dir.display());
    }
}

/// Crate-level debug unless a quieter level is configured
fn default_filter(level: &str) -> String {
    match level.trim() {
        "" | "info" => "info,blazer=debug".to_string(),
        other => other.to_string(),
    }
}

/// Which signal ended a wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// Ctrl+C
    Interrupt,
    /// SIGTERM
    Terminate,
}

pub async fn shutdown_signal() -> Shutdown {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => Shutdown::Interrupt,
        _ = terminate => Shutdown::Terminate,
    }
}

/// Transaction-submitting modules selectable from the menu
#[derive(Debug, Clone, Copy)]
pub enum Module {
    Wrap,
    Rubyscore,
}

/// How a batch run over the selected wallets ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchEnd {
    Completed,
    /// Ctrl+C: back to wallet selection
    Interrupted,
    /// SIGTERM: leave the program
    Terminated,
}

impl From<Shutdown> for BatchEnd {
    fn from(signal: Shutdown) -> Self {
        match signal {
            Shutdown::Interrupt => BatchEnd::Interrupted,
            Shutdown::Terminate => BatchEnd::Terminated,
        }
    }
}

/// Where the interactive loop goes once a menu action ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NextStep {
    Menu,
    Reselect,
    Exit,
}

impl From<BatchEnd> for NextStep {
    fn from(end: BatchEnd) -> Self {
        match end {
            BatchEnd::Completed => NextStep::Menu,
            BatchEnd::Interrupted => NextStep::Reselect,
            BatchEnd::Terminated => NextStep::Exit,
        }
    }
}

async fn run_wallet(ctx: &AppContext, module: Module, wallet: &Wallet) -> Result<RunSummary> {
    match module {
        Module::Wrap => WrapModule::from_context(ctx, wallet.clone()).run().await,
        Module::Rubyscore => RubyscoreModule::from_context(ctx, wallet.clone()).run().await,
    }
}

/// Run `module` on each wallet in turn, pausing between wallets.
///
/// A failure ends only the current wallet. An interrupt abandons the
/// current wallet and the rest of the batch.
pub async fn run_batch(ctx: &AppContext, module: Module, wallets: &[Wallet]) -> BatchEnd {
    for (i, wallet) in wallets.iter().enumerate() {
        let label = wallet.label();

        let result = tokio::select! {
            result = run_wallet(ctx, module, wallet) => result,
            signal = shutdown_signal() => {
                warn!("{} Stopped by {:?}", label, signal);
                return signal.into();
            }
        };

        match result {
            Ok(summary) => info!(
                "{} Wallet completed 🏁 ({}, {} transactions)",
                label, summary.stop, summary.actions
            ),
            Err(e) => error!("{} {} stopped: {}", label, summary_name(module), e),
        }

        if i + 1 < wallets.len() {
            tokio::select! {
                _ = random_sleep(ctx.config.execution.sleep_between_wallets) => {}
                signal = shutdown_signal() => {
                    warn!("Stopped by {:?} between wallets", signal);
                    return signal.into();
                }
            }
        }
    }
    BatchEnd::Completed
}

fn summary_name(module: Module) -> &'static str {
    match module {
        Module::Wrap => "Wrap",
        Module::Rubyscore => "Rubyscore",
    }
}

/// Wallets at the given 1-based indices
pub fn pick_wallets(wallets: &[Wallet], indices: &[usize]) -> Result<Vec<Wallet>> {
    indices
        .iter()
        .map(|&i| {
            wallets
                .get(i.wrapping_sub(1))
                .cloned()
                .ok_or_else(|| BlazerError::Selection(format!("wallet {} does not exist", i)))
        })
        .collect()
}

async fn run_checker(ctx: &AppContext, wallets: &[Wallet]) {
    if let Err(e) = Checker::from_context(ctx).run(wallets).await {
        error!("Checker failed: {}", e);
    }
}

/// Checker, wallet selection, module menu; repeat until the user exits
pub async fn run_interactive(ctx: &AppContext, wallets: &[Wallet]) -> Result<()> {
    let mut prompt = Prompt::new()?;

    'selection: loop {
        run_checker(ctx, wallets).await;

        let selected = loop {
            match prompt.select_wallets(wallets.len()) {
                Ok(Some(indices)) => match pick_wallets(wallets, &indices) {
                    Ok(selected) => break selected,
                    Err(e) => error!("{}", e),
                },
                Ok(None) => return farewell(),
                Err(BlazerError::Selection(msg)) => error!("Invalid wallet selection: {}", msg),
                Err(e) => return Err(e),
            }
        };
        info!("Selected {} wallet(s)", selected.len());

        loop {
            let Some(choice) = prompt.select_module()? else {
                return farewell();
            };

            let end = match choice {
                MenuChoice::Wrap => run_batch(ctx, Module::Wrap, &selected).await,
                MenuChoice::Rubyscore => run_batch(ctx, Module::Rubyscore, &selected).await,
                MenuChoice::Checker => {
                    run_checker(ctx, &selected).await;
                    BatchEnd::Completed
                }
                MenuChoice::Reselect => continue 'selection,
                MenuChoice::Exit => return farewell(),
            };

            match NextStep::from(end) {
                NextStep::Menu => {}
                NextStep::Reselect => continue 'selection,
                NextStep::Exit => return farewell(),
            }
        }
    }
}

fn farewell() -> Result<()> {
    println!("\n👋👋👋");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter("info"), "info,blazer=debug");
        assert_eq!(default_filter(""), "info,blazer=debug");
        assert_eq!(default_filter("warn"), "warn");
    }

    #[test]
    fn test_ctrl_c_returns_to_selection() {
        let end = BatchEnd::from(Shutdown::Interrupt);
        assert_eq!(end, BatchEnd::Interrupted);
        assert_eq!(NextStep::from(end), NextStep::Reselect);
    }

    #[test]
    fn test_sigterm_exits() {
        let end = BatchEnd::from(Shutdown::Terminate);
        assert_eq!(end, BatchEnd::Terminated);
        assert_eq!(NextStep::from(end), NextStep::Exit);
    }

    #[test]
    fn test_completed_batch_shows_menu_again() {
        assert_eq!(NextStep::from(BatchEnd::Completed), NextStep::Menu);
    }
}
