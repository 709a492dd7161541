mod main_runtime;

use anyhow::{bail, Context};
use blazer::cli::{parse_wallet_selection, Cli, Commands};
use blazer::config::AppConfig;
use blazer::context::AppContext;
use blazer::services::Checker;
use blazer::signing::load_keys;
use clap::Parser;
use main_runtime::{init_logging, pick_wallets, run_batch, run_interactive, BatchEnd, Module};
use tracing::{error, info, warn};
use zeroize::Zeroize;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config))?;
    if let Err(errors) = config.validate() {
        for problem in &errors {
            eprintln!("config: {}", problem);
        }
        bail!("invalid configuration ({} problems)", errors.len());
    }
    config
        .paths
        .ensure_dirs()
        .context("failed to create data directories")?;

    init_logging(&config.paths.log_dir, &config.logging);
    info!("{}", "-".repeat(50));

    let keys_file = config.paths.keys_file.clone();
    let mut keys = match load_keys(&keys_file) {
        Ok(keys) => keys,
        Err(e) => {
            error!(
                "Fill in the wallet list! 👉 {} ({})",
                std::env::current_dir()
                    .map(|dir| dir.join(&keys_file))
                    .unwrap_or_else(|_| keys_file.clone())
                    .display(),
                e
            );
            return Err(e.into());
        }
    };

    let ctx = AppContext::from_config(config)?;
    let wallets = ctx.build_wallets(&keys);
    keys.zeroize();
    let wallets = wallets?;
    info!("Loaded {} wallets", wallets.len());

    match cli.command {
        None => run_interactive(&ctx, &wallets).await?,
        Some(Commands::Wrap { wallets: selection }) => {
            let selected = pick_wallets(&wallets, &parse_wallet_selection(&selection, wallets.len())?)?;
            if run_batch(&ctx, Module::Wrap, &selected).await != BatchEnd::Completed {
                warn!("Wrap run interrupted");
            }
        }
        Some(Commands::Vote { wallets: selection }) => {
            let selected = pick_wallets(&wallets, &parse_wallet_selection(&selection, wallets.len())?)?;
            if run_batch(&ctx, Module::Rubyscore, &selected).await != BatchEnd::Completed {
                warn!("Vote run interrupted");
            }
        }
        Some(Commands::Check { wallets: selection }) => {
            let selected = pick_wallets(&wallets, &parse_wallet_selection(&selection, wallets.len())?)?;
            Checker::from_context(&ctx).run(&selected).await?;
        }
    }

    Ok(())
}
