//! Runnable demo binary: wires a [`GameConfig`] to a [`Table`], the default
//! oracle/deck-generator/UI trio, and a [`Dealer`] driving N players, one of
//! which reads its key presses from stdin.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use set_table::config::{CliArgs, GameConfig};
use set_table::deckgen::ShuffledDeckGenerator;
use set_table::dealer::Dealer;
use set_table::input::{KeyboardSource, StdinKeyboardSource};
use set_table::oracle::FeatureOracle;
use set_table::table::Table;
use set_table::ui::{StdoutUiSink, UiSink};

const LOG_TARGET: &str = "bin::set_table_cli";

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.json)?;

    let config = GameConfig::resolve(&args).context("failed to resolve game configuration")?;
    tracing::info!(target: LOG_TARGET, ?config, "starting game");

    let ui: Arc<dyn UiSink> = Arc::new(StdoutUiSink);
    let table = Arc::new(Table::new(
        ui.clone(),
        Duration::from_millis(config.table_delay_millis),
    ));
    let oracle = Arc::new(FeatureOracle::new(config.feature_size, config.deck_size));
    let deckgen = ShuffledDeckGenerator::new(config.rng_seed);

    let (dealer, players) = Dealer::new(&config, table.clone(), oracle, &deckgen, ui);
    let shutdown = dealer.cancel_token();

    for player in &players {
        if player.shared.human {
            Box::new(StdinKeyboardSource).spawn(player.shared.id, player.clone());
            println!(
                "player {}: type whitespace-separated slot numbers (0..{}) and press enter",
                player.shared.id, config.table_size
            );
        }
    }

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!(target: LOG_TARGET, "ctrl-c received, shutting down");
            shutdown.cancel();
        }
    });

    let winners = dealer.run().await;
    println!("winner(s): {winners:?}");
    Ok(())
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("set_table_cli=info,set_table=info"));
    let builder = fmt::fmt()
        .with_env_filter(filter)
        .with_thread_ids(true)
        .with_target(true);

    if json {
        builder.json().flatten_event(true).init();
    } else {
        builder.compact().init();
    }

    Ok(())
}
