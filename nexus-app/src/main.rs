mod config;
mod shell;

use std::env;

use anyhow::Context;
use nexus_social::UserStore;
use nexus_store::AnyStore;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::AppConfig;
use crate::shell::{Reply, Shell, WELCOME};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = AppConfig::load()?;
    if let Some(path) = env::args().nth(1) {
        config.store.path = path.into();
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let store = AnyStore::open(config.store.backend, &config.store.path)?;
    let records = store.load_all().context("loading users")?;
    tracing::info!(
        users = records.len(),
        backend = ?config.store.backend,
        path = %config.store.path.display(),
        "store loaded"
    );

    let mut shell = Shell::new(store, records);
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout.write_all(WELCOME.as_bytes()).await?;
    loop {
        stdout.write_all(shell.prompt().as_bytes()).await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match shell.handle(&line).await {
            Reply::Text(text) => {
                if !text.is_empty() {
                    stdout.write_all(text.as_bytes()).await?;
                    stdout.write_all(b"\n").await?;
                }
            }
            Reply::Quit => break,
        }
    }

    shell.save().context("saving users on exit")?;
    tracing::info!("bye");
    Ok(())
}
