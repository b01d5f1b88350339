//! Settings come from built-in defaults, then an optional `nexus.toml`, then
//! `NEXUS__*` environment variables (`NEXUS__STORE__PATH=...`).

use std::path::PathBuf;

use anyhow::Context;
use nexus_store::Backend;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub backend: Backend,
    /// File for the flat backend, directory for sled.
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Used when `RUST_LOG` is unset.
    pub filter: String,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        ::config::Config::builder()
            .set_default("store.backend", "flat")?
            .set_default("store.path", "users.txt")?
            .set_default("log.filter", "nexus_social=info,nexus_store=info,nexus_app=info")?
            .add_source(::config::File::with_name("nexus").required(false))
            .add_source(::config::Environment::with_prefix("NEXUS").separator("__"))
            .build()
            .context("building configuration")?
            .try_deserialize()
            .context("reading configuration")
    }
}
