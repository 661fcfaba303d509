// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Meridian Tokenization

use std::{env, net::SocketAddr, sync::Arc};

use tracing_subscriber::EnvFilter;

use meridian_custody_server::{
    api::router,
    config::{CustodyConfig, DATA_DIR_ENV},
    custody::{CustodyClient, VaultProvisioner},
    state::AppState,
    storage::{FileStore, StoragePaths},
};

#[tokio::main]
async fn main() {
    init_tracing();

    let config = CustodyConfig::from_env();
    let client = CustodyClient::from_config(&config).expect("Failed to build custody client");
    if client.is_mock() {
        tracing::warn!("custody client is in mock mode, no provider calls will be made");
    }

    let data_dir = env::var(DATA_DIR_ENV).unwrap_or_else(|_| "./data".to_string());
    let store = FileStore::open(StoragePaths::new(&data_dir)).expect("Failed to open record store");

    let provisioner = VaultProvisioner::new(Arc::new(client), Arc::new(store));
    let state = AppState::new(provisioner);
    let app = router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    tracing::info!(%addr, data_dir = %data_dir, "custody server listening (docs at /docs)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let format = env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    if format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install shutdown signal handler");
    tracing::info!("shutdown signal received");
}
