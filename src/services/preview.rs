/*
 * race-map, race calendar map generator.
 * Copyright (c) 2024 race-map contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or any later version.
 */

//! Local preview of the build directory
//!
//! Serves the generated site the way static hosting would, so the map
//! can be checked before it is published.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::extract::Request;
use axum::routing::get;
use axum::{Router, ServiceExt};
use tokio::net::TcpListener;
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::error::MapResult;

/// Router serving `build_dir` with `entry_file` as fallback page
pub fn preview_router(build_dir: PathBuf, entry_file: &str) -> Router {
    let index = build_dir.join(entry_file);
    let serve_dir = ServeDir::new(&build_dir).not_found_service(ServeFile::new(index));
    Router::new()
        .route("/health", get(health_check))
        .fallback_service(serve_dir)
        .layer(TraceLayer::new_for_http())
}

/// Serve `build_dir` on `port` until the process is stopped
pub async fn serve(build_dir: PathBuf, entry_file: &str, port: u16) -> MapResult<()> {
    if !build_dir.exists() {
        tracing::warn!("Build directory {} does not exist", build_dir.display());
    }
    let app = preview_router(build_dir.clone(), entry_file);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Serving {} on http://{}", build_dir.display(), addr);

    let app = NormalizePathLayer::trim_trailing_slash().layer(app);
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;
    Ok(())
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "service": "race-map",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
