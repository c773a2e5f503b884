//! # swagtomock - Mock server for OpenAPI/Swagger descriptions
//!
//! swagtomock loads Swagger 2.0 and OpenAPI 3.x descriptions from a folder and
//! answers every declared operation with a response synthesized from its
//! schema, without any real backend.
//!
//! ## Features
//!
//! - **Two dialects**: `swagger: "2.0"` and `openapi: 3.x` behind one adapter seam
//! - **Reference resolution**: internal `$ref`s with a bounded cycle guard
//! - **Status selection**: configurable patterns such as `2XX` or `404`
//! - **Content negotiation**: preferred media type with declared fallbacks
//! - **CORS preflight**: `OPTIONS` on every mounted path
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use swagtomock::adapters::document_loader::DocumentLoader;
//! use swagtomock::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::new()?;
//!     let documents = DocumentLoader::new(&settings.folder).load()?;
//!     let app = swagtomock::create_app(&settings, documents)?;
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: schema nodes, reference resolution, synthesis, status patterns
//! - **Adapters**: dialect adapters, document loading, route binding
//! - **Config**: layered settings and validation

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;

use axum::Router;
use std::sync::Arc;

use crate::adapters::document_adapter::{adapter_for, DocumentAdapter};
use crate::adapters::route_binder::RouteBinder;
use crate::config::Settings;
use crate::domain::ApiDocument;

/// Creates the Axum application router for the loaded documents.
///
/// # Arguments
///
/// * `settings` - Validated application settings
/// * `documents` - Parsed description documents
///
/// # Returns
///
/// Router with one route per declared (path, method) pair, or an error when
/// a configured status pattern is invalid
pub fn create_app(settings: &Settings, documents: Vec<ApiDocument>) -> Result<Router, anyhow::Error> {
    let binder = RouteBinder::new(settings)?;

    let adapters: Vec<Arc<dyn DocumentAdapter>> = documents
        .into_iter()
        .map(|document| adapter_for(document, settings))
        .collect();

    let table = binder.route_table(&adapters);
    tracing::info!("Registered {} mock routes", table.len());

    Ok(binder.into_router(table))
}
