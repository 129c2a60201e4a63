//! # webapp-template
//!
//! Starter web application: form and Google sign-in, a public and a
//! login-protected example API, an OAuth diagnostics page and the
//! commands that bootstrap a fresh deployment.

pub mod app;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod diagnostics;
pub mod error;
pub mod handlers;
pub mod pages;
pub mod response;

#[cfg(test)]
mod test_support;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Si RUST_LOG n'est pas défini, utiliser ces règles par défaut
        tracing_subscriber::EnvFilter::new(
            "info,webapp_template=debug,hyper_util=warn,tower_http=info",
        )
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
