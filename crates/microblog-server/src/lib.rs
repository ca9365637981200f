//! Microblog feed store server.
//!
//! An append-only message log served over HTTP. The store assigns ids,
//! lists messages newest first and checks that submissions are well formed.
//! It never verifies signatures; readers do that.
//!
//! # Components
//!
//! - [`Storage`]: append-only log with [`MemoryStorage`] and [`RedbStorage`]
//!   backends
//! - [`FeedService`]: validation and query handling, no HTTP types
//! - [`router`]: Axum routes over a [`FeedService`]
//! - [`Server`]: binds a listener and serves the router with Tokio

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod error;
mod http;
mod service;
pub mod storage;

use std::{net::SocketAddr, sync::Arc};

pub use config::{DEFAULT_BIND, ServerConfig};
pub use error::ServerError;
pub use http::{ENVELOPE_HEADROOM, router};
pub use service::{FeedService, ListQuery, Listing, ServiceError};
pub use storage::{MemoryStorage, RedbStorage, Storage, StorageError};
use tokio::net::TcpListener;

/// Production server: a bound listener plus the feed router.
pub struct Server {
    listener: TcpListener,
    app: axum::Router,
    address: String,
}

impl Server {
    /// Open storage per `config` and bind the listen address.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let app = match &config.db_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "using redb storage");
                router(Arc::new(FeedService::new(RedbStorage::open(path)?)))
            },
            None => {
                tracing::warn!("using in-memory storage, messages are lost on exit");
                router(Arc::new(FeedService::new(MemoryStorage::new())))
            },
        };

        Self::bind_router(&config.bind_address, app).await
    }

    /// Bind `address` and serve an already-built router.
    pub async fn bind_router(address: &str, app: axum::Router) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(address)
            .await
            .map_err(|source| ServerError::Io { address: address.to_string(), source })?;

        Ok(Self { listener, app, address: address.to_string() })
    }

    /// Address actually bound (resolves port 0).
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener
            .local_addr()
            .map_err(|source| ServerError::Io { address: self.address.clone(), source })
    }

    /// Serve until the process is stopped.
    pub async fn run(self) -> Result<(), ServerError> {
        let address = self.address;
        axum::serve(self.listener, self.app)
            .await
            .map_err(|source| ServerError::Io { address, source })
    }
}
