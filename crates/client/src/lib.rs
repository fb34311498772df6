//! Murmur client SDK: HTTP core, session coordination and typed services.
//!
//! The layer every Murmur frontend feature talks through. One
//! [`ApiClient`] owns the dispatch pipeline (middleware, error
//! classification, single-flight token refresh); the service wrappers in
//! [`services`] put a typed face on the REST surface; [`Murmur`] bundles
//! both for the common case.
//!
//! ```no_run
//! use murmur_client::{ClientConfig, Murmur};
//! use murmur_domain::types::auth::Credentials;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let murmur = Murmur::new(ClientConfig::from_env()?)?;
//! murmur.auth.login(&Credentials::new("alice", "hunter2")).await?;
//! let feed = murmur.posts.feed(Default::default()).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod config;
pub mod http;
pub mod notify;
pub mod services;
pub mod session;

use std::sync::Arc;

use murmur_common::cache::CacheConfig;

// Re-export commonly used types for convenience
// ------------------------------
pub use config::{ClientConfig, ClientConfigBuilder, ConfigError};
pub use http::{
    ApiClient, ApiClientBuilder, FilePart, Middleware, ProgressHandler, RequestDescriptor,
};
pub use murmur_domain::{ApiError, ApiResult};
pub use notify::{NoopSink, NoticeKind, NotificationSink};
pub use services::{
    AuthService, MessagesService, NotificationsService, PostsService, ResponseCache, UsersService,
};
pub use session::{
    AuthExchange, CredentialStore, InMemoryCredentialStore, LogoutHook, SessionCoordinator,
    SessionCredentials,
};

/// The assembled SDK: one client, every service
pub struct Murmur {
    client: Arc<ApiClient>,
    pub auth: AuthService,
    pub users: UsersService,
    pub posts: PostsService,
    pub messages: MessagesService,
    pub notifications: NotificationsService,
}

impl Murmur {
    /// Build the SDK over a fresh client with default collaborators
    ///
    /// # Errors
    /// Returns an error if the configuration fails validation.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_client(Arc::new(ApiClient::new(config)?)))
    }

    /// Build the SDK over an existing client (custom store, sink, hooks)
    pub fn with_client(client: Arc<ApiClient>) -> Self {
        let cache = Arc::new(ResponseCache::new(CacheConfig::default()));

        Self {
            auth: AuthService::new(Arc::clone(&client)),
            users: UsersService::new(Arc::clone(&client), Arc::clone(&cache)),
            posts: PostsService::new(Arc::clone(&client), cache),
            messages: MessagesService::new(Arc::clone(&client)),
            notifications: NotificationsService::new(Arc::clone(&client)),
            client,
        }
    }

    /// The underlying client, for raw descriptors and transfers
    pub fn client(&self) -> Arc<ApiClient> {
        Arc::clone(&self.client)
    }
}
