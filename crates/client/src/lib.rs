//! Gangbook Client
//!
//! Talks to the engine on behalf of the roster screen. Mutations are applied
//! to a local [`FighterCache`] first, sent through a [`GatewayPort`], and
//! then either reconciled with the server's answer or rolled back.
//!
//! ```text
//! FighterSession ──► Optimistic<FighterCache> ──► patches / reconcile
//!        │
//!        └──► FighterGateway ──► RetryingGateway ──► HttpGateway
//! ```

pub mod cache;
pub mod error;
pub mod gateway;
pub mod optimistic;
pub mod patches;
pub mod reconcile;
pub mod retry;
pub mod session;
pub mod temp_id;
pub mod transport;

pub use cache::FighterCache;
pub use error::ClientError;
pub use gateway::FighterGateway;
pub use optimistic::Optimistic;
pub use retry::{RetryConfig, RetryingGateway};
pub use session::FighterSession;
pub use temp_id::TempId;
pub use transport::{ApiRequest, GatewayPort, HttpGateway, HttpMethod, CORRELATION_ID_HEADER};

use std::sync::Arc;

use gangbook_domain::UserId;
use url::Url;

/// HTTP gateway with the default retry policy, ready for [`FighterSession::open`].
pub fn connect(base_url: Url, user_id: UserId) -> FighterGateway {
    let http: Arc<dyn GatewayPort> = Arc::new(HttpGateway::new(base_url, user_id));
    FighterGateway::new(Arc::new(RetryingGateway::new(http, RetryConfig::default())))
}
