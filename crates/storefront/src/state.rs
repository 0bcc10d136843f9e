//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::auth::{KakaoProvider, NaverProvider};
use crate::services::portone::{PortOneClient, PortOneError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    portone: PortOneClient,
    kakao: Option<KakaoProvider>,
    naver: Option<NaverProvider>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// OAuth providers are optional: a missing client id just leaves that
    /// login button off the page.
    ///
    /// # Errors
    ///
    /// Returns an error if the `PortOne` client cannot be built.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, PortOneError> {
        let portone = PortOneClient::new(&config.portone)?;

        let http = reqwest::Client::new();

        let kakao = config
            .oauth
            .kakao_client_id
            .clone()
            .map(|client_id| KakaoProvider::new(http.clone(), client_id));

        let naver = match (
            config.oauth.naver_client_id.clone(),
            config.oauth.naver_client_secret.clone(),
        ) {
            (Some(id), Some(secret)) => Some(NaverProvider::new(http, id, secret)),
            _ => None,
        };

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                portone,
                kakao,
                naver,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the `PortOne` API client.
    #[must_use]
    pub fn portone(&self) -> &PortOneClient {
        &self.inner.portone
    }

    /// Kakao login, when configured.
    #[must_use]
    pub fn kakao(&self) -> Option<&KakaoProvider> {
        self.inner.kakao.as_ref()
    }

    /// Naver login, when configured.
    #[must_use]
    pub fn naver(&self) -> Option<&NaverProvider> {
        self.inner.naver.as_ref()
    }
}
