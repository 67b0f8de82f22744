use super::error::ResolveError;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Запас до номинального истечения токена
pub const TOKEN_SAFETY_MARGIN_SECS: i64 = 60;

/// Источник текущего времени (подменяется в тестах)
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Bearer-токен со сроком действия
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// Готовое значение заголовка Authorization ("Bearer ...")
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn issued(access_token: &str, expires_in_secs: i64, now: DateTime<Utc>) -> Self {
        Self {
            value: format!("Bearer {}", access_token),
            expires_at: now + Duration::seconds(expires_in_secs - TOKEN_SAFETY_MARGIN_SECS),
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.value.is_empty() && now < self.expires_at
    }
}

/// Ответ OAuth2 client_credentials
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Кэш токена DigiKey с ленивым обновлением
pub struct TokenCache {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    clock: Arc<dyn Clock>,
    current: Mutex<Option<AccessToken>>,
}

impl TokenCache {
    pub fn new(
        client: reqwest::Client,
        token_url: String,
        client_id: String,
        client_secret: String,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            token_url,
            client_id,
            client_secret,
            clock,
            current: Mutex::new(None),
        }
    }

    /// Вернуть действующий токен, при необходимости запросив новый.
    ///
    /// Ошибка обновления не повторяется на этом уровне.
    pub async fn get_token(&self) -> Result<String, ResolveError> {
        let mut current = self.current.lock().await;

        if let Some(token) = current.as_ref() {
            if token.is_valid_at(self.clock.now()) {
                return Ok(token.value.clone());
            }
        }

        let response = self.request_new_token().await?;
        let token = AccessToken::issued(&response.access_token, response.expires_in, self.clock.now());
        tracing::info!("DigiKey access token refreshed, valid until {}", token.expires_at);

        let value = token.value.clone();
        *current = Some(token);
        Ok(value)
    }

    async fn request_new_token(&self) -> Result<TokenResponse, ResolveError> {
        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "client_credentials"),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Token request failed: {}", e);
                ResolveError::TokenRefresh(format!("请求失败: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Token request HTTP error: {} {}", status, body);
            return Err(ResolveError::TokenRefresh(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ResolveError::TokenRefresh(format!("无法解析令牌响应: {}", e)))?;

        if token.access_token.is_empty() {
            return Err(ResolveError::TokenRefresh("令牌响应中 access_token 为空".to_string()));
        }

        Ok(token)
    }
}
