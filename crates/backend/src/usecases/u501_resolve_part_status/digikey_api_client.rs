use super::digikey_models::ProductDetailsResponse;
use super::error::ResolveError;
use super::token_cache::{Clock, SystemClock, TokenCache};
use crate::shared::config::DigiKeyConfig;
use async_trait::async_trait;
use contracts::usecases::u501_resolve_part_status::{PartIdentifier, ProductRecord};
use std::sync::Arc;
use std::time::Duration;

/// Политика повторов: экспоненциальная задержка без jitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Задержка после неудачной попытки `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.initial_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// Итог запроса одной детали
#[derive(Debug, Clone)]
pub enum LookupOutcome {
    Found(ProductDetailsResponse),
    /// Все попытки исчерпаны; это "нет результата", а не ошибка прогона
    Failed { attempts: u32, last_error: String },
}

/// Каталог деталей, которым пользуется executor
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn get_product_details(
        &self,
        identifier: &PartIdentifier,
        manufacturer_id: Option<&str>,
    ) -> Result<LookupOutcome, ResolveError>;
}

/// HTTP-клиент для DigiKey Product Information API v4
pub struct DigiKeyApiClient {
    client: reqwest::Client,
    config: DigiKeyConfig,
    tokens: TokenCache,
    retry: RetryPolicy,
}

impl DigiKeyApiClient {
    pub fn new(config: &DigiKeyConfig) -> Result<Self, ResolveError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &DigiKeyConfig, clock: Arc<dyn Clock>) -> Result<Self, ResolveError> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs));
        if config.no_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| ResolveError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        let base = config.api_base.trim_end_matches('/');
        let tokens = TokenCache::new(
            client.clone(),
            format!("{}/v1/oauth2/token", base),
            config.client_id.clone(),
            config.client_secret.clone(),
            clock,
        );

        Ok(Self {
            client,
            config: config.clone(),
            tokens,
            retry: RetryPolicy {
                max_attempts: config.max_attempts.max(1),
                initial_delay: Duration::from_millis(config.initial_retry_delay_ms),
            },
        })
    }

    fn details_url(&self, product_number: &str) -> String {
        format!(
            "{}/products/v4/search/{}/productdetails",
            self.config.api_base.trim_end_matches('/'),
            urlencoding::encode(product_number)
        )
    }

    /// Получить детали продукта с повторами.
    ///
    /// Ошибка возвращается только при неудачном получении токена.
    pub async fn get_product_details(
        &self,
        product_number: &str,
        manufacturer_id: Option<&str>,
    ) -> Result<LookupOutcome, ResolveError> {
        let token = self.tokens.get_token().await?;
        let url = self.details_url(product_number);
        let max_attempts = self.retry.max_attempts;

        let mut last_error = String::new();
        for attempt in 1..=max_attempts {
            match self.fetch_once(&url, &token, manufacturer_id).await {
                Ok(details) => return Ok(LookupOutcome::Found(details)),
                Err(e) => {
                    last_error = e;
                    if attempt == max_attempts {
                        tracing::error!(
                            "DigiKey request for '{}' finally failed: {}",
                            product_number,
                            last_error
                        );
                        break;
                    }
                    tracing::warn!(
                        "DigiKey request for '{}' failed (attempt {}/{}): {}",
                        product_number,
                        attempt,
                        max_attempts,
                        last_error
                    );
                    tokio::time::sleep(self.retry.delay_after(attempt)).await;
                }
            }
        }

        Ok(LookupOutcome::Failed {
            attempts: max_attempts,
            last_error,
        })
    }

    async fn fetch_once(
        &self,
        url: &str,
        token: &str,
        manufacturer_id: Option<&str>,
    ) -> Result<ProductDetailsResponse, String> {
        let mut request = self
            .client
            .get(url)
            .header("Authorization", token)
            .header("X-DIGIKEY-Client-Id", &self.config.client_id)
            .header("X-DIGIKEY-Locale-Site", &self.config.locale_site)
            .header("X-DIGIKEY-Locale-Language", &self.config.locale_language)
            .header("X-DIGIKEY-Locale-Currency", &self.config.locale_currency)
            .header("X-DIGIKEY-Customer-Id", &self.config.customer_id)
            .header("Accept", "application/json");

        if let Some(id) = manufacturer_id.filter(|id| !id.is_empty()) {
            request = request.query(&[("manufacturerId", id)]);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                format!("请求超时: {}", e)
            } else {
                format!("请求失败: {}", e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("HTTP {}: {}", status.as_u16(), body));
        }

        response
            .json::<ProductDetailsResponse>()
            .await
            .map_err(|e| format!("无法解析响应: {}", e))
    }

    /// Запрос по ссылке или номеру детали с плоским результатом.
    ///
    /// Отсутствующие поля заменяются заглушками, а не превращаются в ошибку.
    pub async fn get_product_info(&self, raw_input: &str) -> Result<ProductRecord, String> {
        let identifier = match PartIdentifier::parse(raw_input) {
            Some(id) => id,
            None if raw_input.trim().starts_with("http") => {
                return Err("无法从URL提取产品编号".to_string())
            }
            None => return Err("产品编号不能为空".to_string()),
        };

        match self.get_product_details(identifier.as_str(), None).await {
            Ok(LookupOutcome::Found(ProductDetailsResponse {
                product: Some(product),
            })) => Ok(product.to_record()),
            Ok(_) => Err("未找到产品信息".to_string()),
            Err(e) => {
                tracing::error!("Product info lookup for '{}' failed: {}", identifier, e);
                Err(e.to_string())
            }
        }
    }
}

#[async_trait]
impl ProductCatalog for DigiKeyApiClient {
    async fn get_product_details(
        &self,
        identifier: &PartIdentifier,
        manufacturer_id: Option<&str>,
    ) -> Result<LookupOutcome, ResolveError> {
        DigiKeyApiClient::get_product_details(self, identifier.as_str(), manufacturer_id).await
    }
}
