//! 基于 HTTP 的网关客户端

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, info};

use super::format::{build_endpoint, fix_base_url};
use super::types::{Gateway, GatewayError, GatewayResult};
use crate::config::AppConfig;
use crate::models::{
    AskRequest, AskResponse, CodebaseSummary, CodebasesResponse, ErrorBody, HealthSnapshot,
    HistoryRecord, HistoryResponse, RefactorRequest, RefactorResponse, RefactorSuggestion,
};

/// 错误日志中响应体的最大长度
const MAX_LOGGED_BODY: usize = 500;

/// HTTP 网关客户端
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// 创建新的网关客户端
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let base_url = fix_base_url(&base_url.into());
        if base_url.is_empty() {
            return Err(GatewayError::Config("Gateway base URL is required".to_string()));
        }

        // 构建 HTTP 客户端
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .pool_max_idle_per_host(5)
            .build()
            .map_err(GatewayError::Http)?;

        info!("Gateway client created: base_url={}", base_url);

        Ok(Self { client, base_url })
    }

    /// 根据配置创建
    pub fn from_config(config: &AppConfig) -> Result<Self, GatewayError> {
        Self::new(
            &config.base_url,
            config.request_timeout(),
            config.connect_timeout(),
        )
    }

    fn endpoint(&self, segments: &[&str]) -> String {
        build_endpoint(&self.base_url, segments)
    }

    /// 检查状态码并解析 JSON 响应体
    async fn read_json<T: DeserializeOwned>(response: Response) -> GatewayResult<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let status_code = status.as_u16();
            error!(
                "Gateway error: status={}, body={}",
                status_code,
                truncate(&body, MAX_LOGGED_BODY)
            );
            // 服务端的错误体形如 {"error": "..."}
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error);
            return Err(GatewayError::Api {
                status: status_code,
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn ask(&self, request: &AskRequest) -> GatewayResult<AskResponse> {
        let endpoint = self.endpoint(&["question", "ask"]);
        debug!(
            "Ask request: codebase_id={}, tags={:?}",
            request.codebase_id, request.tags
        );

        let response = self.client.post(&endpoint).json(request).send().await?;
        Self::read_json(response).await
    }

    async fn fetch_history(&self, codebase_id: &str) -> GatewayResult<Vec<HistoryRecord>> {
        let endpoint = self.endpoint(&["history", codebase_id]);
        debug!("History request: codebase_id={}", codebase_id);

        let response = self.client.get(&endpoint).send().await?;
        let body: HistoryResponse = Self::read_json(response).await?;

        if body.questions.is_array() {
            Ok(serde_json::from_value(body.questions)?)
        } else {
            Ok(Vec::new())
        }
    }

    async fn fetch_all_codebases(&self) -> GatewayResult<Vec<CodebaseSummary>> {
        let endpoint = self.endpoint(&["history"]);

        let response = self.client.get(&endpoint).send().await?;
        let body: CodebasesResponse = Self::read_json(response).await?;
        Ok(body.codebases.unwrap_or_default())
    }

    async fn refactor(&self, code: &str, language: &str) -> GatewayResult<Vec<RefactorSuggestion>> {
        let endpoint = self.endpoint(&["refactor"]);
        let payload = RefactorRequest {
            code: code.to_string(),
            language: language.to_string(),
        };
        debug!("Refactor request: language={}, code_len={}", language, code.len());

        let response = self.client.post(&endpoint).json(&payload).send().await?;
        let body: RefactorResponse = Self::read_json(response).await?;
        Ok(body.suggestions.unwrap_or_default())
    }

    async fn health(&self) -> GatewayResult<HealthSnapshot> {
        let endpoint = self.endpoint(&["health"]);

        let response = self.client.get(&endpoint).send().await?;
        Self::read_json(response).await
    }
}

/// 按字符边界截断
fn truncate(text: &str, max_len: usize) -> &str {
    match text.char_indices().nth(max_len) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
