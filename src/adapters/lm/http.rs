//! HTTP-backed LM adapters. Each provider speaks a slightly different wire
//! format but all funnel through `reqwest` with the same retry policy, per
//! the provider endpoint table in [`crate::domain::models::config::ProvidersConfig`].

use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use serde_json::json;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Provider;
use crate::domain::ports::lm_adapter::{CompletionRequest, CompletionResponse, CompletionUsage, LmAdapter};

/// Generic chat-completions-style HTTP adapter, parameterized by the
/// provider it was built for so request/response shapes stay correct.
pub struct HttpLmAdapter {
    provider: Provider,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    backoff: ExponentialBackoff,
}

impl HttpLmAdapter {
    pub fn new(provider: Provider, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            base_url: base_url.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
            backoff: ExponentialBackoff::default(),
        }
    }

    async fn call_once(&self, request: &CompletionRequest) -> DomainResult<CompletionResponse> {
        match self.provider {
            Provider::Anthropic => self.call_anthropic(request).await,
            Provider::OpenAi | Provider::Groq => self.call_openai_compatible(request).await,
            Provider::Gemini => self.call_gemini(request).await,
        }
    }

    async fn call_anthropic(&self, request: &CompletionRequest) -> DomainResult<CompletionResponse> {
        let body = json!({
            "model": request.context.model,
            "max_tokens": request.context.max_tokens,
            "temperature": request.context.temperature,
            "system": request.system_prompt,
            "messages": [{"role": "user", "content": request.user_prompt}],
        });

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::UpstreamLm(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(DomainError::UpstreamLm(format!("anthropic error {status}: {text}")));
        }

        let value: serde_json::Value =
            response.json().await.map_err(|e| DomainError::UpstreamLm(e.to_string()))?;

        let text = value["content"]
            .as_array()
            .map(|blocks| {
                blocks
                    .iter()
                    .filter_map(|b| b["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();

        let usage = CompletionUsage {
            prompt_tokens: value["usage"]["input_tokens"].as_u64().unwrap_or(0) as u32,
            completion_tokens: value["usage"]["output_tokens"].as_u64().unwrap_or(0) as u32,
        };

        Ok(CompletionResponse { text, usage })
    }

    async fn call_openai_compatible(&self, request: &CompletionRequest) -> DomainResult<CompletionResponse> {
        let body = json!({
            "model": request.context.model,
            "max_tokens": request.context.max_tokens,
            "temperature": request.context.temperature,
            "messages": [
                {"role": "system", "content": request.system_prompt},
                {"role": "user", "content": request.user_prompt},
            ],
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::UpstreamLm(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(DomainError::UpstreamLm(format!("{} error {status}: {text}", self.provider.as_str())));
        }

        let value: serde_json::Value =
            response.json().await.map_err(|e| DomainError::UpstreamLm(e.to_string()))?;

        let text = value["choices"][0]["message"]["content"].as_str().unwrap_or_default().to_string();
        let usage = CompletionUsage {
            prompt_tokens: value["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32,
            completion_tokens: value["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32,
        };

        Ok(CompletionResponse { text, usage })
    }

    async fn call_gemini(&self, request: &CompletionRequest) -> DomainResult<CompletionResponse> {
        let body = json!({
            "contents": [{"parts": [{"text": format!("{}\n\n{}", request.system_prompt, request.user_prompt)}]}],
            "generationConfig": {
                "temperature": request.context.temperature,
                "maxOutputTokens": request.context.max_tokens,
            },
        });

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, request.context.model, self.api_key
        );

        let response = self.client.post(url).json(&body).send().await.map_err(|e| DomainError::UpstreamLm(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(DomainError::UpstreamLm(format!("gemini error {status}: {text}")));
        }

        let value: serde_json::Value =
            response.json().await.map_err(|e| DomainError::UpstreamLm(e.to_string()))?;

        let text = value["candidates"][0]["content"]["parts"][0]["text"].as_str().unwrap_or_default().to_string();
        let usage = CompletionUsage {
            prompt_tokens: value["usageMetadata"]["promptTokenCount"].as_u64().unwrap_or(0) as u32,
            completion_tokens: value["usageMetadata"]["candidatesTokenCount"].as_u64().unwrap_or(0) as u32,
        };

        Ok(CompletionResponse { text, usage })
    }
}

#[async_trait]
impl LmAdapter for HttpLmAdapter {
    fn provider_name(&self) -> &'static str {
        self.provider.as_str()
    }

    async fn complete(&self, request: CompletionRequest) -> DomainResult<CompletionResponse> {
        retry(self.backoff.clone(), || async {
            self.call_once(&request).await.map_err(|e| match e {
                DomainError::UpstreamLm(_) => backoff::Error::transient(e),
                other => backoff::Error::permanent(other),
            })
        })
        .await
    }
}
