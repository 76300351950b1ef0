//! HTTP GenAI Client - 调用 Gemini / Imagen REST 接口
//!
//! 实现 GenerationEnginePort trait
//!
//! 文本: POST {base}/v1beta/models/{text_model}:generateContent
//!   使用 responseSchema 要求返回 {title, content, editorAnalysis, imagePrompt}
//! 图片: POST {base}/v1beta/models/{image_model}:predict
//!   返回 base64 编码的 JPEG，转换为 data URI

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use super::prompt::{build_chapter_prompt, SYSTEM_INSTRUCTION};
use crate::application::ports::{GenerationEnginePort, GenerationError};
use crate::domain::{AspectRatio, ChapterRequest, ChapterResponse, ImageHandle};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP GenAI 客户端配置
#[derive(Debug, Clone)]
pub struct HttpGenAiClientConfig {
    /// 服务基础 URL
    pub base_url: String,
    pub api_key: String,
    /// 文本模型
    pub text_model: String,
    /// 图片模型
    pub image_model: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// 文本模型的思考预算（token）
    pub thinking_budget: u32,
}

impl Default for HttpGenAiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key: String::new(),
            text_model: "gemini-3-pro-preview".to_string(),
            image_model: "imagen-4.0-generate-001".to_string(),
            timeout_secs: 180,
            thinking_budget: 4096,
        }
    }
}

impl HttpGenAiClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

// ---- 文本生成 ----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
    thinking_config: ThinkingConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

/// 模型返回的 JSON，字段齐全才算有效
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawChapter {
    title: Option<String>,
    content: Option<String>,
    editor_analysis: Option<String>,
    image_prompt: Option<String>,
}

fn chapter_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING", "description": "Final title of the chapter" },
            "content": { "type": "STRING", "description": "Full chapter text in Markdown" },
            "editorAnalysis": { "type": "STRING", "description": "The editor's critical analysis of the chapter" },
            "imagePrompt": { "type": "STRING", "description": "Structured, text-free illustration prompt in the requested art style" }
        },
        "required": ["title", "content", "editorAnalysis", "imagePrompt"]
    })
}

fn parse_chapter(response: GenerateContentResponse) -> Result<ChapterResponse, GenerationError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::MalformedPayload("no candidates".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        return Err(GenerationError::MalformedPayload(format!(
            "empty response text (finish reason: {})",
            reason
        )));
    }

    let raw: RawChapter = serde_json::from_str(&text)
        .map_err(|e| GenerationError::MalformedPayload(format!("invalid chapter JSON: {}", e)))?;

    let field = |value: Option<String>, name: &str| {
        value.ok_or_else(|| GenerationError::MalformedPayload(format!("missing field: {}", name)))
    };

    Ok(ChapterResponse::new(
        field(raw.title, "title")?,
        field(raw.content, "content")?,
        field(raw.editor_analysis, "editorAnalysis")?,
        field(raw.image_prompt, "imagePrompt")?,
    ))
}

// ---- 图片生成 ----

#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
struct PredictInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: u32,
    aspect_ratio: AspectRatio,
    output_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

fn parse_image(response: PredictResponse) -> Result<ImageHandle, GenerationError> {
    let prediction = response
        .predictions
        .into_iter()
        .find(|p| p.bytes_base64_encoded.as_deref().is_some_and(|b| !b.is_empty()))
        .ok_or(GenerationError::NoImage)?;

    let mime_type = prediction.mime_type.unwrap_or_else(|| "image/jpeg".to_string());
    let data = prediction.bytes_base64_encoded.unwrap_or_default();
    ImageHandle::from_base64(&mime_type, &data).map_err(|_| GenerationError::NoImage)
}

/// HTTP GenAI 客户端
pub struct HttpGenAiClient {
    client: Client,
    config: HttpGenAiClientConfig,
}

impl HttpGenAiClient {
    pub fn new(config: HttpGenAiClientConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        tracing::info!(
            base_url = %config.base_url,
            text_model = %config.text_model,
            image_model = %config.image_model,
            "HttpGenAiClient initialized"
        );

        Ok(Self { client, config })
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/v1beta/models/{}:{}",
            self.config.base_url.trim_end_matches('/'),
            model,
            method
        )
    }

    fn health_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.text_model
        )
    }

    fn text_request(&self, request: &ChapterRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: Some(SYSTEM_INSTRUCTION.to_string()),
                }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(build_chapter_prompt(request)),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: chapter_schema(),
                thinking_config: ThinkingConfig {
                    thinking_budget: self.config.thinking_budget,
                },
            },
        }
    }

    async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R, GenerationError>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Service(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        response.json::<R>().await.map_err(map_body_error)
    }
}

/// 读取响应体阶段的错误，超时与解析失败分开处理
fn map_body_error(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout
    } else if e.is_decode() {
        GenerationError::MalformedPayload(e.to_string())
    } else {
        GenerationError::Network(e.to_string())
    }
}

fn map_send_error(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout
    } else if e.is_connect() {
        GenerationError::Network(format!("Cannot connect to generation service: {}", e))
    } else {
        GenerationError::Network(e.to_string())
    }
}

#[async_trait]
impl GenerationEnginePort for HttpGenAiClient {
    async fn generate_text(
        &self,
        request: &ChapterRequest,
    ) -> Result<ChapterResponse, GenerationError> {
        let url = self.model_url(&self.config.text_model, "generateContent");
        tracing::debug!(
            url = %url,
            chapter_name = %request.chapter_name,
            "Sending chapter generation request"
        );

        let response: GenerateContentResponse =
            self.post_json(&url, &self.text_request(request)).await?;
        let chapter = parse_chapter(response)?;

        tracing::info!(
            title = %chapter.title(),
            content_len = chapter.content().len(),
            "Chapter text received"
        );
        Ok(chapter)
    }

    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<ImageHandle, GenerationError> {
        let url = self.model_url(&self.config.image_model, "predict");
        let body = PredictRequest {
            instances: vec![PredictInstance {
                prompt: prompt.to_string(),
            }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio,
                output_mime_type: "image/jpeg",
            },
        };

        tracing::debug!(url = %url, prompt_len = prompt.len(), aspect_ratio = %aspect_ratio, "Sending image request");

        let response: PredictResponse = self.post_json(&url, &body).await?;
        let image = parse_image(response)?;

        tracing::info!(media_type = ?image.media_type(), "Illustration received");
        Ok(image)
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(&self.health_url())
            .header(API_KEY_HEADER, &self.config.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_response(text: &str) -> GenerateContentResponse {
        serde_json::from_value(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        }))
        .unwrap()
    }

    /// 只发送响应头和部分响应体，然后保持连接不再发送
    async fn stalling_server() -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 16 * 1024];
            let _ = socket.read(&mut buf).await;
            let head = "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 1000\r\n\r\n{\"candid";
            socket.write_all(head.as_bytes()).await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_body_read_timeout_is_timeout() {
        let config = HttpGenAiClientConfig::new("key")
            .with_base_url(stalling_server().await)
            .with_timeout(1);
        let client = HttpGenAiClient::new(config).unwrap();

        let request = ChapterRequest {
            plot_summary: "A storm at sea.".to_string(),
            ..ChapterRequest::default()
        };
        let err = client.generate_text(&request).await.unwrap_err();
        assert_eq!(err, GenerationError::Timeout);
    }

    #[test]
    fn test_config_default() {
        let config = HttpGenAiClientConfig::default();
        assert_eq!(config.base_url, "https://generativelanguage.googleapis.com");
        assert_eq!(config.thinking_budget, 4096);
    }

    #[test]
    fn test_config_builder() {
        let config = HttpGenAiClientConfig::new("key")
            .with_base_url("http://localhost:9000")
            .with_timeout(30);
        assert_eq!(config.api_key, "key");
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_model_urls() {
        let client =
            HttpGenAiClient::new(HttpGenAiClientConfig::new("k").with_base_url("http://h/")).unwrap();
        assert_eq!(
            client.model_url("gemini-x", "generateContent"),
            "http://h/v1beta/models/gemini-x:generateContent"
        );
    }

    #[test]
    fn test_text_request_shape() {
        let client = HttpGenAiClient::new(HttpGenAiClientConfig::default()).unwrap();
        let request = ChapterRequest {
            chapter_name: "The Fall".to_string(),
            ..ChapterRequest::default()
        };
        let body = serde_json::to_value(client.text_request(&request)).unwrap();

        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["thinkingConfig"]["thinkingBudget"], 4096);
        assert_eq!(
            body["generationConfig"]["responseSchema"]["required"],
            json!(["title", "content", "editorAnalysis", "imagePrompt"])
        );
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["contents"][0]["role"], "user");
    }

    #[test]
    fn test_parse_chapter() {
        let payload = r#"{"title":"T","content":"**C**","editorAnalysis":"E","imagePrompt":"P"}"#;
        let chapter = parse_chapter(text_response(payload)).unwrap();
        assert_eq!(chapter.title(), "T");
        assert_eq!(chapter.content(), "**C**");
        assert_eq!(chapter.image_prompt(), "P");
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let payload = r#"{"title":"T","content":"C","editorAnalysis":"E"}"#;
        assert_eq!(
            parse_chapter(text_response(payload)),
            Err(GenerationError::MalformedPayload("missing field: imagePrompt".to_string()))
        );
        assert!(matches!(
            parse_chapter(text_response("not json")),
            Err(GenerationError::MalformedPayload(_))
        ));
        assert!(matches!(
            parse_chapter(GenerateContentResponse { candidates: vec![] }),
            Err(GenerationError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_parse_image() {
        let response: PredictResponse = serde_json::from_value(json!({
            "predictions": [{ "bytesBase64Encoded": "AAEC", "mimeType": "image/jpeg" }]
        }))
        .unwrap();
        assert_eq!(parse_image(response).unwrap().as_str(), "data:image/jpeg;base64,AAEC");

        let empty: PredictResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(parse_image(empty), Err(GenerationError::NoImage));
    }

    #[test]
    fn test_predict_request_passes_aspect_ratio_through() {
        let body = PredictRequest {
            instances: vec![PredictInstance {
                prompt: "p".to_string(),
            }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: AspectRatio::PortraitMobile,
                output_mime_type: "image/jpeg",
            },
        };
        let value = serde_json::to_value(body).unwrap();
        assert_eq!(value["parameters"]["aspectRatio"], "9:16");
        assert_eq!(value["parameters"]["sampleCount"], 1);
    }
}
