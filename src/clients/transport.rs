//! 预测 API 的网络层
//!
//! `PredictTransport` 只负责把请求发出去并拿回 JSON，不做结构判断

use crate::config::Config;
use crate::error::SubmitError;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// 单个待上传文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub file_id: String,
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// 一次 multipart 请求的内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBatch {
    pub batch_id: String,
    pub parts: Vec<FilePart>,
}

impl FileBatch {
    pub fn total_files(&self) -> usize {
        self.parts.len()
    }

    /// 构建 multipart 表单
    ///
    /// 每个文件依次追加 `files` / `filenames` / `fileIds`，最后是 `totalFiles` 和 `batchId`
    pub fn into_form(self) -> Result<Form, reqwest::Error> {
        let total_files = self.parts.len();
        let mut form = Form::new();

        for part in self.parts {
            let length = part.bytes.len() as u64;
            let file = Part::stream_with_length(part.bytes, length)
                .file_name(part.filename.clone())
                .mime_str(&part.content_type)?;
            form = form
                .part("files", file)
                .text("filenames", part.filename)
                .text("fileIds", part.file_id);
        }

        Ok(form
            .text("totalFiles", total_files.to_string())
            .text("batchId", self.batch_id))
    }
}

/// 预测 API 网络层
#[async_trait]
pub trait PredictTransport: Send + Sync {
    /// `POST {base}/predict`
    async fn post_files(&self, batch: FileBatch) -> Result<Value, SubmitError>;

    /// `POST {base}/predict-samples`
    async fn post_sample_ids(&self, image_ids: &[u32]) -> Result<Value, SubmitError>;
}

/// 基于 reqwest 的网络层
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self::with_client(client, config.api_base_url()))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// 检查状态码并读取 JSON
    async fn read_json(endpoint: &str, response: Response) -> Result<Value, SubmitError> {
        let status = response.status();
        if !status.is_success() {
            let message = status.canonical_reason().unwrap_or("").to_string();
            warn!("API返回错误状态 ({}): {}", endpoint, status);
            return Err(SubmitError::HttpStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SubmitError::request_failed(endpoint, e))?;
        debug!("响应大小: {} 字节", body.len());

        serde_json::from_slice(&body)
            .map_err(|e| SubmitError::malformed(format!("响应不是合法的 JSON: {}", e)))
    }
}

#[async_trait]
impl PredictTransport for HttpTransport {
    async fn post_files(&self, batch: FileBatch) -> Result<Value, SubmitError> {
        let endpoint = self.endpoint("predict");
        let form = batch
            .into_form()
            .map_err(|e| SubmitError::request_failed(&endpoint, e))?;

        let response = self
            .client
            .post(&endpoint)
            .header(ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(|e| SubmitError::request_failed(&endpoint, e))?;

        Self::read_json(&endpoint, response).await
    }

    async fn post_sample_ids(&self, image_ids: &[u32]) -> Result<Value, SubmitError> {
        let endpoint = self.endpoint("predict-samples");

        let response = self
            .client
            .post(&endpoint)
            .header(ACCEPT, "application/json")
            .json(&json!({ "imageIds": image_ids }))
            .send()
            .await
            .map_err(|e| SubmitError::request_failed(&endpoint, e))?;

        Self::read_json(&endpoint, response).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    enum Reply {
        Body(Value),
        Status(u16),
    }

    /// 记录请求并返回固定响应的网络层
    pub struct RecordingTransport {
        reply: Reply,
        file_batches: Mutex<Vec<FileBatch>>,
        sample_requests: Mutex<Vec<Vec<u32>>>,
    }

    impl RecordingTransport {
        pub fn replying(body: Value) -> Self {
            Self::with_reply(Reply::Body(body))
        }

        pub fn failing_with_status(status: u16) -> Self {
            Self::with_reply(Reply::Status(status))
        }

        fn with_reply(reply: Reply) -> Self {
            Self {
                reply,
                file_batches: Mutex::new(Vec::new()),
                sample_requests: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.file_batches.lock().unwrap().len() + self.sample_requests.lock().unwrap().len()
        }

        pub fn file_batches(&self) -> Vec<FileBatch> {
            self.file_batches.lock().unwrap().clone()
        }

        pub fn sample_requests(&self) -> Vec<Vec<u32>> {
            self.sample_requests.lock().unwrap().clone()
        }

        fn respond(&self, endpoint: &str) -> Result<Value, SubmitError> {
            match &self.reply {
                Reply::Body(body) => Ok(body.clone()),
                Reply::Status(status) => Err(SubmitError::HttpStatus {
                    endpoint: endpoint.to_string(),
                    status: *status,
                    message: "Service Unavailable".to_string(),
                }),
            }
        }
    }

    #[async_trait]
    impl PredictTransport for RecordingTransport {
        async fn post_files(&self, batch: FileBatch) -> Result<Value, SubmitError> {
            self.file_batches.lock().unwrap().push(batch);
            self.respond("/predict")
        }

        async fn post_sample_ids(&self, image_ids: &[u32]) -> Result<Value, SubmitError> {
            self.sample_requests.lock().unwrap().push(image_ids.to_vec());
            self.respond("/predict-samples")
        }
    }
}
