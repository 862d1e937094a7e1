//! 预测结果数据结构
//!
//! 后端返回的结果既可能是裸数组，也可能是 `{results, summary}` 信封，
//! 这里在边界处显式解码为 [`PredictResponse`]，无法识别的结构直接拒绝。

use crate::error::SubmitError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// 单张图片的处理状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Success,
    Error,
}

/// 单张图片的处理结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub id: u64,
    pub original_filename: String,
    pub processed_filename: String,
    /// base64 编码的图片，可能已带 `data:image/` 前缀
    pub processed_image: String,
    pub status: EntryStatus,
}

impl ResultEntry {
    pub fn is_success(&self) -> bool {
        self.status == EntryStatus::Success
    }

    /// 转换为可直接展示的 data URL
    pub fn data_url(&self) -> String {
        data_url(&self.processed_image, "png")
    }

    /// 去掉 data URL 前缀后的 base64 内容
    pub fn base64_payload(&self) -> &str {
        let image = self.processed_image.as_str();
        if image.starts_with("data:image/") {
            if let Some((_, payload)) = image.split_once(',') {
                return payload;
            }
        }
        image
    }
}

/// 批次统计，由后端生成，原样透传
///
/// 字段都可能缺失；未知字段保存在 `extra` 中，持久化时一并写回
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_requested: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_successfully: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_available_samples: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 后端响应
#[derive(Debug, Clone, PartialEq)]
pub enum PredictResponse {
    /// 裸结果数组
    Results(Vec<ResultEntry>),
    /// 带统计信息的信封
    Envelope {
        results: Vec<ResultEntry>,
        summary: Option<BatchSummary>,
    },
}

impl PredictResponse {
    /// 从 JSON 解码响应
    ///
    /// # 返回
    /// 数组或包含 `results` 数组的对象，其它结构返回 `MalformedResponse`；
    /// `summary` 无法解析时只记录警告并置空，不影响结果
    pub fn decode(value: Value) -> Result<Self, SubmitError> {
        match value {
            Value::Array(_) => serde_json::from_value(value)
                .map(PredictResponse::Results)
                .map_err(|e| SubmitError::malformed(format!("结果数组无法解析: {}", e))),
            Value::Object(mut map) => {
                let results = map
                    .remove("results")
                    .ok_or_else(|| SubmitError::malformed("对象中缺少 results 字段"))?;
                let results: Vec<ResultEntry> = serde_json::from_value(results)
                    .map_err(|e| SubmitError::malformed(format!("results 无法解析: {}", e)))?;
                let summary = match map.remove("summary") {
                    None | Some(Value::Null) => None,
                    Some(raw) => match serde_json::from_value::<BatchSummary>(raw) {
                        Ok(summary) => Some(summary),
                        Err(e) => {
                            warn!("⚠️ summary 无法解析，已忽略: {}", e);
                            None
                        }
                    },
                };
                Ok(PredictResponse::Envelope { results, summary })
            }
            other => Err(SubmitError::malformed(format!(
                "期望数组或对象，实际为: {}",
                json_kind(&other)
            ))),
        }
    }

    /// 拆分为结果列表和统计信息
    pub fn into_parts(self) -> (Vec<ResultEntry>, Option<BatchSummary>) {
        match self {
            PredictResponse::Results(results) => (results, None),
            PredictResponse::Envelope { results, summary } => (results, summary),
        }
    }
}

/// 将 base64 字符串转换为 data URL，已有前缀时原样返回
pub fn data_url(base64: &str, image_format: &str) -> String {
    if base64.is_empty() {
        return String::new();
    }
    if base64.starts_with("data:image/") {
        return base64.to_string();
    }
    format!("data:image/{};base64,{}", image_format, base64)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
