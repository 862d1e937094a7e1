//! 批次提交流程 - 流程层
//!
//! 核心职责：定义"一次提交"的完整处理流程
//!
//! 流程顺序：
//! 1. 已有提交进行中 → 跳过
//! 2. 校验（无有效文件 / 未选示例 → 直接返回，不动结果存储）
//! 3. begin_load → 提交 → commit / fail → end_load
//! 4. 成功后清空暂存区或示例选择

use crate::clients::{PredictClient, PredictTransport};
use crate::error::{SubmitError, SubmitErrorKind};
use crate::models::PredictResponse;
use crate::services::{FileStaging, SampleSelection};
use crate::store::ResultsStore;
use tracing::{error, info, warn};

/// 提交结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 提交完成，结果已写入存储
    Completed { results: usize },
    /// 已有提交进行中，本次未执行
    Busy,
}

/// 批次提交流程
///
/// - 持有客户端，不持有暂存区和结果存储
/// - 同一时间只允许一个批次在途
/// - 失败时保留暂存文件 / 选择，方便直接重试
pub struct SubmissionFlow<T: PredictTransport> {
    client: PredictClient<T>,
}

impl<T: PredictTransport> SubmissionFlow<T> {
    pub fn new(client: PredictClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &PredictClient<T> {
        &self.client
    }

    /// 上传暂存区中的有效文件
    pub async fn upload_staged<P>(
        &self,
        staging: &mut FileStaging,
        store: &mut ResultsStore,
        on_progress: P,
    ) -> Result<SubmitOutcome, SubmitError>
    where
        P: FnMut(u8) + Send,
    {
        if store.is_loading() {
            warn!("⚠️ 已有批次在处理中，忽略本次上传");
            return Ok(SubmitOutcome::Busy);
        }

        let valid = staging.valid_files();
        if valid.is_empty() {
            return Err(SubmitError::NoValidFiles);
        }

        store.begin_load();
        let response = self.client.submit_files(&valid, on_progress).await;
        let outcome = finish(store, response);
        store.end_load();

        if outcome.is_ok() {
            staging.clear();
        }
        outcome
    }

    /// 分析选中的示例图片
    pub async fn analyze_samples<P>(
        &self,
        selection: &mut SampleSelection,
        store: &mut ResultsStore,
        on_progress: P,
    ) -> Result<SubmitOutcome, SubmitError>
    where
        P: FnMut(u8) + Send,
    {
        if store.is_loading() {
            warn!("⚠️ 已有批次在处理中，忽略本次分析");
            return Ok(SubmitOutcome::Busy);
        }

        if selection.is_empty() {
            return Err(SubmitError::NoSamplesSelected);
        }

        store.begin_load();
        let response = self
            .client
            .submit_sample_ids(selection.selected(), on_progress)
            .await;
        let outcome = finish(store, response);
        store.end_load();

        if outcome.is_ok() {
            selection.clear();
        }
        outcome
    }
}

/// 把提交结果写入存储
///
/// 单条结果的 `status: "error"` 不影响顶层错误
fn finish(
    store: &mut ResultsStore,
    response: Result<PredictResponse, SubmitError>,
) -> Result<SubmitOutcome, SubmitError> {
    match response {
        Ok(response) => {
            let results = store.apply(response);
            info!("✓ 批次完成，收到 {} 条结果", results);
            Ok(SubmitOutcome::Completed { results })
        }
        Err(e) => {
            error!("❌ 批次提交失败: {}", e);
            if e.kind() == SubmitErrorKind::MalformedResponse {
                store.clear();
            }
            store.fail(e.user_message());
            Err(e)
        }
    }
}
