/// 预测 API 客户端
///
/// 把暂存文件或示例 ID 打包成一次请求，提交并解码响应
use crate::clients::transport::{FileBatch, FilePart, PredictTransport};
use crate::error::SubmitError;
use crate::models::PredictResponse;
use crate::services::StagedFile;
use tracing::{debug, info};
use uuid::Uuid;

/// 提交进度（百分比），只用于界面反馈
pub mod progress {
    /// 开始提交
    pub const STARTED: u8 = 0;
    /// 文件批次已发出
    pub const FILES_SENT: u8 = 25;
    /// 文件批次已收到响应
    pub const FILES_RECEIVED: u8 = 75;
    /// 示例批次已收到响应
    pub const SAMPLES_RECEIVED: u8 = 50;
    /// 响应已解码
    pub const DONE: u8 = 100;
}

/// 预测 API 客户端
pub struct PredictClient<T: PredictTransport> {
    transport: T,
}

impl<T: PredictTransport> PredictClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// 提交暂存文件
    ///
    /// # 参数
    /// - `files`: 暂存文件，带校验错误的会被忽略
    /// - `on_progress`: 进度回调
    ///
    /// # 返回
    /// 解码后的响应；没有有效文件时不发请求，直接返回 `NoValidFiles`
    pub async fn submit_files<P>(
        &self,
        files: &[&StagedFile],
        mut on_progress: P,
    ) -> Result<PredictResponse, SubmitError>
    where
        P: FnMut(u8) + Send,
    {
        let batch = build_file_batch(files).ok_or(SubmitError::NoValidFiles)?;

        info!(
            "📤 提交文件批次 {}，共 {} 个文件",
            batch.batch_id,
            batch.total_files()
        );
        on_progress(progress::STARTED);

        on_progress(progress::FILES_SENT);
        let body = self.transport.post_files(batch).await?;
        on_progress(progress::FILES_RECEIVED);

        let response = PredictResponse::decode(body)?;
        on_progress(progress::DONE);

        Ok(response)
    }

    /// 提交示例图片 ID
    ///
    /// # 参数
    /// - `image_ids`: 选中的示例 ID
    /// - `on_progress`: 进度回调
    pub async fn submit_sample_ids<P>(
        &self,
        image_ids: &[u32],
        mut on_progress: P,
    ) -> Result<PredictResponse, SubmitError>
    where
        P: FnMut(u8) + Send,
    {
        if image_ids.is_empty() {
            return Err(SubmitError::NoSamplesSelected);
        }

        info!("📤 提交示例图片批次，共 {} 张", image_ids.len());
        debug!("示例 ID: {:?}", image_ids);
        on_progress(progress::STARTED);

        let body = self.transport.post_sample_ids(image_ids).await?;
        on_progress(progress::SAMPLES_RECEIVED);

        let response = PredictResponse::decode(body)?;
        on_progress(progress::DONE);

        Ok(response)
    }
}

/// 把有效的暂存文件打包成一个批次
///
/// # 返回
/// 没有有效文件时返回 None
pub fn build_file_batch(files: &[&StagedFile]) -> Option<FileBatch> {
    let parts: Vec<FilePart> = files
        .iter()
        .filter(|staged| staged.is_valid())
        .map(|staged| FilePart {
            file_id: staged.id().to_string(),
            filename: staged.file().name.clone(),
            content_type: staged.file().content_type.clone(),
            bytes: staged.file().bytes().clone(),
        })
        .collect();

    if parts.is_empty() {
        return None;
    }

    Some(FileBatch {
        batch_id: Uuid::new_v4().to_string(),
        parts,
    })
}
