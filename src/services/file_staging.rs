//! 文件暂存服务 - 业务能力层
//!
//! 把用户选择的文件变成"已校验、可预览"的暂存列表

use crate::config::{DEFAULT_MAX_FILE_QTY, DEFAULT_MAX_FILE_SIZE};
use crate::infrastructure::{PreviewHandle, PreviewRegistry};
use crate::models::SelectedFile;
use std::fmt;
use tracing::{debug, warn};
use uuid::Uuid;

/// 暂存文件的校验错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageError {
    /// 超过单个文件大小上限
    ExceedsSizeLimit,
    /// 不是图片
    NotAnImage,
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageError::ExceedsSizeLimit => write!(f, "超过文件大小限制"),
            StageError::NotAnImage => write!(f, "不是图片文件"),
        }
    }
}

/// 暂存文件
#[derive(Debug)]
pub struct StagedFile {
    id: String,
    file: SelectedFile,
    preview: PreviewHandle,
    error: Option<StageError>,
}

impl StagedFile {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn file(&self) -> &SelectedFile {
        &self.file
    }

    pub fn preview_url(&self) -> &str {
        self.preview.url()
    }

    pub fn error(&self) -> Option<StageError> {
        self.error
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// 文件暂存服务
///
/// 职责：
/// - 校验文件大小和类型
/// - 为每个文件分配唯一 ID 和预览
/// - 移除 / 清空时释放预览
pub struct FileStaging {
    entries: Vec<StagedFile>,
    previews: PreviewRegistry,
    max_file_size: u64,
    max_file_qty: usize,
}

impl FileStaging {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_FILE_QTY)
    }

    /// 使用自定义上限创建
    pub fn with_limits(max_file_size: u64, max_file_qty: usize) -> Self {
        Self {
            entries: Vec::new(),
            previews: PreviewRegistry::new(),
            max_file_size,
            max_file_qty,
        }
    }

    /// 暂存一批文件，追加到现有列表之后
    ///
    /// # 返回
    /// 新暂存文件的 ID
    pub fn add(&mut self, selected_files: impl IntoIterator<Item = SelectedFile>) -> Vec<String> {
        let mut added = Vec::new();

        for file in selected_files {
            let error = self.validate(&file);
            if let Some(err) = error {
                warn!("⚠️ {}: {}", file.name, err);
            }

            let preview = self.previews.create(&file);
            let id = Uuid::new_v4().to_string();
            debug!("暂存文件: {} ({} 字节) -> {}", file.name, file.size(), id);

            added.push(id.clone());
            self.entries.push(StagedFile {
                id,
                file,
                preview,
                error,
            });
        }

        added
    }

    /// 移除指定文件并释放其预览
    ///
    /// # 返回
    /// ID 不存在时返回 false
    pub fn remove(&mut self, id: &str) -> bool {
        match self.entries.iter().position(|entry| entry.id == id) {
            Some(index) => {
                let entry = self.entries.remove(index);
                self.previews.release(entry.preview);
                true
            }
            None => false,
        }
    }

    /// 清空所有文件并释放全部预览
    pub fn clear(&mut self) {
        for entry in self.entries.drain(..) {
            self.previews.release(entry.preview);
        }
    }

    /// 没有校验错误的文件
    pub fn valid_files(&self) -> Vec<&StagedFile> {
        self.entries.iter().filter(|entry| entry.is_valid()).collect()
    }

    pub fn entries(&self) -> &[StagedFile] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&StagedFile> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|entry| !entry.is_valid())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 达到暂存上限后调用方不应再添加文件
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.max_file_qty
    }

    /// 还能暂存的文件数量
    pub fn remaining_capacity(&self) -> usize {
        self.max_file_qty.saturating_sub(self.entries.len())
    }

    /// 存活的预览数量，始终等于暂存文件数量
    pub fn live_previews(&self) -> usize {
        self.previews.live_count()
    }

    fn validate(&self, file: &SelectedFile) -> Option<StageError> {
        if file.size() > self.max_file_size {
            return Some(StageError::ExceedsSizeLimit);
        }
        if !file.is_image() {
            return Some(StageError::NotAnImage);
        }
        None
    }
}

impl Default for FileStaging {
    fn default() -> Self {
        Self::new()
    }
}
