//! 结果写入服务 - 业务能力层
//!
//! 只负责"把处理后的图片写到磁盘"，不关心提交流程

use crate::error::FileError;
use crate::models::ResultEntry;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// 写入统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteReport {
    /// 成功写入的文件
    pub written: Vec<PathBuf>,
    /// 状态为 error 而跳过的条目
    pub skipped: usize,
    /// 解码或写入失败的条目
    pub failed: usize,
}

/// 结果写入服务
pub struct ResultWriter {
    output_dir: PathBuf,
}

impl ResultWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 写入一批结果
    ///
    /// 单个条目失败只记录警告，不中断其它条目
    pub async fn write_all(&self, results: &[ResultEntry]) -> Result<WriteReport, FileError> {
        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| FileError::write_failed(self.output_dir.display().to_string(), e))?;

        let mut report = WriteReport::default();

        for entry in results {
            if !entry.is_success() {
                debug!("跳过处理失败的图片: {}", entry.original_filename);
                report.skipped += 1;
                continue;
            }

            match self.write_entry(entry).await {
                Ok(path) => report.written.push(path),
                Err(e) => {
                    warn!("⚠️ {}", e);
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// 写入单个结果
    ///
    /// # 返回
    /// 写入的文件路径
    pub async fn write_entry(&self, entry: &ResultEntry) -> Result<PathBuf, FileError> {
        let bytes = decode_image(entry)?;
        let path = self.output_dir.join(output_file_name(entry));

        fs::write(&path, bytes)
            .await
            .map_err(|e| FileError::write_failed(path.display().to_string(), e))?;

        debug!("写入结果图片: {}", path.display());
        Ok(path)
    }
}

/// 解码结果中的 base64 图片
pub fn decode_image(entry: &ResultEntry) -> Result<Vec<u8>, FileError> {
    STANDARD
        .decode(entry.base64_payload().trim())
        .map_err(|e| FileError::DecodeFailed {
            name: entry.processed_filename.clone(),
            source: Box::new(e),
        })
}

/// 输出文件名，只保留最后一段路径
fn output_file_name(entry: &ResultEntry) -> String {
    Path::new(&entry.processed_filename)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("result_{}.png", entry.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryStatus;

    fn entry(id: u64, processed_filename: &str, image: &str, status: EntryStatus) -> ResultEntry {
        ResultEntry {
            id,
            original_filename: format!("orig_{}.jpg", id),
            processed_filename: processed_filename.to_string(),
            processed_image: image.to_string(),
            status,
        }
    }

    #[test]
    fn test_output_file_name_strips_directories() {
        let e = entry(1, "../../etc/passwd", "", EntryStatus::Success);
        assert_eq!(output_file_name(&e), "passwd");

        let e = entry(2, "", "", EntryStatus::Success);
        assert_eq!(output_file_name(&e), "result_2.png");
    }

    #[tokio::test]
    async fn test_write_all() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ResultWriter::new(dir.path().join("out"));

        let results = vec![
            entry(1, "a_processed.png", "QUJD", EntryStatus::Success),
            entry(2, "b_processed.png", "data:image/png;base64,REVG", EntryStatus::Success),
            entry(3, "c_processed.png", "", EntryStatus::Error),
            entry(4, "d_processed.png", "!!not base64!!", EntryStatus::Success),
        ];

        let report = writer.write_all(&results).await.unwrap();
        assert_eq!(report.written.len(), 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 1);

        let a = std::fs::read(dir.path().join("out").join("a_processed.png")).unwrap();
        assert_eq!(a, b"ABC");
        let b = std::fs::read(dir.path().join("out").join("b_processed.png")).unwrap();
        assert_eq!(b, b"DEF");
    }
}
