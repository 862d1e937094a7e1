use crate::error::FileError;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 用户选择的原始文件
///
/// 内容使用 `Bytes` 共享，打包上传时不复制；未通过校验的文件可以只保留元数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// 原始文件名
    pub name: String,
    /// MIME 类型（如 `image/png`）
    pub content_type: String,
    size: u64,
    bytes: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        let bytes = Bytes::from(bytes);
        Self {
            name: name.into(),
            content_type: content_type.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }

    /// 只有元数据、没有读入内容的文件
    pub fn without_contents(name: impl Into<String>, content_type: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            size,
            bytes: Bytes::new(),
        }
    }

    /// 文件大小（字节），来自磁盘元数据时与 `bytes()` 的长度可能不同
    pub fn size(&self) -> u64 {
        self.size
    }

    /// 文件内容
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    /// 从磁盘读取文件，按扩展名推断 MIME 类型
    pub async fn from_path(path: &Path) -> Result<Self, FileError> {
        let bytes = fs::read(path)
            .await
            .map_err(|e| FileError::read_failed(path.display().to_string(), e))?;

        let (name, content_type) = describe(path);
        Ok(Self::new(name, content_type, bytes))
    }

    /// 先读取元数据，只有不超过 `max_size` 的图片才读入内容
    ///
    /// 其它文件只带大小和类型，交给暂存区标记错误
    pub async fn from_path_with_limit(path: &Path, max_size: u64) -> Result<Self, FileError> {
        let metadata = fs::metadata(path)
            .await
            .map_err(|e| FileError::read_failed(path.display().to_string(), e))?;

        let (name, content_type) = describe(path);
        let file = Self::without_contents(name, content_type, metadata.len());
        if file.size > max_size || !file.is_image() {
            return Ok(file);
        }

        let bytes = fs::read(path)
            .await
            .map_err(|e| FileError::read_failed(path.display().to_string(), e))?;
        Ok(Self::new(file.name, file.content_type, bytes))
    }
}

fn describe(path: &Path) -> (String, String) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let content_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    (name, content_type)
}

/// 列出目录下的所有文件（按文件名排序）
pub async fn list_files(folder_path: &str) -> Result<Vec<PathBuf>, FileError> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        });
    }

    let mut files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .map_err(|e| FileError::read_failed(folder_path, e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| FileError::read_failed(folder_path, e))?
    {
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_path_guesses_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("lesion.png");
        let txt = dir.path().join("notes.txt");
        std::fs::write(&png, [0x89, b'P', b'N', b'G']).unwrap();
        std::fs::write(&txt, b"hello").unwrap();

        let image = SelectedFile::from_path(&png).await.unwrap();
        assert_eq!(image.name, "lesion.png");
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.size(), 4);
        assert!(image.is_image());

        let text = SelectedFile::from_path(&txt).await.unwrap();
        assert_eq!(text.content_type, "text/plain");
        assert!(!text.is_image());
    }

    #[tokio::test]
    async fn test_from_path_with_limit_skips_oversized_contents() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("video.mp4");
        let huge = dir.path().join("huge.png");
        std::fs::File::create(&video).unwrap().set_len(256 * 1024 * 1024).unwrap();
        std::fs::File::create(&huge).unwrap().set_len(6 * 1024 * 1024).unwrap();

        let file = SelectedFile::from_path_with_limit(&video, 5 * 1024 * 1024).await.unwrap();
        assert_eq!(file.name, "video.mp4");
        assert_eq!(file.content_type, "video/mp4");
        assert_eq!(file.size(), 256 * 1024 * 1024);
        assert!(file.bytes().is_empty());

        let file = SelectedFile::from_path_with_limit(&huge, 5 * 1024 * 1024).await.unwrap();
        assert!(file.is_image());
        assert_eq!(file.size(), 6 * 1024 * 1024);
        assert!(file.bytes().is_empty());
    }

    #[tokio::test]
    async fn test_from_path_with_limit_reads_valid_images() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("scan.png");
        let txt = dir.path().join("notes.txt");
        std::fs::write(&png, [0x89, b'P', b'N', b'G']).unwrap();
        std::fs::write(&txt, b"hello").unwrap();

        let image = SelectedFile::from_path_with_limit(&png, 1024).await.unwrap();
        assert_eq!(image.size(), 4);
        assert_eq!(image.bytes().as_ref(), &[0x89, b'P', b'N', b'G']);

        let text = SelectedFile::from_path_with_limit(&txt, 1024).await.unwrap();
        assert_eq!(text.size(), 5);
        assert!(text.bytes().is_empty());

        let missing = dir.path().join("gone.png");
        assert!(SelectedFile::from_path_with_limit(&missing, 1024).await.is_err());
    }

    #[tokio::test]
    async fn test_list_files_sorted_and_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"b").unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"a").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let files = list_files(dir.path().to_str().unwrap()).await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg"]);

        let missing = dir.path().join("missing");
        let err = list_files(missing.to_str().unwrap()).await.unwrap_err();
        assert!(matches!(err, FileError::DirectoryNotFound { .. }));
    }
}
