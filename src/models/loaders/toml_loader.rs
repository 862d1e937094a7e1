use crate::error::FileError;
use crate::models::sample::SampleCatalog;
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载示例图片目录
///
/// 文件格式：
/// ```toml
/// [[samples]]
/// id = 25234
/// src = "samples/ISIC_0025234.jpg"
/// alt = "Skin lesion sample ISIC_0025234"
/// ```
pub async fn load_sample_catalog(toml_file_path: &Path) -> Result<SampleCatalog, FileError> {
    let path_str = toml_file_path.display().to_string();

    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| FileError::read_failed(path_str.clone(), e))?;

    let mut catalog: SampleCatalog =
        toml::from_str(&content).map_err(|e| FileError::TomlParseFailed {
            path: path_str.clone(),
            source: Box::new(e),
        })?;

    catalog.file_path = Some(path_str);
    tracing::info!("成功加载 {} 张示例图片", catalog.len());

    Ok(catalog)
}

/// 目录文件不存在时返回空目录
pub async fn load_sample_catalog_or_empty(toml_file_path: &Path) -> Result<SampleCatalog, FileError> {
    if !toml_file_path.exists() {
        tracing::warn!("示例图片目录不存在: {}", toml_file_path.display());
        return Ok(SampleCatalog::default());
    }
    load_sample_catalog(toml_file_path).await
}
