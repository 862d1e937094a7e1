use serde::{Deserialize, Serialize};

/// 示例图片
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleImage {
    pub id: u32,
    pub src: String,
    pub alt: String,
}

/// 示例图片目录
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleCatalog {
    #[serde(default)]
    pub samples: Vec<SampleImage>,
    /// 目录文件路径（加载后设置）
    #[serde(skip)]
    pub file_path: Option<String>,
}

impl SampleCatalog {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.samples.iter().any(|s| s.id == id)
    }

    pub fn get(&self, id: u32) -> Option<&SampleImage> {
        self.samples.iter().find(|s| s.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.samples.iter().map(|s| s.id)
    }
}
