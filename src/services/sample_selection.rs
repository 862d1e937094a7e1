//! 示例图片选择服务 - 业务能力层

use crate::models::SampleCatalog;

/// 示例图片选择
///
/// 按选择顺序保存 ID，同一 ID 只出现一次
#[derive(Debug, Clone, Default)]
pub struct SampleSelection {
    selected: Vec<u32>,
}

impl SampleSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// 切换选择状态
    ///
    /// # 返回
    /// 切换后是否处于选中状态
    pub fn toggle(&mut self, id: u32) -> bool {
        if let Some(pos) = self.selected.iter().position(|&s| s == id) {
            self.selected.remove(pos);
            false
        } else {
            self.selected.push(id);
            true
        }
    }

    /// 选中目录中的全部示例
    pub fn select_all(&mut self, catalog: &SampleCatalog) {
        self.selected = catalog.ids().collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn selected(&self) -> &[u32] {
        &self.selected
    }

    pub fn is_selected(&self, id: u32) -> bool {
        self.selected.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

impl FromIterator<u32> for SampleSelection {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut selection = SampleSelection::new();
        for id in iter {
            if !selection.is_selected(id) {
                selection.selected.push(id);
            }
        }
        selection
    }
}
