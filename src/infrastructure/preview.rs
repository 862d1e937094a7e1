//! 预览资源登记表 - 基础设施层
//!
//! 持有所有预览资源，只暴露"创建 / 释放预览"的能力

use crate::models::SelectedFile;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// 预览资源句柄
///
/// 不可 Clone，释放时按值交回登记表，保证每个预览只释放一次
#[derive(Debug, PartialEq, Eq)]
pub struct PreviewHandle {
    key: String,
    url: String,
}

impl PreviewHandle {
    /// 预览地址
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// 预览资源登记表
///
/// 职责：
/// - 为暂存文件创建预览
/// - 释放预览并确认配对
/// - 不认识暂存列表 / 校验规则
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    /// 存活的预览：key -> 文件名
    live: HashMap<String, String>,
    created: usize,
    released: usize,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为文件创建预览
    pub fn create(&mut self, file: &SelectedFile) -> PreviewHandle {
        let key = Uuid::new_v4().to_string();
        let url = format!("blob:preview/{}", key);
        self.live.insert(key.clone(), file.name.clone());
        self.created += 1;
        debug!("创建预览: {} ({})", url, file.name);
        PreviewHandle { key, url }
    }

    /// 释放预览
    ///
    /// # 返回
    /// 句柄不属于本登记表时返回 false
    pub fn release(&mut self, handle: PreviewHandle) -> bool {
        match self.live.remove(&handle.key) {
            Some(name) => {
                self.released += 1;
                debug!("释放预览: {} ({})", handle.url, name);
                true
            }
            None => false,
        }
    }

    pub fn is_live(&self, handle: &PreviewHandle) -> bool {
        self.live.contains_key(&handle.key)
    }

    /// 当前存活的预览数量
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn created_count(&self) -> usize {
        self.created
    }

    pub fn released_count(&self) -> usize {
        self.released
    }
}
