//! 结果存储
//!
//! 保存最近一次批次的结果，是展示层唯一的数据来源。
//! 每次 `commit` 整体替换结果，不与上一批合并；`results` 和 `summary`
//! 会持久化到磁盘，`is_loading` 和 `error` 不会。

use crate::error::{StoreError, SubmitError};
use crate::models::{BatchSummary, PredictResponse, ResultEntry};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// 持久化使用的固定键
pub const STORAGE_KEY: &str = "prediction-results";

const STORAGE_VERSION: u32 = 0;

/// 结果状态快照
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsState {
    pub results: Vec<ResultEntry>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub summary: Option<BatchSummary>,
}

/// 持久化内容（只包含结果和统计）
#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedResults {
    #[serde(default)]
    results: Vec<ResultEntry>,
    #[serde(default)]
    summary: Option<BatchSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedFile {
    state: PersistedResults,
    #[serde(default)]
    version: u32,
}

/// 结果存储
pub struct ResultsStore {
    state: ResultsState,
    path: Option<PathBuf>,
    tx: watch::Sender<ResultsState>,
}

impl ResultsStore {
    /// 创建不落盘的存储
    pub fn in_memory() -> Self {
        Self::with_state(ResultsState::default(), None)
    }

    /// 打开存储目录，恢复上次的结果
    ///
    /// 文件不存在或损坏时从空状态开始
    pub fn open(storage_dir: impl AsRef<Path>) -> Self {
        let path = Self::storage_path(storage_dir);

        let persisted = match load(&path) {
            Ok(Some(persisted)) => {
                info!("♻️ 恢复了 {} 条历史结果", persisted.results.len());
                persisted
            }
            Ok(None) => PersistedResults::default(),
            Err(e) => {
                warn!("⚠️ 无法恢复历史结果，使用空状态: {}", e);
                PersistedResults::default()
            }
        };

        let state = ResultsState {
            results: persisted.results,
            summary: persisted.summary,
            ..ResultsState::default()
        };
        Self::with_state(state, Some(path))
    }

    /// 存储文件路径
    pub fn storage_path(storage_dir: impl AsRef<Path>) -> PathBuf {
        storage_dir.as_ref().join(format!("{}.json", STORAGE_KEY))
    }

    fn with_state(state: ResultsState, path: Option<PathBuf>) -> Self {
        let (tx, _) = watch::channel(state.clone());
        Self { state, path, tx }
    }

    /// 当前状态
    pub fn snapshot(&self) -> &ResultsState {
        &self.state
    }

    pub fn results(&self) -> &[ResultEntry] {
        &self.state.results
    }

    pub fn summary(&self) -> Option<&BatchSummary> {
        self.state.summary.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    /// 订阅状态变化，每次修改都会推送新的快照
    pub fn subscribe(&self) -> watch::Receiver<ResultsState> {
        self.tx.subscribe()
    }

    pub fn begin_load(&mut self) {
        self.state.is_loading = true;
        self.state.error = None;
        self.publish();
    }

    /// 提交后端返回的原始响应
    ///
    /// # 返回
    /// 成功时返回结果数量；结构无法识别时清空结果并返回 `MalformedResponse`
    pub fn commit(&mut self, payload: Value) -> Result<usize, SubmitError> {
        match PredictResponse::decode(payload) {
            Ok(response) => Ok(self.apply(response)),
            Err(e) => {
                warn!("⚠️ {}，结果已清空", e);
                self.replace_results(Vec::new(), None);
                Err(e)
            }
        }
    }

    /// 提交已解码的响应，整体替换上一批结果
    pub fn apply(&mut self, response: PredictResponse) -> usize {
        let (results, summary) = response.into_parts();
        let count = results.len();
        self.replace_results(results, summary);
        count
    }

    /// 记录错误，不影响已有结果
    pub fn fail(&mut self, message: impl Into<String>) {
        self.state.error = Some(message.into());
        self.publish();
    }

    pub fn end_load(&mut self) {
        self.state.is_loading = false;
        self.publish();
    }

    /// 清空结果和统计，不影响 `error` / `is_loading`
    pub fn clear(&mut self) {
        self.replace_results(Vec::new(), None);
    }

    /// 把结果和统计写入磁盘
    pub fn persist(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let file = PersistedFile {
            state: PersistedResults {
                results: self.state.results.clone(),
                summary: self.state.summary.clone(),
            },
            version: STORAGE_VERSION,
        };
        let content = serde_json::to_string(&file).map_err(|e| StoreError::Corrupt {
            path: path.display().to_string(),
            source: e,
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::WriteFailed {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        fs::write(path, content).map_err(|e| StoreError::WriteFailed {
            path: path.display().to_string(),
            source: e,
        })?;

        debug!("结果已保存至: {}", path.display());
        Ok(())
    }

    fn replace_results(&mut self, results: Vec<ResultEntry>, summary: Option<BatchSummary>) {
        self.state.results = results;
        self.state.summary = summary;

        if let Err(e) = self.persist() {
            warn!("⚠️ 结果保存失败: {}", e);
        }
        self.publish();
    }

    fn publish(&self) {
        self.tx.send_replace(self.state.clone());
    }
}

fn load(path: &Path) -> Result<Option<PersistedResults>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| StoreError::ReadFailed {
        path: path.display().to_string(),
        source: e,
    })?;
    let file: PersistedFile = serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(Some(file.state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SubmitErrorKind;
    use crate::models::EntryStatus;
    use serde_json::json;

    fn entry(id: u64) -> ResultEntry {
        ResultEntry {
            id,
            original_filename: format!("img_{}.jpg", id),
            processed_filename: format!("img_{}_processed.png", id),
            processed_image: "QUJD".to_string(),
            status: EntryStatus::Success,
        }
    }

    fn summary() -> BatchSummary {
        BatchSummary {
            total_requested: Some(1),
            processed_successfully: Some(1),
            failed: Some(0),
            total_available_samples: Some(50),
            ..BatchSummary::default()
        }
    }

    #[test]
    fn test_commit_array_payload() {
        let mut store = ResultsStore::in_memory();
        let payload = serde_json::to_value(vec![entry(1), entry(2)]).unwrap();

        assert_eq!(store.commit(payload).unwrap(), 2);
        assert_eq!(store.results(), &[entry(1), entry(2)]);
        assert!(store.summary().is_none());
    }

    #[test]
    fn test_commit_envelope_payload() {
        let mut store = ResultsStore::in_memory();
        let payload = json!({ "results": [entry(1)], "summary": summary() });

        store.commit(payload).unwrap();
        assert_eq!(store.results(), &[entry(1)]);
        assert_eq!(store.summary(), Some(&summary()));
    }

    #[test]
    fn test_commit_partial_summary_keeps_results() {
        let mut store = ResultsStore::in_memory();
        let payload = json!({
            "results": [entry(1)],
            "summary": { "total_requested": 1, "processed_successfully": 1, "failed": 0 }
        });

        assert_eq!(store.commit(payload).unwrap(), 1);
        assert_eq!(store.results(), &[entry(1)]);
        let summary = store.summary().unwrap();
        assert_eq!(summary.processed_successfully, Some(1));
        assert_eq!(summary.total_available_samples, None);
    }

    #[test]
    fn test_commit_bad_summary_keeps_results() {
        let mut store = ResultsStore::in_memory();
        let payload = json!({ "results": [entry(1), entry(2)], "summary": [1, 2, 3] });

        assert_eq!(store.commit(payload).unwrap(), 2);
        assert_eq!(store.results().len(), 2);
        assert!(store.summary().is_none());
    }

    #[test]
    fn test_summary_extra_fields_survive_rehydrate() {
        let dir = tempfile::tempdir().unwrap();
        let raw_summary = json!({
            "total_requested": 2,
            "processed_successfully": 2,
            "failed": 0,
            "elapsed_ms": 830,
            "model": "unet-v2"
        });
        {
            let mut store = ResultsStore::open(dir.path());
            store
                .commit(json!({ "results": [entry(1), entry(2)], "summary": raw_summary.clone() }))
                .unwrap();
            assert_eq!(store.summary().unwrap().extra.get("elapsed_ms"), Some(&json!(830)));
        }

        let store = ResultsStore::open(dir.path());
        assert_eq!(store.results().len(), 2);
        let persisted: Value =
            serde_json::from_str(&fs::read_to_string(ResultsStore::storage_path(dir.path())).unwrap())
                .unwrap();
        assert_eq!(persisted["state"]["summary"], raw_summary);
        assert_eq!(serde_json::to_value(store.summary().unwrap()).unwrap(), raw_summary);
    }

    #[test]
    fn test_commit_unknown_shape_resets_results() {
        let mut store = ResultsStore::in_memory();
        store.commit(json!({ "results": [entry(9)], "summary": summary() })).unwrap();

        let err = store.commit(json!({ "unexpected": true })).unwrap_err();
        assert_eq!(err.kind(), SubmitErrorKind::MalformedResponse);
        assert!(store.results().is_empty());
        assert!(store.summary().is_none());
    }

    #[test]
    fn test_commit_replaces_instead_of_appending() {
        let mut store = ResultsStore::in_memory();
        store.commit(json!({ "results": [entry(1), entry(2)], "summary": summary() })).unwrap();
        store.commit(serde_json::to_value(vec![entry(3)]).unwrap()).unwrap();

        assert_eq!(store.results(), &[entry(3)]);
        assert!(store.summary().is_none());
    }

    #[test]
    fn test_commit_leaves_loading_flag() {
        let mut store = ResultsStore::in_memory();
        store.begin_load();
        store.commit(json!([])).unwrap();
        assert!(store.is_loading());
        store.end_load();
        assert!(!store.is_loading());
    }

    #[test]
    fn test_fail_keeps_results_and_begin_load_resets_error() {
        let mut store = ResultsStore::in_memory();
        store.apply(PredictResponse::Results(vec![entry(1)]));

        store.fail("网络错误");
        assert_eq!(store.error(), Some("网络错误"));
        assert_eq!(store.results(), &[entry(1)]);

        store.begin_load();
        assert!(store.is_loading());
        assert!(store.error().is_none());
    }

    #[test]
    fn test_clear_leaves_error_and_loading() {
        let mut store = ResultsStore::in_memory();
        store.apply(PredictResponse::Envelope {
            results: vec![entry(1)],
            summary: Some(summary()),
        });
        store.begin_load();
        store.fail("boom");

        store.clear();
        assert!(store.results().is_empty());
        assert!(store.summary().is_none());
        assert_eq!(store.error(), Some("boom"));
        assert!(store.is_loading());
    }

    #[test]
    fn test_rehydrate_only_results_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = ResultsStore::open(dir.path());
            store.apply(PredictResponse::Envelope {
                results: vec![entry(1), entry(2)],
                summary: Some(summary()),
            });
            store.begin_load();
            store.fail("not persisted");
        }

        let store = ResultsStore::open(dir.path());
        assert_eq!(store.results(), &[entry(1), entry(2)]);
        assert_eq!(store.summary(), Some(&summary()));
        assert!(!store.is_loading());
        assert!(store.error().is_none());

        let raw: Value =
            serde_json::from_str(&fs::read_to_string(ResultsStore::storage_path(dir.path())).unwrap())
                .unwrap();
        assert_eq!(raw["version"], json!(0));
        assert!(raw["state"].get("is_loading").is_none());
        assert!(raw["state"].get("error").is_none());
    }

    #[test]
    fn test_corrupt_storage_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(ResultsStore::storage_path(dir.path()), "{ not json").unwrap();

        let store = ResultsStore::open(dir.path());
        assert!(store.results().is_empty());
        assert!(store.summary().is_none());
    }

    #[test]
    fn test_clear_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ResultsStore::open(dir.path());
        store.apply(PredictResponse::Results(vec![entry(1)]));
        store.clear();

        let reopened = ResultsStore::open(dir.path());
        assert!(reopened.results().is_empty());
    }

    #[test]
    fn test_subscribers_see_every_change() {
        let mut store = ResultsStore::in_memory();
        let mut rx = store.subscribe();

        store.begin_load();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_loading);

        store.apply(PredictResponse::Results(vec![entry(5)]));
        assert_eq!(rx.borrow_and_update().results, vec![entry(5)]);

        store.end_load();
        let latest = rx.borrow_and_update().clone();
        assert_eq!(&latest, store.snapshot());
    }
}
