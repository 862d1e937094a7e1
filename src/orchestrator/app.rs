//! 批量提交应用 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，扮演展示层：把目录中的图片（或配置中的示例 ID）
//! 交给提交流程，再把结果存储中的图片写到输出目录。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：写日志头、创建网络层、恢复历史结果
//! 2. **文件暂存**：扫描上传目录，按上限暂存并校验
//! 3. **批次提交**：委托 `SubmissionFlow`，一次只提交一个批次
//! 4. **结果输出**：解码结果图片并输出统计

use crate::clients::{HttpTransport, PredictClient};
use crate::config::Config;
use crate::error::{AppResult, SubmitErrorKind};
use crate::models::{list_files, load_sample_catalog_or_empty, SampleCatalog, SelectedFile};
use crate::services::{FileStaging, ResultWriter, SampleSelection};
use crate::store::ResultsStore;
use crate::utils::logging;
use crate::workflow::{SubmissionFlow, SubmitOutcome};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    flow: SubmissionFlow<HttpTransport>,
    store: ResultsStore,
    writer: ResultWriter,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::init_log_file(&config.output_log_file)
            .with_context(|| format!("无法写入日志文件: {}", config.output_log_file))?;

        logging::log_startup(&config);

        let transport = HttpTransport::new(&config).context("无法创建 HTTP 客户端")?;
        let flow = SubmissionFlow::new(PredictClient::new(transport));
        let store = ResultsStore::open(&config.storage_dir);
        let writer = ResultWriter::new(&config.output_folder);

        Ok(Self {
            config,
            flow,
            store,
            writer,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&mut self) -> Result<()> {
        let outcome = match self.config.parsed_sample_ids()? {
            Some(ids) => self.analyze_samples(ids).await?,
            None => self.upload_folder().await?,
        };

        if let Some(SubmitOutcome::Completed { .. }) = outcome {
            self.write_results().await?;
        }

        Ok(())
    }

    /// 上传目录中的图片
    async fn upload_folder(&mut self) -> Result<Option<SubmitOutcome>> {
        info!("\n📁 正在扫描待上传的图片...");
        let mut staging = self.stage_folder().await?;

        if staging.is_empty() {
            warn!("⚠️ 没有找到待上传的文件，程序结束");
            return Ok(None);
        }

        logging::log_files_staged(staging.len(), staging.valid_files().len());
        logging::log_batch_start("上传", staging.valid_files().len());

        let result = self
            .flow
            .upload_staged(&mut staging, &mut self.store, logging::log_progress)
            .await;

        match result {
            Ok(outcome) => Ok(Some(outcome)),
            Err(e) if e.kind() == SubmitErrorKind::Validation => {
                warn!("⚠️ {}", e.user_message());
                Ok(None)
            }
            Err(e) => Err(e).context("上传失败"),
        }
    }

    /// 分析示例图片
    async fn analyze_samples(&mut self, ids: Vec<u32>) -> Result<Option<SubmitOutcome>> {
        let catalog = load_sample_catalog_or_empty(Path::new(&self.config.sample_catalog)).await?;
        for id in unknown_sample_ids(&catalog, &ids) {
            warn!("⚠️ 示例 {} 不在目录中，仍会提交给后端", id);
        }

        let mut selection: SampleSelection = ids.into_iter().collect();
        logging::log_batch_start("示例", selection.len());

        let result = self
            .flow
            .analyze_samples(&mut selection, &mut self.store, logging::log_progress)
            .await;

        match result {
            Ok(outcome) => Ok(Some(outcome)),
            Err(e) if e.kind() == SubmitErrorKind::Validation => {
                warn!("⚠️ {}", e.user_message());
                Ok(None)
            }
            Err(e) => Err(e).context("示例分析失败"),
        }
    }

    /// 扫描上传目录并暂存文件
    ///
    /// 超过上限的文件不会被读取；超过大小或不是图片的文件只读取元数据
    async fn stage_folder(&self) -> AppResult<FileStaging> {
        let mut staging = FileStaging::with_limits(self.config.max_file_size, self.config.max_file_qty);
        let paths = list_files(&self.config.upload_folder).await?;

        if paths.len() > staging.remaining_capacity() {
            warn!(
                "⚠️ 共 {} 个文件，超过上限 {}，多余的文件将被忽略",
                paths.len(),
                self.config.max_file_qty
            );
        }

        for path in paths {
            if staging.is_full() {
                break;
            }
            match SelectedFile::from_path_with_limit(&path, self.config.max_file_size).await {
                Ok(file) => {
                    staging.add(std::iter::once(file));
                }
                Err(e) => warn!("⚠️ {}", e),
            }
        }

        Ok(staging)
    }

    /// 把结果图片写入输出目录
    async fn write_results(&self) -> Result<()> {
        let report = self.writer.write_all(self.store.results()).await?;

        for entry in self.store.results() {
            info!(
                "🖼️ {} -> {} ({})",
                entry.original_filename,
                entry.processed_filename,
                logging::truncate_text(&entry.data_url(), 48)
            );
        }

        logging::print_final_stats(
            report.written.len(),
            report.skipped + report.failed,
            self.store.summary(),
            &self.config.output_log_file,
        );
        info!("📂 结果图片目录: {}", self.writer.output_dir().display());

        Ok(())
    }
}

/// 不在示例目录中的 ID；目录为空时不做判断
fn unknown_sample_ids(catalog: &SampleCatalog, ids: &[u32]) -> Vec<u32> {
    if catalog.is_empty() {
        return Vec::new();
    }
    ids.iter().copied().filter(|id| !catalog.contains(*id)).collect()
}
