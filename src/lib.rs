//! # Predict Batch Submit
//!
//! 一个用于批量提交图片到预测服务的 Rust 客户端
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源，只暴露能力
//! - `PreviewRegistry` - 预览资源的唯一持有者，保证创建和释放配对
//!
//! ### ② 业务能力层（Services / Clients / Store）
//! - `FileStaging` - 校验并暂存用户选择的文件
//! - `SampleSelection` - 示例图片选择
//! - `PredictClient` - 打包批次、提交、解码响应
//! - `ResultsStore` - 最近一批结果的唯一来源，可订阅、可持久化
//! - `ResultWriter` - 把结果图片写到磁盘
//!
//! ### ③ 流程层（Workflow）
//! - `SubmissionFlow` - 一次提交的完整流程（begin → submit → commit / fail → end）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator::App` - 扫描目录、驱动流程、输出结果
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod store;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{HttpTransport, PredictClient, PredictTransport};
pub use config::Config;
pub use error::{AppError, AppResult, SubmitError, SubmitErrorKind};
pub use models::{BatchSummary, EntryStatus, PredictResponse, ResultEntry, SelectedFile};
pub use orchestrator::App;
pub use services::{FileStaging, SampleSelection, StageError, StagedFile};
pub use store::{ResultsState, ResultsStore};
pub use workflow::{SubmissionFlow, SubmitOutcome};
