//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (扫描目录 / 读取示例 ID，输出结果)
//!     ↓
//! workflow::SubmissionFlow (一次提交：begin → submit → commit / fail → end)
//!     ↓
//! services / store (暂存、选择、结果存储、结果写入)
//!     ↓
//! clients (PredictClient → PredictTransport)
//!     ↓
//! infrastructure (PreviewRegistry)
//! ```

pub mod app;

pub use app::App;
