use anyhow::Result;
/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::BatchSummary;

/// 初始化 tracing 订阅器
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n批量预测日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量图片预测模式");
    info!("🌐 API 地址: {}", config.api_base_url());
    info!(
        "📏 单个文件上限: {} MB，最多 {} 个文件",
        config.max_file_size / (1024 * 1024),
        config.max_file_qty
    );
    info!("{}", "=".repeat(60));
}

/// 记录暂存结果
///
/// # 参数
/// - `total`: 暂存文件总数
/// - `valid`: 通过校验的数量
pub fn log_files_staged(total: usize, valid: usize) {
    info!("✓ 暂存 {} 个文件，其中 {} 个通过校验", total, valid);
    if total > valid {
        info!("💡 未通过校验的 {} 个文件不会上传", total - valid);
    }
}

/// 记录批次开始信息
///
/// # 参数
/// - `kind`: 批次类型（上传 / 示例）
/// - `count`: 本批数量
pub fn log_batch_start(kind: &str, count: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理{}批次，共 {} 项", kind, count);
    info!("{}", "=".repeat(60));
}

/// 记录进度
pub fn log_progress(percent: u8) {
    info!("⏳ 进度: {}%", percent);
}

/// 打印最终统计信息
///
/// # 参数
/// - `written`: 写入的结果图片数量
/// - `skipped`: 处理失败而跳过的数量
/// - `summary`: 后端返回的批次统计
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(
    written: usize,
    skipped: usize,
    summary: Option<&BatchSummary>,
    log_file_path: &str,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 写入结果图片: {}", written);
    info!("❌ 处理失败: {}", skipped);
    if let Some(summary) = summary {
        info!(
            "📋 后端统计: 请求 {} / 成功 {} / 失败 {} / 可用示例 {}",
            count_or_dash(summary.total_requested),
            count_or_dash(summary.processed_successfully),
            count_or_dash(summary.failed),
            count_or_dash(summary.total_available_samples)
        );
        for (key, value) in &summary.extra {
            info!("📋 {}: {}", key, value);
        }
    }
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

fn count_or_dash(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
