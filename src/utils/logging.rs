/// 日志工具模块
///
/// 提供批处理日志格式化和输出的辅助函数
use tracing::{error, info};

use crate::orchestrator::{BatchSummary, Mode};
use crate::workflow::{RouteCtx, RouteSuccess};

/// 记录批处理开始信息
///
/// # 参数
/// - `mode`: 运行模式
/// - `total`: 路由总数
/// - `concurrency`: 同时打开的页面数
/// - `base_url`: 页面的基础 URL
pub fn log_batch_start(mode: Mode, total: usize, concurrency: usize, base_url: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 开始生成 PDF - {}", mode);
    info!("🌐 基础 URL: {}", base_url);
    info!("📄 路由数量: {}", total);
    if concurrency > 1 {
        info!("📊 最大并发页面数: {}", concurrency);
    }
    info!("{}", "=".repeat(60));
}

pub fn log_route_attempt(ctx: &RouteCtx) {
    info!("{} ↻ 正在生成...", ctx);
}

pub fn log_route_success(ctx: &RouteCtx, success: &RouteSuccess) {
    info!(
        "{} ✔ \"{}\" -> {}",
        ctx,
        truncate_text(&success.title, 60),
        success.output_path.display()
    );
}

pub fn log_route_failure(ctx: &RouteCtx, message: &str) {
    error!("{} ✘ {}", ctx, message);
}

/// 打印最终统计信息
pub fn print_final_stats(summary: &BatchSummary) {
    info!("\n{}", "=".repeat(60));
    info!("📊 PDF 生成完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", summary.succeeded(), summary.attempted());
    info!("❌ 失败: {}", summary.failed());
    for outcome in summary.outcomes.iter().filter(|o| o.result.is_err()) {
        if let Err(message) = &outcome.result {
            info!("   - {} {}", outcome.route_path, truncate_text(message, 120));
        }
    }
    info!("{}", "=".repeat(60));
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("关于我们", 2), "关于...");
        assert_eq!(truncate_text("About", 10), "About");
    }
}
