use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use route_pdf::config::{ModuleOptions, PdfOptions};
use route_pdf::logger;
use route_pdf::orchestrator::{LifecycleEvent, Mode, PdfModule};

/// 把站点路由渲染成 PDF
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// 模块配置文件 (TOML)，不存在时使用默认配置
    #[arg(short = 'C', long, env = "ROUTE_PDF_CONFIG", default_value = "route-pdf.toml")]
    config: PathBuf,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 使用正在运行的开发服务器生成 PDF，写入 `dir`
    Dev {
        /// 开发服务器地址
        #[arg(short, long, env = "ROUTE_PDF_URL")]
        url: String,
    },

    /// 对静态导出目录生成 PDF，写入导出目录
    Export {
        /// 静态导出目录，覆盖配置中的 exportDir
        #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
        dist: Option<PathBuf>,

        /// 临时服务器无法启动时使用的地址
        #[arg(short, long, env = "ROUTE_PDF_URL")]
        url: Option<String>,
    },
}

fn load_options(cli: &Cli) -> Result<PdfOptions> {
    let module = if cli.config.is_file() {
        info!("📁 读取配置: {}", cli.config.display());
        ModuleOptions::load(&cli.config)?
    } else {
        ModuleOptions::default()
    };
    let mut host = ModuleOptions::from_env()?;
    if let Commands::Export { dist: Some(dist), .. } = &cli.command {
        host.export_dir = Some(dist.clone());
    }
    Ok(PdfOptions::resolve(module, host))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    logger::init(cli.verbose);

    let options = load_options(&cli).context("加载配置失败")?;

    let (mode, listen_url, trigger) = match &cli.command {
        Commands::Dev { url } => (
            Mode::Dev,
            Some(url.clone()),
            LifecycleEvent::BuildCompiled {
                name: "server".to_string(),
            },
        ),
        Commands::Export { url, .. } => (Mode::Export, url.clone(), LifecycleEvent::GenerateDone),
    };

    let mut module = PdfModule::new(options, mode)?;
    if let Some(url) = listen_url {
        module.handle(LifecycleEvent::Listen { url }).await?;
    }

    match module.handle(trigger).await {
        Ok(Some(summary)) => {
            info!(
                "✓ 批处理完成: 成功 {}/{}",
                summary.succeeded(),
                summary.attempted()
            );
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(e) => {
            error!("❌ 批处理中止: {}", e);
            Err(e.into())
        }
    }
}
