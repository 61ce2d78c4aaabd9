use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 初始化日志，`RUST_LOG` 优先于 `verbose`
///
/// 重复调用时保留第一次安装的订阅者。
pub fn init(verbose: bool) {
    let default = if verbose {
        "route_pdf=debug,info"
    } else {
        "route_pdf=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init();
}
