use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Arg, Command};
use inventory::Application;
use inventory_core::{logging::init_logging, AppConfig, LogFormat};
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("inventory")
        .version(env!("CARGO_PKG_VERSION"))
        .about("云资源清单同步与颜色池分配服务")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径，未指定时按默认路径查找"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("日志级别，覆盖配置文件")
                .value_parser(["trace", "debug", "info", "warn", "error"]),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("日志格式，覆盖配置文件")
                .value_parser(["json", "pretty"]),
        )
        .arg(
            Arg::new("account")
                .short('a')
                .long("account")
                .value_name("ACCOUNT_ID")
                .help("要同步的云账户"),
        )
        .arg(
            Arg::new("poll-interval")
                .long("poll-interval")
                .value_name("SECONDS")
                .help("轮询间隔（秒）")
                .value_parser(clap::value_parser!(u64)),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config");
    let mut config = AppConfig::load(config_path.map(String::as_str)).with_context(|| {
        format!(
            "加载配置失败: {}",
            config_path.map(String::as_str).unwrap_or("<默认路径>")
        )
    })?;

    if let Some(level) = matches.get_one::<String>("log-level") {
        config.observability.log_level = level.clone();
    }
    if let Some(format) = matches.get_one::<String>("log-format") {
        config.observability.log_format = format.parse::<LogFormat>()?;
    }
    if let Some(account) = matches.get_one::<String>("account") {
        config.collector.account_id = account.clone();
    }
    if let Some(seconds) = matches.get_one::<u64>("poll-interval") {
        config.sync.poll_interval_seconds = *seconds;
    }
    config.validate().context("命令行参数覆盖后的配置无效")?;

    init_logging(
        &config.observability.log_level,
        config.observability.log_format,
    )?;

    info!("启动清单同步服务");
    info!(
        "账户: {}, 轮询间隔: {}秒",
        config.collector.account_id, config.sync.poll_interval_seconds
    );

    let app = Arc::new(Application::new(config).await?);
    app.run_until(wait_for_shutdown_signal(), Duration::from_secs(30))
        .await?;

    info!("清单同步服务已退出");
    Ok(())
}

/// 等待 Ctrl+C 或 SIGTERM
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("安装Ctrl+C信号处理器失败: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("安装SIGTERM信号处理器失败: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("收到Ctrl+C信号");
        },
        _ = terminate => {
            info!("收到SIGTERM信号");
        },
    }
}
