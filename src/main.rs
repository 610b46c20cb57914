use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use x_bot_blocker::config::{self, Config};
use x_bot_blocker::utils::logging::{self, LogSettings, CONSOLE};
use x_bot_blocker::{ChromeLauncher, Cli, MonitorSession};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置（日志初始化之后再报告结果）
    let mut config = Config::default();
    let load_result = config.try_load(&cli.config);

    // 初始化日志
    logging::init(&LogSettings::from(&config))?;
    logging::log_banner();
    config::report_load(&cli.config, &load_result);

    // 根据命令行参数更新配置
    cli.apply_overrides(&mut config);

    let mut session = MonitorSession::new(config, ChromeLauncher::new());
    session.show_config();

    // Ctrl+C 只发出停止请求，收尾统一在下面完成
    let stop = session.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!(target: CONSOLE, "用户中断，正在停止...");
            stop.stop();
        }
    });

    info!(target: CONSOLE, "按 Ctrl+C 可以停止监控");
    info!(target: CONSOLE, "正在启动监控...");

    if let Err(e) = session.start(Some(&cli.url)).await {
        error!("❌ 发生错误: {}", e);
    }

    // 停止监控并关闭浏览器
    session.stop();
    session.close().await;

    // 保存配置
    session.save_config(&cli.config);
    info!(target: CONSOLE, "已保存配置并退出");

    Ok(())
}
