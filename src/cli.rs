use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use crate::config::Config;

/// X平台机器人账号自动拉黑工具
#[derive(Parser, Debug)]
#[command(name = "x_bot_blocker")]
#[command(version)]
#[command(about = "X平台机器人账号自动拉黑工具", long_about = None)]
pub struct Cli {
    /// 要监控的推文URL
    #[arg(long)]
    pub url: String,

    /// 配置文件路径（.json 或 .toml）
    #[arg(long, default_value = "config.json")]
    pub config: PathBuf,

    /// 启用自动拉黑模式
    #[arg(long)]
    pub auto: bool,

    /// 启用无头模式（不显示浏览器窗口）
    #[arg(long)]
    pub headless: bool,

    /// 检查间隔（秒），0 表示沿用配置文件中的值
    #[arg(long, default_value_t = 5)]
    pub interval: u64,
}

impl Cli {
    /// 把命令行参数覆盖到配置上
    pub fn apply_overrides(&self, config: &mut Config) {
        if self.auto {
            config.auto_mode = true;
            info!("自动拉黑模式已启用");
        }

        if self.headless {
            config.headless = true;
            info!("无头模式已启用");
        }

        if self.interval > 0 {
            config.check_interval = self.interval;
            info!("检查间隔已设置为 {} 秒", self.interval);
        }
    }
}
