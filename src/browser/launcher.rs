use std::path::PathBuf;

use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{AppResult, BrowserError};
use crate::infrastructure::{ChromePage, ReplyPage, SelectorTable};
use crate::utils::logging::SUCCESS;

/// 浏览器窗口尺寸
const WINDOW_SIZE: (u32, u32) = (1280, 800);

/// 浏览器启动器
///
/// 监控会话在第一次 `start` 时调用，失败即终止会话
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Page: ReplyPage;

    /// 启动浏览器并返回一个空白页面
    async fn launch(&self, config: &Config) -> AppResult<Self::Page>;
}

/// 启动本地 Chromium
#[derive(Debug, Clone, Default)]
pub struct ChromeLauncher {
    executable: Option<PathBuf>,
}

impl ChromeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定浏览器可执行文件，不指定时由 chromiumoxide 自动查找
    pub fn with_executable(path: impl Into<PathBuf>) -> Self {
        Self {
            executable: Some(path.into()),
        }
    }

    fn browser_config(&self, headless: bool) -> AppResult<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .window_size(WINDOW_SIZE.0, WINDOW_SIZE.1)
            .args(vec![
                "--disable-gpu",
                "--no-sandbox",
                "--disable-dev-shm-usage",
                "--disable-extensions",
            ]);
        builder = if headless {
            builder.new_headless_mode()
        } else {
            builder.with_head()
        };
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(|message| {
            error!("配置浏览器失败: {}", message);
            BrowserError::ConfigurationFailed { message }.into()
        })
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    type Page = ChromePage;

    async fn launch(&self, config: &Config) -> AppResult<ChromePage> {
        info!("🚀 正在初始化浏览器...");
        debug!("无头模式: {}", config.headless);

        let browser_config = self.browser_config(config.headless)?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            error!("启动浏览器失败: {}", e);
            BrowserError::LaunchFailed { source: Box::new(e) }
        })?;
        debug!("浏览器启动成功");

        // 在后台处理浏览器事件
        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        // 添加短暂延迟以等待浏览器状态同步
        sleep(Duration::from_millis(300)).await;

        let page = browser.new_page("about:blank").await.map_err(|e| {
            error!("创建页面失败: {}", e);
            BrowserError::PageCreationFailed { source: Box::new(e) }
        })?;

        info!(target: SUCCESS, "✅ 浏览器初始化成功");
        Ok(ChromePage::new(
            browser,
            page,
            handler_task,
            SelectorTable::with_overrides(&config.selectors),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_config_builds_in_both_modes() {
        let launcher = ChromeLauncher::with_executable("/usr/bin/chromium");
        assert!(launcher.browser_config(true).is_ok());
        assert!(launcher.browser_config(false).is_ok());
    }

    #[tokio::test]
    #[ignore] // 需要本机安装 Chromium：cargo test -- --ignored
    async fn test_launch_and_close() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config {
            headless: true,
            ..Config::default()
        };
        let mut page = ChromeLauncher::new()
            .launch(&config)
            .await
            .expect("启动浏览器失败");
        page.close().await.expect("关闭浏览器失败");
        page.close().await.expect("重复关闭应无副作用");
    }
}
