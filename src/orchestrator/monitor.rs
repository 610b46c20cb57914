//! 监控会话 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个监控流程的入口，负责浏览器资源和轮询循环。
//!
//! ## 状态机
//!
//! ```text
//! Idle ──start──▶ Running ──stop / StopHandle──▶ Stopped
//!                    ▲                              │
//!                    └────────────start─────────────┘
//! ```
//!
//! - 停止请求在每轮扫描边界和间隔等待期间检查，不会打断进行中的浏览器调用
//! - 启动前发出的停止请求在进入循环后立即生效
//! - `close` 与状态无关，重复调用无副作用

use std::path::Path;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::browser::BrowserLauncher;
use crate::config::{Config, Keywords};
use crate::error::{AppResult, BrowserError};
use crate::infrastructure::{ReplyPage, SelectorTable};
use crate::services::BlockService;
use crate::utils::logging::{CONSOLE, SUCCESS};
use crate::workflow::{ReplyScanner, ScanReport};

/// 每轮扫描后向下滚动的距离（像素）
const SCROLL_STEP: i64 = 500;

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Stopped,
}

/// 停止监控的句柄，可在其他任务中使用（例如 Ctrl+C 监听）
#[derive(Debug, Clone)]
pub struct StopHandle(CancellationToken);

impl StopHandle {
    /// 请求停止，下一个检查点生效
    pub fn stop(&self) {
        self.0.cancel();
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.is_cancelled()
    }
}

/// 监控会话
pub struct MonitorSession<L: BrowserLauncher> {
    config: Config,
    launcher: L,
    page: Option<L::Page>,
    scanner: ReplyScanner,
    blocker: BlockService,
    state: SessionState,
    cancel: CancellationToken,
}

impl<L: BrowserLauncher> MonitorSession<L> {
    /// 创建会话，此时不启动浏览器
    pub fn new(config: Config, launcher: L) -> Self {
        info!("X 机器人拦截器已初始化");
        Self {
            config,
            launcher,
            page: None,
            scanner: ReplyScanner::new(),
            blocker: BlockService::new(),
            state: SessionState::Idle,
            cancel: CancellationToken::new(),
        }
    }

    /// 替换拉黑服务（例如调整点击间的停顿）
    pub fn with_block_service(mut self, blocker: BlockService) -> Self {
        self.blocker = blocker;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// 本次会话已拉黑的数量
    pub fn blocked_count(&self) -> usize {
        self.blocker.blocked_count()
    }

    /// 已处理过的回复数
    pub fn seen_count(&self) -> usize {
        self.scanner.seen_count()
    }

    pub fn is_browser_open(&self) -> bool {
        self.page.is_some()
    }

    /// 获取停止句柄，作用于当前或下一轮监控
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(self.cancel.clone())
    }

    /// 添加关键词，见 [`Config::add_keywords`]
    pub fn add_keywords(&mut self, kind: &str, keywords: impl Into<Keywords>) -> usize {
        self.config.add_keywords(kind, keywords)
    }

    /// 移除关键词，见 [`Config::remove_keywords`]
    pub fn remove_keywords(&mut self, kind: &str, keywords: impl Into<Keywords>) -> usize {
        self.config.remove_keywords(kind, keywords)
    }

    /// 切换自动拉黑模式
    pub fn toggle_auto_mode(&mut self) -> bool {
        self.config.toggle_auto_mode()
    }

    /// 更新选择器
    ///
    /// 同时写入配置，浏览器重新启动后仍然生效
    pub fn update_selector(&mut self, name: &str, selector: &str) -> bool {
        let updated = match self.page.as_mut() {
            Some(page) => page.selectors_mut().update(name, selector),
            None => SelectorTable::default().update(name, selector),
        };
        if updated {
            self.config
                .selectors
                .insert(name.to_string(), selector.to_string());
        } else {
            warn!("⚠️ 未知的选择器名称: {}", name);
        }
        updated
    }

    /// 保存当前配置
    pub fn save_config(&self, path: impl AsRef<Path>) -> bool {
        self.config.save(path)
    }

    /// 显示当前配置
    pub fn show_config(&self) {
        info!(target: CONSOLE, "===== X Bot Blocker 配置 =====");
        for line in self.config.summary_lines() {
            info!(target: CONSOLE, "{}", line);
        }
        info!(target: CONSOLE, "已拉黑数量: {}", self.blocked_count());
        info!(target: CONSOLE, "=============================");
    }

    /// 初始化浏览器，已初始化时直接返回
    pub async fn initialize_browser(&mut self) -> AppResult<()> {
        if self.page.is_some() {
            info!("浏览器已经初始化");
            return Ok(());
        }

        match self.launcher.launch(&self.config).await {
            Ok(page) => {
                self.page = Some(page);
                Ok(())
            }
            Err(e) => {
                error!("❌ 浏览器初始化失败: {}", e);
                Err(e)
            }
        }
    }

    /// 导航到指定 URL
    ///
    /// # 返回
    /// 返回是否成功导航
    pub async fn navigate(&self, url: &str) -> bool {
        let Some(page) = self.page.as_ref() else {
            error!("❌ 导航到 {} 失败: {}", url, BrowserError::NotInitialized);
            return false;
        };

        info!("正在导航到 {}", url);
        match page.navigate(url, self.config.timeout_duration()).await {
            Ok(()) => {
                info!(target: SUCCESS, "✅ 已加载页面 {}", url);
                true
            }
            Err(e) => {
                error!("❌ 导航到 {} 失败: {}", url, e);
                false
            }
        }
    }

    /// 启动监控
    ///
    /// 浏览器启动失败时返回错误；导航失败只记录日志并返回，不进入循环。
    /// 正常情况下一直运行到收到停止请求
    pub async fn start(&mut self, url: Option<&str>) -> AppResult<()> {
        if self.state == SessionState::Running {
            info!("监控已经在运行中");
            return Ok(());
        }

        self.initialize_browser().await?;

        if let Some(url) = url {
            if !self.navigate(url).await {
                return Ok(());
            }
        }

        self.state = SessionState::Running;
        info!(target: SUCCESS, "✅ 开始监控回复...");
        self.run_loop().await;
        Ok(())
    }

    /// 单轮扫描：扫描回复并滚动页面，不包含间隔等待
    ///
    /// 供外部调度器直接驱动
    pub async fn tick(&mut self) -> AppResult<ScanReport> {
        let page = self.page.as_ref().ok_or(BrowserError::NotInitialized)?;

        let report = self
            .scanner
            .scan(page, &self.config, &mut self.blocker)
            .await;

        // 滚动页面以加载更多回复
        match page.scroll_by(SCROLL_STEP).await {
            Ok(()) => debug!("页面已滚动，加载更多回复"),
            Err(e) => error!("❌ 滚动页面失败: {}", e),
        }

        report
    }

    async fn run_loop(&mut self) {
        let cancel = self.cancel.clone();

        while !cancel.is_cancelled() {
            match self.tick().await {
                Ok(report) => debug!(
                    "本轮: 共 {} 条回复, 新增 {} 条, 可疑 {} 条",
                    report.total,
                    report.new_replies(),
                    report.suspicious()
                ),
                Err(e) if e.is_wait_timeout() => warn!("⚠️ 等待回复加载超时"),
                Err(e) => error!("❌ 监控过程中出错: {}", e),
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = sleep(self.config.check_interval_duration()) => {}
            }
        }

        self.finish();
    }

    /// 停止监控
    pub fn stop(&mut self) {
        if self.state != SessionState::Running {
            info!("监控未在运行");
            return;
        }
        self.cancel.cancel();
        self.finish();
    }

    fn finish(&mut self) {
        if self.state == SessionState::Running {
            self.state = SessionState::Stopped;
            // 已触发的令牌不能复用，之后获取的句柄作用于下一轮
            self.cancel = CancellationToken::new();
            info!(target: SUCCESS, "✅ 停止监控。共拉黑 {} 个账号", self.blocked_count());
        }
    }

    /// 关闭浏览器并清理资源，与会话状态无关
    pub async fn close(&mut self) {
        if let Some(mut page) = self.page.take() {
            match page.close().await {
                Ok(()) => info!(target: SUCCESS, "✅ 已关闭浏览器"),
                Err(e) => error!("❌ 关闭浏览器时出错: {}", e),
            }
        }
    }
}
