//! 测试用的内存页面和启动器

#![allow(dead_code)]

use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::layer::SubscriberExt;
use x_bot_blocker::error::{BrowserError, PageError};
use x_bot_blocker::utils::logging::FileLogLayer;
use x_bot_blocker::{
    AppError, AppResult, BlockService, BrowserLauncher, Config, MonitorSession, ReplyPage,
    SelectorKey, SelectorTable, StopHandle,
};

#[derive(Debug, Clone)]
pub struct FakeReply {
    pub username: String,
    pub content: String,
    pub unreadable: bool,
}

impl FakeReply {
    pub fn new(username: &str, content: &str) -> Self {
        Self {
            username: username.to_string(),
            content: content.to_string(),
            unreadable: false,
        }
    }

    pub fn unreadable(mut self) -> Self {
        self.unreadable = true;
        self
    }
}

/// 每次 `find_replies` 都生成新句柄，模拟页面重新渲染
#[derive(Debug)]
pub struct FakeElement {
    pub index: usize,
}

#[derive(Default)]
pub struct PageState {
    pub replies: Vec<FakeReply>,
    pub container_missing: bool,
    pub fail_navigation: bool,
    pub failing_step: Option<SelectorKey>,
    pub navigations: Vec<String>,
    pub clicks: Vec<SelectorKey>,
    pub scrolls: Vec<i64>,
    pub close_calls: usize,
    pub stop_after_scrolls: Option<(usize, StopHandle)>,
}

pub type SharedState = Arc<Mutex<PageState>>;

pub fn shared_state(replies: Vec<FakeReply>) -> SharedState {
    Arc::new(Mutex::new(PageState {
        replies,
        ..Default::default()
    }))
}

pub struct FakePage {
    state: SharedState,
    selectors: SelectorTable,
}

impl FakePage {
    fn step(&self, key: SelectorKey) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.failing_step == Some(key) {
            return Err(AppError::element_not_found(
                key.name(),
                io::Error::new(io::ErrorKind::NotFound, "no such node"),
            ));
        }
        state.clicks.push(key);
        Ok(())
    }

    fn reply(&self, element: &FakeElement) -> AppResult<FakeReply> {
        let state = self.state.lock().unwrap();
        let reply = state.replies[element.index].clone();
        if reply.unreadable {
            return Err(PageError::TextExtractionFailed {
                selector: "username".to_string(),
                source: "detached node".into(),
            }
            .into());
        }
        Ok(reply)
    }
}

#[async_trait]
impl ReplyPage for FakePage {
    type Element = FakeElement;

    async fn navigate(&self, url: &str, _timeout: Duration) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_navigation {
            return Err(AppError::navigation_failed(
                url,
                io::Error::new(io::ErrorKind::ConnectionRefused, "net::ERR_CONNECTION_REFUSED"),
            ));
        }
        state.navigations.push(url.to_string());
        Ok(())
    }

    async fn wait_for(&self, key: SelectorKey, timeout: Duration) -> AppResult<()> {
        let state = self.state.lock().unwrap();
        if key == SelectorKey::RepliesContainer && state.container_missing {
            return Err(PageError::WaitTimeout {
                selector: key.name().to_string(),
                timeout_secs: timeout.as_secs(),
            }
            .into());
        }
        Ok(())
    }

    async fn find_replies(&self) -> AppResult<Vec<FakeElement>> {
        let state = self.state.lock().unwrap();
        Ok((0..state.replies.len())
            .map(|index| FakeElement { index })
            .collect())
    }

    async fn extract_username(&self, element: &FakeElement) -> AppResult<String> {
        Ok(self.reply(element)?.username)
    }

    async fn extract_content(&self, element: &FakeElement) -> AppResult<String> {
        Ok(self.reply(element)?.content)
    }

    async fn click_in(&self, _element: &FakeElement, key: SelectorKey) -> AppResult<()> {
        self.step(key)
    }

    async fn click(&self, key: SelectorKey) -> AppResult<()> {
        self.step(key)
    }

    async fn scroll_by(&self, delta_y: i64) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        state.scrolls.push(delta_y);
        if let Some((limit, handle)) = &state.stop_after_scrolls {
            if state.scrolls.len() >= *limit {
                handle.stop();
            }
        }
        Ok(())
    }

    fn selectors_mut(&mut self) -> &mut SelectorTable {
        &mut self.selectors
    }

    async fn close(&mut self) -> AppResult<()> {
        self.state.lock().unwrap().close_calls += 1;
        Ok(())
    }
}

pub struct FakeLauncher {
    pub state: SharedState,
    pub fail: bool,
}

impl FakeLauncher {
    pub fn new(state: SharedState) -> Self {
        Self { state, fail: false }
    }

    pub fn failing(state: SharedState) -> Self {
        Self { state, fail: true }
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    type Page = FakePage;

    async fn launch(&self, config: &Config) -> AppResult<FakePage> {
        if self.fail {
            return Err(BrowserError::LaunchFailed {
                source: "chrome executable not found".into(),
            }
            .into());
        }
        Ok(FakePage {
            state: self.state.clone(),
            selectors: SelectorTable::with_overrides(&config.selectors),
        })
    }
}

/// 零停顿的会话，检查间隔为 0
pub fn session(config: Config, state: &SharedState) -> MonitorSession<FakeLauncher> {
    let config = Config {
        check_interval: 0,
        save_log: false,
        ..config
    };
    MonitorSession::new(config, FakeLauncher::new(state.clone()))
        .with_block_service(BlockService::with_pauses(Duration::ZERO, Duration::ZERO))
}

pub fn keywords(words: &[&str]) -> std::collections::BTreeSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// 把当前线程的日志写入文件，守卫释放前有效
pub fn capture_logs(path: &Path) -> DefaultGuard {
    let subscriber = tracing_subscriber::registry().with(FileLogLayer::new(path));
    tracing::subscriber::set_default(subscriber)
}
