//! Chromium 页面 - 基础设施层
//!
//! 持有唯一的浏览器和页面资源，基于 chromiumoxide 实现 [`ReplyPage`]

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::element::Element;
use chromiumoxide::{Browser, Page};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult, BrowserError, PageError};
use crate::infrastructure::reply_page::ReplyPage;
use crate::infrastructure::selectors::{SelectorKey, SelectorTable};

/// 轮询等待元素的间隔
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Chromium 页面
///
/// 职责：
/// - 持有 Browser / Page / 事件处理任务
/// - 按选择器表查找元素
/// - 不认识关键词，不处理流程
pub struct ChromePage {
    browser: Option<Browser>,
    page: Page,
    handler: Option<JoinHandle<()>>,
    selectors: SelectorTable,
}

impl ChromePage {
    /// 创建新的页面封装
    pub fn new(
        browser: Browser,
        page: Page,
        handler: JoinHandle<()>,
        selectors: SelectorTable,
    ) -> Self {
        Self {
            browser: Some(browser),
            page,
            handler: Some(handler),
            selectors,
        }
    }

    /// 轮询直到选择器命中或超时
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> AppResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(PageError::WaitTimeout {
                    selector: selector.to_string(),
                    timeout_secs: timeout.as_secs(),
                }
                .into());
            }
            sleep(WAIT_POLL_INTERVAL).await;
        }
    }

    /// 读取回复内部某个子元素的文本
    async fn child_text(&self, element: &Element, key: SelectorKey) -> AppResult<String> {
        let selector = self.selectors.require(key)?;
        let child = element
            .find_element(selector)
            .await
            .map_err(|e| AppError::element_not_found(selector, e))?;
        let text = child.inner_text().await.map_err(|e| {
            AppError::Page(PageError::TextExtractionFailed {
                selector: selector.to_string(),
                source: Box::new(e),
            })
        })?;
        Ok(text.unwrap_or_default())
    }
}

#[async_trait]
impl ReplyPage for ChromePage {
    type Element = Element;

    async fn navigate(&self, url: &str, timeout: Duration) -> AppResult<()> {
        debug!("导航到: {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| AppError::navigation_failed(url, e))?;
        self.wait_for_selector("body", timeout).await
    }

    async fn wait_for(&self, key: SelectorKey, timeout: Duration) -> AppResult<()> {
        let selector = self.selectors.require(key)?;
        self.wait_for_selector(selector, timeout).await
    }

    async fn find_replies(&self) -> AppResult<Vec<Element>> {
        let selector = self.selectors.require(SelectorKey::Reply)?;
        self.page
            .find_elements(selector)
            .await
            .map_err(|e| AppError::element_not_found(selector, e))
    }

    async fn extract_username(&self, element: &Element) -> AppResult<String> {
        self.child_text(element, SelectorKey::Username).await
    }

    async fn extract_content(&self, element: &Element) -> AppResult<String> {
        self.child_text(element, SelectorKey::Content).await
    }

    async fn click_in(&self, element: &Element, key: SelectorKey) -> AppResult<()> {
        let selector = self.selectors.require(key)?;
        let target = element
            .find_element(selector)
            .await
            .map_err(|e| AppError::element_not_found(selector, e))?;
        target
            .click()
            .await
            .map_err(|e| AppError::click_failed(selector, e))?;
        Ok(())
    }

    async fn click(&self, key: SelectorKey) -> AppResult<()> {
        let selector = self.selectors.require(key)?;
        let target = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| AppError::element_not_found(selector, e))?;
        target
            .click()
            .await
            .map_err(|e| AppError::click_failed(selector, e))?;
        Ok(())
    }

    async fn scroll_by(&self, delta_y: i64) -> AppResult<()> {
        // scrollBy 返回 undefined，不取返回值
        self.page
            .evaluate(format!("window.scrollBy(0, {});", delta_y))
            .await
            .map_err(|e| BrowserError::ScriptExecutionFailed { source: Box::new(e) })?;
        Ok(())
    }

    fn selectors_mut(&mut self) -> &mut SelectorTable {
        &mut self.selectors
    }

    async fn close(&mut self) -> AppResult<()> {
        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };

        let closed = browser.close().await;
        if let Err(e) = browser.wait().await {
            warn!("等待浏览器进程退出失败: {}", e);
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }

        closed.map_err(|e| BrowserError::CloseFailed { source: Box::new(e) })?;
        Ok(())
    }
}
