//! 页面能力接口
//!
//! 监控流程只通过这个接口接触浏览器：
//! 真实实现见 [`ChromePage`](super::ChromePage)，测试中可以换成内存实现。

use std::time::Duration;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::infrastructure::selectors::{SelectorKey, SelectorTable};

/// 回复页面
///
/// 职责：
/// - 持有唯一的页面资源
/// - 暴露查找、读取、点击、滚动能力
/// - 不认识关键词，不处理拉黑流程
#[async_trait]
pub trait ReplyPage: Send + Sync {
    /// 单条回复的元素句柄
    type Element: Send + Sync;

    /// 导航到 URL 并等待页面就绪
    async fn navigate(&self, url: &str, timeout: Duration) -> AppResult<()>;

    /// 等待指定元素出现，超时返回 `PageError::WaitTimeout`
    async fn wait_for(&self, key: SelectorKey, timeout: Duration) -> AppResult<()>;

    /// 当前页面上所有回复元素
    async fn find_replies(&self) -> AppResult<Vec<Self::Element>>;

    /// 回复的作者名
    async fn extract_username(&self, element: &Self::Element) -> AppResult<String>;

    /// 回复的正文
    async fn extract_content(&self, element: &Self::Element) -> AppResult<String>;

    /// 点击回复内部的控件
    async fn click_in(&self, element: &Self::Element, key: SelectorKey) -> AppResult<()>;

    /// 点击页面级控件（菜单项、确认框等）
    async fn click(&self, key: SelectorKey) -> AppResult<()>;

    /// 纵向滚动页面
    async fn scroll_by(&self, delta_y: i64) -> AppResult<()>;

    /// 运行时修改选择器
    fn selectors_mut(&mut self) -> &mut SelectorTable;

    /// 关闭浏览器，重复调用无副作用
    async fn close(&mut self) -> AppResult<()>;
}
