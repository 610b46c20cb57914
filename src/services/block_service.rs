//! 拉黑服务 - 业务能力层
//!
//! 只负责"通过页面菜单拉黑一个账号"能力，不关心何时该拉黑

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::AppResult;
use crate::infrastructure::{ReplyPage, SelectorKey};
use crate::utils::logging::SUCCESS;

/// 拉黑服务
///
/// 职责：
/// - 依次点击 更多 → 拉黑 → 确认
/// - 任一步失败即放弃，不重试
/// - 只在完整成功时累加计数
pub struct BlockService {
    /// 每一步点击之间的停顿，等待菜单弹出
    step_pause: Duration,
    /// 确认后等待页面完成拉黑
    settle_pause: Duration,
    blocked_count: usize,
}

impl BlockService {
    /// 创建新的拉黑服务
    pub fn new() -> Self {
        Self::with_pauses(Duration::from_secs(1), Duration::from_secs(2))
    }

    /// 使用自定义停顿时间创建
    pub fn with_pauses(step_pause: Duration, settle_pause: Duration) -> Self {
        Self {
            step_pause,
            settle_pause,
            blocked_count: 0,
        }
    }

    /// 本次会话已拉黑的数量
    pub fn blocked_count(&self) -> usize {
        self.blocked_count
    }

    /// 拉黑回复的作者
    ///
    /// # 参数
    /// - `page`: 回复所在页面
    /// - `username`: 用户名（仅用于日志记录）
    /// - `element`: 用户的回复元素
    ///
    /// # 返回
    /// 返回是否成功拉黑
    pub async fn block_user<P: ReplyPage>(
        &mut self,
        page: &P,
        username: Option<&str>,
        element: &P::Element,
    ) -> bool {
        let display_name = username.filter(|u| !u.is_empty()).unwrap_or("未知用户");

        match self.click_through_menu(page, element).await {
            Ok(()) => {
                self.blocked_count += 1;
                info!(target: SUCCESS, "✅ 已拉黑用户: {}", display_name);
                sleep(self.settle_pause).await;
                true
            }
            Err(e) => {
                error!("❌ 拉黑用户 {} 失败: {}", display_name, e);
                false
            }
        }
    }

    async fn click_through_menu<P: ReplyPage>(&self, page: &P, element: &P::Element) -> AppResult<()> {
        debug!("点击更多选项按钮");
        page.click_in(element, SelectorKey::MoreOptions).await?;
        sleep(self.step_pause).await;

        debug!("查找拉黑选项");
        page.click(SelectorKey::BlockOption).await?;
        sleep(self.step_pause).await;

        debug!("确认拉黑");
        page.click(SelectorKey::ConfirmBlock).await?;
        Ok(())
    }
}

impl Default for BlockService {
    fn default() -> Self {
        Self::new()
    }
}
