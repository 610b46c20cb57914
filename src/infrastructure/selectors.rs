//! X 平台 CSS 选择器表
//!
//! X 的 DOM 结构随时可能变化。工具失效时，先检查这些选择器，
//! 可以在配置文件的 `selectors` 中按名称覆盖，或运行时调用 [`SelectorTable::update`]。

use std::collections::{BTreeMap, HashMap};

use phf::phf_map;
use tracing::{debug, warn};

use crate::error::{AppResult, PageError};

/// 默认选择器
static DEFAULT_SELECTORS: phf::Map<&'static str, &'static str> = phf_map! {
    // 回复容器
    "replies_container" => "div[aria-label='Timeline: Conversation']",
    // 单条回复
    "reply" => "article[data-testid='tweet']",
    // 用户名
    "username" => "div[data-testid='User-Name'] span.css-901oao.css-16my406.r-poiln3",
    // 回复内容
    "content" => "div[data-testid='tweetText']",
    // 更多选项按钮
    "more_options" => "div[aria-label='More'][role='button']",
    // 拉黑选项（下拉菜单中）
    "block_option" => "div[role='menuitem'][data-testid='block']",
    // 确认拉黑按钮
    "confirm_block" => "div[data-testid='confirmationSheetConfirm']",
    // 加载更多回复的区域
    "load_more_area" => "div[role='button'][data-testid='cellInnerDiv']",
};

/// 页面元素的逻辑名称
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorKey {
    RepliesContainer,
    Reply,
    Username,
    Content,
    MoreOptions,
    BlockOption,
    ConfirmBlock,
    LoadMoreArea,
}

impl SelectorKey {
    pub fn name(self) -> &'static str {
        match self {
            SelectorKey::RepliesContainer => "replies_container",
            SelectorKey::Reply => "reply",
            SelectorKey::Username => "username",
            SelectorKey::Content => "content",
            SelectorKey::MoreOptions => "more_options",
            SelectorKey::BlockOption => "block_option",
            SelectorKey::ConfirmBlock => "confirm_block",
            SelectorKey::LoadMoreArea => "load_more_area",
        }
    }
}

/// 可在运行时修改的选择器表
#[derive(Debug, Clone)]
pub struct SelectorTable {
    entries: HashMap<String, String>,
}

impl Default for SelectorTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_SELECTORS
                .entries()
                .map(|(name, selector)| (name.to_string(), selector.to_string()))
                .collect(),
        }
    }
}

impl SelectorTable {
    /// 默认表 + 配置中的覆盖项
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut table = Self::default();
        for (name, selector) in overrides {
            if !table.update(name, selector) {
                warn!("⚠️ 忽略未知的选择器名称: {}", name);
            }
        }
        table
    }

    /// 按名称获取选择器，未知名称返回空字符串
    pub fn get(&self, name: &str) -> &str {
        self.entries.get(name).map(String::as_str).unwrap_or("")
    }

    /// 获取选择器，为空时返回错误
    pub fn require(&self, key: SelectorKey) -> AppResult<&str> {
        let selector = self.get(key.name());
        if selector.is_empty() {
            return Err(PageError::UnknownSelector {
                name: key.name().to_string(),
            }
            .into());
        }
        Ok(selector)
    }

    /// 更新选择器，只接受已有的名称
    ///
    /// # 返回
    /// 返回是否更新成功
    pub fn update(&mut self, name: &str, selector: impl Into<String>) -> bool {
        match self.entries.get_mut(name) {
            Some(entry) => {
                *entry = selector.into();
                debug!("选择器 {} 已更新为 {}", name, entry);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_has_default() {
        let table = SelectorTable::default();
        for key in [
            SelectorKey::RepliesContainer,
            SelectorKey::Reply,
            SelectorKey::Username,
            SelectorKey::Content,
            SelectorKey::MoreOptions,
            SelectorKey::BlockOption,
            SelectorKey::ConfirmBlock,
            SelectorKey::LoadMoreArea,
        ] {
            assert!(table.require(key).is_ok(), "{} 缺少默认值", key.name());
        }
    }

    #[test]
    fn test_update_only_known_names() {
        let mut table = SelectorTable::default();
        assert!(table.update("reply", "div.reply"));
        assert_eq!(table.get("reply"), "div.reply");

        assert!(!table.update("avatar", "img"));
        assert_eq!(table.get("avatar"), "");
    }

    #[test]
    fn test_overrides_from_config() {
        let overrides = BTreeMap::from([
            ("content".to_string(), "div.text".to_string()),
            ("unknown".to_string(), "span".to_string()),
        ]);
        let table = SelectorTable::with_overrides(&overrides);
        assert_eq!(table.get("content"), "div.text");
        assert_eq!(table.get("unknown"), "");
        assert_eq!(table.get("reply"), "article[data-testid='tweet']");
    }

    #[test]
    fn test_require_rejects_emptied_selector() {
        let mut table = SelectorTable::default();
        table.update("confirm_block", "");
        assert!(table.require(SelectorKey::ConfirmBlock).is_err());
    }
}
