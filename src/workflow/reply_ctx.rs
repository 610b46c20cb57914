//! 单条回复的上下文
//!
//! 封装"这条回复是谁发的、说了什么、哪里可疑"

use std::collections::hash_map::DefaultHasher;
use std::fmt::Display;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use regex::Regex;

use crate::config::{Config, KeywordKind};
use crate::services::classifier::{is_suspicious_content, is_suspicious_username, MatchReason};
use crate::utils::logging::truncate_text;

/// 回复的稳定标识
///
/// 由规范化后的作者名和正文计算得出，不依赖元素句柄，
/// 页面滚动或重新渲染后同一条回复得到同一个标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReplyKey(u64);

impl ReplyKey {
    pub fn from_parts(username: &str, content: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        normalize(username).to_lowercase().hash(&mut hasher);
        normalize(content).hash(&mut hasher);
        ReplyKey(hasher.finish())
    }

    /// 同一轮扫描中第 `n` 次出现的相同回复（从 0 计）
    ///
    /// 同一作者连发的相同内容各占一个标识，第一次出现时标识不变
    pub fn occurrence(self, n: usize) -> Self {
        if n == 0 {
            return self;
        }
        let mut hasher = DefaultHasher::new();
        self.0.hash(&mut hasher);
        n.hash(&mut hasher);
        ReplyKey(hasher.finish())
    }

    /// 读取失败的回复：由已读到的作者名和元素在列表中的位置构成
    pub fn unreadable(username: Option<&str>, position: usize) -> Self {
        let mut hasher = DefaultHasher::new();
        "unreadable".hash(&mut hasher);
        username.map(|u| normalize(u).to_lowercase()).hash(&mut hasher);
        position.hash(&mut hasher);
        ReplyKey(hasher.finish())
    }
}

/// 去掉首尾空白并把连续空白折叠为一个空格
fn normalize(text: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let re = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("合法的正则"));
    re.replace_all(text.trim(), " ").into_owned()
}

/// 单条回复的判定记录，只在一次扫描内存在
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRecord {
    pub username: String,
    pub content: String,
    pub is_suspicious_username: bool,
    pub is_suspicious_content: bool,
}

impl ReplyRecord {
    /// 用当前配置的关键词判定一条回复
    pub fn classify(username: impl Into<String>, content: impl Into<String>, config: &Config) -> Self {
        let username = username.into();
        let content = content.into();
        let is_suspicious_username =
            is_suspicious_username(&username, config.keywords(KeywordKind::Username));
        let is_suspicious_content =
            is_suspicious_content(&content, config.keywords(KeywordKind::Content));
        Self {
            is_suspicious_username,
            is_suspicious_content,
            username,
            content,
        }
    }

    pub fn key(&self) -> ReplyKey {
        ReplyKey::from_parts(&self.username, &self.content)
    }

    pub fn is_suspicious(&self) -> bool {
        self.is_suspicious_username || self.is_suspicious_content
    }

    /// 命中的原因，用户名在前
    pub fn reasons(&self) -> Vec<MatchReason> {
        let mut reasons = Vec::with_capacity(2);
        if self.is_suspicious_username {
            reasons.push(MatchReason::UsernameKeyword);
        }
        if self.is_suspicious_content {
            reasons.push(MatchReason::ContentKeyword);
        }
        reasons
    }

    /// 用于日志的作者名
    pub fn display_name(&self) -> &str {
        if self.username.is_empty() {
            "未知用户"
        } else {
            &self.username
        }
    }
}

impl Display for ReplyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}: {}]", self.display_name(), truncate_text(&self.content, 40))
    }
}
