//! 关键词分类 - 业务能力层
//!
//! 只负责"判断可疑"能力：大小写不敏感的子串匹配

use std::fmt;

/// 文本中是否包含任一关键词（不区分大小写）
///
/// 文本为空或关键词为空时返回 false
pub fn matches_any<I>(text: &str, keywords: I) -> bool
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    if text.is_empty() {
        return false;
    }
    let text = text.to_lowercase();
    keywords
        .into_iter()
        .any(|keyword| text.contains(&keyword.as_ref().to_lowercase()))
}

/// 用户名是否可疑
pub fn is_suspicious_username<I>(username: &str, keywords: I) -> bool
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    matches_any(username, keywords)
}

/// 回复内容是否可疑
pub fn is_suspicious_content<I>(content: &str, keywords: I) -> bool
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    matches_any(content, keywords)
}

/// 命中原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchReason {
    /// 用户名关键词
    UsernameKeyword,
    /// 内容关键词
    ContentKeyword,
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchReason::UsernameKeyword => write!(f, "用户名关键词"),
            MatchReason::ContentKeyword => write!(f, "内容关键词"),
        }
    }
}

/// 把命中原因拼成 "用户名关键词 和 内容关键词"
pub fn describe_reasons(reasons: &[MatchReason]) -> String {
    reasons
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" 和 ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_keyword_case_insensitive() {
        assert!(is_suspicious_username("cryptobot99", ["bot"]));
        assert!(is_suspicious_username("CryptoBOT99", ["bot"]));
        assert!(is_suspicious_username("alice", ["ALI"]));
        assert!(!is_suspicious_username("alice", ["bot"]));
    }

    #[test]
    fn test_content_keyword_matches_phrases() {
        let keywords = vec!["dm me".to_string(), "get rich".to_string()];
        assert!(is_suspicious_content("Want to GET RICH fast?", &keywords));
        assert!(is_suspicious_content("please dm me now", &keywords));
        assert!(!is_suspicious_content("great thread, thanks", &keywords));
    }

    #[test]
    fn test_empty_inputs_never_match() {
        assert!(!matches_any("", ["bot"]));
        assert!(!matches_any("cryptobot", Vec::<String>::new()));
        // 空关键词是任何非空文本的子串
        assert!(matches_any("cryptobot", [""]));
    }

    #[test]
    fn test_non_ascii_text() {
        assert!(is_suspicious_content("免费领取 AIRDROP 空投", ["airdrop"]));
        assert!(is_suspicious_content("私信我领取", ["私信"]));
    }

    #[test]
    fn test_matches_iff_some_keyword_is_substring() {
        let texts = ["", "Bot", "nothing here", "FreeNFT", "earn$$", "dm Me"];
        let keyword_sets: [&[&str]; 4] = [&[], &["nft"], &["bot", "dm me"], &["earn", "x", ""]];

        for text in texts {
            for keywords in keyword_sets {
                let expected = keywords
                    .iter()
                    .any(|k| !text.is_empty() && text.to_lowercase().contains(&k.to_lowercase()));
                assert_eq!(matches_any(text, keywords), expected, "{:?} / {:?}", text, keywords);
            }
        }
    }

    #[test]
    fn test_describe_reasons() {
        assert_eq!(describe_reasons(&[MatchReason::UsernameKeyword]), "用户名关键词");
        assert_eq!(
            describe_reasons(&[MatchReason::UsernameKeyword, MatchReason::ContentKeyword]),
            "用户名关键词 和 内容关键词"
        );
    }
}
