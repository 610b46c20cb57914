//! 程序配置
//!
//! 扁平的键值配置：关键词列表 + 若干标量开关。
//! 支持 JSON（默认）和 TOML 两种文件格式，按扩展名区分。

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::{error, info};

use crate::error::ConfigError;
use crate::utils::logging::CONSOLE;

/// 程序配置文件
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 用户名中的关键词
    pub username_keywords: BTreeSet<String>,
    /// 回复内容中的关键词
    pub content_keywords: BTreeSet<String>,
    /// 检查间隔（秒）
    pub check_interval: u64,
    /// 是否启用自动拉黑模式
    pub auto_mode: bool,
    /// 调试模式
    pub debug: bool,
    /// 等待超时（秒）
    pub timeout: u64,
    /// 无头模式
    pub headless: bool,
    /// 是否保存日志到文件
    pub save_log: bool,
    /// 日志文件路径
    pub log_path: String,
    /// 选择器覆盖（逻辑名称 -> CSS 选择器）
    pub selectors: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username_keywords: to_set(&[
                "bot", "crypto", "nft", "airdrop", "giveaway", "earn", "free",
            ]),
            content_keywords: to_set(&[
                "dm me",
                "check dm",
                "earn money",
                "make money",
                "free crypto",
                "join now",
                "click link",
                "get rich",
            ]),
            check_interval: 5,
            auto_mode: false,
            debug: true,
            timeout: 10,
            headless: false,
            save_log: true,
            log_path: "x_bot_blocker_log.txt".to_string(),
            selectors: BTreeMap::new(),
        }
    }
}

fn to_set(words: &[&str]) -> BTreeSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// 关键词类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordKind {
    /// 用户名关键词
    Username,
    /// 内容关键词
    Content,
}

impl FromStr for KeywordKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "username" => Ok(KeywordKind::Username),
            "content" => Ok(KeywordKind::Content),
            other => Err(ConfigError::UnknownKeywordKind {
                kind: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for KeywordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeywordKind::Username => write!(f, "username"),
            KeywordKind::Content => write!(f, "content"),
        }
    }
}

/// 一组关键词参数，单个字符串视为只有一个元素的列表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keywords(Vec<String>);

impl Keywords {
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    fn joined(&self) -> String {
        self.0.join(", ")
    }
}

impl From<&str> for Keywords {
    fn from(value: &str) -> Self {
        Keywords(vec![value.to_string()])
    }
}

impl From<String> for Keywords {
    fn from(value: String) -> Self {
        Keywords(vec![value])
    }
}

impl From<Vec<String>> for Keywords {
    fn from(value: Vec<String>) -> Self {
        Keywords(value)
    }
}

impl From<Vec<&str>> for Keywords {
    fn from(value: Vec<&str>) -> Self {
        Keywords(value.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for Keywords {
    fn from(value: &[&str]) -> Self {
        Keywords(value.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Keywords {
    fn from(value: [&str; N]) -> Self {
        Keywords(value.iter().map(|s| s.to_string()).collect())
    }
}

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// 根据扩展名判断格式，`.toml` 以外一律按 JSON 处理
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

/// 加载配置的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// 已从文件加载并合并
    Loaded,
    /// 文件不存在，已把当前配置写入该路径
    CreatedDefault,
}

impl Config {
    /// 检查间隔
    pub fn check_interval_duration(&self) -> Duration {
        Duration::from_secs(self.check_interval)
    }

    /// 单次等待超时
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// 获取指定类型的关键词集合
    pub fn keywords(&self, kind: KeywordKind) -> &BTreeSet<String> {
        match kind {
            KeywordKind::Username => &self.username_keywords,
            KeywordKind::Content => &self.content_keywords,
        }
    }

    fn keywords_mut(&mut self, kind: KeywordKind) -> &mut BTreeSet<String> {
        match kind {
            KeywordKind::Username => &mut self.username_keywords,
            KeywordKind::Content => &mut self.content_keywords,
        }
    }

    /// 添加关键词（并集，自动去重）
    ///
    /// # 参数
    /// - `kind`: 关键词类型（`username` 或 `content`）
    /// - `keywords`: 单个关键词或关键词列表
    ///
    /// # 返回
    /// 实际新增的关键词数量；未知类型时记录错误并返回 0
    pub fn add_keywords(&mut self, kind: &str, keywords: impl Into<Keywords>) -> usize {
        let kind = match kind.parse::<KeywordKind>() {
            Ok(kind) => kind,
            Err(e) => {
                error!("❌ {}", e);
                return 0;
            }
        };
        let keywords = keywords.into();
        let set = self.keywords_mut(kind);
        let added = keywords
            .iter()
            .filter(|k| set.insert(k.to_string()))
            .count();
        info!("已添加 {} 关键词: {}", kind, keywords.joined());
        added
    }

    /// 移除关键词（差集）
    ///
    /// # 返回
    /// 实际移除的关键词数量；未知类型时记录错误并返回 0
    pub fn remove_keywords(&mut self, kind: &str, keywords: impl Into<Keywords>) -> usize {
        let kind = match kind.parse::<KeywordKind>() {
            Ok(kind) => kind,
            Err(e) => {
                error!("❌ {}", e);
                return 0;
            }
        };
        let keywords = keywords.into();
        let set = self.keywords_mut(kind);
        let removed = keywords.iter().filter(|k| set.remove(k.as_str())).count();
        info!("已移除 {} 关键词: {}", kind, keywords.joined());
        removed
    }

    /// 切换自动拉黑模式，返回切换后的状态
    pub fn toggle_auto_mode(&mut self) -> bool {
        self.auto_mode = !self.auto_mode;
        let status = if self.auto_mode { "开启" } else { "关闭" };
        info!("自动拉黑模式: {}", status);
        self.auto_mode
    }

    /// 从文件加载配置，结果写入日志
    ///
    /// - 文件不存在：把当前配置写到该路径，内存中的配置不变
    /// - 文件存在：逐键覆盖当前配置，未出现的键保持原值
    /// - 文件损坏：记录错误，配置不变，返回 `None`
    pub fn load(&mut self, path: impl AsRef<Path>) -> Option<LoadOutcome> {
        let path = path.as_ref();
        let result = self.try_load(path);
        report_load(path, &result)
    }

    /// 与 [`Config::load`] 相同，但不写日志，便于在日志初始化之前调用
    pub fn try_load(&mut self, path: impl AsRef<Path>) -> Result<LoadOutcome, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            self.try_save(path)?;
            return Ok(LoadOutcome::CreatedDefault);
        }

        let overrides = read_overrides(path)?;
        *self = self.merged_with(overrides, path)?;
        Ok(LoadOutcome::Loaded)
    }

    /// 保存配置，失败时只记录错误
    ///
    /// # 返回
    /// 返回是否保存成功
    pub fn save(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match self.try_save(path) {
            Ok(()) => {
                info!("配置已保存到 {}", path.display());
                true
            }
            Err(e) => {
                error!("❌ 保存配置文件失败: {}", e);
                false
            }
        }
    }

    /// 保存配置，返回错误
    pub fn try_save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.render(ConfigFormat::from_path(path))?;
        fs::write(path, content).map_err(|source| ConfigError::WriteFailed {
            path: path.display().to_string(),
            source,
        })
    }

    /// 按指定格式序列化
    pub fn render(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        match format {
            ConfigFormat::Json => {
                let mut buf = Vec::new();
                let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
                let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
                self.serialize(&mut ser)
                    .map_err(|e| ConfigError::SerializeFailed { source: Box::new(e) })?;
                String::from_utf8(buf)
                    .map_err(|e| ConfigError::SerializeFailed { source: Box::new(e) })
            }
            ConfigFormat::Toml => toml::to_string_pretty(self)
                .map_err(|e| ConfigError::SerializeFailed { source: Box::new(e) }),
        }
    }

    /// 显示当前配置的各行文本
    pub fn summary_lines(&self) -> Vec<String> {
        let join = |set: &BTreeSet<String>| set.iter().cloned().collect::<Vec<_>>().join(", ");
        let mut lines = vec![
            format!("username_keywords: {}", join(&self.username_keywords)),
            format!("content_keywords: {}", join(&self.content_keywords)),
            format!("check_interval: {}", self.check_interval),
            format!("auto_mode: {}", self.auto_mode),
            format!("debug: {}", self.debug),
            format!("timeout: {}", self.timeout),
            format!("headless: {}", self.headless),
            format!("save_log: {}", self.save_log),
            format!("log_path: {}", self.log_path),
        ];
        for (name, selector) in &self.selectors {
            lines.push(format!("selectors.{}: {}", name, selector));
        }
        lines
    }

    /// 把文件中的键逐个覆盖到当前配置上
    fn merged_with(&self, overrides: Map<String, JsonValue>, path: &Path) -> Result<Config, ConfigError> {
        let serialize_err = |e: serde_json::Error| ConfigError::SerializeFailed { source: Box::new(e) };

        let JsonValue::Object(mut current) = serde_json::to_value(self).map_err(serialize_err)? else {
            return Err(ConfigError::NotAnObject {
                path: path.display().to_string(),
            });
        };
        for (key, value) in overrides {
            current.insert(key, value);
        }

        serde_json::from_value(JsonValue::Object(current)).map_err(|e| ConfigError::ParseFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })
    }
}

/// 读取配置文件中出现的键
fn read_overrides(path: &Path) -> Result<Map<String, JsonValue>, ConfigError> {
    let display = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
        path: display.clone(),
        source,
    })?;

    let value: JsonValue = match ConfigFormat::from_path(path) {
        ConfigFormat::Json => serde_json::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: display.clone(),
            source: Box::new(e),
        })?,
        ConfigFormat::Toml => toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: display.clone(),
            source: Box::new(e),
        })?,
    };

    match value {
        JsonValue::Object(map) => Ok(map),
        _ => Err(ConfigError::NotAnObject { path: display }),
    }
}

/// 把加载结果写入日志
pub fn report_load(path: &Path, result: &Result<LoadOutcome, ConfigError>) -> Option<LoadOutcome> {
    match result {
        Ok(LoadOutcome::Loaded) => info!(target: CONSOLE, "已从 {} 加载配置", path.display()),
        Ok(LoadOutcome::CreatedDefault) => {
            info!(target: CONSOLE, "配置文件 {} 不存在，已写入当前配置", path.display())
        }
        Err(e) => error!("❌ 加载配置文件失败: {}", e),
    }
    result.as_ref().ok().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_add_then_remove_restores_keywords() {
        let mut config = Config::default();
        let before = config.username_keywords.clone();

        assert_eq!(config.add_keywords("username", vec!["spam", "promo"]), 2);
        assert!(config.username_keywords.contains("spam"));

        assert_eq!(config.remove_keywords("username", vec!["spam", "promo"]), 2);
        assert_eq!(config.username_keywords, before);
    }

    #[test]
    fn test_add_keywords_deduplicates() {
        let mut config = Config::default();
        let before = config.content_keywords.len();

        assert_eq!(config.add_keywords("content", "dm me"), 0);
        assert_eq!(config.add_keywords("content", ["promo", "promo"]), 1);
        assert_eq!(config.content_keywords.len(), before + 1);
    }

    #[test]
    fn test_unknown_keyword_kind_is_noop() {
        let mut config = Config::default();
        let before = config.clone();

        assert_eq!(config.add_keywords("hashtag", "x"), 0);
        assert_eq!(config.remove_keywords("hashtag", "bot"), 0);
        assert_eq!(config, before);
    }

    #[test]
    fn test_keyword_kind_parse() {
        assert_eq!("username".parse::<KeywordKind>().unwrap(), KeywordKind::Username);
        assert_eq!("content".parse::<KeywordKind>().unwrap(), KeywordKind::Content);
        assert!("Username".parse::<KeywordKind>().is_err());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();

        for name in ["config.json", "config.toml"] {
            let path = dir.path().join(name);
            let mut saved = Config::default();
            saved.add_keywords("username", "shill");
            saved.auto_mode = true;
            saved.check_interval = 30;
            saved
                .selectors
                .insert("reply".to_string(), "article".to_string());
            assert!(saved.save(&path));

            let mut loaded = Config::default();
            assert_eq!(loaded.load(&path), Some(LoadOutcome::Loaded));
            assert_eq!(loaded, saved, "{} 往返后应保持一致", name);
        }
    }

    #[test]
    fn test_load_missing_file_writes_current_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.json");

        let mut config = Config::default();
        config.check_interval = 12;
        let before = config.clone();

        assert_eq!(config.load(&path), Some(LoadOutcome::CreatedDefault));
        assert_eq!(config, before);
        assert!(path.exists());

        let written: Config = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, before);
    }

    #[test]
    fn test_load_merges_key_by_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.json");
        fs::write(&path, r#"{ "auto_mode": true, "username_keywords": ["scam"] }"#).unwrap();

        let mut config = Config::default();
        config.timeout = 42;
        assert_eq!(config.load(&path), Some(LoadOutcome::Loaded));

        assert!(config.auto_mode);
        assert_eq!(config.username_keywords, to_set(&["scam"]));
        assert_eq!(config.timeout, 42);
        assert_eq!(config.content_keywords, Config::default().content_keywords);
    }

    #[test]
    fn test_malformed_file_leaves_config_untouched() {
        let dir = TempDir::new().unwrap();
        let before = Config::default();

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        let mut config = before.clone();
        assert_eq!(config.load(&broken), None);
        assert_eq!(config, before);

        let wrong_type = dir.path().join("wrong_type.json");
        fs::write(&wrong_type, r#"{ "check_interval": "soon" }"#).unwrap();
        assert_eq!(config.load(&wrong_type), None);
        assert_eq!(config, before);

        let array = dir.path().join("array.json");
        fs::write(&array, "[1, 2]").unwrap();
        assert!(matches!(
            config.try_load(&array),
            Err(ConfigError::NotAnObject { .. })
        ));
        assert_eq!(config, before);
    }

    #[test]
    fn test_report_load_passes_outcome_through() {
        let path = Path::new("config.json");
        assert_eq!(
            report_load(path, &Ok(LoadOutcome::CreatedDefault)),
            Some(LoadOutcome::CreatedDefault)
        );

        let failed = Err(ConfigError::NotAnObject {
            path: "config.json".to_string(),
        });
        assert_eq!(report_load(path, &failed), None);
    }

    #[test]
    fn test_save_failure_is_reported_not_raised() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no_such_dir").join("config.json");
        assert!(!Config::default().save(&path));
    }

    #[test]
    fn test_json_uses_four_space_indent() {
        let text = Config::default().render(ConfigFormat::Json).unwrap();
        assert!(text.contains("\n    \"check_interval\": 5"));
    }

    #[test]
    fn test_toggle_auto_mode() {
        let mut config = Config::default();
        assert!(config.toggle_auto_mode());
        assert!(!config.toggle_auto_mode());
    }
}
