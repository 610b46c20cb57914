//! 日志工具模块
//!
//! 控制台彩色输出 + 可选的日志文件。
//! 文件中每条日志一行：`[时间] [级别] 消息`
//!
//! 非调试模式下只输出 WARNING、ERROR 和 [`SUCCESS`] 目标的成功提示；
//! [`CONSOLE`] 目标用于标题和配置展示，始终输出到控制台但不写入文件

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Local};
use tracing::field::{Field, Visit};
use tracing::{info, warn, Event, Level, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as tracing_fmt, EnvFilter, Layer};

use crate::config::Config;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 成功提示的日志目标，文件中记为 `SUCCESS`
pub const SUCCESS: &str = "x_bot_blocker::success";

/// 控制台提示的日志目标
pub const CONSOLE: &str = "x_bot_blocker::console";

/// 日志设置
#[derive(Debug, Clone)]
pub struct LogSettings {
    /// 调试模式，输出 debug 级别日志
    pub debug: bool,
    /// 是否写入日志文件
    pub save_log: bool,
    /// 日志文件路径
    pub log_path: PathBuf,
}

impl From<&Config> for LogSettings {
    fn from(config: &Config) -> Self {
        Self {
            debug: config.debug,
            save_log: config.save_log,
            log_path: PathBuf::from(&config.log_path),
        }
    }
}

/// 未设置 `RUST_LOG` 时的过滤规则
pub fn default_directives(debug: bool) -> String {
    if debug {
        "x_bot_blocker=debug,warn".to_string()
    } else {
        format!("x_bot_blocker=warn,{}=info,{}=info,warn", SUCCESS, CONSOLE)
    }
}

/// 初始化全局日志
///
/// `RUST_LOG` 优先，否则按 [`default_directives`]
pub fn init(settings: &LogSettings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(settings.debug)));

    let (file_layer, banner) = if settings.save_log {
        (
            Some(FileLogLayer::new(&settings.log_path)),
            write_session_banner(&settings.log_path),
        )
    } else {
        (None, Ok(false))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_fmt::layer().with_target(false))
        .with(file_layer)
        .try_init()?;

    if let Err(e) = banner {
        warn!("⚠️ 写入日志文件分隔行失败 ({}): {}", settings.log_path.display(), e);
    }

    Ok(())
}

/// 日志文件已存在且非空时，追加新会话分隔行
///
/// # 返回
/// 返回是否写入了分隔行
pub fn write_session_banner(log_path: &Path) -> io::Result<bool> {
    let non_empty = fs::metadata(log_path).map(|m| m.len() > 0).unwrap_or(false);
    if !non_empty {
        return Ok(false);
    }

    let separator = "-".repeat(50);
    let banner = format!(
        "\n{}\n新会话开始于 {}\n{}\n",
        separator,
        Local::now().format(TIMESTAMP_FORMAT),
        separator
    );
    append_line(log_path, banner.trim_end_matches('\n'))?;
    Ok(true)
}

/// 文件日志中的级别名称
pub fn level_label(metadata: &Metadata<'_>) -> &'static str {
    match *metadata.level() {
        Level::WARN => "WARNING",
        Level::INFO if metadata.target() == SUCCESS => "SUCCESS",
        other => other.as_str(),
    }
}

/// 格式化一行文件日志，消息中的换行折叠为空格
pub fn format_line(timestamp: &DateTime<Local>, label: &str, message: &str) -> String {
    let message = message.lines().map(str::trim_end).collect::<Vec<_>>().join(" ");
    format!("[{}] [{}] {}", timestamp.format(TIMESTAMP_FORMAT), label, message)
}

/// 每次写入都重新打开文件追加
fn append_line(path: &Path, line: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", line)
}

/// 把日志事件追加到文件的 Layer
pub struct FileLogLayer {
    path: PathBuf,
}

impl FileLogLayer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl<S: Subscriber> Layer<S> for FileLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if metadata.target() == CONSOLE {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let line = format_line(&Local::now(), level_label(metadata), &visitor.finish());
        if let Err(e) = append_line(&self.path, &line) {
            // 此处不能再走 tracing，否则会递归
            eprintln!("[ERROR] 写入日志文件失败: {}", e);
        }
    }
}

/// 收集事件的 message 字段，其余字段以 key=value 附在后面
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else {
            format!("{} {}", self.message, self.fields.join(" "))
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

/// 打印程序标题
pub fn log_banner() {
    info!(target: CONSOLE, "{}", "=".repeat(50));
    info!(target: CONSOLE, "X平台机器人账号自动拉黑工具");
    info!(target: CONSOLE, "{}", "=".repeat(50));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
