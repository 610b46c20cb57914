//! # X Bot Blocker
//!
//! 监控 X 平台推文下的回复，按关键词识别机器人账号并（可选）自动拉黑
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `ReplyPage` - 页面能力接口，`ChromePage` 为 chromiumoxide 实现
//! - `SelectorTable` - 可运行时修改的 CSS 选择器表
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单条回复
//! - `classifier` - 用户名 / 内容关键词判定
//! - `BlockService` - 通过页面菜单拉黑
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次扫描"的完整流程
//! - `ReplyRecord` / `ReplyKey` - 单条回复的判定记录和稳定标识
//! - `ReplyScanner` - 去重 → 判定 → 拉黑或建议
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/monitor` - 监控会话：浏览器生命周期、状态机、轮询循环
//!
//! ## 模块结构

pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::{BrowserLauncher, ChromeLauncher};
pub use cli::Cli;
pub use config::{Config, KeywordKind, LoadOutcome};
pub use error::{AppError, AppResult};
pub use infrastructure::{ChromePage, ReplyPage, SelectorKey, SelectorTable};
pub use orchestrator::{MonitorSession, SessionState, StopHandle};
pub use services::BlockService;
pub use workflow::{ReplyKey, ReplyOutcome, ReplyRecord, ReplyScanner, ScanReport};
