//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::MonitorSession (轮询循环、浏览器生命周期)
//!     ↓
//! workflow::ReplyScanner (一次扫描)
//!     ↓
//! services (能力层：classifier / block)
//!     ↓
//! infrastructure (基础设施：ReplyPage)
//! ```
//!
//! 只有编排层持有浏览器页面，下层只借用

pub mod monitor;

pub use monitor::{MonitorSession, SessionState, StopHandle};
