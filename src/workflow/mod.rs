pub mod reply_ctx;
pub mod scan_flow;

pub use reply_ctx::{ReplyKey, ReplyRecord};
pub use scan_flow::{ReplyOutcome, ReplyScanner, ScanReport};
