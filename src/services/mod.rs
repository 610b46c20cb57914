pub mod block_service;
pub mod classifier;

pub use block_service::BlockService;
pub use classifier::{is_suspicious_content, is_suspicious_username, MatchReason};
