//! 基础设施层
//!
//! 持有稀缺资源（浏览器页面），只暴露能力

pub mod chrome_page;
pub mod reply_page;
pub mod selectors;

pub use chrome_page::ChromePage;
pub use reply_page::ReplyPage;
pub use selectors::{SelectorKey, SelectorTable};
