pub mod launcher;

pub use launcher::{BrowserLauncher, ChromeLauncher};
