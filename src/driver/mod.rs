pub mod common;
#[cfg(test)]
pub mod mock;
pub mod traits;
pub mod web;

pub use traits::{BrowserDriver, FrameTarget};
pub use web::PlaywrightDriver;
