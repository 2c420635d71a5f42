pub mod config;

pub use config::{ErrwireConfig, StackCapture};
