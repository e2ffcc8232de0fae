//! 工具前端的传输层

pub mod stdio;

pub use stdio::{run_stdio_server, serve};
