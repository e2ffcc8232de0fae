//! Model Context Protocol 工具前端

pub mod protocol;
pub mod server;
pub mod tools;

pub use server::DocAnalyzerServer;
