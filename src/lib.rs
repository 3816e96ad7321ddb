//! enumcron-match
//!
//! タブ区切りの所蔵データに対して巻号照合を実行するCLIの本体。
//! 解析・照合エンジンは `enumcron-common` にある。

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod table;
