//! # Configuration Implementation
//!
//! 组合过程使用的分层配置实现，基于 `config` crate。
//!
//! ## 主要组件
//!
//! - [`ConfigurationBuilder`] - 按顺序叠加 TOML/JSON 文件、字符串和环境变量
//! - [`Configuration`] - 传递给模块钩子的只读配置视图

pub mod builder;
pub mod configuration;

pub use builder::*;
pub use configuration::*;
