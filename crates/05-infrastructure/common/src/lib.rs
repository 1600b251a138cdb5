//! # Infrastructure Common
//!
//! 这个 crate 提供了 Lorn Composition 组合引擎的公共类型。
//!
//! ## 核心组件
//!
//! - [`TypeInfo`] - 基于 `TypeId` 的类型身份
//! - [`Lifetime`] - 服务生命周期
//! - [`SingletonDependency`] / [`ScopedDependency`] / [`TransientDependency`] - 能力标记
//! - [`CompositionError`] - 组合错误分类
//! - [`ConfigSection`] - 配置节
//!
//! ## 设计原则
//!
//! - 基于 Rust 类型系统的编译时安全
//! - 显式元数据优先于约定

pub mod configuration;
pub mod errors;
pub mod lifecycle;
pub mod metadata;

pub use configuration::*;
pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
