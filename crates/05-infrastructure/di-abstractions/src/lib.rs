//! # DI Abstractions
//!
//! 组合引擎面向容器的抽象接口。
//!
//! - [`ServiceDescriptor`] - 服务类型、实现类型、生命周期与激活函数
//! - [`ServiceRegistry`] - 组合期间的可变构建目标（追加 / 替换）
//! - [`ServiceResolver`] - 工厂解析自身依赖时使用的解析器
//! - [`ResolveContext`] - 解析链与循环依赖检测

pub mod descriptor;
pub mod registry;
pub mod resolver;

pub use descriptor::*;
pub use registry::*;
pub use resolver::*;
