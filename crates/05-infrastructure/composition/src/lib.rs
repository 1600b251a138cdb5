//! # 基础设施组合层
//!
//! 启动期的组合引擎：在一组作用域中发现模块和服务，确定模块加载顺序，
//! 每个模块的配置钩子只执行一次，并根据声明式元数据把服务自动注册到容器。
//!
//! ## 主要功能
//!
//! - **模块加载器**: 深度优先解析模块依赖，检测循环依赖
//! - **服务扫描器**: 根据显式元数据或能力标记解析生命周期和目标服务类型
//! - **组合器**: 按作用域顺序加载模块、执行钩子、扫描服务
//! - **发现目录**: 派生宏在程序启动时登记的模块和服务
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use infrastructure_composition::prelude::*;
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! #[derive(Default)]
//! struct ConsoleGreeter;
//!
//! impl Greeter for ConsoleGreeter {
//!     fn greet(&self) -> String {
//!         "你好".to_string()
//!     }
//! }
//!
//! impl SingletonDependency for ConsoleGreeter {}
//!
//! impl ServiceDefinition for ConsoleGreeter {
//!     fn manifest() -> ServiceManifest<Self> {
//!         ServiceManifest::with_default()
//!             .implements::<dyn Greeter>(|s| s)
//!             .singleton_marker()
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = CompositionBuilder::new()
//!         .add_scope(CompositionScope::new("app").with_service::<ConsoleGreeter>())
//!         .build()?;
//!
//!     let greeter: Arc<dyn Greeter> = provider.get::<dyn Greeter>()?;
//!     println!("{}", greeter.greet());
//!     Ok(())
//! }
//! ```

extern crate self as infrastructure_composition;

pub mod builder;
pub mod catalog;
pub mod composer;
pub mod loader;
pub mod manifest;
pub mod module;
pub mod options;
pub mod scanner;
pub mod scope;

#[cfg(test)]
mod tests;

pub use builder::{CompositionBuilder, LoggingConfig};
pub use composer::{Composer, CompositionReport};
pub use loader::{ModuleIdentityPolicy, ModuleLoader};
pub use manifest::{
    CapabilityMarker, ServiceBinding, ServiceDefinition, ServiceEntry, ServiceManifest,
    ServiceMetadata,
};
pub use module::{HookResult, LoadedModule, Module, ModuleDefinition, ModuleDescriptor};
pub use options::{CompositionOptions, COMPOSITION_SECTION};
pub use scanner::{BindingStrategy, ServiceRegistration, ServiceScanner};
pub use scope::CompositionScope;

// 派生宏与 trait 同名，分别位于宏命名空间和类型命名空间
pub use composition_macros::{ModuleDefinition, ServiceDefinition};

// 重新导出容器、配置和公共类型
pub use config_impl::{Configuration, ConfigurationBuilder};
pub use di_abstractions::{RegistrationMode, ServiceDescriptor, ServiceRegistry, ServiceResolver};
pub use di_impl::{ServiceCollection, ServiceProvider, ServiceScope};
pub use infrastructure_common::{
    BoxError, CompositionError, CompositionResult, DependencyError, HookPhase, Lifetime,
    ScopedDependency, SingletonDependency, TransientDependency, TypeInfo,
};

/// 常用类型
pub mod prelude {
    pub use crate::{
        BindingStrategy, CompositionBuilder, CompositionOptions, CompositionScope, Configuration,
        HookResult, Lifetime, Module, ModuleDefinition, ModuleDescriptor, ScopedDependency,
        ServiceCollection, ServiceDefinition, ServiceManifest, ServiceProvider, ServiceRegistry,
        ServiceResolver, SingletonDependency, TransientDependency,
    };
}

/// 派生宏生成代码使用的路径，不属于公开 API
#[doc(hidden)]
pub mod __private {
    pub use crate::catalog::{register_module, register_service};
    pub use ctor;
}
