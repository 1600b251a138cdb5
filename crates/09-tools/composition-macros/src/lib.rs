//! # Composition Macros
//!
//! 模块和服务的声明式派生宏。生成的代码实现组合层的 `ModuleDefinition` /
//! `ServiceDefinition` trait，并在程序启动时把类型登记到发现目录。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use infrastructure_composition::prelude::*;
//!
//! pub trait Clock: Send + Sync {
//!     fn now(&self) -> u64;
//! }
//!
//! #[derive(Default, ServiceDefinition)]
//! #[service(singleton, implements(dyn Clock))]
//! pub struct SystemClock;
//!
//! #[derive(Default, ModuleDefinition)]
//! #[module(depends_on(CoreModule))]
//! pub struct TimeModule;
//!
//! impl Module for TimeModule {}
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod module;
mod service;
mod utils;

/// 模块声明派生宏
///
/// 类型本身还需要实现 `Module` trait（三个钩子都有默认实现）。
///
/// # 参数
///
/// - `depends_on(A, path::B)` - 前置模块
/// - `factory = path` - 自定义构造函数 `fn() -> Result<Self, BoxError>`，默认使用 `Default`
/// - `skip_discovery` - 不登记到发现目录
///
/// # 示例
///
/// ```rust,ignore
/// #[derive(Default, ModuleDefinition)]
/// #[module(depends_on(InfrastructureModule))]
/// pub struct PersistenceModule;
/// ```
#[proc_macro_derive(ModuleDefinition, attributes(module))]
pub fn derive_module_definition(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    module::expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// 服务声明派生宏
///
/// # 参数
///
/// - `singleton` / `scoped` / `transient` - 能力标记，同时生成对应的标记 trait 实现
/// - `implements(dyn A, ...)` - 实现的接口
/// - `expose(dyn A, ...)` - 显式目标服务类型
/// - `lifetime = scoped` - 显式生命周期
/// - `include_self` - 同时注册实现类型自身
/// - `replace` - 替换同一服务类型的已有注册
/// - `factory = path` - 自定义工厂 `fn(&mut dyn ServiceResolver) -> Result<Self, BoxError>`
/// - `skip_discovery` - 不登记到发现目录
///
/// # 示例
///
/// ```rust,ignore
/// #[derive(ServiceDefinition)]
/// #[service(scoped, implements(dyn Repository), factory = SqlRepository::create)]
/// pub struct SqlRepository {
///     clock: Arc<dyn Clock>,
/// }
/// ```
#[proc_macro_derive(ServiceDefinition, attributes(service))]
pub fn derive_service_definition(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    service::expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
