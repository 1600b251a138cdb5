//! 全局发现目录
//!
//! `#[derive(ModuleDefinition)]` 和 `#[derive(ServiceDefinition)]` 在程序启动时
//! 把类型登记到这里，[`CompositionScope::discover`](crate::CompositionScope::discover)
//! 按模块路径前缀查询。

use crate::manifest::{ServiceDefinition, ServiceEntry};
use crate::module::{ModuleDefinition, ModuleDescriptor};
use infrastructure_common::TypeInfo;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

#[derive(Clone, Copy)]
struct CatalogService {
    implementation: TypeInfo,
    entry: fn() -> ServiceEntry,
}

#[derive(Default)]
struct Catalog {
    modules: Vec<ModuleDescriptor>,
    services: Vec<CatalogService>,
}

static CATALOG: Lazy<RwLock<Catalog>> = Lazy::new(|| RwLock::new(Catalog::default()));

/// 登记模块
pub fn register_module<M: ModuleDefinition>() {
    let descriptor = ModuleDescriptor::of::<M>();
    let mut catalog = CATALOG.write();
    if !catalog.modules.contains(&descriptor) {
        catalog.modules.push(descriptor);
    }
}

/// 登记服务
pub fn register_service<T: ServiceDefinition>() {
    let implementation = TypeInfo::of::<T>();
    let mut catalog = CATALOG.write();
    if !catalog
        .services
        .iter()
        .any(|s| s.implementation == implementation)
    {
        catalog.services.push(CatalogService {
            implementation,
            entry: T::entry,
        });
    }
}

/// 模块路径位于 `prefix` 之下的模块，按 (模块路径, 类型名称) 排序
pub fn modules_under(prefix: &str) -> Vec<ModuleDescriptor> {
    let mut modules: Vec<ModuleDescriptor> = CATALOG
        .read()
        .modules
        .iter()
        .filter(|m| is_under(m.type_info, prefix))
        .copied()
        .collect();
    modules.sort_by_key(|m| sort_key(m.type_info));
    modules
}

/// 模块路径位于 `prefix` 之下的服务条目，按 (模块路径, 类型名称) 排序
pub fn services_under(prefix: &str) -> Vec<ServiceEntry> {
    let mut services: Vec<CatalogService> = CATALOG
        .read()
        .services
        .iter()
        .filter(|s| is_under(s.implementation, prefix))
        .copied()
        .collect();
    services.sort_by_key(|s| sort_key(s.implementation));
    services.into_iter().map(|s| (s.entry)()).collect()
}

fn is_under(type_info: TypeInfo, prefix: &str) -> bool {
    let path = type_info.module_path();
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with("::"))
}

fn sort_key(type_info: TypeInfo) -> (&'static str, &'static str) {
    (type_info.module_path(), type_info.short_name())
}
