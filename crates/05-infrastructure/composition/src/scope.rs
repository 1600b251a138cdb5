//! 组合作用域
//!
//! 一个作用域是一起处理的一组候选模块和服务，通常对应一个 crate 或其中的一个模块路径。

use crate::catalog;
use crate::manifest::{ServiceDefinition, ServiceEntry};
use crate::module::{ModuleDefinition, ModuleDescriptor};
use crate::scanner::BindingStrategy;
use tracing::debug;

/// 组合作用域
#[derive(Debug, Clone)]
pub struct CompositionScope {
    name: String,
    modules: Vec<ModuleDescriptor>,
    services: Vec<ServiceEntry>,
    binding_strategy: Option<BindingStrategy>,
}

impl CompositionScope {
    /// 创建空作用域
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modules: Vec::new(),
            services: Vec::new(),
            binding_strategy: None,
        }
    }

    /// 从全局发现目录中收集模块路径位于 `prefix` 之下的模块和服务
    pub fn discover(prefix: &str) -> Self {
        let modules = catalog::modules_under(prefix);
        let services = catalog::services_under(prefix);
        debug!(
            "发现作用域 {}: {} 个模块，{} 个服务",
            prefix,
            modules.len(),
            services.len()
        );

        Self {
            name: prefix.to_string(),
            modules,
            services,
            binding_strategy: None,
        }
    }

    /// 添加模块
    pub fn with_module<M: ModuleDefinition>(self) -> Self {
        self.with_module_descriptor(ModuleDescriptor::of::<M>())
    }

    /// 添加模块描述符
    pub fn with_module_descriptor(mut self, descriptor: ModuleDescriptor) -> Self {
        if !self.modules.contains(&descriptor) {
            self.modules.push(descriptor);
        }
        self
    }

    /// 添加服务
    pub fn with_service<T: ServiceDefinition>(self) -> Self {
        self.with_entry(T::entry())
    }

    /// 添加服务条目
    pub fn with_entry(mut self, entry: ServiceEntry) -> Self {
        self.services.push(entry);
        self
    }

    /// 为该作用域指定回退绑定策略
    pub fn with_binding_strategy(mut self, strategy: BindingStrategy) -> Self {
        self.binding_strategy = Some(strategy);
        self
    }

    /// 作用域名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 候选模块（发现顺序）
    pub fn modules(&self) -> &[ModuleDescriptor] {
        &self.modules
    }

    /// 候选服务（发现顺序）
    pub fn services(&self) -> &[ServiceEntry] {
        &self.services
    }

    /// 作用域指定的绑定策略
    pub fn binding_strategy(&self) -> Option<BindingStrategy> {
        self.binding_strategy
    }

    /// 是否包含某个模块
    pub fn contains_module(&self, module: &ModuleDescriptor) -> bool {
        self.modules.contains(module)
    }
}
