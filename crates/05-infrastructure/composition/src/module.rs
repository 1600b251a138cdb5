//! 模块定义
//!
//! 模块是带有三个有序配置钩子和前置模块声明的组合单元。

use config_impl::Configuration;
use di_impl::ServiceCollection;
use infrastructure_common::{BoxError, CompositionError, CompositionResult, HookPhase, TypeInfo};
use std::fmt;
use tracing::debug;

/// 钩子返回类型
pub type HookResult = Result<(), BoxError>;

/// 模块 trait
///
/// 三个钩子按 预配置 -> 配置 -> 后配置 的顺序各执行一次，默认什么都不做。
pub trait Module: Send + Sync + 'static {
    /// 预配置服务
    fn pre_configure_services(
        &self,
        _services: &mut ServiceCollection,
        _configuration: &Configuration,
    ) -> HookResult {
        Ok(())
    }

    /// 配置服务
    fn configure_services(
        &self,
        _services: &mut ServiceCollection,
        _configuration: &Configuration,
    ) -> HookResult {
        Ok(())
    }

    /// 后配置服务
    fn post_configure_services(
        &self,
        _services: &mut ServiceCollection,
        _configuration: &Configuration,
    ) -> HookResult {
        Ok(())
    }
}

/// 可被模块加载器实例化的模块类型
pub trait ModuleDefinition: Module + Sized {
    /// 前置模块，按声明顺序加载
    fn depends_on() -> Vec<ModuleDescriptor> {
        Vec::new()
    }

    /// 创建模块实例
    fn create() -> Result<Self, BoxError>;
}

/// 模块描述符
///
/// 只保存函数指针，依赖的模块在需要时才构造描述符和实例。
#[derive(Clone, Copy)]
pub struct ModuleDescriptor {
    /// 模块类型
    pub type_info: TypeInfo,
    depends_on: fn() -> Vec<ModuleDescriptor>,
    create: fn() -> Result<Box<dyn Module>, BoxError>,
}

impl ModuleDescriptor {
    /// 模块类型的描述符
    pub fn of<M: ModuleDefinition>() -> Self {
        Self {
            type_info: TypeInfo::of::<M>(),
            depends_on: M::depends_on,
            create: create_boxed::<M>,
        }
    }

    /// 前置模块
    pub fn dependencies(&self) -> Vec<ModuleDescriptor> {
        (self.depends_on)()
    }

    /// 创建模块实例
    pub fn instantiate(&self) -> Result<Box<dyn Module>, BoxError> {
        (self.create)()
    }

    /// 模块简短名称
    pub fn name(&self) -> &'static str {
        self.type_info.short_name()
    }
}

impl PartialEq for ModuleDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.type_info == other.type_info
    }
}

impl Eq for ModuleDescriptor {}

impl fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModuleDescriptor")
            .field(&self.type_info.full_name)
            .finish()
    }
}

fn create_boxed<M: ModuleDefinition>() -> Result<Box<dyn Module>, BoxError> {
    Ok(Box::new(M::create()?))
}

/// 已实例化的模块
pub struct LoadedModule {
    descriptor: ModuleDescriptor,
    instance: Box<dyn Module>,
    scope: String,
}

impl LoadedModule {
    pub(crate) fn new(descriptor: ModuleDescriptor, instance: Box<dyn Module>, scope: &str) -> Self {
        Self {
            descriptor,
            instance,
            scope: scope.to_string(),
        }
    }

    /// 模块类型
    pub fn type_info(&self) -> TypeInfo {
        self.descriptor.type_info
    }

    /// 模块描述符
    pub fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    /// 实例化该模块的作用域名称
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// 模块实例
    pub fn instance(&self) -> &dyn Module {
        self.instance.as_ref()
    }

    /// 执行某个阶段的钩子
    pub fn run_hook(
        &self,
        phase: HookPhase,
        services: &mut ServiceCollection,
        configuration: &Configuration,
    ) -> CompositionResult<()> {
        debug!("执行模块钩子: {}::{}", self.descriptor.name(), phase);

        let result = match phase {
            HookPhase::PreConfigure => self.instance.pre_configure_services(services, configuration),
            HookPhase::Configure => self.instance.configure_services(services, configuration),
            HookPhase::PostConfigure => {
                self.instance.post_configure_services(services, configuration)
            }
        };

        result.map_err(|source| CompositionError::HookFailed {
            module: self.descriptor.type_info.full_name.to_string(),
            phase,
            source,
        })
    }

    /// 按顺序执行全部三个钩子
    pub fn run_hooks(
        &self,
        services: &mut ServiceCollection,
        configuration: &Configuration,
    ) -> CompositionResult<()> {
        for phase in [
            HookPhase::PreConfigure,
            HookPhase::Configure,
            HookPhase::PostConfigure,
        ] {
            self.run_hook(phase, services, configuration)?;
        }
        Ok(())
    }
}

impl fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModule")
            .field("module", &self.descriptor.type_info.full_name)
            .field("scope", &self.scope)
            .finish()
    }
}
