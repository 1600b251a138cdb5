//! 服务描述符

use crate::resolver::ServiceResolver;
use infrastructure_common::{BoxError, DependencyError, DependencyResult, Lifetime, TypeInfo};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 类型擦除后的服务实例，内部保存的是 `Arc<S>`（`S` 为服务类型）
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 激活函数类型
pub type ActivatorFn =
    Arc<dyn Fn(&mut dyn ServiceResolver) -> DependencyResult<Instance> + Send + Sync>;

/// 服务描述符
///
/// 提交给容器的最小单元：服务类型、实现类型、生命周期以及创建实例的激活函数。
#[derive(Clone)]
pub struct ServiceDescriptor {
    /// 服务类型（解析时使用的键）
    pub service: TypeInfo,
    /// 实现类型
    pub implementation: TypeInfo,
    /// 生命周期
    pub lifetime: Lifetime,
    activator: ActivatorFn,
}

impl ServiceDescriptor {
    /// 创建服务描述符
    pub fn new(
        service: TypeInfo,
        implementation: TypeInfo,
        lifetime: Lifetime,
        activator: ActivatorFn,
    ) -> Self {
        Self {
            service,
            implementation,
            lifetime,
            activator,
        }
    }

    /// 从返回 `Arc<S>` 的工厂创建描述符
    pub fn from_factory<S, F>(implementation: TypeInfo, lifetime: Lifetime, factory: F) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&mut dyn ServiceResolver) -> Result<Arc<S>, BoxError> + Send + Sync + 'static,
    {
        let activator: ActivatorFn = Arc::new(move |resolver: &mut dyn ServiceResolver| {
            factory(resolver)
                .map(|service| Arc::new(service) as Instance)
                .map_err(|e| into_dependency_error(implementation.full_name, e))
        });
        Self::new(TypeInfo::of::<S>(), implementation, lifetime, activator)
    }

    /// 使用给定解析器创建实例
    pub fn activate(&self, resolver: &mut dyn ServiceResolver) -> DependencyResult<Instance> {
        (self.activator)(resolver)
    }

    /// 是否为自注册（服务类型即实现类型）
    pub fn is_self_binding(&self) -> bool {
        self.service == self.implementation
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("service", &self.service.full_name)
            .field("implementation", &self.implementation.full_name)
            .field("lifetime", &self.lifetime)
            .field("activator", &"<function>")
            .finish()
    }
}

impl fmt::Display for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} ({})",
            self.service.short_name(),
            self.implementation.short_name(),
            self.lifetime
        )
    }
}

/// 将工厂错误转换为依赖注入错误
///
/// 嵌套解析产生的 `DependencyError` 原样返回，其他错误包装为 `ComponentCreationFailed`。
pub fn into_dependency_error(type_name: &str, error: BoxError) -> DependencyError {
    match error.downcast::<DependencyError>() {
        Ok(inner) => *inner,
        Err(other) => DependencyError::creation_failed(type_name, other),
    }
}
