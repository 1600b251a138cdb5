//! 服务清单
//!
//! 服务通过 [`ServiceManifest`] 在组合时声明自己实现的接口、能力标记和显式元数据。
//! `implements` / `expose` 接收的转换函数 `fn(Arc<T>) -> Arc<S>` 依赖编译器的
//! unsizing 转换，因此只有 `T` 真正实现了 `S` 时清单才能通过编译。

use di_abstractions::{
    into_dependency_error, ActivatorFn, Instance, ServiceDescriptor, ServiceResolver,
};
use infrastructure_common::{
    BoxError, DependencyError, Lifetime, ScopedDependency, SingletonDependency,
    TransientDependency, TypeInfo,
};
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// 创建实现类型实例的工厂，返回值内部是 `Arc<T>`
pub type ServiceFactory =
    Arc<dyn Fn(&mut dyn ServiceResolver) -> Result<Arc<dyn Any + Send + Sync>, BoxError> + Send + Sync>;

type ConvertFn = Arc<dyn Fn(Arc<dyn Any + Send + Sync>) -> Option<Instance> + Send + Sync>;

/// 能力标记
///
/// 实现类型声明的默认生命周期。标记只能通过对应的 trait 约束记录到清单中。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityMarker {
    /// 单例标记
    Singleton,
    /// 作用域标记
    Scoped,
    /// 瞬时标记
    Transient,
}

impl CapabilityMarker {
    /// 标记对应的生命周期
    pub fn lifetime(self) -> Lifetime {
        match self {
            Self::Singleton => Lifetime::Singleton,
            Self::Scoped => Lifetime::Scoped,
            Self::Transient => Lifetime::Transient,
        }
    }

    /// 生命周期对应的标记
    pub fn for_lifetime(lifetime: Lifetime) -> Self {
        match lifetime {
            Lifetime::Singleton => Self::Singleton,
            Lifetime::Scoped => Self::Scoped,
            Lifetime::Transient => Self::Transient,
        }
    }
}

impl fmt::Display for CapabilityMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Singleton => "SingletonDependency",
            Self::Scoped => "ScopedDependency",
            Self::Transient => "TransientDependency",
        };
        f.write_str(name)
    }
}

/// 服务绑定：目标服务类型以及从实现实例到服务实例的转换
#[derive(Clone)]
pub struct ServiceBinding {
    /// 目标服务类型
    pub service: TypeInfo,
    convert: ConvertFn,
}

impl ServiceBinding {
    /// 创建绑定
    pub fn new<T, S>(cast: fn(Arc<T>) -> Arc<S>) -> Self
    where
        T: Send + Sync + 'static,
        S: ?Sized + Send + Sync + 'static,
    {
        let convert: ConvertFn = Arc::new(move |instance: Arc<dyn Any + Send + Sync>| {
            instance
                .downcast::<T>()
                .ok()
                .map(|implementation| Arc::new(cast(implementation)) as Instance)
        });
        Self {
            service: TypeInfo::of::<S>(),
            convert,
        }
    }

    /// 实现类型自身的绑定
    pub fn of_self<T>() -> Self
    where
        T: Send + Sync + 'static,
    {
        Self::new::<T, T>(|implementation| implementation)
    }
}

impl fmt::Debug for ServiceBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ServiceBinding")
            .field(&self.service.full_name)
            .finish()
    }
}

/// 显式声明的元数据
///
/// 所有字段都是可选的；只要任一声明存在，元数据就存在。
#[derive(Debug, Clone, Default)]
pub struct ServiceMetadata {
    /// 显式目标服务类型列表
    pub services: Option<Vec<ServiceBinding>>,
    /// 显式生命周期
    pub lifetime: Option<Lifetime>,
    /// 是否同时注册实现类型自身
    pub include_self: bool,
    /// 是否替换同一服务类型的已有注册
    pub replace: bool,
}

/// 类型擦除后的服务条目，由服务扫描器消费
#[derive(Clone)]
pub struct ServiceEntry {
    /// 实现类型
    pub implementation: TypeInfo,
    /// 能力标记（去重，按声明顺序）
    pub markers: Vec<CapabilityMarker>,
    /// 实现的接口（不包含能力标记本身）
    pub interfaces: Vec<ServiceBinding>,
    /// 显式元数据
    pub metadata: Option<ServiceMetadata>,
    self_binding: ServiceBinding,
    factory: ServiceFactory,
}

impl ServiceEntry {
    /// 实现类型自身的绑定
    pub fn self_binding(&self) -> &ServiceBinding {
        &self.self_binding
    }

    /// 是否替换已有注册
    pub fn is_replace(&self) -> bool {
        self.metadata.as_ref().is_some_and(|m| m.replace)
    }

    /// 是否携带指定标记
    pub fn has_marker(&self, marker: CapabilityMarker) -> bool {
        self.markers.contains(&marker)
    }

    /// 为某个绑定创建服务描述符
    pub fn descriptor(&self, binding: &ServiceBinding, lifetime: Lifetime) -> ServiceDescriptor {
        let factory = self.factory.clone();
        let convert = binding.convert.clone();
        let implementation = self.implementation;
        let service = binding.service;

        let activator: ActivatorFn = Arc::new(move |resolver: &mut dyn ServiceResolver| {
            let instance = factory(resolver)
                .map_err(|e| into_dependency_error(implementation.full_name, e))?;
            convert(instance).ok_or_else(|| DependencyError::TypeMismatch {
                expected: service.full_name.to_string(),
            })
        });

        ServiceDescriptor::new(service, implementation, lifetime, activator)
    }
}

impl fmt::Debug for ServiceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceEntry")
            .field("implementation", &self.implementation.full_name)
            .field("markers", &self.markers)
            .field("interfaces", &self.interfaces)
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// 服务清单构建器
pub struct ServiceManifest<T> {
    factory: ServiceFactory,
    markers: Vec<CapabilityMarker>,
    interfaces: Vec<ServiceBinding>,
    metadata: Option<ServiceMetadata>,
    _implementation: PhantomData<fn() -> T>,
}

impl<T> ServiceManifest<T>
where
    T: Send + Sync + 'static,
{
    /// 使用工厂创建清单，工厂可通过解析器获取依赖
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&mut dyn ServiceResolver) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let factory: ServiceFactory = Arc::new(move |resolver: &mut dyn ServiceResolver| {
            factory(resolver).map(|implementation| Arc::new(implementation) as Arc<dyn Any + Send + Sync>)
        });
        Self {
            factory,
            markers: Vec::new(),
            interfaces: Vec::new(),
            metadata: None,
            _implementation: PhantomData,
        }
    }

    /// 使用 `Default` 创建实例
    pub fn with_default() -> Self
    where
        T: Default,
    {
        Self::new(|_| Ok(T::default()))
    }

    /// 声明实现的接口
    pub fn implements<S>(mut self, cast: fn(Arc<T>) -> Arc<S>) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.interfaces.push(ServiceBinding::new(cast));
        self
    }

    /// 单例能力标记
    pub fn singleton_marker(self) -> Self
    where
        T: SingletonDependency,
    {
        self.with_marker(CapabilityMarker::Singleton)
    }

    /// 作用域能力标记
    pub fn scoped_marker(self) -> Self
    where
        T: ScopedDependency,
    {
        self.with_marker(CapabilityMarker::Scoped)
    }

    /// 瞬时能力标记
    pub fn transient_marker(self) -> Self
    where
        T: TransientDependency,
    {
        self.with_marker(CapabilityMarker::Transient)
    }

    /// 显式目标服务类型
    pub fn expose<S>(mut self, cast: fn(Arc<T>) -> Arc<S>) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.metadata_mut()
            .services
            .get_or_insert_with(Vec::new)
            .push(ServiceBinding::new(cast));
        self
    }

    /// 显式生命周期
    pub fn lifetime(mut self, lifetime: Lifetime) -> Self {
        self.metadata_mut().lifetime = Some(lifetime);
        self
    }

    /// 同时注册实现类型自身
    pub fn include_self(mut self) -> Self {
        self.metadata_mut().include_self = true;
        self
    }

    /// 替换同一服务类型的已有注册
    pub fn replace(mut self) -> Self {
        self.metadata_mut().replace = true;
        self
    }

    /// 构建类型擦除的服务条目
    pub fn build(self) -> ServiceEntry {
        ServiceEntry {
            implementation: TypeInfo::of::<T>(),
            markers: self.markers,
            interfaces: self.interfaces,
            metadata: self.metadata,
            self_binding: ServiceBinding::of_self::<T>(),
            factory: self.factory,
        }
    }

    fn with_marker(mut self, marker: CapabilityMarker) -> Self {
        if !self.markers.contains(&marker) {
            self.markers.push(marker);
        }
        self
    }

    fn metadata_mut(&mut self) -> &mut ServiceMetadata {
        self.metadata.get_or_insert_with(ServiceMetadata::default)
    }
}

/// 可被组合引擎扫描的服务类型
pub trait ServiceDefinition: Send + Sync + Sized + 'static {
    /// 服务清单
    fn manifest() -> ServiceManifest<Self>;

    /// 类型擦除的服务条目
    fn entry() -> ServiceEntry {
        Self::manifest().build()
    }
}
