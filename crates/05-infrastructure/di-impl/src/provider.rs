//! 服务提供者与服务作用域

use crate::collection::OptionsActions;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use di_abstractions::{
    Instance, ResolveContext, ServiceDescriptor, ServiceResolver,
};
use infrastructure_common::{DependencyError, DependencyResult, Lifetime, TypeInfo};
use once_cell::sync::OnceCell;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

struct ProviderInner {
    descriptors: Vec<ServiceDescriptor>,
    index: HashMap<TypeId, Vec<usize>>,
    singletons: Vec<OnceCell<Instance>>,
    /// 根提供者上解析的作用域服务
    root_scoped: DashMap<usize, Instance>,
    options: HashMap<TypeId, OptionsActions>,
    options_cache: DashMap<TypeId, Instance>,
}

/// 服务提供者
///
/// 冻结后的只读解析器，可在线程间共享。单例按描述符缓存，
/// 瞬时服务每次解析都创建新实例。
#[derive(Clone)]
pub struct ServiceProvider {
    inner: Arc<ProviderInner>,
}

impl ServiceProvider {
    pub(crate) fn new(
        descriptors: Vec<ServiceDescriptor>,
        options: HashMap<TypeId, OptionsActions>,
    ) -> Self {
        let mut index: HashMap<TypeId, Vec<usize>> = HashMap::new();
        for (i, descriptor) in descriptors.iter().enumerate() {
            index.entry(descriptor.service.id).or_default().push(i);
        }
        let singletons = descriptors.iter().map(|_| OnceCell::new()).collect();

        info!(
            "服务提供者构建完成，共 {} 个描述符，{} 个服务类型",
            descriptors.len(),
            index.len()
        );

        Self {
            inner: Arc::new(ProviderInner {
                descriptors,
                index,
                singletons,
                root_scoped: DashMap::new(),
                options,
                options_cache: DashMap::new(),
            }),
        }
    }

    /// 解析服务，多个注册时返回最后一个
    pub fn get<S>(&self) -> DependencyResult<Arc<S>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let mut resolution = Resolution::new(&self.inner, &self.inner.root_scoped);
        (&mut resolution as &mut dyn ServiceResolver).get::<S>()
    }

    /// 按注册顺序解析服务的所有实现
    pub fn get_all<S>(&self) -> DependencyResult<Vec<Arc<S>>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let mut resolution = Resolution::new(&self.inner, &self.inner.root_scoped);
        (&mut resolution as &mut dyn ServiceResolver).get_all::<S>()
    }

    /// 服务是否已注册
    pub fn contains<S>(&self) -> bool
    where
        S: ?Sized + 'static,
    {
        self.inner.index.contains_key(&TypeId::of::<S>())
    }

    /// 创建服务作用域
    pub fn create_scope(&self) -> ServiceScope {
        let scope = ServiceScope {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            provider: self.clone(),
            instances: DashMap::new(),
        };
        debug!("创建服务作用域: {}", scope.id);
        scope
    }

    /// 获取选项
    ///
    /// 在默认值上依次执行配置回调和后配置回调，结果按类型缓存。
    pub fn options<O>(&self) -> Arc<O>
    where
        O: Default + Send + Sync + 'static,
    {
        let key = TypeId::of::<O>();
        if let Some(cached) = self.inner.options_cache.get(&key) {
            if let Some(options) = cached.downcast_ref::<Arc<O>>() {
                return options.clone();
            }
        }

        let mut value = O::default();
        if let Some(actions) = self.inner.options.get(&key) {
            for action in actions.configure.iter().chain(&actions.post_configure) {
                action(&mut value as &mut dyn Any);
            }
        }

        let options = Arc::new(value);
        self.inner
            .options_cache
            .insert(key, Arc::new(options.clone()) as Instance);
        options
    }

    /// 按注册顺序返回所有描述符
    pub fn descriptors(&self) -> &[ServiceDescriptor] {
        &self.inner.descriptors
    }
}

impl std::fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("descriptors", &self.inner.descriptors.len())
            .field("services", &self.inner.index.len())
            .finish()
    }
}

/// 服务作用域（工作单元）
///
/// 作用域服务在同一作用域内共享，单例仍由根提供者持有。
pub struct ServiceScope {
    id: Uuid,
    created_at: DateTime<Utc>,
    provider: ServiceProvider,
    instances: DashMap<usize, Instance>,
}

impl ServiceScope {
    /// 作用域ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// 创建时间
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 所属的服务提供者
    pub fn provider(&self) -> &ServiceProvider {
        &self.provider
    }

    /// 在作用域内解析服务
    pub fn get<S>(&self) -> DependencyResult<Arc<S>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let mut resolution = Resolution::new(&self.provider.inner, &self.instances);
        (&mut resolution as &mut dyn ServiceResolver).get::<S>()
    }

    /// 在作用域内解析服务的所有实现
    pub fn get_all<S>(&self) -> DependencyResult<Vec<Arc<S>>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let mut resolution = Resolution::new(&self.provider.inner, &self.instances);
        (&mut resolution as &mut dyn ServiceResolver).get_all::<S>()
    }
}

impl std::fmt::Debug for ServiceScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceScope")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("instances", &self.instances.len())
            .finish()
    }
}

/// 一次解析调用的状态
struct Resolution<'a> {
    inner: &'a ProviderInner,
    scoped: &'a DashMap<usize, Instance>,
    context: ResolveContext,
}

impl<'a> Resolution<'a> {
    fn new(inner: &'a ProviderInner, scoped: &'a DashMap<usize, Instance>) -> Self {
        Self {
            inner,
            scoped,
            context: ResolveContext::new(),
        }
    }

    fn indices(&self, service: TypeInfo) -> Option<&'a [usize]> {
        self.inner.index.get(&service.id).map(Vec::as_slice)
    }

    fn resolve_descriptor(&mut self, index: usize) -> DependencyResult<Instance> {
        let inner = self.inner;
        let descriptor = &inner.descriptors[index];

        match descriptor.lifetime {
            Lifetime::Singleton => {
                if let Some(instance) = inner.singletons[index].get() {
                    return Ok(instance.clone());
                }
                // 单例的依赖从根提供者解析，避免持有某个作用域的实例
                let scoped = std::mem::replace(&mut self.scoped, &inner.root_scoped);
                let result = inner.singletons[index]
                    .get_or_try_init(|| descriptor.activate(&mut *self))
                    .cloned();
                self.scoped = scoped;
                result
            }
            Lifetime::Scoped => {
                if let Some(instance) = self.scoped.get(&index) {
                    return Ok(instance.value().clone());
                }
                let created = descriptor.activate(&mut *self)?;
                Ok(self.scoped.entry(index).or_insert(created).value().clone())
            }
            Lifetime::Transient => descriptor.activate(&mut *self),
        }
    }
}

impl ServiceResolver for Resolution<'_> {
    fn resolve_instance(&mut self, service: TypeInfo) -> DependencyResult<Instance> {
        let index = self
            .indices(service)
            .and_then(|indices| indices.last().copied())
            .ok_or_else(|| DependencyError::ServiceNotRegistered {
                type_name: service.full_name.to_string(),
            })?;

        self.context.push(service)?;
        let result = self.resolve_descriptor(index);
        self.context.pop();
        result
    }

    fn resolve_all_instances(&mut self, service: TypeInfo) -> DependencyResult<Vec<Instance>> {
        let Some(indices) = self.indices(service) else {
            return Ok(Vec::new());
        };

        self.context.push(service)?;
        let result = indices
            .iter()
            .map(|&index| self.resolve_descriptor(index))
            .collect();
        self.context.pop();
        result
    }

    fn is_registered(&self, service: TypeInfo) -> bool {
        self.inner.index.contains_key(&service.id)
    }
}
