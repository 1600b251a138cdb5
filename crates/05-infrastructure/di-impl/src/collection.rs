//! 服务集合
//!
//! 组合期间独占的可变构建目标，组合完成后通过 [`ServiceCollection::build_provider`] 冻结。

use crate::provider::ServiceProvider;
use di_abstractions::{ServiceDescriptor, ServiceRegistry, ServiceResolver};
use infrastructure_common::{BoxError, Lifetime, TypeInfo};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub(crate) type OptionsAction = Arc<dyn Fn(&mut dyn Any) + Send + Sync>;

/// 某个选项类型上登记的配置回调
#[derive(Clone, Default)]
pub(crate) struct OptionsActions {
    pub(crate) configure: Vec<OptionsAction>,
    pub(crate) post_configure: Vec<OptionsAction>,
}

/// 服务集合
#[derive(Default)]
pub struct ServiceCollection {
    descriptors: Vec<ServiceDescriptor>,
    options: HashMap<TypeId, OptionsActions>,
}

impl ServiceCollection {
    /// 创建空的服务集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册已有实例（单例）
    pub fn add_instance<S>(&mut self, instance: Arc<S>) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let descriptor = ServiceDescriptor::from_factory::<S, _>(
            TypeInfo::of::<S>(),
            Lifetime::Singleton,
            move |_| Ok(instance.clone()),
        );
        self.add(descriptor);
        self
    }

    /// 追加工厂注册
    pub fn add_factory<S, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&mut dyn ServiceResolver) -> Result<Arc<S>, BoxError> + Send + Sync + 'static,
    {
        let descriptor =
            ServiceDescriptor::from_factory::<S, _>(TypeInfo::of::<S>(), lifetime, factory);
        self.add(descriptor);
        self
    }

    /// 替换工厂注册
    pub fn replace_factory<S, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&mut dyn ServiceResolver) -> Result<Arc<S>, BoxError> + Send + Sync + 'static,
    {
        let descriptor =
            ServiceDescriptor::from_factory::<S, _>(TypeInfo::of::<S>(), lifetime, factory);
        self.replace(descriptor);
        self
    }

    /// 服务是否已注册
    pub fn contains<S>(&self) -> bool
    where
        S: ?Sized + 'static,
    {
        self.is_registered(TypeInfo::of::<S>())
    }

    /// 服务的注册数量
    pub fn count<S>(&self) -> usize
    where
        S: ?Sized + 'static,
    {
        self.descriptors_for(TypeInfo::of::<S>()).len()
    }

    /// 登记选项配置回调
    pub fn configure<O, F>(&mut self, action: F) -> &mut Self
    where
        O: Send + Sync + 'static,
        F: Fn(&mut O) + Send + Sync + 'static,
    {
        debug!("登记选项配置: {}", std::any::type_name::<O>());
        let action = erase_action(action);
        self.options
            .entry(TypeId::of::<O>())
            .or_default()
            .configure
            .push(action);
        self
    }

    /// 登记选项后配置回调，在所有配置回调之后执行
    pub fn post_configure<O, F>(&mut self, action: F) -> &mut Self
    where
        O: Send + Sync + 'static,
        F: Fn(&mut O) + Send + Sync + 'static,
    {
        debug!("登记选项后配置: {}", std::any::type_name::<O>());
        let action = erase_action(action);
        self.options
            .entry(TypeId::of::<O>())
            .or_default()
            .post_configure
            .push(action);
        self
    }

    /// 冻结服务集合，创建服务提供者
    pub fn build_provider(self) -> ServiceProvider {
        ServiceProvider::new(self.descriptors, self.options)
    }
}

impl ServiceRegistry for ServiceCollection {
    fn add(&mut self, descriptor: ServiceDescriptor) {
        debug!("追加服务注册: {}", descriptor);
        self.descriptors.push(descriptor);
    }

    fn replace(&mut self, descriptor: ServiceDescriptor) -> usize {
        let before = self.descriptors.len();
        self.descriptors.retain(|d| d.service != descriptor.service);
        let removed = before - self.descriptors.len();
        debug!("替换服务注册: {}，移除 {} 个已有注册", descriptor, removed);
        self.descriptors.push(descriptor);
        removed
    }

    fn descriptors(&self) -> &[ServiceDescriptor] {
        &self.descriptors
    }
}

impl std::fmt::Debug for ServiceCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCollection")
            .field("descriptors", &self.descriptors)
            .field("options", &self.options.len())
            .finish()
    }
}

fn erase_action<O, F>(action: F) -> OptionsAction
where
    O: Send + Sync + 'static,
    F: Fn(&mut O) + Send + Sync + 'static,
{
    Arc::new(move |value: &mut dyn Any| {
        if let Some(options) = value.downcast_mut::<O>() {
            action(options);
        }
    })
}
