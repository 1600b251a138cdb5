//! 服务扫描器
//!
//! 解析每个服务条目的生命周期和目标服务类型，然后按追加或替换模式提交到注册表。

use crate::manifest::{CapabilityMarker, ServiceBinding, ServiceEntry};
use di_abstractions::{RegistrationMode, ServiceDescriptor, ServiceRegistry};
use infrastructure_common::{CompositionError, CompositionResult, Lifetime, TypeInfo};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// 未显式声明目标服务类型时的回退绑定策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingStrategy {
    /// 实现的所有接口
    #[default]
    AllInterfaces,
    /// 名称后缀匹配的接口，例如 `ConsoleGreeter` 匹配 `Greeter`，`IFoo` 匹配 `Foo`
    NameSuffix,
    /// 只使用显式列表，没有回退
    ExplicitOnly,
}

impl BindingStrategy {
    fn fallback<'a>(&self, entry: &'a ServiceEntry) -> Vec<&'a ServiceBinding> {
        match self {
            Self::AllInterfaces => entry.interfaces.iter().collect(),
            Self::NameSuffix => {
                let implementation = entry.implementation.short_name();
                entry
                    .interfaces
                    .iter()
                    .filter(|b| is_suffix_match(b.service.short_name(), implementation))
                    .collect()
            }
            Self::ExplicitOnly => Vec::new(),
        }
    }
}

fn is_suffix_match(interface: &str, implementation: &str) -> bool {
    implementation.ends_with(interface) || interface.ends_with(implementation)
}

/// 一次提交的记录
#[derive(Debug, Clone)]
pub struct ServiceRegistration {
    /// 提交的描述符
    pub descriptor: ServiceDescriptor,
    /// 提交模式
    pub mode: RegistrationMode,
}

struct Plan<'a> {
    entry: &'a ServiceEntry,
    lifetime: Lifetime,
    targets: Vec<&'a ServiceBinding>,
}

/// 服务扫描器
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceScanner {
    strategy: BindingStrategy,
}

impl ServiceScanner {
    /// 创建服务扫描器
    pub fn new(strategy: BindingStrategy) -> Self {
        Self { strategy }
    }

    /// 回退绑定策略
    pub fn strategy(&self) -> BindingStrategy {
        self.strategy
    }

    /// 扫描服务条目并注册到注册表
    ///
    /// 所有条目先完成校验再开始提交，任一条目出现配置错误时注册表保持不变。
    pub fn scan<R>(
        &self,
        registry: &mut R,
        entries: &[ServiceEntry],
    ) -> CompositionResult<Vec<ServiceRegistration>>
    where
        R: ServiceRegistry + ?Sized,
    {
        let mut plans = Vec::with_capacity(entries.len());
        for entry in entries {
            match resolve_lifetime(entry)? {
                Some(lifetime) => plans.push(Plan {
                    entry,
                    lifetime,
                    targets: self.resolve_targets(entry),
                }),
                None => debug!("跳过非服务类型: {}", entry.implementation.full_name),
            }
        }

        let mut registrations = Vec::new();
        for plan in plans {
            let mode = if plan.entry.is_replace() {
                RegistrationMode::Replace
            } else {
                RegistrationMode::Append
            };

            if plan.targets.is_empty() {
                debug!(
                    "服务 {} 没有可注册的目标类型（策略: {:?}）",
                    plan.entry.implementation.full_name, self.strategy
                );
            }

            for binding in plan.targets {
                let descriptor = plan.entry.descriptor(binding, plan.lifetime);
                registrations.push(submit(registry, descriptor, mode));
            }
        }

        Ok(registrations)
    }

    /// 按指定生命周期批量注册
    ///
    /// 声明了显式目标列表的条目注册到该列表；否则只有携带该生命周期标记的条目
    /// 注册到回退目标集合。不做生命周期推断，总是追加。
    pub fn register_exposed<R>(
        &self,
        registry: &mut R,
        entries: &[ServiceEntry],
        lifetime: Lifetime,
    ) -> Vec<ServiceRegistration>
    where
        R: ServiceRegistry + ?Sized,
    {
        let marker = CapabilityMarker::for_lifetime(lifetime);
        let mut registrations = Vec::new();

        for entry in entries {
            let targets = match explicit_services(entry) {
                Some(explicit) => explicit.iter().collect(),
                None if entry.has_marker(marker) => self.strategy.fallback(entry),
                None => continue,
            };

            for binding in dedup(targets) {
                let descriptor = entry.descriptor(binding, lifetime);
                registrations.push(submit(registry, descriptor, RegistrationMode::Append));
            }
        }

        registrations
    }

    fn resolve_targets<'a>(&self, entry: &'a ServiceEntry) -> Vec<&'a ServiceBinding> {
        let mut targets = match explicit_services(entry) {
            Some(explicit) => explicit.iter().collect(),
            None => self.strategy.fallback(entry),
        };

        let include_self = entry.metadata.as_ref().is_some_and(|m| m.include_self);
        if include_self {
            targets.push(entry.self_binding());
            // 带标记时并入标记对应的全部接口，与回退策略无关
            if !entry.markers.is_empty() {
                targets.extend(entry.interfaces.iter());
            }
        }

        dedup(targets)
    }
}

fn explicit_services(entry: &ServiceEntry) -> Option<&Vec<ServiceBinding>> {
    entry.metadata.as_ref().and_then(|m| m.services.as_ref())
}

/// 解析生命周期：显式生命周期优先，其次是唯一的能力标记
///
/// 返回 `None` 表示既没有元数据也没有标记，不是服务。
fn resolve_lifetime(entry: &ServiceEntry) -> CompositionResult<Option<Lifetime>> {
    let type_name = entry.implementation.full_name;

    if let Some(lifetime) = entry.metadata.as_ref().and_then(|m| m.lifetime) {
        if let Some(marker) = entry.markers.iter().find(|m| m.lifetime() != lifetime) {
            warn!(
                "服务 {} 显式声明的生命周期 {} 覆盖了能力标记 {}",
                type_name, lifetime, marker
            );
        }
        return Ok(Some(lifetime));
    }

    match entry.markers.as_slice() {
        [marker] => Ok(Some(marker.lifetime())),
        [] if entry.metadata.is_some() => Err(CompositionError::UnresolvableLifetime {
            type_name: type_name.to_string(),
        }),
        [] => Ok(None),
        markers => Err(CompositionError::AmbiguousMarkers {
            type_name: type_name.to_string(),
            markers: markers
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

fn dedup(targets: Vec<&ServiceBinding>) -> Vec<&ServiceBinding> {
    let mut seen: Vec<TypeInfo> = Vec::with_capacity(targets.len());
    targets
        .into_iter()
        .filter(|binding| {
            if seen.contains(&binding.service) {
                false
            } else {
                seen.push(binding.service);
                true
            }
        })
        .collect()
}

fn submit<R>(
    registry: &mut R,
    descriptor: ServiceDescriptor,
    mode: RegistrationMode,
) -> ServiceRegistration
where
    R: ServiceRegistry + ?Sized,
{
    registry.submit(descriptor.clone(), mode);
    ServiceRegistration { descriptor, mode }
}
