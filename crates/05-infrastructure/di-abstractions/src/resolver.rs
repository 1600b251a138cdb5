//! 服务解析器抽象接口
//!
//! 工厂在创建实例时通过解析器获取自身依赖。

use crate::descriptor::Instance;
use infrastructure_common::{DependencyError, DependencyResult, TypeInfo};
use std::sync::Arc;

/// 服务解析器 trait
///
/// 对象安全，泛型便捷方法定义在 `dyn ServiceResolver` 上。
pub trait ServiceResolver {
    /// 解析服务类型的最后一个注册
    fn resolve_instance(&mut self, service: TypeInfo) -> DependencyResult<Instance>;

    /// 按注册顺序解析服务类型的所有注册
    fn resolve_all_instances(&mut self, service: TypeInfo) -> DependencyResult<Vec<Instance>>;

    /// 服务类型是否已注册
    fn is_registered(&self, service: TypeInfo) -> bool;
}

impl dyn ServiceResolver + '_ {
    /// 解析服务
    pub fn get<S>(&mut self) -> DependencyResult<Arc<S>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let instance = self.resolve_instance(TypeInfo::of::<S>())?;
        downcast_instance::<S>(&instance)
    }

    /// 解析服务的所有实现
    pub fn get_all<S>(&mut self) -> DependencyResult<Vec<Arc<S>>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.resolve_all_instances(TypeInfo::of::<S>())?
            .iter()
            .map(downcast_instance::<S>)
            .collect()
    }

    /// 服务是否已注册
    pub fn contains<S>(&self) -> bool
    where
        S: ?Sized + 'static,
    {
        self.is_registered(TypeInfo::of::<S>())
    }
}

/// 将类型擦除的实例还原为 `Arc<S>`
pub fn downcast_instance<S>(instance: &Instance) -> DependencyResult<Arc<S>>
where
    S: ?Sized + Send + Sync + 'static,
{
    instance
        .downcast_ref::<Arc<S>>()
        .cloned()
        .ok_or_else(|| DependencyError::TypeMismatch {
            expected: std::any::type_name::<S>().to_string(),
        })
}

/// 解析上下文
///
/// 记录当前解析链，同一服务类型在链上再次出现即为循环依赖。
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    chain: Vec<TypeInfo>,
}

impl ResolveContext {
    /// 创建新的解析上下文
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加类型到解析链
    pub fn push(&mut self, service: TypeInfo) -> DependencyResult<()> {
        if self.chain.contains(&service) {
            let dependency_chain = self
                .chain
                .iter()
                .chain(std::iter::once(&service))
                .map(TypeInfo::short_name)
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(DependencyError::CircularDependency { dependency_chain });
        }
        self.chain.push(service);
        Ok(())
    }

    /// 从解析链中移除最后一个类型
    pub fn pop(&mut self) {
        self.chain.pop();
    }

    /// 当前解析深度
    pub fn depth(&self) -> usize {
        self.chain.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Clock: Send + Sync {}
    struct SystemClock;
    impl Clock for SystemClock {}
    struct Greeter;
    struct Formatter;

    #[test]
    fn test_cycle_reports_chain() {
        let mut context = ResolveContext::new();
        context.push(TypeInfo::of::<Greeter>()).unwrap();
        context.push(TypeInfo::of::<Formatter>()).unwrap();
        assert_eq!(context.depth(), 2);

        match context.push(TypeInfo::of::<Greeter>()) {
            Err(DependencyError::CircularDependency { dependency_chain }) => {
                assert_eq!(dependency_chain, "Greeter -> Formatter -> Greeter")
            }
            other => panic!("应该检测到循环依赖: {:?}", other),
        }

        context.pop();
        context.pop();
        assert_eq!(context.depth(), 0);
    }

    #[test]
    fn test_downcast_instance() {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let instance: Instance = Arc::new(clock);

        assert!(downcast_instance::<dyn Clock>(&instance).is_ok());
        assert!(matches!(
            downcast_instance::<SystemClock>(&instance),
            Err(DependencyError::TypeMismatch { .. })
        ));
    }
}
