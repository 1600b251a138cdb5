//! # 依赖注入具体实现
//!
//! 提供组合期间使用的服务集合，以及组合完成后冻结得到的服务提供者和服务作用域。

pub mod collection;
pub mod provider;

pub use collection::*;
pub use provider::*;

#[cfg(test)]
mod tests {
    use super::*;
    use di_abstractions::{ServiceRegistry, ServiceResolver};
    use infrastructure_common::{BoxError, DependencyError, Lifetime};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    trait Clock: Send + Sync {
        fn now(&self) -> u64;
    }

    struct FixedClock(u64);

    impl Clock for FixedClock {
        fn now(&self) -> u64 {
            self.0
        }
    }

    struct Greeter {
        clock: Arc<dyn Clock>,
    }

    fn fixed_clock(
        value: u64,
    ) -> impl Fn(&mut dyn ServiceResolver) -> Result<Arc<dyn Clock>, BoxError> + Send + Sync + 'static
    {
        move |_| Ok(Arc::new(FixedClock(value)) as Arc<dyn Clock>)
    }

    #[test]
    fn test_last_registration_wins_and_get_all_keeps_order() {
        let mut services = ServiceCollection::new();
        services.add_factory::<dyn Clock, _>(Lifetime::Singleton, fixed_clock(1));
        services.add_factory::<dyn Clock, _>(Lifetime::Singleton, fixed_clock(2));
        assert_eq!(services.count::<dyn Clock>(), 2);

        let provider = services.build_provider();
        assert_eq!(provider.get::<dyn Clock>().unwrap().now(), 2);

        let all: Vec<u64> = provider
            .get_all::<dyn Clock>()
            .unwrap()
            .iter()
            .map(|c| c.now())
            .collect();
        assert_eq!(all, vec![1, 2]);
    }

    #[test]
    fn test_replace_factory_removes_previous() {
        let mut services = ServiceCollection::new();
        services.add_factory::<dyn Clock, _>(Lifetime::Singleton, fixed_clock(1));
        services.add_factory::<dyn Clock, _>(Lifetime::Singleton, fixed_clock(2));
        services.replace_factory::<dyn Clock, _>(Lifetime::Transient, fixed_clock(3));
        assert_eq!(services.count::<dyn Clock>(), 1);

        let provider = services.build_provider();
        assert_eq!(provider.get_all::<dyn Clock>().unwrap().len(), 1);
        assert_eq!(provider.get::<dyn Clock>().unwrap().now(), 3);
    }

    #[test]
    fn test_lifetimes() {
        let created = Arc::new(AtomicUsize::new(0));
        let mut services = ServiceCollection::new();

        let counter = created.clone();
        services.add_factory::<FixedClock, _>(Lifetime::Scoped, move |_| {
            Ok(Arc::new(FixedClock(counter.fetch_add(1, Ordering::SeqCst) as u64)))
        });
        services.add_factory::<String, _>(Lifetime::Transient, |_| Ok(Arc::new("tick".to_string())));
        services.add_instance::<u32>(Arc::new(7));

        let provider = services.build_provider();

        let scope_a = provider.create_scope();
        let scope_b = provider.create_scope();
        assert_ne!(scope_a.id(), scope_b.id());

        let a1 = scope_a.get::<FixedClock>().unwrap();
        let a2 = scope_a.get::<FixedClock>().unwrap();
        let b1 = scope_b.get::<FixedClock>().unwrap();
        assert!(Arc::ptr_eq(&a1, &a2));
        assert!(!Arc::ptr_eq(&a1, &b1));
        assert_eq!(created.load(Ordering::SeqCst), 2);

        let t1 = provider.get::<String>().unwrap();
        let t2 = provider.get::<String>().unwrap();
        assert!(!Arc::ptr_eq(&t1, &t2));

        let s1 = scope_a.get::<u32>().unwrap();
        let s2 = provider.get::<u32>().unwrap();
        assert!(Arc::ptr_eq(&s1, &s2));
    }

    #[test]
    fn test_factory_resolves_dependencies() {
        let mut services = ServiceCollection::new();
        services.add_factory::<dyn Clock, _>(Lifetime::Singleton, fixed_clock(42));
        services.add_factory::<Greeter, _>(Lifetime::Transient, |resolver| {
            Ok(Arc::new(Greeter {
                clock: resolver.get::<dyn Clock>()?,
            }))
        });

        let provider = services.build_provider();
        let greeter = provider.get::<Greeter>().unwrap();
        assert_eq!(greeter.clock.now(), 42);
    }

    #[test]
    fn test_missing_dependency_passes_through() {
        let mut services = ServiceCollection::new();
        services.add_factory::<Greeter, _>(Lifetime::Transient, |resolver| {
            Ok(Arc::new(Greeter {
                clock: resolver.get::<dyn Clock>()?,
            }))
        });

        let provider = services.build_provider();
        assert!(matches!(
            provider.get::<Greeter>(),
            Err(DependencyError::ServiceNotRegistered { .. })
        ));
    }

    #[test]
    fn test_resolution_cycle_is_reported() {
        struct Left(#[allow(dead_code)] Arc<Right>);
        struct Right(#[allow(dead_code)] Arc<Left>);

        let mut services = ServiceCollection::new();
        services.add_factory::<Left, _>(Lifetime::Singleton, |r| Ok(Arc::new(Left(r.get()?))));
        services.add_factory::<Right, _>(Lifetime::Singleton, |r| Ok(Arc::new(Right(r.get()?))));

        let provider = services.build_provider();
        match provider.get::<Left>() {
            Err(DependencyError::CircularDependency { dependency_chain }) => {
                assert_eq!(dependency_chain, "Left -> Right -> Left")
            }
            other => panic!("应该检测到循环依赖: {:?}", other.map(|_| ())),
        }
    }

    #[derive(Debug, Default)]
    struct PoolOptions {
        size: usize,
        name: String,
    }

    #[test]
    fn test_options_configure_then_post_configure() {
        let mut services = ServiceCollection::new();
        services.post_configure::<PoolOptions, _>(|o| o.size *= 2);
        services.configure::<PoolOptions, _>(|o| o.size = 4);
        services.configure::<PoolOptions, _>(|o| o.name = "primary".to_string());

        let provider = services.build_provider();
        let options = provider.options::<PoolOptions>();
        assert_eq!(options.size, 8);
        assert_eq!(options.name, "primary");
        assert!(Arc::ptr_eq(&options, &provider.options::<PoolOptions>()));
    }

    #[test]
    fn test_registry_view() {
        let mut services = ServiceCollection::new();
        assert!(services.is_empty());
        services.add_instance::<dyn Clock>(Arc::new(FixedClock(0)));
        assert!(services.contains::<dyn Clock>());
        assert!(!services.contains::<Greeter>());
        assert_eq!(services.len(), 1);
        assert!(services.descriptors()[0].is_self_binding());
    }
}
