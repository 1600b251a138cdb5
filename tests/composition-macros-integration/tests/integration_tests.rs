//! 派生宏与发现目录集成测试

use infrastructure_composition::prelude::*;
use infrastructure_composition::{BoxError, CapabilityMarker, TypeInfo};
use std::sync::Arc;

pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

pub trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

mod discovered {
    use super::*;

    #[derive(Default, ServiceDefinition)]
    #[service(singleton, implements(dyn Clock))]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> u64 {
            7
        }
    }

    #[derive(ServiceDefinition)]
    #[service(transient, implements(dyn Greeter), factory = ClockGreeter::create)]
    pub struct ClockGreeter {
        clock: Arc<dyn Clock>,
    }

    impl ClockGreeter {
        fn create(resolver: &mut dyn ServiceResolver) -> Result<Self, BoxError> {
            Ok(ClockGreeter {
                clock: resolver.get::<dyn Clock>()?,
            })
        }
    }

    impl Greeter for ClockGreeter {
        fn greet(&self) -> String {
            format!("现在是 {}", self.clock.now())
        }
    }

    #[derive(Default, ModuleDefinition)]
    pub struct CoreModule;

    impl Module for CoreModule {
        fn configure_services(
            &self,
            services: &mut ServiceCollection,
            _configuration: &Configuration,
        ) -> HookResult {
            services.add_instance(Arc::new(String::from("core")));
            Ok(())
        }
    }

    #[derive(ModuleDefinition)]
    #[module(depends_on(CoreModule), factory = FeatureModule::build)]
    pub struct FeatureModule {
        label: &'static str,
    }

    impl FeatureModule {
        fn build() -> Result<Self, BoxError> {
            Ok(FeatureModule { label: "feature" })
        }
    }

    impl Module for FeatureModule {
        fn configure_services(
            &self,
            services: &mut ServiceCollection,
            _configuration: &Configuration,
        ) -> HookResult {
            let label = self.label;
            services.add_factory::<&'static str, _>(Lifetime::Singleton, move |_| Ok(Arc::new(label)));
            Ok(())
        }
    }

    pub mod overrides {
        use super::super::*;

        #[derive(Default, ServiceDefinition)]
        #[service(expose(dyn Clock), lifetime = singleton, replace)]
        pub struct FrozenClock;

        impl Clock for FrozenClock {
            fn now(&self) -> u64 {
                0
            }
        }
    }
}

mod hidden {
    use super::*;

    #[derive(Default, ServiceDefinition)]
    #[service(scoped, implements(dyn Greeter), include_self, skip_discovery)]
    pub struct PoliteGreeter;

    impl Greeter for PoliteGreeter {
        fn greet(&self) -> String {
            "您好".to_string()
        }
    }
}

#[test]
fn test_service_derive_builds_manifest() {
    let entry = discovered::SystemClock::entry();
    assert_eq!(entry.implementation, TypeInfo::of::<discovered::SystemClock>());
    assert_eq!(entry.markers, vec![CapabilityMarker::Singleton]);
    assert_eq!(entry.interfaces.len(), 1);
    assert_eq!(entry.interfaces[0].service, TypeInfo::of::<dyn Clock>());
    assert!(entry.metadata.is_none());

    let entry = discovered::overrides::FrozenClock::entry();
    assert!(entry.markers.is_empty());
    assert!(entry.is_replace());
    let metadata = entry.metadata.unwrap();
    assert_eq!(metadata.lifetime, Some(Lifetime::Singleton));
    assert_eq!(metadata.services.map(|s| s.len()), Some(1));
}

#[test]
fn test_module_derive_declares_dependencies() {
    let feature = ModuleDescriptor::of::<discovered::FeatureModule>();
    assert_eq!(
        feature.dependencies(),
        vec![ModuleDescriptor::of::<discovered::CoreModule>()]
    );
    assert!(feature.instantiate().is_ok());
}

#[test]
fn test_discover_scope_by_module_path() {
    let prefix = concat!(module_path!(), "::discovered");
    let scope = CompositionScope::discover(prefix);

    assert_eq!(scope.name(), prefix);
    assert_eq!(
        scope.modules().to_vec(),
        vec![
            ModuleDescriptor::of::<discovered::CoreModule>(),
            ModuleDescriptor::of::<discovered::FeatureModule>(),
        ]
    );

    // 按 (模块路径, 类型名称) 排序，子模块排在后面
    let implementations: Vec<TypeInfo> = scope.services().iter().map(|e| e.implementation).collect();
    assert_eq!(
        implementations,
        vec![
            TypeInfo::of::<discovered::ClockGreeter>(),
            TypeInfo::of::<discovered::SystemClock>(),
            TypeInfo::of::<discovered::overrides::FrozenClock>(),
        ]
    );

    let hidden = CompositionScope::discover(concat!(module_path!(), "::hidden"));
    assert!(hidden.services().is_empty());
}

#[test]
fn test_discovered_scope_composes() {
    let provider = CompositionBuilder::new()
        .add_scope(CompositionScope::discover(concat!(module_path!(), "::discovered")))
        .build()
        .unwrap();

    assert_eq!(provider.get::<String>().unwrap().as_str(), "core");
    assert_eq!(*provider.get::<&'static str>().unwrap(), "feature");
    assert_eq!(provider.get_all::<dyn Clock>().unwrap().len(), 1);
    assert_eq!(provider.get::<dyn Greeter>().unwrap().greet(), "现在是 0");
}

#[test]
fn test_undiscovered_service_added_explicitly() {
    let provider = CompositionBuilder::new()
        .add_scope(CompositionScope::new("manual").with_service::<hidden::PoliteGreeter>())
        .build()
        .unwrap();

    let scope = provider.create_scope();
    assert_eq!(scope.get::<dyn Greeter>().unwrap().greet(), "您好");
    assert!(scope.get::<hidden::PoliteGreeter>().is_ok());
}
