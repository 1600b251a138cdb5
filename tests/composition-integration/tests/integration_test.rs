//! 组合引擎端到端集成测试
//!
//! 类库作用域提供默认实现，宿主作用域在之后组合并覆盖其中一部分。

use infrastructure_composition::prelude::*;
use infrastructure_composition::{
    BoxError, CompositionError, DependencyError, HookPhase, TypeInfo,
};
use serde::Deserialize;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ---------- 服务接口 ----------

trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

trait OrderRepository: Send + Sync {
    fn describe(&self) -> String;
}

trait AuditLog: Send + Sync {
    fn sequence(&self) -> usize;
}

trait Notifier: Send + Sync {
    fn channel(&self) -> &'static str;
}

// ---------- 类库默认实现 ----------

#[derive(Default)]
struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        1
    }
}

impl SingletonDependency for SystemClock {}

impl ServiceDefinition for SystemClock {
    fn manifest() -> ServiceManifest<Self> {
        ServiceManifest::with_default()
            .implements::<dyn Clock>(|s| s)
            .singleton_marker()
    }
}

struct MemoryOrderRepository {
    clock: Arc<dyn Clock>,
}

impl OrderRepository for MemoryOrderRepository {
    fn describe(&self) -> String {
        format!("memory@{}", self.clock.now())
    }
}

impl ScopedDependency for MemoryOrderRepository {}

impl ServiceDefinition for MemoryOrderRepository {
    fn manifest() -> ServiceManifest<Self> {
        ServiceManifest::new(|resolver| {
            let clock = resolver.get::<dyn Clock>()?;
            Ok(MemoryOrderRepository { clock })
        })
        .implements::<dyn OrderRepository>(|s| s)
        .scoped_marker()
    }
}

static AUDIT_SEQUENCE: AtomicUsize = AtomicUsize::new(0);

struct SequentialJournal {
    sequence: usize,
}

impl AuditLog for SequentialJournal {
    fn sequence(&self) -> usize {
        self.sequence
    }
}

impl TransientDependency for SequentialJournal {}

impl ServiceDefinition for SequentialJournal {
    fn manifest() -> ServiceManifest<Self> {
        ServiceManifest::new(|_| {
            Ok(SequentialJournal {
                sequence: AUDIT_SEQUENCE.fetch_add(1, Ordering::SeqCst),
            })
        })
        .implements::<dyn AuditLog>(|s| s)
        .transient_marker()
    }
}

#[derive(Default)]
struct EmailNotifier;

impl Notifier for EmailNotifier {
    fn channel(&self) -> &'static str {
        "email"
    }
}

impl SingletonDependency for EmailNotifier {}

impl ServiceDefinition for EmailNotifier {
    fn manifest() -> ServiceManifest<Self> {
        ServiceManifest::with_default()
            .implements::<dyn Notifier>(|s| s)
            .singleton_marker()
    }
}

#[derive(Debug, Default, Deserialize)]
struct StoreSettings {
    name: String,
    #[serde(default)]
    max_orders: usize,
}

/// 类库模块：绑定配置节
#[derive(Default)]
struct StoreModule;

impl Module for StoreModule {
    fn configure_services(
        &self,
        services: &mut ServiceCollection,
        configuration: &Configuration,
    ) -> HookResult {
        let settings: StoreSettings = configuration.bind("store")?;
        services.add_instance(Arc::new(settings));
        Ok(())
    }
}

impl ModuleDefinition for StoreModule {
    fn create() -> Result<Self, BoxError> {
        Ok(StoreModule)
    }
}

// ---------- 宿主覆盖 ----------

#[derive(Default)]
struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        42
    }
}

impl ServiceDefinition for FixedClock {
    fn manifest() -> ServiceManifest<Self> {
        ServiceManifest::with_default()
            .expose::<dyn Clock>(|s| s)
            .lifetime(Lifetime::Singleton)
            .replace()
    }
}

#[derive(Default)]
struct SmsNotifier;

impl Notifier for SmsNotifier {
    fn channel(&self) -> &'static str {
        "sms"
    }
}

impl SingletonDependency for SmsNotifier {}

impl ServiceDefinition for SmsNotifier {
    fn manifest() -> ServiceManifest<Self> {
        ServiceManifest::with_default()
            .implements::<dyn Notifier>(|s| s)
            .singleton_marker()
    }
}

/// 宿主模块：依赖类库模块，在后配置阶段调整选项
#[derive(Default)]
struct HostModule;

#[derive(Debug, Default)]
struct HostOptions {
    stages: Vec<&'static str>,
}

impl Module for HostModule {
    fn pre_configure_services(
        &self,
        services: &mut ServiceCollection,
        _configuration: &Configuration,
    ) -> HookResult {
        services.configure::<HostOptions, _>(|o| o.stages.push("configure"));
        Ok(())
    }

    fn post_configure_services(
        &self,
        services: &mut ServiceCollection,
        _configuration: &Configuration,
    ) -> HookResult {
        services.post_configure::<HostOptions, _>(|o| o.stages.push("post_configure"));
        Ok(())
    }
}

impl ModuleDefinition for HostModule {
    fn depends_on() -> Vec<ModuleDescriptor> {
        vec![ModuleDescriptor::of::<StoreModule>()]
    }

    fn create() -> Result<Self, BoxError> {
        Ok(HostModule)
    }
}

fn library_scope() -> CompositionScope {
    CompositionScope::new("library")
        .with_module::<StoreModule>()
        .with_service::<SystemClock>()
        .with_service::<MemoryOrderRepository>()
        .with_service::<SequentialJournal>()
        .with_service::<EmailNotifier>()
}

fn host_scope() -> CompositionScope {
    CompositionScope::new("host")
        .with_module::<HostModule>()
        .with_service::<FixedClock>()
        .with_service::<SmsNotifier>()
}

fn store_configuration() -> Configuration {
    Configuration::builder()
        .add_toml_str("[store]\nname = \"北京门店\"\nmax_orders = 16")
        .build()
        .unwrap()
}

#[test]
fn test_host_overrides_library_defaults() {
    let provider = CompositionBuilder::new()
        .with_configuration(store_configuration())
        .add_scope(library_scope())
        .add_scope(host_scope())
        .build()
        .unwrap();

    // 替换声明只留下宿主的时钟
    assert_eq!(provider.get_all::<dyn Clock>().unwrap().len(), 1);
    assert_eq!(provider.get::<dyn Clock>().unwrap().now(), 42);

    // 追加声明保留两个通知实现，最后注册的生效
    let notifiers = provider.get_all::<dyn Notifier>().unwrap();
    let channels: Vec<&str> = notifiers.iter().map(|n| n.channel()).collect();
    assert_eq!(channels, vec!["email", "sms"]);
    assert_eq!(provider.get::<dyn Notifier>().unwrap().channel(), "sms");

    // 类库服务通过解析器拿到被覆盖后的依赖
    let scope = provider.create_scope();
    assert_eq!(
        scope.get::<dyn OrderRepository>().unwrap().describe(),
        "memory@42"
    );
}

#[test]
fn test_lifetimes_after_composition() {
    let provider = CompositionBuilder::new()
        .with_configuration(store_configuration())
        .add_scope(library_scope())
        .build()
        .unwrap();

    let first = provider.create_scope();
    let second = provider.create_scope();
    assert_ne!(first.id(), second.id());

    let a = first.get::<dyn OrderRepository>().unwrap();
    let b = first.get::<dyn OrderRepository>().unwrap();
    let c = second.get::<dyn OrderRepository>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&a, &c));

    let clock_a = first.get::<dyn Clock>().unwrap();
    let clock_b = second.get::<dyn Clock>().unwrap();
    assert!(Arc::ptr_eq(&clock_a, &clock_b));

    let log_a = first.get::<dyn AuditLog>().unwrap();
    let log_b = first.get::<dyn AuditLog>().unwrap();
    assert_ne!(log_a.sequence(), log_b.sequence());
}

#[test]
fn test_modules_run_once_and_options_follow_hook_order() {
    let (services, report) = CompositionBuilder::new()
        .with_configuration(store_configuration())
        .add_scope(library_scope())
        .add_scope(host_scope())
        .compose()
        .unwrap();

    assert_eq!(
        report.modules,
        vec![TypeInfo::of::<StoreModule>(), TypeInfo::of::<HostModule>()]
    );
    assert_eq!(report.scopes, vec!["library", "host"]);
    assert_eq!(services.count::<StoreSettings>(), 1);

    let provider = services.build_provider();
    let settings = provider.get::<StoreSettings>().unwrap();
    assert_eq!(settings.name, "北京门店");
    assert_eq!(settings.max_orders, 16);

    let options = provider.options::<HostOptions>();
    assert_eq!(options.stages, vec!["configure", "post_configure"]);
}

#[test]
fn test_missing_configuration_section_fails_hook() {
    let result = CompositionBuilder::new()
        .add_scope(CompositionScope::new("library").with_module::<StoreModule>())
        .compose();

    match result {
        Err(CompositionError::HookFailed { module, phase, .. }) => {
            assert!(module.ends_with("StoreModule"));
            assert_eq!(phase, HookPhase::Configure);
        }
        other => panic!("应该是钩子执行错误: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_missing_dependency_is_reported_on_resolve() {
    let provider = CompositionBuilder::new()
        .add_scope(CompositionScope::new("library").with_service::<MemoryOrderRepository>())
        .build()
        .unwrap();

    let scope = provider.create_scope();
    match scope.get::<dyn OrderRepository>() {
        Err(DependencyError::ServiceNotRegistered { type_name }) => {
            assert!(type_name.contains("Clock"))
        }
        Err(other) => panic!("应该是服务未注册错误: {}", other),
        Ok(_) => panic!("不应该解析成功"),
    }
}

#[test]
fn test_options_loaded_from_configuration_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{"store": {{"name": "上海门店"}}, "composition": {{"binding_strategy": "name_suffix"}}}}"#
    )
    .unwrap();

    let (services, _) = CompositionBuilder::new()
        .with_configuration_file(file.path())
        .unwrap()
        .options_from_configuration()
        .add_scope(library_scope())
        .compose()
        .unwrap();

    // SequentialJournal 与 AuditLog 名称不匹配
    assert!(services.contains::<dyn Clock>());
    assert!(services.contains::<dyn OrderRepository>());
    assert!(!services.contains::<dyn AuditLog>());

    let provider = services.build_provider();
    assert_eq!(provider.get::<StoreSettings>().unwrap().max_orders, 0);
}
