use infrastructure_composition::{Lifetime, ServiceDefinition, SingletonDependency};

pub trait Store: Send + Sync {}

#[derive(Default, ServiceDefinition)]
#[service(singleton, implements(dyn Store), lifetime = "transient", include_self)]
struct MemoryStore;

impl Store for MemoryStore {}

fn assert_marker<T: SingletonDependency>() {}

fn main() {
    assert_marker::<MemoryStore>();

    let entry = MemoryStore::entry();
    let metadata = entry.metadata.expect("声明了元数据");
    assert_eq!(metadata.lifetime, Some(Lifetime::Transient));
    assert!(metadata.include_self);
}
