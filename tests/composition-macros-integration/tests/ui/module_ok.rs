use infrastructure_composition::{Module, ModuleDefinition, ModuleDescriptor};

#[derive(Default, ModuleDefinition)]
#[module(skip_discovery)]
struct BaseModule;

impl Module for BaseModule {}

#[derive(Default, ModuleDefinition)]
#[module(depends_on(BaseModule), skip_discovery)]
struct AppModule;

impl Module for AppModule {}

fn main() {
    let descriptor = ModuleDescriptor::of::<AppModule>();
    assert_eq!(descriptor.name(), "AppModule");
    assert_eq!(descriptor.dependencies(), vec![ModuleDescriptor::of::<BaseModule>()]);
}
