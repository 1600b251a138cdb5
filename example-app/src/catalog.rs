//! 商品目录类库
//!
//! 以默认实现的形式提供服务，宿主可以在之后的作用域中覆盖。

use infrastructure_composition::prelude::*;
use infrastructure_composition::BoxError;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// 价格计算
pub trait PriceCalculator: Send + Sync {
    fn price(&self, base_cents: u64) -> u64;
}

/// 商品仓储
pub trait ProductRepository: Send + Sync {
    fn find(&self, sku: &str) -> Option<(String, u64)>;
}

/// 目录配置
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    pub currency: String,
    #[serde(default)]
    pub skus: Vec<String>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            currency: "CNY".to_string(),
            skus: vec!["tea".to_string(), "coffee".to_string()],
        }
    }
}

#[derive(Default, ServiceDefinition)]
#[service(singleton, implements(dyn PriceCalculator))]
pub struct ListPriceCalculator;

impl PriceCalculator for ListPriceCalculator {
    fn price(&self, base_cents: u64) -> u64 {
        base_cents
    }
}

#[derive(ServiceDefinition)]
#[service(scoped, implements(dyn ProductRepository), factory = InMemoryProductRepository::create)]
pub struct InMemoryProductRepository {
    calculator: Arc<dyn PriceCalculator>,
    settings: Arc<CatalogSettings>,
}

impl InMemoryProductRepository {
    fn create(resolver: &mut dyn ServiceResolver) -> Result<Self, BoxError> {
        Ok(Self {
            calculator: resolver.get::<dyn PriceCalculator>()?,
            settings: resolver.get::<CatalogSettings>()?,
        })
    }
}

impl ProductRepository for InMemoryProductRepository {
    fn find(&self, sku: &str) -> Option<(String, u64)> {
        let base = match sku {
            "tea" => 1200,
            "coffee" => 2500,
            _ => return None,
        };
        Some((self.settings.currency.clone(), self.calculator.price(base)))
    }
}

/// 目录模块：绑定 `catalog` 配置节
#[derive(Default, ModuleDefinition)]
pub struct CatalogModule;

impl Module for CatalogModule {
    fn configure_services(
        &self,
        services: &mut ServiceCollection,
        configuration: &Configuration,
    ) -> HookResult {
        let settings = if configuration.contains_key("catalog") {
            configuration.bind::<CatalogSettings>("catalog")?
        } else {
            CatalogSettings::default()
        };
        info!("目录配置: {:?}", settings);
        services.add_instance(Arc::new(settings));
        Ok(())
    }
}
