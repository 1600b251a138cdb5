//! 宿主应用：覆盖类库的价格计算并追加自己的模块

use crate::catalog::{CatalogModule, PriceCalculator};
use infrastructure_composition::prelude::*;
use infrastructure_composition::BoxError;
use std::sync::Arc;
use tracing::info;

/// 会员折扣（百分比）
#[derive(Debug, Clone, Copy)]
pub struct MemberDiscount(pub u64);

/// 店铺展示选项
#[derive(Debug, Default)]
pub struct StorefrontOptions {
    pub title: String,
    pub banner: String,
}

#[derive(ServiceDefinition)]
#[service(expose(dyn PriceCalculator), lifetime = singleton, replace, factory = MemberPriceCalculator::create)]
pub struct MemberPriceCalculator {
    discount: MemberDiscount,
}

impl MemberPriceCalculator {
    fn create(resolver: &mut dyn ServiceResolver) -> Result<Self, BoxError> {
        let discount = resolver.get::<MemberDiscount>()?;
        Ok(Self {
            discount: *discount,
        })
    }
}

impl PriceCalculator for MemberPriceCalculator {
    fn price(&self, base_cents: u64) -> u64 {
        base_cents * self.discount.0 / 100
    }
}

/// 宿主模块
#[derive(Default, ModuleDefinition)]
#[module(depends_on(CatalogModule))]
pub struct ShopModule;

impl Module for ShopModule {
    fn configure_services(
        &self,
        services: &mut ServiceCollection,
        configuration: &Configuration,
    ) -> HookResult {
        let percent: u64 = configuration.get_or("shop.member_discount", 90)?;
        services.add_instance(Arc::new(MemberDiscount(percent.clamp(1, 100))));

        let title: String = configuration.get_or("shop.title", "示例商店".to_string())?;
        services.configure::<StorefrontOptions, _>(move |o| o.title = title.clone());
        Ok(())
    }

    fn post_configure_services(
        &self,
        services: &mut ServiceCollection,
        _configuration: &Configuration,
    ) -> HookResult {
        services.post_configure::<StorefrontOptions, _>(|o| {
            o.banner = format!("欢迎光临 {}", o.title);
        });
        info!("宿主模块配置完成");
        Ok(())
    }
}
