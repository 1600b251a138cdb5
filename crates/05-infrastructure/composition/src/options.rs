//! 组合选项

use crate::loader::ModuleIdentityPolicy;
use crate::scanner::BindingStrategy;
use config_impl::Configuration;
use infrastructure_common::CompositionResult;
use serde::{Deserialize, Serialize};

/// 配置中组合选项所在的节
pub const COMPOSITION_SECTION: &str = "composition";

/// 组合选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionOptions {
    /// 默认回退绑定策略，作用域可单独覆盖
    pub binding_strategy: BindingStrategy,
    /// 模块身份判定策略
    pub module_identity: ModuleIdentityPolicy,
    /// 执行模块钩子之前先扫描模块所在作用域的服务
    pub scan_module_scope: bool,
}

impl CompositionOptions {
    /// 从配置的 `composition` 节读取，节不存在时使用默认值
    pub fn from_configuration(configuration: &Configuration) -> CompositionResult<Self> {
        if !configuration.contains_key(COMPOSITION_SECTION) {
            return Ok(Self::default());
        }
        Ok(configuration.bind(COMPOSITION_SECTION)?)
    }
}
