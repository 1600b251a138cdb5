//! 模块加载器
//!
//! 对候选模块做深度优先遍历，先加载前置模块再实例化模块本身，
//! 输出顺序即拓扑顺序。

use crate::module::{LoadedModule, ModuleDescriptor};
use infrastructure_common::{CompositionError, CompositionResult, TypeInfo};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// 模块身份判定策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleIdentityPolicy {
    /// 只按类型身份去重
    #[default]
    TypeIdentity,
    /// 额外按简短类型名称去重：与已实例化模块同名的模块不再实例化
    SimpleName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Resolving,
    Resolved,
}

/// 模块加载器
///
/// 访问状态跨多次 `load` 调用保留，因此一次组合中每个模块最多实例化一次。
/// `load` 失败时状态回到调用之前。
#[derive(Debug, Default)]
pub struct ModuleLoader {
    policy: ModuleIdentityPolicy,
    states: HashMap<TypeInfo, VisitState>,
    names: HashMap<&'static str, TypeInfo>,
}

impl ModuleLoader {
    /// 创建模块加载器
    pub fn new(policy: ModuleIdentityPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// 加载候选模块，只返回本次调用新实例化的模块
    pub fn load(
        &mut self,
        scope_name: &str,
        candidates: &[ModuleDescriptor],
    ) -> CompositionResult<Vec<LoadedModule>> {
        let mut loaded = Vec::new();
        let mut path = Vec::new();
        let states = self.states.clone();
        let names = self.names.clone();

        for candidate in candidates {
            if let Err(error) = self.visit(scope_name, *candidate, &mut path, &mut loaded) {
                // 本次调用实例化的模块随错误一起丢弃，恢复调用前的状态
                self.states = states;
                self.names = names;
                return Err(error);
            }
        }

        debug!("作用域 {} 加载了 {} 个模块", scope_name, loaded.len());
        Ok(loaded)
    }

    /// 模块是否已经加载
    pub fn is_loaded(&self, module: TypeInfo) -> bool {
        self.states.get(&module) == Some(&VisitState::Resolved)
    }

    fn visit(
        &mut self,
        scope_name: &str,
        module: ModuleDescriptor,
        path: &mut Vec<TypeInfo>,
        loaded: &mut Vec<LoadedModule>,
    ) -> CompositionResult<()> {
        let type_info = module.type_info;

        // 正在解析的模块都在当前路径上
        if let Some(start) = path.iter().position(|t| *t == type_info) {
            let cycle = path[start..]
                .iter()
                .chain(std::iter::once(&type_info))
                .map(TypeInfo::short_name)
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(CompositionError::ModuleCycle { cycle });
        }
        if self.states.get(&type_info) == Some(&VisitState::Resolved) {
            return Ok(());
        }

        self.states.insert(type_info, VisitState::Resolving);
        path.push(type_info);

        for dependency in module.dependencies() {
            if let Err(error) = self.visit(scope_name, dependency, path, loaded) {
                path.pop();
                self.states.remove(&type_info);
                return Err(error);
            }
        }

        path.pop();

        if self.policy == ModuleIdentityPolicy::SimpleName {
            if let Some(existing) = self.names.get(module.name()) {
                warn!(
                    "模块 {} 与已加载的模块 {} 简短名称相同，按名称去重策略跳过",
                    type_info.full_name, existing.full_name
                );
                self.states.insert(type_info, VisitState::Resolved);
                return Ok(());
            }
        }

        let instance = match module.instantiate() {
            Ok(instance) => instance,
            Err(source) => {
                self.states.remove(&type_info);
                return Err(CompositionError::ModuleResolution {
                    module: type_info.full_name.to_string(),
                    source,
                });
            }
        };

        self.states.insert(type_info, VisitState::Resolved);
        self.names.insert(module.name(), type_info);
        debug!("模块已实例化: {}", type_info.full_name);
        loaded.push(LoadedModule::new(module, instance, scope_name));
        Ok(())
    }
}
