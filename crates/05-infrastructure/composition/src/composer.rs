//! 组合器
//!
//! 按调用方给定的顺序处理作用域：加载模块、依次执行模块钩子、扫描作用域中的服务。

use crate::loader::ModuleLoader;
use crate::options::CompositionOptions;
use crate::scanner::{ServiceRegistration, ServiceScanner};
use crate::scope::CompositionScope;
use chrono::{DateTime, Utc};
use config_impl::Configuration;
use di_impl::ServiceCollection;
use infrastructure_common::{CompositionResult, TypeInfo};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// 组合报告
#[derive(Debug, Clone)]
pub struct CompositionReport {
    /// 按钩子执行顺序排列的模块
    pub modules: Vec<TypeInfo>,
    /// 按提交顺序排列的服务注册
    pub registrations: Vec<ServiceRegistration>,
    /// 已处理的作用域名称
    pub scopes: Vec<String>,
    /// 开始时间
    pub started_at: DateTime<Utc>,
    /// 结束时间
    pub finished_at: DateTime<Utc>,
}

impl CompositionReport {
    /// 组合耗时
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// 某个服务类型的提交记录
    pub fn registrations_for(&self, service: TypeInfo) -> Vec<&ServiceRegistration> {
        self.registrations
            .iter()
            .filter(|r| r.descriptor.service == service)
            .collect()
    }
}

/// 组合器
///
/// `compose` 消费组合器本身，一个组合器最多执行一次组合。
#[derive(Debug, Clone, Default)]
pub struct Composer {
    options: CompositionOptions,
}

impl Composer {
    /// 创建组合器
    pub fn new(options: CompositionOptions) -> Self {
        Self { options }
    }

    /// 执行组合
    pub fn compose(
        self,
        scopes: &[CompositionScope],
        services: &mut ServiceCollection,
        configuration: &Configuration,
    ) -> CompositionResult<CompositionReport> {
        let started_at = Utc::now();
        info!("开始组合，共 {} 个作用域", scopes.len());

        let mut loader = ModuleLoader::new(self.options.module_identity);
        let mut scanned = HashSet::new();
        let mut modules = Vec::new();
        let mut registrations = Vec::new();

        // 模块类型 -> 定义它的第一个作用域
        let mut owners: HashMap<TypeInfo, usize> = HashMap::new();
        for (index, scope) in scopes.iter().enumerate() {
            for module in scope.modules() {
                owners.entry(module.type_info).or_insert(index);
            }
        }

        for (index, scope) in scopes.iter().enumerate() {
            info!("处理作用域: {}", scope.name());

            let loaded = loader.load(scope.name(), scope.modules())?;
            for module in &loaded {
                if self.options.scan_module_scope {
                    // 定义在后续作用域的模块被提前加载时，只预扫描当前作用域，
                    // 后续作用域仍在轮到它时扫描
                    let target = owners
                        .get(&module.type_info())
                        .map_or(index, |owner| (*owner).min(index));
                    if scanned.insert(target) {
                        debug!(
                            "执行模块 {} 的钩子之前扫描作用域 {}",
                            module.descriptor().name(),
                            scopes[target].name()
                        );
                        registrations.extend(self.scan_scope(&scopes[target], services)?);
                    }
                }

                module.run_hooks(services, configuration)?;
                modules.push(module.type_info());
            }

            if scanned.insert(index) {
                registrations.extend(self.scan_scope(scope, services)?);
            }
        }

        let report = CompositionReport {
            modules,
            registrations,
            scopes: scopes.iter().map(|s| s.name().to_string()).collect(),
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            "组合完成: {} 个模块，{} 次服务注册，耗时 {} ms",
            report.modules.len(),
            report.registrations.len(),
            report.duration().num_milliseconds()
        );
        Ok(report)
    }

    fn scan_scope(
        &self,
        scope: &CompositionScope,
        services: &mut ServiceCollection,
    ) -> CompositionResult<Vec<ServiceRegistration>> {
        let strategy = scope
            .binding_strategy()
            .unwrap_or(self.options.binding_strategy);
        let registrations = ServiceScanner::new(strategy).scan(services, scope.services())?;
        debug!(
            "作用域 {} 扫描完成，提交 {} 个服务注册",
            scope.name(),
            registrations.len()
        );
        Ok(registrations)
    }
}
