//! 组合构建器
//!
//! 使用构建者模式组装作用域、配置、组合选项和日志，然后执行一次组合。

use crate::composer::{Composer, CompositionReport};
use crate::options::CompositionOptions;
use crate::scope::CompositionScope;
use config_impl::Configuration;
use di_impl::{ServiceCollection, ServiceProvider};
use infrastructure_common::{CompositionError, CompositionResult};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// 组合构建器
pub struct CompositionBuilder {
    scopes: Vec<CompositionScope>,
    configuration: Option<Configuration>,
    options: Option<CompositionOptions>,
    options_from_configuration: bool,
    services: ServiceCollection,
    logging_enabled: bool,
    logging_config: LoggingConfig,
}

impl CompositionBuilder {
    /// 创建新的组合构建器
    pub fn new() -> Self {
        Self {
            scopes: Vec::new(),
            configuration: None,
            options: None,
            options_from_configuration: false,
            services: ServiceCollection::new(),
            logging_enabled: false, // 默认不初始化日志
            logging_config: LoggingConfig::default(),
        }
    }

    /// 添加作用域，按添加顺序处理
    pub fn add_scope(mut self, scope: CompositionScope) -> Self {
        self.scopes.push(scope);
        self
    }

    /// 设置传递给模块钩子的配置
    pub fn with_configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = Some(configuration);
        self
    }

    /// 从配置文件加载配置，`.json` 按 JSON 解析，其余按 TOML 解析
    pub fn with_configuration_file<P: AsRef<Path>>(self, path: P) -> CompositionResult<Self> {
        let path = path.as_ref();
        let builder = Configuration::builder();
        let builder = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => builder.add_json_file(path)?,
            _ => builder.add_toml_file(path)?,
        };
        Ok(self.with_configuration(builder.build()?))
    }

    /// 设置组合选项
    pub fn with_options(mut self, options: CompositionOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// 从配置的 `composition` 节读取组合选项
    pub fn options_from_configuration(mut self) -> Self {
        self.options_from_configuration = true;
        self
    }

    /// 使用预先注册了服务的集合作为构建目标
    pub fn with_services(mut self, services: ServiceCollection) -> Self {
        self.services = services;
        self
    }

    /// 配置日志
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = config;
        self.logging_enabled = true;
        self
    }

    /// 执行组合，返回服务集合和组合报告
    pub fn compose(self) -> CompositionResult<(ServiceCollection, CompositionReport)> {
        // 只有明确配置了日志时才初始化
        if self.logging_enabled {
            self.logging_config.initialize()?;
        }

        let configuration = self.configuration.unwrap_or_default();
        let options = match (self.options, self.options_from_configuration) {
            (Some(options), _) => options,
            (None, true) => CompositionOptions::from_configuration(&configuration)?,
            (None, false) => CompositionOptions::default(),
        };
        info!("组合选项: {:?}", options);

        let mut services = self.services;
        let report = Composer::new(options).compose(&self.scopes, &mut services, &configuration)?;

        if !services.contains::<Configuration>() {
            services.add_instance::<Configuration>(Arc::new(configuration));
        }

        Ok((services, report))
    }

    /// 执行组合并冻结得到服务提供者
    pub fn build(self) -> CompositionResult<ServiceProvider> {
        let (services, _) = self.compose()?;
        Ok(services.build_provider())
    }
}

impl Default for CompositionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: tracing::Level,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 创建生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }

    /// 设置日志级别
    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.level = level;
        self
    }

    /// 初始化全局日志订阅者，重复初始化返回错误
    pub fn initialize(&self) -> CompositionResult<()> {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(self.level)
            .with_target(self.show_target)
            .with_thread_ids(self.show_thread_ids)
            .with_file(self.show_file)
            .with_line_number(self.show_line_number);

        let result = if self.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        };
        result.map_err(|e| CompositionError::BootstrapFailed {
            message: format!("日志初始化失败: {}", e),
        })?;

        info!("日志系统初始化完成");
        Ok(())
    }
}
