//! 错误类型定义

use thiserror::Error;

/// 可跨线程传递的装箱错误，模块钩子和服务工厂使用此类型报告失败
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置加载失败: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("配置序列化失败: {source}")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },

    #[error("配置键不存在: {key}")]
    KeyNotFound { key: String },

    #[error("配置类型转换失败: {message}")]
    TypeConversionError { message: String },
}

/// 依赖注入错误类型（容器侧）
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("服务未注册: {type_name}")]
    ServiceNotRegistered { type_name: String },

    #[error("组件创建失败: {type_name}, 原因: {source}")]
    ComponentCreationFailed {
        type_name: String,
        #[source]
        source: BoxError,
    },

    #[error("循环依赖检测到: {dependency_chain}")]
    CircularDependency { dependency_chain: String },

    #[error("类型转换失败: 期望 {expected}")]
    TypeMismatch { expected: String },
}

impl DependencyError {
    /// 创建组件创建失败错误
    pub fn creation_failed(type_name: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::ComponentCreationFailed {
            type_name: type_name.into(),
            source: source.into(),
        }
    }
}

/// 模块钩子阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPhase {
    /// 预配置
    PreConfigure,
    /// 配置
    Configure,
    /// 后配置
    PostConfigure,
}

impl std::fmt::Display for HookPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::PreConfigure => "pre_configure_services",
            Self::Configure => "configure_services",
            Self::PostConfigure => "post_configure_services",
        };
        f.write_str(name)
    }
}

/// 组合错误类型
///
/// 组合过程是一次性的启动流程，所有错误都会直接返回给调用方并终止启动，不存在重试。
#[derive(Error, Debug)]
pub enum CompositionError {
    /// 声明了元数据却既没有显式生命周期也没有能力标记
    #[error("无法确定服务生命周期: {type_name}（声明了元数据，但既没有显式生命周期也没有能力标记）")]
    UnresolvableLifetime { type_name: String },

    #[error("服务携带多个能力标记且未声明显式生命周期: {type_name} ({markers})")]
    AmbiguousMarkers { type_name: String, markers: String },

    #[error("检测到模块循环依赖: {cycle}")]
    ModuleCycle { cycle: String },

    #[error("模块实例化失败: {module}, 原因: {source}")]
    ModuleResolution {
        module: String,
        #[source]
        source: BoxError,
    },

    #[error("模块钩子执行失败: {module}::{phase}, 原因: {source}")]
    HookFailed {
        module: String,
        phase: HookPhase,
        #[source]
        source: BoxError,
    },

    #[error("依赖注入错误: {source}")]
    Dependency {
        #[from]
        source: DependencyError,
    },

    #[error("配置错误: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("组合启动失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type CompositionResult<T> = Result<T, CompositionError>;
