//! 配置构建器
//!
//! 按添加顺序叠加配置源，后添加的配置源覆盖先添加的同名键。

use crate::configuration::Configuration;
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File, FileFormat};
use infrastructure_common::{ConfigError, ConfigResult};
use std::path::Path;
use tracing::{debug, info};

/// 环境变量中表示层级的分隔符
pub const ENV_SEPARATOR: &str = "__";

/// 配置构建器
#[derive(Debug, Default)]
pub struct ConfigurationBuilder {
    inner: ConfigBuilder<DefaultState>,
    sources: Vec<String>,
}

impl ConfigurationBuilder {
    /// 创建新的配置构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加 TOML 配置文件（文件必须存在）
    pub fn add_toml_file<P: AsRef<Path>>(self, path: P) -> ConfigResult<Self> {
        self.add_required_file(path.as_ref(), FileFormat::Toml)
    }

    /// 添加 JSON 配置文件（文件必须存在）
    pub fn add_json_file<P: AsRef<Path>>(self, path: P) -> ConfigResult<Self> {
        self.add_required_file(path.as_ref(), FileFormat::Json)
    }

    /// 添加可选配置文件，格式由扩展名推断，文件不存在时忽略
    pub fn add_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        let path = path.as_ref();
        debug!("添加可选配置文件: {}", path.display());
        self.sources.push(format!("optional:{}", path.display()));
        self.inner = self.inner.add_source(File::from(path).required(false));
        self
    }

    /// 添加 TOML 字符串配置
    pub fn add_toml_str(mut self, content: &str) -> Self {
        self.sources.push("inline:toml".to_string());
        self.inner = self
            .inner
            .add_source(File::from_str(content, FileFormat::Toml));
        self
    }

    /// 添加 JSON 字符串配置
    pub fn add_json_str(mut self, content: &str) -> Self {
        self.sources.push("inline:json".to_string());
        self.inner = self
            .inner
            .add_source(File::from_str(content, FileFormat::Json));
        self
    }

    /// 添加环境变量配置源
    ///
    /// `APP_COMPOSITION__BINDING_STRATEGY` 映射为 `composition.binding_strategy`。
    pub fn add_env_vars(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        info!("添加环境变量配置源，前缀: {}", prefix);
        self.sources.push(format!("env:{}", prefix));
        self.inner = self.inner.add_source(
            Environment::with_prefix(&prefix)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );
        self
    }

    /// 设置覆盖值，优先级高于所有配置源
    pub fn set<V>(mut self, key: &str, value: V) -> ConfigResult<Self>
    where
        V: Into<config::Value>,
    {
        self.inner = self.inner.set_override(key, value)?;
        Ok(self)
    }

    /// 构建配置
    pub fn build(self) -> ConfigResult<Configuration> {
        let config = self.inner.build()?;
        debug!("配置构建完成，配置源: {:?}", self.sources);
        Ok(Configuration::from_config(config, self.sources))
    }

    fn add_required_file(mut self, path: &Path, format: FileFormat) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        info!("添加配置文件: {}", path.display());
        self.sources.push(path.display().to_string());
        self.inner = self
            .inner
            .add_source(File::from(path).format(format).required(true));
        Ok(self)
    }
}
