//! 只读配置视图

use crate::builder::ConfigurationBuilder;
use infrastructure_common::{ConfigError, ConfigResult, ConfigSection};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;

/// 组合过程中传递给模块钩子的配置
///
/// 内部共享同一棵 `config::Config` 树，克隆开销很小。
#[derive(Debug, Clone)]
pub struct Configuration {
    inner: Arc<config::Config>,
    sources: Arc<Vec<String>>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::empty()
    }
}

impl Configuration {
    /// 创建配置构建器
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }

    /// 空配置
    pub fn empty() -> Self {
        Self::from_config(config::Config::default(), Vec::new())
    }

    pub(crate) fn from_config(config: config::Config, sources: Vec<String>) -> Self {
        Self {
            inner: Arc::new(config),
            sources: Arc::new(sources),
        }
    }

    /// 读取配置值，键使用 `.` 分隔层级
    pub fn get<T>(&self, key: &str) -> ConfigResult<T>
    where
        T: DeserializeOwned,
    {
        self.inner.get::<T>(key).map_err(|e| match e {
            config::ConfigError::NotFound(_) => ConfigError::KeyNotFound {
                key: key.to_string(),
            },
            other => ConfigError::TypeConversionError {
                message: format!("{}: {}", key, other),
            },
        })
    }

    /// 读取配置值，键不存在时返回默认值；类型错误仍然返回错误
    pub fn get_or<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: DeserializeOwned,
    {
        match self.get(key) {
            Ok(value) => Ok(value),
            Err(ConfigError::KeyNotFound { .. }) => Ok(default),
            Err(e) => Err(e),
        }
    }

    /// 是否包含指定键
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.get::<config::Value>(key).is_ok()
    }

    /// 读取配置节
    pub fn section(&self, key: &str) -> ConfigResult<ConfigSection> {
        let data = self.get::<HashMap<String, serde_json::Value>>(key)?;
        Ok(ConfigSection { data })
    }

    /// 将指定配置节绑定到强类型选项
    pub fn bind<T>(&self, key: &str) -> ConfigResult<T>
    where
        T: DeserializeOwned,
    {
        self.get(key)
    }

    /// 将整个配置树绑定到强类型选项
    pub fn bind_all<T>(&self) -> ConfigResult<T>
    where
        T: DeserializeOwned,
    {
        Ok(self.inner.as_ref().clone().try_deserialize::<T>()?)
    }

    /// 按叠加顺序列出配置源
    pub fn sources(&self) -> &[String] {
        &self.sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct DatabaseOptions {
        host: String,
        port: u16,
    }

    fn sample() -> Configuration {
        Configuration::builder()
            .add_toml_str(
                r#"
                [database]
                host = "db.internal"
                port = 5432

                [features]
                audit = true
                "#,
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_get_missing_key() {
        let configuration = sample();
        assert!(matches!(
            configuration.get::<String>("database.user"),
            Err(ConfigError::KeyNotFound { .. })
        ));
        assert_eq!(
            configuration.get_or("database.user", "admin".to_string()).unwrap(),
            "admin"
        );
    }

    #[test]
    fn test_get_wrong_type() {
        let configuration = sample();
        assert!(matches!(
            configuration.get::<u16>("database.host"),
            Err(ConfigError::TypeConversionError { .. })
        ));
    }

    #[test]
    fn test_bind_section() {
        let configuration = sample();
        let options: DatabaseOptions = configuration.bind("database").unwrap();
        assert_eq!(
            options,
            DatabaseOptions {
                host: "db.internal".to_string(),
                port: 5432
            }
        );

        let section = configuration.section("features").unwrap();
        assert_eq!(section.get("audit"), Some(&serde_json::json!(true)));
    }

    #[test]
    fn test_contains_key_and_empty() {
        let configuration = sample();
        assert!(configuration.contains_key("features.audit"));
        assert!(!configuration.contains_key("features.export"));

        let empty = Configuration::empty();
        assert!(!empty.contains_key("database"));
        assert!(empty.sources().is_empty());
    }
}
