//! 服务生命周期与能力标记

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 服务生命周期类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifetime {
    /// 单例模式 - 每个容器只创建一个实例
    Singleton,
    /// 作用域模式 - 在同一作用域（工作单元）内共享实例
    Scoped,
    /// 瞬时模式 - 每次解析都创建新实例
    Transient,
}

impl Lifetime {
    /// 所有生命周期，按标记优先级排列
    pub const ALL: [Lifetime; 3] = [Lifetime::Singleton, Lifetime::Scoped, Lifetime::Transient];

    /// 生命周期名称
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Singleton => "singleton",
            Self::Scoped => "scoped",
            Self::Transient => "transient",
        }
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lifetime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "singleton" => Ok(Self::Singleton),
            "scoped" | "scope" => Ok(Self::Scoped),
            "transient" => Ok(Self::Transient),
            other => Err(format!("未知的生命周期: {}", other)),
        }
    }
}

/// 单例生命周期标记
///
/// 能力标记本身没有任何行为，只用于声明实现类型期望的默认生命周期。
/// 显式声明的生命周期总是优先于标记。
pub trait SingletonDependency: Send + Sync + 'static {}

/// 作用域生命周期标记
pub trait ScopedDependency: Send + Sync + 'static {}

/// 瞬时生命周期标记
pub trait TransientDependency: Send + Sync + 'static {}
