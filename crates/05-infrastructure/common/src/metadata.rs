//! 元数据定义
//!
//! 提供组合过程使用的类型身份信息

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// 类型信息
///
/// 类型身份只由 `TypeId` 决定，名称仅用于日志、错误信息和命名约定匹配。
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    /// 类型ID
    pub id: TypeId,
    /// 完整类型名称（包含模块路径）
    pub full_name: &'static str,
}

impl TypeInfo {
    /// 从类型获取类型信息，支持 `dyn Trait` 等非 Sized 类型
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            full_name: std::any::type_name::<T>(),
        }
    }

    /// 获取简短的类型名称（不包含模块路径、`dyn` 前缀和 trait 约束）
    pub fn short_name(&self) -> &'static str {
        short_type_name(self.full_name)
    }

    /// 模块路径（不包含类型名称本身）
    pub fn module_path(&self) -> &'static str {
        let path = strip_dyn(self.full_name);
        let head = match path.find('<') {
            Some(index) => &path[..index],
            None => path,
        };
        match head.rfind("::") {
            Some(index) => &head[..index],
            None => "",
        }
    }

    /// 是否为 trait object
    pub fn is_trait_object(&self) -> bool {
        self.full_name.starts_with("dyn ")
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name)
    }
}

fn strip_dyn(name: &str) -> &str {
    let Some(name) = name.strip_prefix("dyn ") else {
        return name;
    };
    // `dyn app::Greeter + Send + Sync` 只保留 trait 本身，泛型参数里的 `+` 不算
    let mut depth = 0usize;
    for (index, ch) in name.char_indices() {
        match ch {
            '<' | '(' => depth += 1,
            '>' | ')' => depth = depth.saturating_sub(1),
            '+' if depth == 0 => return name[..index].trim_end(),
            _ => {}
        }
    }
    name
}

/// 从完整类型名称中提取简短名称
///
/// `app::services::Greeter` -> `Greeter`，`dyn app::Greeter + Send` -> `Greeter`，
/// `alloc::vec::Vec<app::User>` -> `Vec<app::User>`
pub fn short_type_name(full_name: &str) -> &str {
    let name = strip_dyn(full_name);
    let head_end = name.find('<').unwrap_or(name.len());
    let start = name[..head_end].rfind("::").map_or(0, |index| index + 2);
    &name[start..]
}
