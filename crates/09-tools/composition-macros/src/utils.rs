//! 宏工具函数

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::parse::Parse;
use syn::{parenthesized, DeriveInput, Ident, LitStr, Result, Token, Type};

/// 组合层 crate 的根路径
pub fn crate_path() -> TokenStream {
    quote! { ::infrastructure_composition }
}

/// 解析 `name(Type, Type, ...)` 形式的类型列表
pub fn parse_type_list(meta: &ParseNestedMeta<'_>) -> Result<Vec<Type>> {
    let content;
    parenthesized!(content in meta.input);
    let types = content.parse_terminated(Type::parse, Token![,])?;
    Ok(types.into_iter().collect())
}

/// 生命周期关键字
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifetimeKind {
    Singleton,
    Scoped,
    Transient,
}

impl LifetimeKind {
    /// 从关键字解析
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "singleton" => Some(Self::Singleton),
            "scoped" => Some(Self::Scoped),
            "transient" => Some(Self::Transient),
            _ => None,
        }
    }

    /// `Lifetime` 枚举值
    pub fn lifetime_tokens(self) -> TokenStream {
        let root = crate_path();
        match self {
            Self::Singleton => quote! { #root::Lifetime::Singleton },
            Self::Scoped => quote! { #root::Lifetime::Scoped },
            Self::Transient => quote! { #root::Lifetime::Transient },
        }
    }

    /// 能力标记 trait
    pub fn marker_trait(self) -> TokenStream {
        let root = crate_path();
        match self {
            Self::Singleton => quote! { #root::SingletonDependency },
            Self::Scoped => quote! { #root::ScopedDependency },
            Self::Transient => quote! { #root::TransientDependency },
        }
    }

    /// 清单上记录标记的方法
    pub fn marker_method(self) -> Ident {
        let name = match self {
            Self::Singleton => "singleton_marker",
            Self::Scoped => "scoped_marker",
            Self::Transient => "transient_marker",
        };
        Ident::new(name, Span::call_site())
    }
}

/// 解析 `lifetime = scoped` 或 `lifetime = "scoped"`
pub fn parse_lifetime_value(meta: &ParseNestedMeta<'_>) -> Result<LifetimeKind> {
    let value = meta.value()?;
    let name = if value.peek(LitStr) {
        value.parse::<LitStr>()?.value()
    } else {
        value.parse::<Ident>()?.to_string()
    };

    LifetimeKind::from_name(&name).ok_or_else(|| {
        meta.error(format!(
            "未知的生命周期 `{}`，可选值: singleton, scoped, transient",
            name
        ))
    })
}

/// 派生宏不支持泛型类型
pub fn reject_generics(input: &DeriveInput, derive_name: &str) -> Result<()> {
    if input.generics.params.is_empty() {
        Ok(())
    } else {
        Err(syn::Error::new_spanned(
            &input.generics,
            format!("#[derive({})] 不支持泛型类型", derive_name),
        ))
    }
}

/// 启动时登记函数名称
pub fn registration_fn_name(prefix: &str, ident: &Ident) -> Ident {
    Ident::new(
        &format!("__register_{}_{}", prefix, ident.to_string().to_lowercase()),
        Span::call_site(),
    )
}
