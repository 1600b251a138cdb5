//! `#[derive(ModuleDefinition)]` 实现

use crate::utils::{crate_path, parse_type_list, registration_fn_name, reject_generics};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, ExprPath, Result, Type};

/// 模块声明参数
#[derive(Default)]
pub struct ModuleArgs {
    /// 前置模块
    pub depends_on: Vec<Type>,
    /// 自定义工厂 `fn() -> Result<Self, BoxError>`
    pub factory: Option<ExprPath>,
    /// 是否登记到发现目录
    pub discoverable: bool,
}

impl ModuleArgs {
    /// 从 `#[module(...)]` 属性解析
    pub fn from_input(input: &DeriveInput) -> Result<Self> {
        let mut args = ModuleArgs {
            discoverable: true,
            ..Default::default()
        };

        for attr in &input.attrs {
            if !attr.path().is_ident("module") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("depends_on") {
                    args.depends_on.extend(parse_type_list(&meta)?);
                } else if meta.path.is_ident("factory") {
                    args.factory = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("skip_discovery") {
                    args.discoverable = false;
                } else {
                    return Err(meta.error("未知的 module 参数，可选: depends_on(...), factory = path, skip_discovery"));
                }
                Ok(())
            })?;
        }

        Ok(args)
    }
}

/// 生成 `ModuleDefinition` 实现和启动时登记代码
pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    reject_generics(&input, "ModuleDefinition")?;
    let args = ModuleArgs::from_input(&input)?;

    let root = crate_path();
    let ident = &input.ident;
    let dependencies = &args.depends_on;

    let create_body = match &args.factory {
        Some(factory) => quote! { #factory() },
        None => quote! { ::core::result::Result::Ok(<Self as ::core::default::Default>::default()) },
    };

    let registration = if args.discoverable {
        let fn_name = registration_fn_name("module", ident);
        quote! {
            #[#root::__private::ctor::ctor]
            fn #fn_name() {
                #root::__private::register_module::<#ident>();
            }
        }
    } else {
        TokenStream::new()
    };

    Ok(quote! {
        impl #root::ModuleDefinition for #ident {
            fn depends_on() -> ::std::vec::Vec<#root::ModuleDescriptor> {
                ::std::vec![#(#root::ModuleDescriptor::of::<#dependencies>()),*]
            }

            fn create() -> ::core::result::Result<Self, #root::BoxError> {
                #create_body
            }
        }

        #registration
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_parse_module_args() {
        let input: DeriveInput = parse_quote! {
            #[module(depends_on(CoreModule, crate::data::DataModule), factory = AppModule::build)]
            struct AppModule;
        };

        let args = ModuleArgs::from_input(&input).unwrap();
        assert_eq!(args.depends_on.len(), 2);
        assert!(args.factory.is_some());
        assert!(args.discoverable);
    }

    #[test]
    fn test_unknown_argument_is_error() {
        let input: DeriveInput = parse_quote! {
            #[module(priority = 3)]
            struct AppModule;
        };

        assert!(ModuleArgs::from_input(&input).is_err());
    }

    #[test]
    fn test_generic_module_is_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Wrapper<T>(T);
        };

        assert!(expand(input).is_err());
    }

    #[test]
    fn test_skip_discovery_omits_ctor() {
        let input: DeriveInput = parse_quote! {
            #[module(skip_discovery)]
            struct LocalModule;
        };

        let output = expand(input).unwrap().to_string();
        assert!(output.contains("ModuleDefinition"));
        assert!(!output.contains("ctor"));
    }
}
