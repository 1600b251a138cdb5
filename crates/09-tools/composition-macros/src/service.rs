//! `#[derive(ServiceDefinition)]` 实现

use crate::utils::{
    crate_path, parse_lifetime_value, parse_type_list, registration_fn_name, reject_generics,
    LifetimeKind,
};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, ExprPath, Result, Type};

/// 服务声明参数
#[derive(Default)]
pub struct ServiceArgs {
    /// 能力标记，按声明顺序
    pub markers: Vec<LifetimeKind>,
    /// 实现的接口
    pub implements: Vec<Type>,
    /// 显式目标服务类型
    pub expose: Vec<Type>,
    /// 显式生命周期
    pub lifetime: Option<LifetimeKind>,
    pub include_self: bool,
    pub replace: bool,
    /// 自定义工厂 `fn(&mut dyn ServiceResolver) -> Result<Self, BoxError>`
    pub factory: Option<ExprPath>,
    /// 是否登记到发现目录
    pub discoverable: bool,
}

impl ServiceArgs {
    /// 从 `#[service(...)]` 属性解析
    pub fn from_input(input: &DeriveInput) -> Result<Self> {
        let mut args = ServiceArgs {
            discoverable: true,
            ..Default::default()
        };

        for attr in &input.attrs {
            if !attr.path().is_ident("service") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if let Some(kind) = meta
                    .path
                    .get_ident()
                    .and_then(|ident| LifetimeKind::from_name(&ident.to_string()))
                {
                    if !args.markers.contains(&kind) {
                        args.markers.push(kind);
                    }
                } else if meta.path.is_ident("implements") {
                    args.implements.extend(parse_type_list(&meta)?);
                } else if meta.path.is_ident("expose") {
                    args.expose.extend(parse_type_list(&meta)?);
                } else if meta.path.is_ident("lifetime") {
                    args.lifetime = Some(parse_lifetime_value(&meta)?);
                } else if meta.path.is_ident("include_self") {
                    args.include_self = true;
                } else if meta.path.is_ident("replace") {
                    args.replace = true;
                } else if meta.path.is_ident("factory") {
                    args.factory = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("skip_discovery") {
                    args.discoverable = false;
                } else {
                    return Err(meta.error(
                        "未知的 service 参数，可选: singleton, scoped, transient, implements(...), \
                         expose(...), lifetime = ..., include_self, replace, factory = path, skip_discovery",
                    ));
                }
                Ok(())
            })?;
        }

        Ok(args)
    }
}

/// 生成标记实现、`ServiceDefinition` 实现和启动时登记代码
pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    reject_generics(&input, "ServiceDefinition")?;
    let args = ServiceArgs::from_input(&input)?;

    let root = crate_path();
    let ident = &input.ident;

    let constructor = match &args.factory {
        Some(factory) => quote! { #root::ServiceManifest::<Self>::new(#factory) },
        None => quote! { #root::ServiceManifest::<Self>::with_default() },
    };

    let marker_impls = args.markers.iter().map(|kind| {
        let marker = kind.marker_trait();
        quote! { impl #marker for #ident {} }
    });
    let marker_calls = args.markers.iter().map(|kind| {
        let method = kind.marker_method();
        quote! { .#method() }
    });

    let implements = &args.implements;
    let expose = &args.expose;

    let lifetime = args.lifetime.map(|kind| {
        let value = kind.lifetime_tokens();
        quote! { .lifetime(#value) }
    });
    let include_self = args.include_self.then(|| quote! { .include_self() });
    let replace = args.replace.then(|| quote! { .replace() });

    let registration = if args.discoverable {
        let fn_name = registration_fn_name("service", ident);
        quote! {
            #[#root::__private::ctor::ctor]
            fn #fn_name() {
                #root::__private::register_service::<#ident>();
            }
        }
    } else {
        TokenStream::new()
    };

    Ok(quote! {
        #(#marker_impls)*

        impl #root::ServiceDefinition for #ident {
            fn manifest() -> #root::ServiceManifest<Self> {
                #constructor
                    #(.implements::<#implements>(|s| s))*
                    #(#marker_calls)*
                    #(.expose::<#expose>(|s| s))*
                    #lifetime
                    #include_self
                    #replace
            }
        }

        #registration
    })
}
