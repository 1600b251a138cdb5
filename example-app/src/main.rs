//! # 示例应用程序
//!
//! 演示类库作用域和宿主作用域的组合：类库提供默认实现，宿主在之后的作用域中覆盖。

mod catalog;
mod host;

use anyhow::Context;
use catalog::ProductRepository;
use clap::Parser;
use host::StorefrontOptions;
use infrastructure_composition::{
    BindingStrategy, CompositionBuilder, CompositionOptions, CompositionScope, Configuration,
    LoggingConfig, ServiceProvider,
};
use tracing::{info, warn};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "模块组合示例应用")]
struct Args {
    /// 配置文件路径，不存在时忽略
    #[arg(short, long, default_value = "config/app.toml")]
    config: String,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 使用 JSON 格式日志
    #[arg(long)]
    json_logs: bool,

    /// 绑定策略，覆盖配置文件中的设置
    #[arg(long, value_parser = parse_binding_strategy)]
    binding_strategy: Option<BindingStrategy>,

    /// 要查询的商品
    #[arg(default_values_t = vec!["tea".to_string(), "coffee".to_string()])]
    skus: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let logging = if args.json_logs {
        LoggingConfig::production()
    } else {
        LoggingConfig::default()
    }
    .with_level(parse_log_level(&args.log_level));

    let configuration = Configuration::builder()
        .add_optional_file(&args.config)
        .add_env_vars("EXAMPLE_APP")
        .build()
        .context("加载配置失败")?;

    let mut builder = CompositionBuilder::new()
        .with_logging(logging)
        .with_configuration(configuration)
        .options_from_configuration()
        .add_scope(CompositionScope::discover("example_app::catalog"))
        .add_scope(CompositionScope::discover("example_app::host"));

    if let Some(strategy) = args.binding_strategy {
        builder = builder.with_options(CompositionOptions {
            binding_strategy: strategy,
            ..CompositionOptions::default()
        });
    }

    let (services, report) = builder.compose().context("组合失败")?;
    info!(
        "组合完成: {} 个模块, {} 条注册, 耗时 {} ms",
        report.modules.len(),
        report.registrations.len(),
        report.duration().num_milliseconds()
    );

    let provider = services.build_provider();
    run(&provider, &args.skus)
}

fn run(provider: &ServiceProvider, skus: &[String]) -> anyhow::Result<()> {
    let storefront = provider.options::<StorefrontOptions>();
    info!("{}", storefront.banner);

    let scope = provider.create_scope();
    let repository = scope
        .get::<dyn ProductRepository>()
        .context("解析商品仓储失败")?;

    for sku in skus {
        match repository.find(sku) {
            Some((currency, cents)) => {
                info!("{}: {}.{:02} {}", sku, cents / 100, cents % 100, currency)
            }
            None => warn!("商品不存在: {}", sku),
        }
    }

    Ok(())
}

fn parse_binding_strategy(value: &str) -> Result<BindingStrategy, String> {
    match value {
        "all_interfaces" => Ok(BindingStrategy::AllInterfaces),
        "name_suffix" => Ok(BindingStrategy::NameSuffix),
        "explicit_only" => Ok(BindingStrategy::ExplicitOnly),
        other => Err(format!("未知的绑定策略: {}", other)),
    }
}

/// 解析日志级别
fn parse_log_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
