//! 分区切换演示：装配动态路由器，在多个分区上依次读写同一个键。
//!
//! # 使用方法
//! ```bash
//! RUST_LOG=debug cargo run --bin switch_partition -- --config spark-kv.toml --partitions 0,3,7
//! ```
//! - `--config`：可选，TOML 格式的传输配置；缺省连接 `localhost:6379` 的分区 0。
//! - `--partitions`：可选，逗号分隔的分区号，缺省为 `0,1,2`。
//!
//! # 设计要点（Why）
//! - 演示程序使用进程内建连协作方，无需真实服务端即可观察“首用建连、之后复用”的日志；
//! - 配置仍走真实的解析与校验路径，非法 URL 会在装配阶段直接失败。

use std::env;
use std::path::PathBuf;

use spark_kv_examples::{install_tracing, load_config, tour_partitions};
use spark_kv_router::bootstrap;
use spark_kv_transport::{ConnectionBuilder, memory::MemoryConnector};

fn main() {
    if let Err(error) = run() {
        eprintln!("分区切换演示失败: {error}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    install_tracing()?;

    let mut config_path = None;
    let mut partitions = vec![0, 1, 2];
    let mut args = env::args().skip(1);
    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--config" => {
                let value = args
                    .next()
                    .ok_or_else(|| usage("--config 之后必须提供文件路径"))?;
                config_path = Some(PathBuf::from(value));
            }
            "--partitions" => {
                let value = args
                    .next()
                    .ok_or_else(|| usage("--partitions 之后必须提供分区列表"))?;
                partitions = parse_partitions(&value)?;
            }
            unknown => return Err(usage(&format!("未知参数: {unknown}"))),
        }
    }

    let config = load_config(config_path.as_deref())?;
    let connector = MemoryConnector::new();
    let helper = bootstrap(ConnectionBuilder::new(config, connector.clone()))
        .map_err(|error| format!("装配失败: {error}"))?;

    let reports =
        tour_partitions(&helper, &partitions).map_err(|error| format!("演示失败: {error}"))?;
    for report in &reports {
        println!(
            "{} -> {}",
            report.partition,
            report.value.as_deref().unwrap_or("<missing>")
        );
    }
    println!(
        "建连次数 {}，已缓存分区 {}",
        connector.connection_count(),
        helper.router().len()
    );
    Ok(())
}

fn parse_partitions(raw: &str) -> Result<Vec<i64>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<i64>()
                .map_err(|error| usage(&format!("分区号 `{item}` 非法: {error}")))
        })
        .collect()
}

fn usage(message: &str) -> String {
    format!("{message}\n用法: switch_partition [--config <path>] [--partitions 0,1,2]")
}
