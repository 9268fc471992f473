//! # spark-kv-examples
//!
//! ## 定位（Why）
//! - 演示如何把传输配置、建连协作方与动态路由器装配成一个可用的门面；
//! - 演示程序复用本库的装配函数，测试也直接覆盖这些函数，避免示例与真实用法脱节。
//!
//! ## 内容（What）
//! - [`load_config`]：从可选的 TOML 文件加载传输配置，缺省时使用默认值；
//! - [`install_tracing`]：按 `RUST_LOG` 安装 `fmt` 日志订阅器，缺省级别为 `info`；
//! - [`tour_partitions`]：在一组分区上依次写入、读取并清理演示键。

use std::fs;
use std::path::Path;

use spark_kv_router::{NO_EXPIRE, Partition, PartitionHelper, RouterError, SelectorStack};
use spark_kv_transport::{ConnectionBuilder, Connector, TransportConfig};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt};

/// 演示程序写入的键。
pub const DEMO_KEY: &str = "spark-kv:demo";

/// 加载传输配置；`path` 为空时返回默认配置（`localhost:6379`，分区 0）。
pub fn load_config(path: Option<&Path>) -> Result<TransportConfig, String> {
    let Some(path) = path else {
        return Ok(TransportConfig::default());
    };
    let source = fs::read_to_string(path)
        .map_err(|error| format!("读取配置文件 {} 失败: {error}", path.display()))?;
    TransportConfig::from_toml_str(&source)
        .map_err(|error| format!("解析配置文件 {} 失败: {error}", path.display()))
}

/// 安装全局日志订阅器。
pub fn install_tracing() -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer());
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|error| format!("安装日志订阅器失败: {error}"))
}

/// 单个分区的演示结果。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionReport {
    pub partition: Partition,
    pub value: Option<String>,
    pub deleted: bool,
}

/// 依次在每个分区写入 `partition-<n>`、读回并删除。
///
/// 任一分区失败即返回错误；已完成的分区不回滚。
pub fn tour_partitions<K: Connector>(
    helper: &PartitionHelper<ConnectionBuilder<K>>,
    partitions: &[i64],
) -> Result<Vec<PartitionReport>, RouterError> {
    let mut ctx = SelectorStack::new();
    partitions
        .iter()
        .map(|&raw| -> Result<PartitionReport, RouterError> {
            let partition = Partition::try_from_raw(raw)?;
            let expected = format!("partition-{}", partition.index());
            helper.set_with_partition(&mut ctx, raw, DEMO_KEY, &expected, NO_EXPIRE, None)?;
            let value = helper.get_with_partition(&mut ctx, raw, DEMO_KEY)?;
            let deleted = helper.delete_with_partition(&mut ctx, raw, DEMO_KEY)?;
            info!(%partition, ?value, deleted, "partition visited");
            Ok(PartitionReport {
                partition,
                value,
                deleted,
            })
        })
        .collect()
}
