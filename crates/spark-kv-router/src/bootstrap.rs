use std::sync::Arc;

use spark_kv_transport::{ConnectionBuilder, Connector};
use tracing::info;

use crate::{error::RouterError, helper::PartitionHelper, router::DynamicRouter};

/// 以连接构建器装配门面：立即构造默认分区的客户端，其余分区留待首用时构造。
///
/// # 教案式说明
/// - **意图 (Why)**：启动阶段只付出一条连接的代价，同时在第一时间暴露配置错误
///   （非法 URL、认证失败）而不是推迟到首个业务请求；
/// - **契约 (What)**：默认分区取自 `builder.config().database`；构建器随后作为路由器的工厂；
///   默认客户端构造失败时返回与 [`DynamicRouter::resolve`] 相同的错误分类。
pub fn bootstrap<K: Connector>(
    builder: ConnectionBuilder<K>,
) -> Result<PartitionHelper<ConnectionBuilder<K>>, RouterError> {
    let default_partition = builder.config().database;
    let default_client = builder
        .build(default_partition)
        .map_err(|error| RouterError::from_build(&default_partition, error))?;
    info!(partition = %default_partition, "default partition client ready");

    let router = DynamicRouter::new(default_partition, default_client, builder);
    Ok(PartitionHelper::new(Arc::new(router)))
}
