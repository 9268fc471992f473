use core::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::{
    client::{Connector, SettingsCustomizer},
    config::TransportConfig,
    error::BuildError,
    partition::Partition,
    settings::ConnectionSettings,
};

/// 按分区构建客户端的连接构建器。
///
/// # 设计动机（Why）
/// - 每个分区需要一条独立的、已选定 database 的连接；连接昂贵，构建器只负责“按需造一个”，
///   是否缓存由上层路由器决定；
/// - 配置翻译与建连分离：翻译是纯函数，建连交给注入的 [`Connector`]。
///
/// # 行为概览（How）
/// 1. [`ConnectionSettings::resolve`] 将共享配置与分区号翻译为建连参数，URL 非法时立即失败；
/// 2. 依注册顺序执行 [`SettingsCustomizer`]；
/// 3. 调用 [`Connector::connect`] 完成握手。
///
/// # 使用契约（What）
/// - **线程安全**：构建器只持有只读配置与无状态钩子，可被不同分区的首次构造并发调用；
/// - **错误语义**：[`BuildError::MalformedEndpoint`] 不应重试，[`BuildError::ConnectionRefused`] 可在条件恢复后重试。
pub struct ConnectionBuilder<K> {
    config: Arc<TransportConfig>,
    connector: K,
    customizers: Vec<Arc<dyn SettingsCustomizer>>,
}

impl<K: Connector> ConnectionBuilder<K> {
    /// 以配置与建连协作方创建构建器。
    pub fn new(config: TransportConfig, connector: K) -> Self {
        Self {
            config: Arc::new(config),
            connector,
            customizers: Vec::new(),
        }
    }

    /// 追加一个参数定制钩子。
    pub fn with_customizer<C>(mut self, customizer: C) -> Self
    where
        C: SettingsCustomizer,
    {
        self.customizers.push(Arc::new(customizer));
        self
    }

    /// 共享配置。
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// 建连协作方。
    pub fn connector(&self) -> &K {
        &self.connector
    }

    /// 翻译出指定分区的建连参数（含定制钩子的改写）。
    pub fn settings_for(&self, partition: Partition) -> Result<ConnectionSettings, BuildError> {
        let mut settings = ConnectionSettings::resolve(&self.config, partition)?;
        for customizer in &self.customizers {
            customizer.customize(&mut settings);
        }
        Ok(settings)
    }

    /// 为指定分区构建一个已就绪的客户端。
    pub fn build(&self, partition: Partition) -> Result<K::Client, BuildError> {
        let settings = self.settings_for(partition)?;
        debug!(
            host = %settings.host,
            port = settings.port,
            database = partition.index(),
            tls = settings.use_ssl,
            pool_max_total = settings.pool.max_total,
            pool_configured = settings.pool_configured,
            "connecting partition client"
        );
        self.connector.connect(&settings)
    }
}

impl<K> fmt::Debug for ConnectionBuilder<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionBuilder")
            .field("config", &self.config)
            .field("customizers", &self.customizers.len())
            .finish_non_exhaustive()
    }
}
