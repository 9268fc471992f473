use core::fmt;
use std::time::Duration;

use crate::{
    config::{PoolLimits, TransportConfig},
    endpoint::parse_url,
    error::BuildError,
    partition::Partition,
};

/// 单个分区客户端的完整建连参数。
///
/// # 教案式说明
/// - **意图 (Why)**：把“共享配置 + 分区号”翻译为一份自洽、可直接交给 [`Connector`](crate::Connector)
///   的参数集合，使建连实现无需再理解 URL 与离散字段之间的优先级；
/// - **契约 (What)**：
///   - `url` 存在时主机、端口与凭证取自 URL，否则取自离散字段；
///   - `use_ssl` 为配置开关与 `rediss` scheme 的逻辑或；
///   - 值为零的 `shutdown_timeout` 视为未配置；
///   - `pool` 总是有值：已配置时原样复制，未配置时为 [`PoolLimits::default`]，`pool_configured` 标明来源；
/// - **风险 (Trade-offs)**：字段公开以便 [`SettingsCustomizer`](crate::SettingsCustomizer) 改写，
///   改写后的合法性由定制器自行负责。
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: Partition,
    pub use_ssl: bool,
    pub command_timeout: Option<Duration>,
    pub shutdown_timeout: Option<Duration>,
    pub client_name: Option<String>,
    pub pool: PoolLimits,
    pub pool_configured: bool,
}

impl ConnectionSettings {
    /// 将共享配置翻译为指定分区的建连参数。
    pub fn resolve(config: &TransportConfig, database: Partition) -> Result<Self, BuildError> {
        let (host, port, username, password, url_ssl) = match config.effective_url() {
            Some(url) => {
                let info = parse_url(url)?;
                (
                    info.host().to_owned(),
                    info.port(),
                    info.username().map(str::to_owned),
                    info.password().map(str::to_owned),
                    info.use_ssl(),
                )
            }
            None => (
                config.host.clone(),
                config.port,
                config.username.clone(),
                config.password.clone(),
                false,
            ),
        };

        Ok(Self {
            host,
            port,
            username,
            password,
            database,
            use_ssl: config.ssl || url_ssl,
            command_timeout: config.command_timeout,
            shutdown_timeout: config.shutdown_timeout.filter(|timeout| !timeout.is_zero()),
            client_name: config
                .client_name
                .clone()
                .filter(|name| !name.trim().is_empty()),
            pool: config.pool.clone().unwrap_or_default(),
            pool_configured: config.pool.is_some(),
        })
    }

    /// `host:port` 形式的端点描述，用于日志与错误上下文。
    pub fn endpoint(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .field("use_ssl", &self.use_ssl)
            .field("command_timeout", &self.command_timeout)
            .field("shutdown_timeout", &self.shutdown_timeout)
            .field("client_name", &self.client_name)
            .field("pool", &self.pool)
            .field("pool_configured", &self.pool_configured)
            .finish()
    }
}
