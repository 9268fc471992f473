use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{endpoint::DEFAULT_PORT, error::ConfigError, partition::Partition};

/// 传输层的只读配置。
///
/// # 教案式说明
/// - **意图 (Why)**：配置的发现（文件、环境变量、配置中心）属于外部协作方的职责；
///   本结构只描述“建连需要知道什么”，由调用方反序列化后交给 [`ConnectionBuilder`](crate::ConnectionBuilder)；
/// - **契约 (What)**：
///   - `url` 非空时优先生效，覆盖 `host`/`port`/`username`/`password`；
///   - `database` 为默认分区，引导阶段以它构造默认客户端；
///   - 时长字段采用 humantime 文本（如 `"2s"`、`"150ms"`）；
///   - `pool` 缺省时使用 [`PoolLimits::default`]；
/// - **风险 (Trade-offs)**：`Debug` 隐去密码。
#[derive(Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TransportConfig {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: Partition,
    pub ssl: bool,
    #[serde(with = "humantime_serde::option")]
    pub command_timeout: Option<Duration>,
    #[serde(with = "humantime_serde::option")]
    pub shutdown_timeout: Option<Duration>,
    pub client_name: Option<String>,
    pub pool: Option<PoolLimits>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_owned(),
            port: DEFAULT_PORT,
            username: None,
            password: None,
            database: Partition::default(),
            ssl: false,
            command_timeout: None,
            shutdown_timeout: None,
            client_name: None,
            pool: None,
        }
    }
}

impl TransportConfig {
    /// 从 TOML 文本加载并校验配置。
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// 返回非空的 URL。
    pub fn effective_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.trim().is_empty())
    }

    /// 校验字段之间的约束。
    ///
    /// - 未配置 URL 时 `host` 不得为空、`port` 不得为 0；
    /// - 连接池要求 `min_idle <= max_idle <= max_total` 且 `max_total > 0`。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.effective_url().is_none() {
            if self.host.trim().is_empty() {
                return Err(validation("host must not be empty when url is absent"));
            }
            if self.port == 0 {
                return Err(validation("port must not be 0"));
            }
        }
        if let Some(pool) = &self.pool {
            pool.validate()?;
        }
        Ok(())
    }
}

impl core::fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TransportConfig")
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .field("ssl", &self.ssl)
            .field("command_timeout", &self.command_timeout)
            .field("shutdown_timeout", &self.shutdown_timeout)
            .field("client_name", &self.client_name)
            .field("pool", &self.pool)
            .finish()
    }
}

/// 连接池上限与回收参数。
///
/// 默认值：`max_total = 8`、`max_idle = 8`、`min_idle = 0`，不做空闲回收，借出等待不设上限。
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PoolLimits {
    pub max_total: usize,
    pub max_idle: usize,
    pub min_idle: usize,
    #[serde(with = "humantime_serde::option")]
    pub eviction_interval: Option<Duration>,
    #[serde(with = "humantime_serde::option")]
    pub max_wait: Option<Duration>,
}

impl Default for PoolLimits {
    fn default() -> Self {
        Self {
            max_total: 8,
            max_idle: 8,
            min_idle: 0,
            eviction_interval: None,
            max_wait: None,
        }
    }
}

impl PoolLimits {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_total == 0 {
            return Err(validation("pool.max_total must be greater than 0"));
        }
        if self.max_idle > self.max_total {
            return Err(validation("pool.max_idle must not exceed pool.max_total"));
        }
        if self.min_idle > self.max_idle {
            return Err(validation("pool.min_idle must not exceed pool.max_idle"));
        }
        Ok(())
    }
}

fn validation(message: &str) -> ConfigError {
    ConfigError::Validation {
        message: message.to_owned(),
    }
}

/// humantime 文本格式的时长序列化。
mod humantime_serde {
    pub mod option {
        use std::time::Duration;

        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match duration {
                Some(duration) => serializer
                    .serialize_some(&humantime::format_duration(*duration).to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|text| humantime::parse_duration(&text).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
