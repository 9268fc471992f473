//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 集中声明传输构建层的错误语义：端点解析、建连、已建立客户端的操作失败以及配置校验；
//! - 上层路由器据此区分“不可重试的配置错误”与“可在条件恢复后重试的建连失败”。
//!
//! ## 设计要求（What）
//! - 所有错误均派生 `thiserror::Error`，满足 `Send + Sync + 'static`，可跨线程传播；
//! - 变体携带足够的排障上下文（URL、端点、分区），但绝不携带密码。

use thiserror::Error;

/// 构建客户端时的错误。
///
/// # 教案式说明
/// - **意图 (Why)**：将“配置本身有误”与“服务端拒绝”拆成两个变体，便于调用方决定是否重试；
/// - **契约 (What)**：`MalformedEndpoint` 在配置翻译阶段即被检出，永不重试；
///   `ConnectionRefused` 由 [`Connector`](crate::Connector) 在握手阶段返回，条件恢复后可重试。
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// URL scheme 不受支持或 URL 无法解析。
    #[error("malformed endpoint `{url}`: {reason}")]
    MalformedEndpoint { url: String, reason: String },

    /// 服务端拒绝连接或认证失败。
    #[error("connection to `{endpoint}` refused: {detail}")]
    ConnectionRefused { endpoint: String, detail: String },
}

impl BuildError {
    /// 是否为端点格式错误。
    pub fn is_malformed_endpoint(&self) -> bool {
        matches!(self, BuildError::MalformedEndpoint { .. })
    }
}

/// 已建立的客户端执行操作时的错误。
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ClientError {
    /// 客户端已关闭，无法继续服务。
    #[error("client for `{partition}` is closed")]
    Closed { partition: String },

    /// 单条命令超出命令超时。
    #[error("command `{command}` timed out")]
    Timeout { command: &'static str },

    /// 后端返回的其它失败。
    #[error("backend failure during `{command}`: {detail}")]
    Backend {
        command: &'static str,
        detail: String,
    },
}

/// 传输配置加载或校验失败。
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML 反序列化失败。
    #[error("failed to parse transport configuration: {source}")]
    Parse {
        #[from]
        source: toml::de::Error,
    },

    /// 字段取值越界或字段之间互相矛盾。
    #[error("invalid transport configuration: {message}")]
    Validation { message: String },
}

/// 分区索引不合法。
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid partition `{value}`: {reason}")]
pub struct InvalidPartition {
    /// 调用方传入的原始值。
    pub value: i64,
    /// 拒绝原因。
    pub reason: &'static str,
}
