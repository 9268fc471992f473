//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 为路由器与操作门面对外暴露的错误语义提供集中定义；
//! - 区分“输入非法”“配置非法”“建连失败”“操作失败”四类，便于上层决定是否重试。
//!
//! ## 设计要求（What）
//! - 所有错误均可跨线程传播；
//! - 建连失败携带选择器，便于定位是哪个分区出了问题；
//! - 任何错误都只影响触发它的那一次调用，不会污染缓存或其它选择器。

use core::fmt;

use spark_kv_transport::{BuildError, ClientError, InvalidPartition};
use thiserror::Error;

/// 路由核心错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：把传输层的 [`BuildError`]/[`ClientError`] 与路由语义结合，补上“哪个选择器”这一维度；
/// - **契约 (What)**：
///   - `InvalidSelector` 在任何构造尝试之前返回；
///   - `MalformedEndpoint` 来自配置翻译阶段，重试无意义；
///   - `ResourceCreationFailed` 发生时缓存保持不变，条件恢复后可重试；
///   - `Operation` 包装已解析客户端上的操作失败。
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RouterError {
    /// 选择器在结构上不合法，例如负的分区号。
    #[error("invalid selector `{value}`: {reason}")]
    InvalidSelector { value: i64, reason: &'static str },

    /// 端点 URL 非法。
    #[error("malformed endpoint `{url}` while building client for selector `{selector}`: {reason}")]
    MalformedEndpoint {
        selector: String,
        url: String,
        reason: String,
    },

    /// 工厂未能为选择器建立客户端。
    #[error("failed to create client for selector `{selector}`: {source}")]
    ResourceCreationFailed {
        selector: String,
        #[source]
        source: BuildError,
    },

    /// 过期时长不合法。
    #[error("invalid ttl `{ttl}`: expected a non-negative value or NO_EXPIRE")]
    InvalidExpiry { ttl: i64 },

    /// 已解析客户端上的操作失败。
    #[error("operation `{operation}` failed: {source}")]
    Operation {
        operation: &'static str,
        #[source]
        source: ClientError,
    },
}

impl RouterError {
    /// 将工厂错误与选择器结合。
    pub fn from_build<S: fmt::Display + ?Sized>(selector: &S, error: BuildError) -> Self {
        match error {
            BuildError::MalformedEndpoint { url, reason } => RouterError::MalformedEndpoint {
                selector: selector.to_string(),
                url,
                reason,
            },
            other => RouterError::ResourceCreationFailed {
                selector: selector.to_string(),
                source: other,
            },
        }
    }

    /// 重试是否可能成功。
    ///
    /// 仅建连失败与操作失败在外部条件变化后可能恢复；输入与配置错误重试无意义。
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RouterError::ResourceCreationFailed { .. } | RouterError::Operation { .. }
        )
    }

    pub(crate) fn operation(operation: &'static str) -> impl FnOnce(ClientError) -> Self {
        move |source| RouterError::Operation { operation, source }
    }
}

impl From<InvalidPartition> for RouterError {
    fn from(value: InvalidPartition) -> Self {
        RouterError::InvalidSelector {
            value: value.value,
            reason: value.reason,
        }
    }
}
