use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InvalidPartition;

/// 存储分区（database）索引。
///
/// # 教案式说明
/// - **意图 (Why)**：调用方传入的分区号通常来自外部（请求参数、配置），类型为有符号整数；
///   在边界处一次性校验并收窄为 `u32`，后续路由与缓存即可直接以其为键，无需重复判断。
/// - **契约 (What)**：取值范围 `0..=u32::MAX`；实现 `Copy + Eq + Hash`，可直接作为并发映射的键。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Partition(u32);

impl Partition {
    /// 直接以无符号索引构造。
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// 校验有符号输入并构造分区。
    ///
    /// - **前置条件**：`raw` 非负且不超过 `u32::MAX`；
    /// - **错误语义**：越界时返回 [`InvalidPartition`]，不会截断或回绕。
    pub fn try_from_raw(raw: i64) -> Result<Self, InvalidPartition> {
        if raw < 0 {
            return Err(InvalidPartition {
                value: raw,
                reason: "partition index must not be negative",
            });
        }
        u32::try_from(raw).map(Self).map_err(|_| InvalidPartition {
            value: raw,
            reason: "partition index exceeds u32::MAX",
        })
    }

    /// 返回原始索引。
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl From<u32> for Partition {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl TryFrom<i64> for Partition {
    type Error = InvalidPartition;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::try_from_raw(value)
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "db{}", self.0)
    }
}
