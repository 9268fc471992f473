//! # memory：进程内分区存储
//!
//! ## 核心意图（Why）
//! - 为测试与演示提供一个无需外部服务端的 [`Connector`] 实现，行为上贴近真实存储：
//!   多个互相隔离的分区、字符串读写、按键过期；
//! - 同时暴露故障注入与计数能力（拒绝某分区建连、认证口令、握手延迟、建连次数），
//!   用于验证路由器的单次构造与失败隔离语义。
//!
//! ## 行为契约（What）
//! - 同一 [`MemoryStore`] 上不同分区的键空间完全隔离；
//! - 过期采用惰性清理：读到已过期的键时删除并返回 `None`；
//! - [`MemoryConnector`] 可克隆，克隆体共享计数与故障注入状态。
//!
//! ## 风险提示（Trade-offs）
//! - 不实现任何线协议，也不模拟连接池；`PoolLimits` 仅被忽略；
//! - 过期时间基于 `Instant`，测试需使用毫秒级 TTL 并等待其流逝。

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use dashmap::{DashMap, DashSet};

use crate::{
    client::{Connector, KvClient},
    error::{BuildError, ClientError},
    partition::Partition,
    settings::ConnectionSettings,
};

#[derive(Clone, Debug)]
struct StoredValue {
    value: String,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| deadline > now)
    }
}

/// 分区化的进程内字符串存储。
#[derive(Debug, Default)]
pub struct MemoryStore {
    partitions: DashMap<Partition, HashMap<String, StoredValue>>,
}

impl MemoryStore {
    /// 创建空存储。
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定分区中仍存活的键数量。
    pub fn len(&self, partition: Partition) -> usize {
        let now = Instant::now();
        self.partitions
            .get(&partition)
            .map(|entries| entries.values().filter(|value| value.is_live(now)).count())
            .unwrap_or(0)
    }

    /// 指定分区是否没有存活的键。
    pub fn is_empty(&self, partition: Partition) -> bool {
        self.len(partition) == 0
    }

    fn set(&self, partition: Partition, key: &str, value: &str) {
        self.partitions.entry(partition).or_default().insert(
            key.to_owned(),
            StoredValue {
                value: value.to_owned(),
                expires_at: None,
            },
        );
    }

    fn get(&self, partition: Partition, key: &str) -> Option<String> {
        let mut entries = self.partitions.get_mut(&partition)?;
        let now = Instant::now();
        match entries.get(key).map(|stored| stored.is_live(now)) {
            Some(true) => entries.get(key).map(|stored| stored.value.clone()),
            Some(false) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn expire(&self, partition: Partition, key: &str, ttl: Duration) -> bool {
        let Some(mut entries) = self.partitions.get_mut(&partition) else {
            return false;
        };
        let now = Instant::now();
        let live = entries.get(key).is_some_and(|stored| stored.is_live(now));
        if !live {
            entries.remove(key);
            return false;
        }
        if ttl.is_zero() {
            entries.remove(key);
        } else if let Some(stored) = entries.get_mut(key) {
            stored.expires_at = now.checked_add(ttl);
        }
        true
    }

    fn delete(&self, partition: Partition, key: &str) -> bool {
        let Some(mut entries) = self.partitions.get_mut(&partition) else {
            return false;
        };
        let now = Instant::now();
        entries
            .remove(key)
            .is_some_and(|stored| stored.is_live(now))
    }
}

#[derive(Debug, Default)]
struct ConnectorState {
    refused: DashSet<Partition>,
    attempts: AtomicUsize,
    attempts_by_partition: DashMap<Partition, usize>,
}

/// 基于 [`MemoryStore`] 的建连协作方。
///
/// # 教案式说明
/// - **意图 (Why)**：让路由器的并发与失败路径可以在单进程内被确定性地复现；
/// - **契约 (What)**：
///   - 每次 [`Connector::connect`] 调用都会计数，无论成功与否；
///   - 被 [`refuse`](Self::refuse) 的分区返回 [`BuildError::ConnectionRefused`]，
///     [`accept`](Self::accept) 后恢复；
///   - 配置了口令时，参数中的密码不匹配即视为认证失败；
///   - 设置握手延迟后，每次建连先阻塞该时长，用于放大并发首用的竞争窗口。
#[derive(Clone, Debug)]
pub struct MemoryConnector {
    store: Arc<MemoryStore>,
    password: Option<Arc<str>>,
    handshake_delay: Option<Duration>,
    state: Arc<ConnectorState>,
}

impl Default for MemoryConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryConnector {
    /// 以全新的存储创建建连协作方。
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    /// 复用已有存储。
    pub fn with_store(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            password: None,
            handshake_delay: None,
            state: Arc::new(ConnectorState::default()),
        }
    }

    /// 要求建连参数携带指定口令。
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = Some(Arc::from(password));
        self
    }

    /// 为每次建连注入固定的握手延迟。
    pub fn with_handshake_delay(mut self, delay: Duration) -> Self {
        self.handshake_delay = Some(delay);
        self
    }

    /// 底层存储。
    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    /// 让指定分区拒绝后续建连。
    pub fn refuse(&self, partition: Partition) {
        self.state.refused.insert(partition);
    }

    /// 解除对指定分区的拒绝。
    pub fn accept(&self, partition: Partition) {
        self.state.refused.remove(&partition);
    }

    /// 累计建连尝试次数。
    pub fn connection_count(&self) -> usize {
        self.state.attempts.load(Ordering::SeqCst)
    }

    /// 指定分区的累计建连尝试次数。
    pub fn connection_count_for(&self, partition: Partition) -> usize {
        self.state
            .attempts_by_partition
            .get(&partition)
            .map(|count| *count)
            .unwrap_or(0)
    }
}

impl Connector for MemoryConnector {
    type Client = MemoryClient;

    fn connect(&self, settings: &ConnectionSettings) -> Result<Self::Client, BuildError> {
        if let Some(delay) = self.handshake_delay {
            std::thread::sleep(delay);
        }

        let partition = settings.database;
        self.state.attempts.fetch_add(1, Ordering::SeqCst);
        *self
            .state
            .attempts_by_partition
            .entry(partition)
            .or_insert(0) += 1;

        if self.state.refused.contains(&partition) {
            return Err(BuildError::ConnectionRefused {
                endpoint: settings.endpoint(),
                detail: format!("partition {partition} is refusing connections"),
            });
        }

        if let Some(expected) = &self.password
            && settings.password.as_deref() != Some(expected.as_ref())
        {
            return Err(BuildError::ConnectionRefused {
                endpoint: settings.endpoint(),
                detail: "authentication failed".to_owned(),
            });
        }

        Ok(MemoryClient {
            store: Arc::clone(&self.store),
            partition,
            client_name: settings.client_name.clone(),
        })
    }
}

/// 绑定到单个分区的进程内客户端。
#[derive(Clone, Debug)]
pub struct MemoryClient {
    store: Arc<MemoryStore>,
    partition: Partition,
    client_name: Option<String>,
}

impl MemoryClient {
    /// 建连时协商的客户端名称。
    pub fn client_name(&self) -> Option<&str> {
        self.client_name.as_deref()
    }
}

impl KvClient for MemoryClient {
    fn partition(&self) -> Partition {
        self.partition
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.store.set(self.partition, key, value);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self.store.get(self.partition, key))
    }

    fn expire(&self, key: &str, ttl: Duration) -> Result<bool, ClientError> {
        Ok(self.store.expire(self.partition, key, ttl))
    }

    fn delete(&self, key: &str) -> Result<bool, ClientError> {
        Ok(self.store.delete(self.partition, key))
    }
}
