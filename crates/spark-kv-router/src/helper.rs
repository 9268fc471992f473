use core::fmt;
use std::sync::Arc;
use std::time::Duration;

use spark_kv_transport::{KvClient, Partition};
use tracing::trace;

use crate::{
    context::SelectorStack, error::RouterError, factory::ClientFactory, router::DynamicRouter,
};

/// 不设置过期时间的保留值。
pub const NO_EXPIRE: i64 = -1;

/// 过期时长的单位，缺省为秒。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    #[default]
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// 将数量换算为时长，溢出时饱和。
    pub fn to_duration(self, amount: u64) -> Duration {
        match self {
            TimeUnit::Nanoseconds => Duration::from_nanos(amount),
            TimeUnit::Microseconds => Duration::from_micros(amount),
            TimeUnit::Milliseconds => Duration::from_millis(amount),
            TimeUnit::Seconds => Duration::from_secs(amount),
            TimeUnit::Minutes => Duration::from_secs(amount.saturating_mul(60)),
            TimeUnit::Hours => Duration::from_secs(amount.saturating_mul(60 * 60)),
            TimeUnit::Days => Duration::from_secs(amount.saturating_mul(24 * 60 * 60)),
        }
    }
}

/// 写入时的过期策略。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expiry {
    /// 不设置过期。
    Never,
    /// 写入后经过给定时长过期。
    After(Duration),
}

impl Expiry {
    /// 由 `ttl + 单位` 形式的输入构造过期策略。
    ///
    /// - `ttl == NO_EXPIRE` 得到 [`Expiry::Never`]；
    /// - 非负 `ttl` 按 `unit` 换算，`unit` 为 `None` 时按秒；
    /// - 其它负值返回 [`RouterError::InvalidExpiry`]。
    pub fn from_ttl(ttl: i64, unit: Option<TimeUnit>) -> Result<Self, RouterError> {
        if ttl == NO_EXPIRE {
            return Ok(Expiry::Never);
        }
        let amount = u64::try_from(ttl).map_err(|_| RouterError::InvalidExpiry { ttl })?;
        Ok(Expiry::After(unit.unwrap_or_default().to_duration(amount)))
    }
}

/// `PartitionHelper` 是面向业务代码的操作门面。
///
/// # 教案式说明
/// - **意图 (Why)**：业务代码以“分区号 + 键值”的形式调用，无需感知选择器栈与路由器；
/// - **契约 (What)**：
///   - `*_with_partition` 系列先校验分区号，再把它压入调用方提供的 [`SelectorStack`]，
///     委托给对应的无分区操作，最后在任何退出路径上执行 `pop_or_clear`；
///   - 无分区操作（`str_set`/`str_get`/`set_expire`/`delete`）读取栈顶选择器，空栈时使用默认客户端；
///   - `str_set` 在 [`Expiry::Never`] 时跳过过期设置；
/// - **风险 (Trade-offs)**：门面本身无状态，可自由克隆；所有克隆共享同一个路由器与缓存。
pub struct PartitionHelper<F: ClientFactory<Selector = Partition>> {
    router: Arc<DynamicRouter<F>>,
}

impl<F> PartitionHelper<F>
where
    F: ClientFactory<Selector = Partition>,
    F::Client: KvClient,
{
    /// 以共享路由器创建门面。
    pub fn new(router: Arc<DynamicRouter<F>>) -> Self {
        Self { router }
    }

    /// 底层路由器。
    pub fn router(&self) -> &Arc<DynamicRouter<F>> {
        &self.router
    }

    /// 写入字符串值，并按需设置过期。
    pub fn str_set(
        &self,
        ctx: &SelectorStack<Partition>,
        key: &str,
        value: &str,
        expiry: Expiry,
    ) -> Result<(), RouterError> {
        let client = self.router.resolve(ctx)?;
        trace!(partition = %client.partition(), key, "set");
        client.set(key, value).map_err(RouterError::operation("set"))?;
        if let Expiry::After(ttl) = expiry {
            client
                .expire(key, ttl)
                .map_err(RouterError::operation("expire"))?;
        }
        Ok(())
    }

    /// 读取字符串值。
    pub fn str_get(
        &self,
        ctx: &SelectorStack<Partition>,
        key: &str,
    ) -> Result<Option<String>, RouterError> {
        let client = self.router.resolve(ctx)?;
        trace!(partition = %client.partition(), key, "get");
        client.get(key).map_err(RouterError::operation("get"))
    }

    /// 为已有键设置存活时长。
    pub fn set_expire(
        &self,
        ctx: &SelectorStack<Partition>,
        key: &str,
        ttl: Duration,
    ) -> Result<bool, RouterError> {
        let client = self.router.resolve(ctx)?;
        trace!(partition = %client.partition(), key, ?ttl, "expire");
        client
            .expire(key, ttl)
            .map_err(RouterError::operation("expire"))
    }

    /// 删除键。
    pub fn delete(&self, ctx: &SelectorStack<Partition>, key: &str) -> Result<bool, RouterError> {
        let client = self.router.resolve(ctx)?;
        trace!(partition = %client.partition(), key, "delete");
        client.delete(key).map_err(RouterError::operation("delete"))
    }

    /// 在指定分区的作用域内执行 `op`。
    ///
    /// 分区号非法时在压栈之前返回 [`RouterError::InvalidSelector`]；
    /// 压入的分区在 `op` 返回（或 panic 展开）时弹出。`op` 拿到同一个栈，可继续嵌套。
    pub fn with_partition<R>(
        &self,
        ctx: &mut SelectorStack<Partition>,
        partition: i64,
        op: impl FnOnce(&Self, &mut SelectorStack<Partition>) -> Result<R, RouterError>,
    ) -> Result<R, RouterError> {
        let partition = Partition::try_from_raw(partition)?;
        let mut scope = ctx.enter(partition);
        op(self, &mut *scope)
    }

    /// 在指定分区写入字符串值。
    pub fn set_with_partition(
        &self,
        ctx: &mut SelectorStack<Partition>,
        partition: i64,
        key: &str,
        value: &str,
        ttl: i64,
        unit: Option<TimeUnit>,
    ) -> Result<(), RouterError> {
        let expiry = Expiry::from_ttl(ttl, unit)?;
        self.with_partition(ctx, partition, |helper, scope| {
            helper.str_set(scope, key, value, expiry)
        })
    }

    /// 在指定分区读取字符串值。
    pub fn get_with_partition(
        &self,
        ctx: &mut SelectorStack<Partition>,
        partition: i64,
        key: &str,
    ) -> Result<Option<String>, RouterError> {
        self.with_partition(ctx, partition, |helper, scope| helper.str_get(scope, key))
    }

    /// 在指定分区为键设置过期；`ttl` 不可为 [`NO_EXPIRE`]。
    pub fn expire_with_partition(
        &self,
        ctx: &mut SelectorStack<Partition>,
        partition: i64,
        key: &str,
        ttl: i64,
        unit: Option<TimeUnit>,
    ) -> Result<bool, RouterError> {
        let Expiry::After(duration) = Expiry::from_ttl(ttl, unit)? else {
            return Err(RouterError::InvalidExpiry { ttl });
        };
        self.with_partition(ctx, partition, |helper, scope| {
            helper.set_expire(scope, key, duration)
        })
    }

    /// 在指定分区删除键。
    pub fn delete_with_partition(
        &self,
        ctx: &mut SelectorStack<Partition>,
        partition: i64,
        key: &str,
    ) -> Result<bool, RouterError> {
        self.with_partition(ctx, partition, |helper, scope| helper.delete(scope, key))
    }
}

impl<F: ClientFactory<Selector = Partition>> Clone for PartitionHelper<F> {
    fn clone(&self) -> Self {
        Self {
            router: Arc::clone(&self.router),
        }
    }
}

impl<F: ClientFactory<Selector = Partition>> fmt::Debug for PartitionHelper<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartitionHelper")
            .field("router", &self.router)
            .finish()
    }
}
