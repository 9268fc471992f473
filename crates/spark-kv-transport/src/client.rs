use std::time::Duration;

use crate::{
    error::{BuildError, ClientError},
    partition::Partition,
    settings::ConnectionSettings,
};

/// 绑定到单个分区的 KV 客户端。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 路由器只关心“拿到一个能在某分区上执行字符串读写的对象”，不关心底层连接、池化或线协议；
/// - 以 trait 隔离后，真实网络客户端与进程内存储可以互换。
///
/// ## 契约（What）
/// - 构造完成即不可变，所有方法只需 `&self`，实现需自行保证内部同步；
/// - `partition` 返回构造时绑定的分区，终生不变；
/// - `expire` 对不存在的键返回 `Ok(false)`；时长为零等价于立即删除；
/// - `delete` 返回键在删除前是否存在。
pub trait KvClient: Send + Sync + 'static {
    /// 客户端绑定的分区。
    fn partition(&self) -> Partition;

    /// 写入字符串值，覆盖已有值并清除其过期时间。
    fn set(&self, key: &str, value: &str) -> Result<(), ClientError>;

    /// 读取字符串值。
    fn get(&self, key: &str) -> Result<Option<String>, ClientError>;

    /// 为已有键设置存活时长。
    fn expire(&self, key: &str, ttl: Duration) -> Result<bool, ClientError>;

    /// 删除键。
    fn delete(&self, key: &str) -> Result<bool, ClientError>;
}

/// 建连协作方：把一份 [`ConnectionSettings`] 变成已就绪的客户端。
///
/// - **契约 (What)**：实现方负责网络握手、认证、选择分区与连接池初始化；
///   服务端拒绝或认证失败时返回 [`BuildError::ConnectionRefused`]；
/// - **线程安全**：会被不同分区的首次构造并发调用，实现不得依赖调用顺序。
pub trait Connector: Send + Sync + 'static {
    /// 产出的客户端类型。
    type Client: KvClient;

    /// 依据参数建立客户端。
    fn connect(&self, settings: &ConnectionSettings) -> Result<Self::Client, BuildError>;
}

/// 在建连前改写参数的定制钩子。
///
/// 按注册顺序依次执行，位于配置翻译之后、[`Connector::connect`] 之前。
pub trait SettingsCustomizer: Send + Sync + 'static {
    /// 就地改写参数。
    fn customize(&self, settings: &mut ConnectionSettings);
}

impl<F> SettingsCustomizer for F
where
    F: Fn(&mut ConnectionSettings) + Send + Sync + 'static,
{
    fn customize(&self, settings: &mut ConnectionSettings) {
        self(settings)
    }
}
