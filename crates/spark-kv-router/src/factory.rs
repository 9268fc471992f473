use core::fmt;
use core::hash::Hash;
use core::marker::PhantomData;

use spark_kv_transport::{BuildError, ConnectionBuilder, Connector, Partition};

/// `ClientFactory` 定义路由器“如何为一个选择器构造客户端”的抽象。
///
/// # 设计初衷（Why）
/// - 路由器只负责解析选择器、缓存与单次构造保证，构造细节（URL、凭证、连接池）交给注入的工厂；
/// - 以能力接口代替继承：任何满足签名的类型（连接构建器、闭包、测试桩）都可以充当工厂。
///
/// # 契约说明（What）
/// - **输入/输出**：`create` 接收选择器引用，返回为该选择器绑定的新客户端；
/// - **错误语义**：失败时返回 [`BuildError`]，路由器会附加选择器并包装为
///   [`RouterError`](crate::RouterError)；
/// - **线程安全**：实现必须满足 `Send + Sync + 'static`；不同选择器的首次构造会并发调用 `create`，
///   同一选择器则由路由器保证串行。
pub trait ClientFactory: Send + Sync + 'static {
    /// 选择器类型。
    type Selector: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static;
    /// 客户端类型。
    type Client: Send + Sync + 'static;

    /// 为选择器构造新的客户端。
    fn create(&self, selector: &Self::Selector) -> Result<Self::Client, BuildError>;
}

impl<K: Connector> ClientFactory for ConnectionBuilder<K> {
    type Selector = Partition;
    type Client = K::Client;

    fn create(&self, selector: &Partition) -> Result<K::Client, BuildError> {
        self.build(*selector)
    }
}

/// 以闭包充当工厂。
pub struct FnFactory<S, C, F> {
    create: F,
    _marker: PhantomData<fn(&S) -> C>,
}

/// 将闭包包装为 [`ClientFactory`]。
pub fn factory_fn<S, C, F>(create: F) -> FnFactory<S, C, F>
where
    F: Fn(&S) -> Result<C, BuildError> + Send + Sync + 'static,
{
    FnFactory {
        create,
        _marker: PhantomData,
    }
}

impl<S, C, F> ClientFactory for FnFactory<S, C, F>
where
    S: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static,
    C: Send + Sync + 'static,
    F: Fn(&S) -> Result<C, BuildError> + Send + Sync + 'static,
{
    type Selector = S;
    type Client = C;

    fn create(&self, selector: &S) -> Result<C, BuildError> {
        (self.create)(selector)
    }
}

impl<S, C, F> fmt::Debug for FnFactory<S, C, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFactory").finish_non_exhaustive()
    }
}
