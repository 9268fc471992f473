use core::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::{context::SelectorStack, error::RouterError, factory::ClientFactory};

/// `DynamicRouter` 按调用上下文中的选择器解析客户端，并为每个选择器惰性构造、永久缓存一个实例。
///
/// # 设计动机（Why）
/// - **连接昂贵**：切换分区不应每次都新建连接，同一选择器的客户端构造一次后复用；
/// - **按需构造**：只有真正被使用的选择器才会建连，启动时仅需默认客户端；
/// - **读路径轻量**：命中缓存只需一次分片读锁与一次 `Arc` 克隆。
///
/// # 行为概览（How）
/// 1. 从 [`SelectorStack`] 读取栈顶选择器；为空或等于默认选择器时直接返回默认客户端；
/// 2. 查询 `clients`，命中即返回；
/// 3. 未命中时取得该选择器独有的构造闸门（`gates`），持锁后再次检查 `clients`（双重检查），
///    仍未命中才调用工厂；构造完成后把 `Arc` 整体发布进 `clients`；
/// 4. 构造成功时先发布条目再移除闸门；构造失败时不写入任何条目，且仅当没有其它调用方
///    持有该闸门时才移除它，排队者仍在同一把锁上串行重试。
///
/// # 使用契约（What）
/// - **单次构造**：同一选择器的并发首用只会触发一次成功构造，所有调用方拿到同一个 `Arc`；
/// - **无撕裂**：`clients` 中只存在构造完成的客户端；
/// - **互不干扰**：不同选择器仅在 `DashMap` 分片层面竞争，构造过程互不阻塞；
/// - **只增不减**：不提供移除或淘汰接口，缓存条目存活至进程结束。
///
/// # 风险提示（Trade-offs）
/// - 缓存规模没有上限；选择器空间由分区数量决定时这不是问题，但若选择器来自不可信输入，
///   调用方需在进入路由器之前自行限制取值范围；
/// - 构造失败期间排队等待同一闸门的调用方会依次各自重试一次，而不是共享首个失败结果；
///   最后一个失败者移除闸门，因此从未成功的选择器不会在 `gates` 中累积。
pub struct DynamicRouter<F: ClientFactory> {
    default_selector: F::Selector,
    default_client: Arc<F::Client>,
    clients: DashMap<F::Selector, Arc<F::Client>>,
    gates: DashMap<F::Selector, Arc<Mutex<()>>>,
    factory: F,
}

impl<F: ClientFactory> DynamicRouter<F> {
    /// 以默认选择器、默认客户端与工厂创建路由器，缓存初始为空。
    pub fn new(default_selector: F::Selector, default_client: F::Client, factory: F) -> Self {
        Self::with_shared_default(default_selector, Arc::new(default_client), factory)
    }

    /// 与 [`Self::new`] 相同，但默认客户端由调用方以 `Arc` 共享持有。
    pub fn with_shared_default(
        default_selector: F::Selector,
        default_client: Arc<F::Client>,
        factory: F,
    ) -> Self {
        Self {
            default_selector,
            default_client,
            clients: DashMap::new(),
            gates: DashMap::new(),
            factory,
        }
    }

    /// 解析当前调用应使用的客户端。
    pub fn resolve(&self, ctx: &SelectorStack<F::Selector>) -> Result<Arc<F::Client>, RouterError> {
        match ctx.peek() {
            Some(selector) => self.resolve_selector(selector),
            None => Ok(Arc::clone(&self.default_client)),
        }
    }

    /// 为显式给出的选择器解析客户端。
    pub fn resolve_selector(
        &self,
        selector: &F::Selector,
    ) -> Result<Arc<F::Client>, RouterError> {
        if *selector == self.default_selector {
            return Ok(Arc::clone(&self.default_client));
        }
        if let Some(client) = self.cached_client(selector) {
            return Ok(client);
        }
        self.build_once(selector)
    }

    fn build_once(&self, selector: &F::Selector) -> Result<Arc<F::Client>, RouterError> {
        // 闸门的 `RefMut` 在本语句结束时释放，持有闸门锁期间不占用任何分片锁。
        let gate = Arc::clone(
            &self
                .gates
                .entry(selector.clone())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        );
        let _guard = gate.lock();

        if let Some(client) = self.cached_client(selector) {
            return Ok(client);
        }

        debug!(%selector, "building client on first use");
        let client = match self.factory.create(selector) {
            Ok(client) => Arc::new(client),
            Err(error) => {
                // 仅映射与本调用持有闸门时无人排队；克隆闸门需要同一分片锁。
                self.gates
                    .remove_if(selector, |_, held| Arc::strong_count(held) == 2);
                warn!(%selector, %error, "client construction failed; cache left untouched");
                return Err(RouterError::from_build(selector, error));
            }
        };

        self.clients.insert(selector.clone(), Arc::clone(&client));
        self.gates.remove(selector);
        info!(%selector, cached = self.clients.len(), "client published");
        Ok(client)
    }

    /// 已缓存的客户端；不会触发构造。
    pub fn cached_client(&self, selector: &F::Selector) -> Option<Arc<F::Client>> {
        self.clients.get(selector).map(|entry| Arc::clone(entry.value()))
    }

    /// 已缓存的选择器集合（不含默认选择器），顺序不保证。
    pub fn cached_selectors(&self) -> Vec<F::Selector> {
        self.clients.iter().map(|entry| entry.key().clone()).collect()
    }

    /// 默认选择器。
    pub fn default_selector(&self) -> &F::Selector {
        &self.default_selector
    }

    /// 默认客户端。
    pub fn default_client(&self) -> &Arc<F::Client> {
        &self.default_client
    }

    /// 注入的工厂。
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// 已缓存的客户端数量（不含默认客户端）。
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// 是否尚未缓存任何客户端。
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl<F: ClientFactory> fmt::Debug for DynamicRouter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicRouter")
            .field("default_selector", &self.default_selector)
            .field("cached", &self.clients.len())
            .finish_non_exhaustive()
    }
}
