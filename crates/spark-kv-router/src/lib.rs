#![deny(unsafe_code)]

//! # spark-kv-router
//!
//! ## 定位与职责（Why）
//! - 让业务代码通过同一个句柄访问同一 KV 服务端上的多个分区，按调用切换分区，
//!   而不必为每次切换新建连接；
//! - 核心是动态路由器：依据调用上下文中的选择器解析客户端，按选择器惰性构造并永久缓存，
//!   无选择器时回落到默认客户端。
//!
//! ## 架构嵌入（Where）
//! - `context` 模块提供调用作用域内的选择器栈；
//! - `factory` 模块定义客户端工厂能力接口，`spark_kv_transport::ConnectionBuilder` 是其默认实现；
//! - `router` 模块实现缓存与单次构造保证；
//! - `helper` 模块是面向业务的操作门面，`bootstrap` 负责一次性装配。
//!
//! ## 并发策略（Trade-offs）
//! - 缓存以 `DashMap` 分片，首次构造以每选择器一把 `parking_lot::Mutex` 串行化；
//! - 缓存只增不减，规模等于实际使用过的分区数量。

mod bootstrap;
mod context;
mod error;
mod factory;
mod helper;
mod router;

pub use bootstrap::bootstrap;
pub use context::{SelectorScope, SelectorStack};
pub use error::RouterError;
pub use factory::{ClientFactory, FnFactory, factory_fn};
pub use helper::{Expiry, NO_EXPIRE, PartitionHelper, TimeUnit};
pub use router::DynamicRouter;
pub use spark_kv_transport::Partition;
