#![deny(unsafe_code)]
#![doc = r#"
# spark-kv-transport

## 设计动机（Why）
- **定位**：为“单服务端、多分区（database）”的 KV 存储提供按分区构建客户端的能力，
  把 URL 解析、凭证提取、超时与连接池参数翻译等细节收敛在一处。
- **架构角色**：位于路由核心 `spark-kv-router` 之下，作为其唯一的客户端工厂来源；
  本 crate 不实现任何 KV 线协议，真正的网络握手由 [`Connector`] 的实现方负责。

## 核心契约（What）
- [`ConnectionBuilder::build`]：`分区 + 共享传输配置 → 已就绪的客户端`，不持有与“上一次构建了哪个分区”相关的可变状态；
- [`parse_url`]：仅接受 `redis`/`rediss` 两种 scheme，其余一律以 [`BuildError::MalformedEndpoint`] 拒绝；
- [`TransportConfig`]：只读配置，由调用方反序列化后交入，本 crate 不访问文件或环境变量。

## 实现策略（How）
- 配置 → [`ConnectionSettings`] 的翻译是纯函数，便于单测；
- [`SettingsCustomizer`] 钩子在翻译完成、建连之前按注册顺序执行；
- [`memory`] 模块提供进程内存储，供测试与演示替代真实服务端。

## 风险与考量（Trade-offs）
- 连接池参数只做“原样透传”，是否真正生效取决于 [`Connector`] 实现；
- 默认端口固定为 6379，与主流服务端保持一致。
"#]

mod builder;
mod client;
mod config;
mod endpoint;
mod error;
pub mod memory;
mod partition;
mod settings;

pub use builder::ConnectionBuilder;
pub use client::{Connector, KvClient, SettingsCustomizer};
pub use config::{PoolLimits, TransportConfig};
pub use endpoint::{ConnectionInfo, DEFAULT_PORT, Scheme, parse_url};
pub use error::{BuildError, ClientError, ConfigError, InvalidPartition};
pub use partition::Partition;
pub use settings::ConnectionSettings;
