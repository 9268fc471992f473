//! 操作门面端到端测试：经 `bootstrap` 装配，在进程内存储上验证分区路由、过期与失败隔离。

use std::thread;
use std::time::Duration;

use spark_kv_router::{
    Expiry, NO_EXPIRE, Partition, PartitionHelper, RouterError, SelectorStack, TimeUnit, bootstrap,
};
use spark_kv_transport::{
    ConnectionBuilder, KvClient, TransportConfig, memory::MemoryConnector,
};

type Helper = PartitionHelper<ConnectionBuilder<MemoryConnector>>;

fn helper_with(config: TransportConfig, connector: &MemoryConnector) -> Helper {
    bootstrap(ConnectionBuilder::new(config, connector.clone())).expect("装配门面")
}

fn default_helper(connector: &MemoryConnector) -> Helper {
    helper_with(TransportConfig::default(), connector)
}

#[test]
fn values_round_trip_within_a_partition() {
    let connector = MemoryConnector::new();
    let helper = default_helper(&connector);
    let mut ctx = SelectorStack::new();

    helper
        .set_with_partition(&mut ctx, 3, "user:1", "alice", NO_EXPIRE, None)
        .expect("写入分区 3");
    assert_eq!(
        helper.get_with_partition(&mut ctx, 3, "user:1").expect("读取"),
        Some("alice".to_owned())
    );
    assert!(ctx.is_empty(), "操作结束后选择器栈应恢复为空");
}

#[test]
fn partitions_are_isolated() {
    let connector = MemoryConnector::new();
    let helper = default_helper(&connector);
    let mut ctx = SelectorStack::new();

    helper
        .set_with_partition(&mut ctx, 1, "k", "one", NO_EXPIRE, None)
        .expect("写入分区 1");
    helper
        .set_with_partition(&mut ctx, 2, "k", "two", NO_EXPIRE, None)
        .expect("写入分区 2");

    assert_eq!(
        helper.get_with_partition(&mut ctx, 1, "k").expect("读取"),
        Some("one".to_owned())
    );
    assert_eq!(
        helper.get_with_partition(&mut ctx, 2, "k").expect("读取"),
        Some("two".to_owned())
    );
    assert_eq!(helper.get_with_partition(&mut ctx, 4, "k").expect("读取"), None);
    assert_eq!(connector.store().len(Partition::new(1)), 1);
    assert_eq!(connector.store().len(Partition::new(2)), 1);
}

#[test]
fn empty_context_uses_default_partition() {
    let connector = MemoryConnector::new();
    let config = TransportConfig {
        database: Partition::new(2),
        ..TransportConfig::default()
    };
    let helper = helper_with(config, &connector);
    let ctx = SelectorStack::new();

    helper
        .str_set(&ctx, "greeting", "hello", Expiry::Never)
        .expect("写入默认分区");
    assert_eq!(connector.store().len(Partition::new(2)), 1);

    let mut ctx = ctx;
    assert_eq!(
        helper.get_with_partition(&mut ctx, 2, "greeting").expect("读取"),
        Some("hello".to_owned())
    );
    assert_eq!(
        connector.connection_count_for(Partition::new(2)),
        1,
        "显式选择默认分区不应再次建连"
    );
    assert!(helper.router().is_empty());
}

#[test]
fn first_use_connects_once_per_partition() {
    let connector = MemoryConnector::new();
    let helper = default_helper(&connector);
    let mut ctx = SelectorStack::new();

    for round in 0..5 {
        helper
            .set_with_partition(&mut ctx, 6, "counter", &round.to_string(), NO_EXPIRE, None)
            .expect("写入");
    }
    assert_eq!(connector.connection_count_for(Partition::new(6)), 1);
    assert_eq!(helper.router().cached_selectors(), vec![Partition::new(6)]);
}

#[test]
fn ttl_defaults_to_seconds() {
    let connector = MemoryConnector::new();
    let helper = default_helper(&connector);
    let mut ctx = SelectorStack::new();

    helper
        .set_with_partition(&mut ctx, 0, "a", "1", 5, Some(TimeUnit::Seconds))
        .expect("写入带过期的值");
    helper
        .set_with_partition(&mut ctx, 0, "b", "2", 5, None)
        .expect("缺省单位写入");
    assert_eq!(
        helper.get_with_partition(&mut ctx, 0, "a").expect("读取"),
        Some("1".to_owned())
    );
    assert_eq!(
        helper.get_with_partition(&mut ctx, 0, "b").expect("读取"),
        Some("2".to_owned())
    );
}

#[test]
fn values_disappear_after_ttl() {
    let connector = MemoryConnector::new();
    let helper = default_helper(&connector);
    let mut ctx = SelectorStack::new();

    helper
        .set_with_partition(&mut ctx, 4, "session", "token", 30, Some(TimeUnit::Milliseconds))
        .expect("写入");
    thread::sleep(Duration::from_millis(80));
    assert_eq!(
        helper.get_with_partition(&mut ctx, 4, "session").expect("读取"),
        None,
        "过期后的键不可见"
    );
}

#[test]
fn expire_with_partition_applies_to_existing_keys_only() {
    let connector = MemoryConnector::new();
    let helper = default_helper(&connector);
    let mut ctx = SelectorStack::new();

    helper
        .set_with_partition(&mut ctx, 5, "k", "v", NO_EXPIRE, None)
        .expect("写入");
    assert!(
        helper
            .expire_with_partition(&mut ctx, 5, "k", 20, Some(TimeUnit::Milliseconds))
            .expect("设置过期")
    );
    assert!(
        !helper
            .expire_with_partition(&mut ctx, 5, "missing", 1, None)
            .expect("不存在的键")
    );
    assert_eq!(
        helper.expire_with_partition(&mut ctx, 5, "k", NO_EXPIRE, None),
        Err(RouterError::InvalidExpiry { ttl: NO_EXPIRE })
    );

    thread::sleep(Duration::from_millis(60));
    assert_eq!(helper.get_with_partition(&mut ctx, 5, "k").expect("读取"), None);
}

#[test]
fn delete_with_partition_reports_presence() {
    let connector = MemoryConnector::new();
    let helper = default_helper(&connector);
    let mut ctx = SelectorStack::new();

    helper
        .set_with_partition(&mut ctx, 8, "k", "v", NO_EXPIRE, None)
        .expect("写入");
    assert!(helper.delete_with_partition(&mut ctx, 8, "k").expect("删除"));
    assert!(!helper.delete_with_partition(&mut ctx, 8, "k").expect("重复删除"));
}

#[test]
fn negative_ttl_other_than_sentinel_is_rejected_before_routing() {
    let connector = MemoryConnector::new();
    let helper = default_helper(&connector);
    let mut ctx = SelectorStack::new();

    let error = helper
        .set_with_partition(&mut ctx, 3, "k", "v", -5, None)
        .expect_err("负的过期时间");
    assert_eq!(error, RouterError::InvalidExpiry { ttl: -5 });
    assert_eq!(connector.connection_count_for(Partition::new(3)), 0);
    assert!(ctx.is_empty());
}

#[test]
fn invalid_partition_is_rejected_without_connecting() {
    let connector = MemoryConnector::new();
    let helper = default_helper(&connector);
    let mut ctx = SelectorStack::new();
    let before = connector.connection_count();

    let error = helper
        .get_with_partition(&mut ctx, -1, "k")
        .expect_err("负的分区号");
    assert!(matches!(error, RouterError::InvalidSelector { value: -1, .. }));
    assert!(!error.is_retryable());
    assert_eq!(connector.connection_count(), before);
    assert!(ctx.is_empty(), "校验失败不得向栈中留下条目");

    let error = helper
        .get_with_partition(&mut ctx, i64::from(u32::MAX) + 1, "k")
        .expect_err("超出范围的分区号");
    assert!(matches!(error, RouterError::InvalidSelector { .. }));
}

#[test]
fn failed_partition_does_not_affect_others() {
    let connector = MemoryConnector::new();
    let helper = default_helper(&connector);
    let mut ctx = SelectorStack::new();

    helper
        .set_with_partition(&mut ctx, 3, "k", "three", NO_EXPIRE, None)
        .expect("分区 3 可用");
    connector.refuse(Partition::new(7));

    let error = helper
        .set_with_partition(&mut ctx, 7, "k", "seven", NO_EXPIRE, None)
        .expect_err("分区 7 拒绝建连");
    assert!(
        matches!(
            error,
            RouterError::ResourceCreationFailed { ref selector, .. } if selector == "db7"
        ),
        "错误应携带失败的分区：{error:?}"
    );
    assert!(error.is_retryable());
    assert!(ctx.is_empty(), "失败路径同样要弹出选择器");
    assert!(helper.router().cached_client(&Partition::new(7)).is_none());

    assert_eq!(
        helper.get_with_partition(&mut ctx, 3, "k").expect("分区 3 不受影响"),
        Some("three".to_owned())
    );

    connector.accept(Partition::new(7));
    helper
        .set_with_partition(&mut ctx, 7, "k", "seven", NO_EXPIRE, None)
        .expect("条件恢复后重试成功");
    assert_eq!(connector.connection_count_for(Partition::new(7)), 2);
    assert!(helper.router().cached_client(&Partition::new(7)).is_some());
}

#[test]
fn nested_partitions_restore_the_outer_selector() {
    let connector = MemoryConnector::new();
    let helper = default_helper(&connector);
    let mut ctx = SelectorStack::new();

    let value = helper
        .with_partition(&mut ctx, 1, |helper, scope| {
            helper.str_set(scope, "k", "outer", Expiry::Never)?;
            helper.set_with_partition(scope, 2, "k", "inner", NO_EXPIRE, None)?;
            assert_eq!(scope.peek(), Some(&Partition::new(1)), "内层结束后恢复外层分区");
            assert_eq!(scope.depth(), 1);
            helper.str_get(scope, "k")
        })
        .expect("嵌套作用域");
    assert_eq!(value, Some("outer".to_owned()));
    assert!(ctx.is_empty());
    assert_eq!(connector.store().len(Partition::new(2)), 1);
}

#[test]
fn malformed_url_fails_bootstrap() {
    let connector = MemoryConnector::new();
    let config = TransportConfig {
        url: Some("ftp://example.com:6379".to_owned()),
        ..TransportConfig::default()
    };

    let error = bootstrap(ConnectionBuilder::new(config, connector.clone()))
        .expect_err("非 redis 协议");
    assert!(matches!(error, RouterError::MalformedEndpoint { .. }), "{error:?}");
    assert!(!error.is_retryable());
    assert_eq!(connector.connection_count(), 0, "非法 URL 不应触发建连");
}

#[test]
fn url_selects_default_partition_and_credentials() {
    let connector = MemoryConnector::new().with_password("s3cret");
    let config = TransportConfig::from_toml_str(
        r#"
            url = "redis://:s3cret@cache.internal:6380"
            database = 3
            client_name = "billing"
        "#,
    )
    .expect("解析配置");
    let helper = helper_with(config, &connector);

    let default_client = helper.router().default_client();
    assert_eq!(default_client.partition(), Partition::new(3));
    assert_eq!(default_client.client_name(), Some("billing"));

    let mut ctx = SelectorStack::new();
    helper
        .set_with_partition(&mut ctx, 9, "k", "v", NO_EXPIRE, None)
        .expect("同一口令可建立其它分区的连接");
}

#[test]
fn wrong_password_surfaces_as_creation_failure() {
    let connector = MemoryConnector::new().with_password("expected");
    let config = TransportConfig {
        password: Some("wrong".to_owned()),
        ..TransportConfig::default()
    };

    let error = bootstrap(ConnectionBuilder::new(config, connector)).expect_err("口令错误");
    assert!(matches!(
        error,
        RouterError::ResourceCreationFailed { ref selector, .. } if selector == "db0"
    ));
}
