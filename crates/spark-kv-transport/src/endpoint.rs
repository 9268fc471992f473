use core::fmt;

use url::Url;

use crate::error::BuildError;

/// 未显式指定端口时使用的默认端口。
pub const DEFAULT_PORT: u16 = 6379;

/// 端点 URL 支持的 scheme。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// 明文传输，`redis://`。
    Plain,
    /// TLS 传输，`rediss://`。
    Secure,
}

impl Scheme {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "redis" => Some(Scheme::Plain),
            "rediss" => Some(Scheme::Secure),
            _ => None,
        }
    }

    /// 返回 URL 中的 scheme 字面量。
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Plain => "redis",
            Scheme::Secure => "rediss",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 从端点 URL 中解析出的连接信息。
///
/// # 教案式说明
/// - **意图 (Why)**：URL 与离散的 `host`/`port`/`password` 字段是两种等价的配置方式，
///   先解析为统一结构，再由 [`ConnectionSettings`](crate::ConnectionSettings) 决定采用哪一种；
/// - **契约 (What)**：`host` 非空；`port` 缺省为 [`DEFAULT_PORT`]；
///   `userinfo` 为 `user:password` 时两者均保留，为裸 `password` 时只产出密码；
/// - **风险 (Trade-offs)**：`Debug` 输出会隐去密码，避免凭证落入日志。
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    scheme: Scheme,
    host: String,
    port: u16,
    username: Option<String>,
    password: Option<String>,
}

impl ConnectionInfo {
    /// 端点 scheme。
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// 是否要求 TLS。
    pub fn use_ssl(&self) -> bool {
        self.scheme == Scheme::Secure
    }

    /// 主机名或 IP 字面量（IPv6 不带方括号）。
    pub fn host(&self) -> &str {
        &self.host
    }

    /// 端口。
    pub fn port(&self) -> u16 {
        self.port
    }

    /// 用户名，仅在 `user:password` 形式下存在。
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// 密码。
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}

impl fmt::Debug for ConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionInfo")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// 解析端点 URL。
///
/// 语法为 `scheme://[userinfo@]host[:port][/path]`，`scheme` 仅限 `redis` 与 `rediss`。
/// 其它 scheme、缺失主机或无法解析的 URL 均返回 [`BuildError::MalformedEndpoint`]。
pub fn parse_url(url: &str) -> Result<ConnectionInfo, BuildError> {
    let parsed = Url::parse(url).map_err(|err| malformed(url, err.to_string()))?;

    let scheme = Scheme::from_name(parsed.scheme())
        .ok_or_else(|| malformed(url, format!("unsupported scheme `{}`", parsed.scheme())))?;

    let host = parsed
        .host_str()
        .map(|host| host.trim_start_matches('[').trim_end_matches(']'))
        .filter(|host| !host.is_empty())
        .ok_or_else(|| malformed(url, "missing host".to_owned()))?
        .to_owned();

    let port = parsed.port().unwrap_or(DEFAULT_PORT);

    // 裸 userinfo 视为密码；`:secret` 形式的空用户名不产出 username。
    let user = parsed.username();
    let (username, password) = match parsed.password() {
        Some(password) => (
            (!user.is_empty()).then(|| user.to_owned()),
            Some(password.to_owned()),
        ),
        None if !user.is_empty() => (None, Some(user.to_owned())),
        None => (None, None),
    };

    Ok(ConnectionInfo {
        scheme,
        host,
        port,
        username,
        password,
    })
}

fn malformed(url: &str, reason: String) -> BuildError {
    BuildError::MalformedEndpoint {
        url: url.to_owned(),
        reason,
    }
}
