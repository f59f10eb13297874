use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// 协调节点默认端口
pub const DEFAULT_PORT: u16 = 11810;

/// 一个服务进程的地址 (host, port)，按值比较
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// 不做校验；来自配置或外部输入的文本应通过 `parse` 构造
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // IPv6 字面量需要加方括号
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    /// 支持 `host:port`、`host`（使用默认端口）、`[v6]:port` 和 `[v6]`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let invalid = |reason| Error::InvalidEndpoint {
            input: s.to_string(),
            reason,
        };

        let (host, port) = if let Some(rest) = input.strip_prefix('[') {
            let (host, tail) = rest.split_once(']').ok_or_else(|| invalid("unclosed '['"))?;
            match tail {
                "" => (host, None),
                _ => {
                    let port = tail
                        .strip_prefix(':')
                        .ok_or_else(|| invalid("unexpected text after ']'"))?;
                    (host, Some(port))
                }
            }
        } else {
            match input.rsplit_once(':') {
                Some((host, _)) if host.contains(':') => {
                    return Err(invalid("IPv6 host must be enclosed in brackets"));
                }
                Some((host, port)) => (host, Some(port)),
                None => (input, None),
            }
        };

        if host.is_empty() {
            return Err(invalid("empty host"));
        }
        if host.chars().any(char::is_whitespace) {
            return Err(invalid("host contains whitespace"));
        }

        let port = match port {
            None => DEFAULT_PORT,
            Some(p) if !p.bytes().all(|b| b.is_ascii_digit()) => {
                return Err(invalid("port is not a number in 1..=65535"));
            }
            Some(p) => match p.parse::<u16>() {
                Ok(0) => return Err(invalid("port must be non-zero")),
                Ok(port) => port,
                Err(_) => return Err(invalid("port is not a number in 1..=65535")),
            },
        };

        Ok(Endpoint::new(host, port))
    }
}

impl TryFrom<String> for Endpoint {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Endpoint> for String {
    fn from(value: Endpoint) -> Self {
        value.to_string()
    }
}

/// 解析逗号分隔的地址列表，如 `"sdb1:11810, sdb2:11820"`，空项会被忽略
pub fn parse_address_list(list: &str) -> Result<Vec<Endpoint>, Error> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}
