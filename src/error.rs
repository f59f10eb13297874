use thiserror::Error;

/// 只在边界处出现的错误：解析地址、解析策略名、加载配置。
/// 地址选择本身从不报错，没有可用地址时返回 `None`。
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid endpoint `{input}`: {reason}")]
    InvalidEndpoint { input: String, reason: &'static str },
    #[error("unknown selection strategy `{0}`")]
    UnknownStrategy(String),
    #[error("config error")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
