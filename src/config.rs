use std::collections::BTreeMap;

use serde::Deserialize;

use crate::endpoint::{Endpoint, parse_address_list};
use crate::error::{Error, Result};
use crate::registry::GroupRegistry;
use crate::strategy::{DEFAULT_SEED, SeedSource, StrategyConfig, StrategyKind};

/// 组成员：既可以写成数组，也可以写成逗号分隔的字符串
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum AddressList {
    List(Vec<String>),
    Joined(String),
}

impl AddressList {
    pub fn endpoints(&self) -> Result<Vec<Endpoint>> {
        match self {
            AddressList::List(items) => items.iter().map(|s| s.parse()).collect(),
            AddressList::Joined(s) => parse_address_list(s),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub strategy: StrategyKind,
    pub seed: Option<u64>,
    #[serde(default)]
    pub seed_from_entropy: bool,
    pub probe_rounds: Option<usize>,
    #[serde(default)]
    pub groups: BTreeMap<String, AddressList>,
}

impl Settings {
    pub fn strategy_config(&self) -> StrategyConfig {
        let seed = if self.seed_from_entropy {
            SeedSource::Entropy
        } else {
            SeedSource::Fixed(self.seed.unwrap_or(DEFAULT_SEED))
        };
        StrategyConfig {
            kind: self.strategy,
            seed,
        }
    }

    pub fn probe_rounds(&self) -> usize {
        self.probe_rounds.unwrap_or(3)
    }

    /// 校验所有地址，出错时报告所在的组
    pub fn group_endpoints(&self) -> Result<BTreeMap<String, Vec<Endpoint>>> {
        self.groups
            .iter()
            .map(|(name, list)| -> Result<(String, Vec<Endpoint>)> {
                let endpoints = list.endpoints().map_err(|e| match e {
                    Error::InvalidEndpoint { input, reason } => Error::InvalidEndpoint {
                        input: format!("{input} (group {name})"),
                        reason,
                    },
                    other => other,
                })?;
                Ok((name.clone(), endpoints))
            })
            .collect()
    }

    /// 按配置构建注册表并填入初始成员
    pub fn build_registry(&self) -> Result<GroupRegistry> {
        let groups = self.group_endpoints()?;
        let registry = GroupRegistry::new(self.strategy_config());
        for (name, endpoints) in groups {
            registry.host(&name).replace_addresses(endpoints);
        }
        Ok(registry)
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("SELECTOR")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// 文件在前，环境变量在后，后者覆盖前者
fn builder<F>(file: F, env: config::Environment) -> config::ConfigBuilder<config::builder::DefaultState>
where
    F: config::Source + Send + Sync + 'static,
{
    config::Config::builder().add_source(file).add_source(env)
}

pub fn load_settings() -> Result<Settings> {
    // also load .env
    dotenvy::dotenv().ok();
    let c = builder(config::File::with_name("config").required(false), environment()).build()?;
    Ok(c.try_deserialize::<Settings>()?)
}

/// 用给定的文件内容和环境变量加载，不读取进程环境
pub fn settings_with_env<I, K, V>(text: &str, format: config::FileFormat, vars: I) -> Result<Settings>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let vars: config::Map<String, String> =
        vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
    let c = builder(
        config::File::from_str(text, format),
        environment().source(Some(vars)),
    )
    .build()?;
    Ok(c.try_deserialize::<Settings>()?)
}

/// 从给定文本加载，格式由 `format` 指定
pub fn settings_from_str(text: &str, format: config::FileFormat) -> Result<Settings> {
    let c = config::Config::builder()
        .add_source(config::File::from_str(text, format))
        .build()?;
    Ok(c.try_deserialize::<Settings>()?)
}
