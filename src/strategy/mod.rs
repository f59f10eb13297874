pub mod lcg;
pub mod random;
pub mod round_robin;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::endpoint::Endpoint;
use crate::error::Error;

pub use random::{DEFAULT_SEED, RandomStrategy};
pub use round_robin::RoundRobinStrategy;

/// 从当前成员中挑出一个地址
///
/// 状态的可变借用由宿主的锁保证独占，实现不需要自己做同步。
/// 集合为空时返回 `None`，且不得修改传入的切片。
pub trait SelectionStrategy: Send {
    fn select(&mut self, addresses: &[Endpoint]) -> Option<Endpoint>;
}

/// 策略种类，用于配置和日志
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StrategyKind {
    #[default]
    #[serde(rename = "random")]
    Random,
    #[serde(rename = "round-robin")]
    RoundRobin,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Random => "random",
            StrategyKind::RoundRobin => "round-robin",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(StrategyKind::Random),
            "round-robin" | "round_robin" | "roundrobin" | "sequential" => {
                Ok(StrategyKind::RoundRobin)
            }
            _ => Err(Error::UnknownStrategy(s.to_string())),
        }
    }
}

/// 随机策略的种子来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedSource {
    Fixed(u64),
    Entropy,
}

impl Default for SeedSource {
    fn default() -> Self {
        SeedSource::Fixed(DEFAULT_SEED)
    }
}

/// 构造策略所需的全部配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StrategyConfig {
    pub kind: StrategyKind,
    pub seed: SeedSource,
}

impl StrategyConfig {
    pub fn new(kind: StrategyKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = SeedSource::Fixed(seed);
        self
    }

    pub fn build(&self) -> Strategy {
        match self.kind {
            StrategyKind::Random => match self.seed {
                SeedSource::Fixed(seed) => Strategy::Random(RandomStrategy::with_seed(seed)),
                SeedSource::Entropy => Strategy::Random(RandomStrategy::from_entropy()),
            },
            StrategyKind::RoundRobin => Strategy::RoundRobin(RoundRobinStrategy::new()),
        }
    }
}

/// 封闭的策略集合
#[derive(Debug, Clone)]
pub enum Strategy {
    Random(RandomStrategy),
    RoundRobin(RoundRobinStrategy),
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Random(_) => StrategyKind::Random,
            Strategy::RoundRobin(_) => StrategyKind::RoundRobin,
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        StrategyConfig::default().build()
    }
}

impl From<StrategyKind> for Strategy {
    fn from(kind: StrategyKind) -> Self {
        StrategyConfig::new(kind).build()
    }
}

impl From<RandomStrategy> for Strategy {
    fn from(s: RandomStrategy) -> Self {
        Strategy::Random(s)
    }
}

impl From<RoundRobinStrategy> for Strategy {
    fn from(s: RoundRobinStrategy) -> Self {
        Strategy::RoundRobin(s)
    }
}

impl SelectionStrategy for Strategy {
    fn select(&mut self, addresses: &[Endpoint]) -> Option<Endpoint> {
        match self {
            Strategy::Random(s) => s.select(addresses),
            Strategy::RoundRobin(s) => s.select(addresses),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str() {
        assert_eq!("random".parse::<StrategyKind>().unwrap(), StrategyKind::Random);
        assert_eq!(" Round-Robin ".parse::<StrategyKind>().unwrap(), StrategyKind::RoundRobin);
        assert_eq!("sequential".parse::<StrategyKind>().unwrap(), StrategyKind::RoundRobin);
        assert!(matches!(
            "weighted".parse::<StrategyKind>(),
            Err(Error::UnknownStrategy(name)) if name == "weighted"
        ));
    }

    #[test]
    fn test_kind_serde() {
        assert_eq!(serde_json::to_string(&StrategyKind::RoundRobin).unwrap(), "\"round-robin\"");
        let kind: StrategyKind = serde_json::from_str("\"random\"").unwrap();
        assert_eq!(kind, StrategyKind::Random);
    }

    #[test]
    fn test_every_variant_returns_none_on_empty() {
        for kind in [StrategyKind::Random, StrategyKind::RoundRobin] {
            let mut s = Strategy::from(kind);
            assert_eq!(s.kind(), kind);
            assert!(s.select(&[]).is_none());
        }
    }

    #[test]
    fn test_config_build_uses_seed() {
        let addrs: Vec<Endpoint> = (1..=5).map(|p| Endpoint::new("h", p)).collect();
        let mut a = StrategyConfig::new(StrategyKind::Random).with_seed(99).build();
        let mut b = Strategy::from(RandomStrategy::with_seed(99));
        for _ in 0..20 {
            assert_eq!(a.select(&addrs), b.select(&addrs));
        }
    }
}
