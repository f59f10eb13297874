use crate::endpoint::Endpoint;
use crate::strategy::SelectionStrategy;
use crate::strategy::lcg::Lcg48;

/// 固定种子，保证测试多次运行得到同样的选择序列
pub const DEFAULT_SEED: u64 = 47;

/// 随机选择：每次在 `[0, n)` 中均匀抽取一个下标
#[derive(Debug, Clone)]
pub struct RandomStrategy {
    seed: u64,
    rng: Lcg48,
}

impl RandomStrategy {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: Lcg48::new(seed),
        }
    }

    /// 使用进程熵作为种子，生产环境下选择序列不可预测
    pub fn from_entropy() -> Self {
        Self::with_seed(rand::random::<u64>())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for RandomStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStrategy for RandomStrategy {
    fn select(&mut self, addresses: &[Endpoint]) -> Option<Endpoint> {
        if addresses.is_empty() {
            return None;
        }
        let idx = self.rng.next_index(addresses.len());
        addresses.get(idx).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Vec<Endpoint> {
        vec![
            Endpoint::new("a", 11810),
            Endpoint::new("b", 11810),
            Endpoint::new("c", 11810),
        ]
    }

    #[test]
    fn test_empty_returns_none() {
        let mut s = RandomStrategy::new();
        assert!(s.select(&[]).is_none());
    }

    #[test]
    fn test_default_seed_sequence() {
        let addrs = abc();
        let mut s = RandomStrategy::new();
        let picked: Vec<String> = (0..5)
            .map(|_| s.select(&addrs).unwrap().host().to_string())
            .collect();
        // 种子 47 在 [0,3) 上的前五次抽取为 2, 2, 1, 2, 1
        assert_eq!(picked, vec!["c", "c", "b", "c", "b"]);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let addrs = abc();
        let mut s1 = RandomStrategy::with_seed(12345);
        let mut s2 = RandomStrategy::with_seed(12345);
        for _ in 0..100 {
            assert_eq!(s1.select(&addrs), s2.select(&addrs));
        }
    }

    #[test]
    fn test_roughly_uniform() {
        let addrs = abc();
        let mut s = RandomStrategy::with_seed(2024);
        let mut counts = std::collections::HashMap::new();
        for _ in 0..6000 {
            let ep = s.select(&addrs).unwrap();
            *counts.entry(ep).or_insert(0) += 1;
        }
        println!("{:?}", counts);
        assert_eq!(counts.len(), 3);
        assert!(counts.values().all(|&c| c > 1500));
    }

    #[test]
    fn test_does_not_touch_input() {
        let addrs = abc();
        let before = addrs.clone();
        let mut s = RandomStrategy::from_entropy();
        for _ in 0..10 {
            assert!(addrs.contains(&s.select(&addrs).unwrap()));
        }
        assert_eq!(addrs, before);
    }
}
