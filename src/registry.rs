use std::sync::Arc;

use dashmap::DashMap;
use tracing::info;

use crate::endpoint::Endpoint;
use crate::host::StrategyHost;
use crate::metrics;
use crate::strategy::StrategyConfig;

/// 复制组名到 `StrategyHost` 的映射
///
/// 每个组的宿主各自加锁，互不影响；注册表本身只在查找/插入时短暂占用分片锁，
/// 不会在持有分片锁时去拿宿主的锁。
#[derive(Debug, Default)]
pub struct GroupRegistry {
    hosts: DashMap<String, Arc<StrategyHost>>,
    strategy: StrategyConfig,
}

impl GroupRegistry {
    pub fn new(strategy: StrategyConfig) -> Self {
        Self {
            hosts: DashMap::new(),
            strategy,
        }
    }

    pub fn strategy_config(&self) -> StrategyConfig {
        self.strategy
    }

    /// 获取组对应的宿主，不存在时按默认策略创建
    pub fn host(&self, group: &str) -> Arc<StrategyHost> {
        if let Some(host) = self.hosts.get(group) {
            return Arc::clone(host.value());
        }
        let host = self
            .hosts
            .entry(group.to_string())
            .or_insert_with(|| {
                info!(group, strategy = %self.strategy.kind, "replica group registered");
                Arc::new(StrategyHost::new(group, self.strategy.build()))
            });
        Arc::clone(host.value())
    }

    pub fn get(&self, group: &str) -> Option<Arc<StrategyHost>> {
        self.hosts.get(group).map(|h| Arc::clone(h.value()))
    }

    pub fn remove(&self, group: &str) -> Option<Arc<StrategyHost>> {
        let removed = self.hosts.remove(group).map(|(_, host)| host);
        if removed.is_some() {
            metrics::forget_group(group);
            info!(group, "replica group removed");
        }
        removed
    }

    /// 已注册的组名，按字典序
    pub fn groups(&self) -> Vec<String> {
        let mut names: Vec<String> = self.hosts.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// 未知的组同样视为没有可用地址
    pub fn get_address(&self, group: &str) -> Option<Endpoint> {
        self.get(group)?.get_address()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::StrategyKind;

    fn ep(port: u16) -> Endpoint {
        Endpoint::new("localhost", port)
    }

    #[test]
    fn test_host_is_created_once() {
        let registry = GroupRegistry::new(StrategyConfig::new(StrategyKind::RoundRobin));
        let h1 = registry.host("group1");
        let h2 = registry.host("group1");
        assert!(Arc::ptr_eq(&h1, &h2));
        assert_eq!(h1.strategy_kind(), StrategyKind::RoundRobin);
        assert_eq!(h1.name(), "group1");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_groups_are_independent() {
        let registry = GroupRegistry::new(StrategyConfig::new(StrategyKind::RoundRobin));
        registry.host("g1").replace_addresses([ep(1), ep(2)]);
        registry.host("g2").replace_addresses([ep(3)]);

        assert_eq!(registry.get_address("g1"), Some(ep(1)));
        assert_eq!(registry.get_address("g2"), Some(ep(3)));
        assert_eq!(registry.get_address("g1"), Some(ep(2)));
        assert_eq!(registry.groups(), vec!["g1".to_string(), "g2".to_string()]);
    }

    #[test]
    fn test_unknown_group_has_no_address() {
        let registry = GroupRegistry::default();
        assert!(registry.get_address("missing").is_none());
        assert!(registry.get("missing").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_group() {
        let registry = GroupRegistry::default();
        let host = registry.host("g1");
        host.add_address(ep(1));
        assert!(registry.remove("g1").is_some());
        assert!(registry.remove("g1").is_none());
        assert!(registry.get_address("g1").is_none());
        // 已经拿到的宿主仍然可用
        assert_eq!(host.get_address(), Some(ep(1)));
    }

    #[test]
    fn test_remove_group_drops_metric_labels() {
        let registry = GroupRegistry::default();
        registry.host("registry-dropped").add_address(ep(1));
        assert_eq!(registry.get_address("registry-dropped"), Some(ep(1)));
        assert!(
            crate::metrics::render_metrics()
                .unwrap()
                .contains("group=\"registry-dropped\"")
        );

        registry.remove("registry-dropped");
        assert!(
            !crate::metrics::render_metrics()
                .unwrap()
                .contains("group=\"registry-dropped\"")
        );
    }

    #[test]
    fn test_each_group_gets_its_own_generator() {
        let registry = GroupRegistry::new(StrategyConfig::new(StrategyKind::Random).with_seed(47));
        for g in ["g1", "g2"] {
            registry.host(g).replace_addresses([ep(1), ep(2), ep(3)]);
        }
        // 两个组各自从种子的第一次抽取开始
        assert_eq!(registry.get_address("g1"), Some(ep(3)));
        assert_eq!(registry.get_address("g2"), Some(ep(3)));
    }
}
