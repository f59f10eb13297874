use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::address_set::{AddressSet, Snapshot};
use crate::endpoint::Endpoint;
use crate::metrics;
use crate::strategy::{SelectionStrategy, Strategy, StrategyKind};

#[derive(Debug)]
struct HostState {
    addresses: AddressSet,
    strategy: Strategy,
}

/// 持有一个复制组的地址集合和当前策略
///
/// 所有读写都经过同一把锁：选择时快照和调用策略在一次加锁内完成，
/// 并发的成员变更不会被观察到一半。锁内只有内存操作，持有时间很短。
#[derive(Debug)]
pub struct StrategyHost {
    name: String,
    state: Mutex<HostState>,
}

impl StrategyHost {
    pub fn new(name: impl Into<String>, strategy: impl Into<Strategy>) -> Self {
        let name = name.into();
        metrics::record_members(&name, 0);
        Self {
            name,
            state: Mutex::new(HostState {
                addresses: AddressSet::new(),
                strategy: strategy.into(),
            }),
        }
    }

    /// 用初始成员构造
    pub fn with_addresses<I>(name: impl Into<String>, strategy: impl Into<Strategy>, addrs: I) -> Self
    where
        I: IntoIterator<Item = Endpoint>,
    {
        let host = Self::new(name, strategy);
        host.replace_addresses(addrs);
        host
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 取一个地址，没有可用地址时返回 `None`
    pub fn get_address(&self) -> Option<Endpoint> {
        let (picked, kind) = {
            let mut state = self.state.lock();
            let snapshot = state.addresses.snapshot();
            let picked = state.strategy.select(&snapshot);
            (picked, state.strategy.kind())
        };

        metrics::record_selection(&self.name, kind.as_str(), picked.is_some());
        match &picked {
            Some(ep) => debug!(group = %self.name, strategy = %kind, endpoint = %ep, "selected address"),
            None => warn!(group = %self.name, strategy = %kind, "no address available"),
        }
        picked
    }

    /// 先删除再添加；同时出现在两个列表里的地址最终存在，位于末尾
    pub fn update_addresses<A, R>(&self, add: A, remove: R)
    where
        A: IntoIterator<Item = Endpoint>,
        R: IntoIterator<Item = Endpoint>,
    {
        let (added, removed, size) = {
            let mut state = self.state.lock();
            let removed = remove
                .into_iter()
                .filter(|ep| state.addresses.remove(ep))
                .count();
            let added = add
                .into_iter()
                .filter(|ep| state.addresses.add(ep.clone()))
                .count();
            let size = state.addresses.size();
            // 在锁内更新，保证指标与变更顺序一致
            metrics::record_members(&self.name, size);
            (added, removed, size)
        };

        if added > 0 || removed > 0 {
            info!(group = %self.name, added, removed, size, "membership updated");
        }
    }

    pub fn add_address(&self, endpoint: Endpoint) -> bool {
        let (added, size) = {
            let mut state = self.state.lock();
            let added = state.addresses.add(endpoint.clone());
            let size = state.addresses.size();
            if added {
                metrics::record_members(&self.name, size);
            }
            (added, size)
        };
        if added {
            info!(group = %self.name, endpoint = %endpoint, size, "address added");
        }
        added
    }

    pub fn remove_address(&self, endpoint: &Endpoint) -> bool {
        let (removed, size) = {
            let mut state = self.state.lock();
            let removed = state.addresses.remove(endpoint);
            let size = state.addresses.size();
            if removed {
                metrics::record_members(&self.name, size);
            }
            (removed, size)
        };
        if removed {
            info!(group = %self.name, endpoint = %endpoint, size, "address removed");
        }
        removed
    }

    /// 整体替换成员
    pub fn replace_addresses<I>(&self, endpoints: I)
    where
        I: IntoIterator<Item = Endpoint>,
    {
        let size = {
            let mut state = self.state.lock();
            state.addresses.replace(endpoints);
            let size = state.addresses.size();
            metrics::record_members(&self.name, size);
            size
        };
        info!(group = %self.name, size, "membership replaced");
    }

    /// 切换策略，旧策略的内部状态（随机数生成器、轮询游标）随之丢弃
    pub fn set_strategy(&self, kind: StrategyKind) {
        self.set_strategy_instance(Strategy::from(kind));
    }

    pub fn set_strategy_instance(&self, strategy: impl Into<Strategy>) {
        let strategy = strategy.into();
        let kind = strategy.kind();
        let previous = {
            let mut state = self.state.lock();
            std::mem::replace(&mut state.strategy, strategy).kind()
        };
        info!(group = %self.name, from = %previous, to = %kind, "selection strategy switched");
    }

    pub fn strategy_kind(&self) -> StrategyKind {
        self.state.lock().strategy.kind()
    }

    pub fn size(&self) -> usize {
        self.state.lock().addresses.size()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().addresses.is_empty()
    }

    pub fn contains(&self, endpoint: &Endpoint) -> bool {
        self.state.lock().addresses.contains(endpoint)
    }

    /// 当前成员的只读快照
    pub fn snapshot(&self) -> Snapshot {
        self.state.lock().addresses.snapshot()
    }
}
