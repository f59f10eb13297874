use std::ops::Deref;
use std::sync::Arc;

use crate::endpoint::Endpoint;

/// 某一时刻地址集合的只读视图
///
/// 与 `AddressSet` 共享底层存储，集合之后的修改会先复制（copy-on-write），
/// 所以快照永远不会被改动。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(Arc<Vec<Endpoint>>);

impl Snapshot {
    pub fn to_vec(&self) -> Vec<Endpoint> {
        self.0.as_ref().clone()
    }
}

impl Deref for Snapshot {
    type Target = [Endpoint];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Endpoint;
    type IntoIter = std::slice::Iter<'a, Endpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// 一个复制组的有序地址集合，不允许重复
///
/// 本身不加锁，由持有它的 `StrategyHost` 负责互斥。
#[derive(Debug, Default)]
pub struct AddressSet {
    addrs: Arc<Vec<Endpoint>>,
}

impl AddressSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 不存在时追加到末尾，返回是否发生了插入
    pub fn add(&mut self, endpoint: Endpoint) -> bool {
        if self.contains(&endpoint) {
            return false;
        }
        Arc::make_mut(&mut self.addrs).push(endpoint);
        true
    }

    /// 存在时删除，其余地址保持原有顺序
    pub fn remove(&mut self, endpoint: &Endpoint) -> bool {
        match self.addrs.iter().position(|e| e == endpoint) {
            Some(idx) => {
                Arc::make_mut(&mut self.addrs).remove(idx);
                true
            }
            None => false,
        }
    }

    /// 整体替换成员，输入中的重复项只保留第一次出现
    pub fn replace<I>(&mut self, endpoints: I)
    where
        I: IntoIterator<Item = Endpoint>,
    {
        let mut next: Vec<Endpoint> = Vec::new();
        for ep in endpoints {
            if !next.contains(&ep) {
                next.push(ep);
            }
        }
        self.addrs = Arc::new(next);
    }

    pub fn contains(&self, endpoint: &Endpoint) -> bool {
        self.addrs.contains(endpoint)
    }

    pub fn size(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot(Arc::clone(&self.addrs))
    }
}
