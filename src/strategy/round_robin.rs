use crate::endpoint::Endpoint;
use crate::strategy::SelectionStrategy;

/// 轮询选择，游标跨调用保留
///
/// 游标记住上一次交出的地址、它的位置以及当时的成员列表：
/// - 该地址仍在集合中时，从它的下一个继续；
/// - 该地址已被移除时，沿旧列表向后找第一个仍是成员的地址（幸存的后继），从它继续。
#[derive(Debug, Clone, Default)]
pub struct RoundRobinStrategy {
    cursor: Option<Cursor>,
}

#[derive(Debug, Clone)]
struct Cursor {
    last: Endpoint,
    index: usize,
    view: Vec<Endpoint>,
}

impl RoundRobinStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_position(&self, addresses: &[Endpoint]) -> usize {
        let Some(cursor) = &self.cursor else {
            return 0;
        };

        // 先在原位置上比对，成员没变时不用线性查找
        if addresses.get(cursor.index) == Some(&cursor.last) {
            return (cursor.index + 1) % addresses.len();
        }
        if let Some(idx) = addresses.iter().position(|e| *e == cursor.last) {
            return (idx + 1) % addresses.len();
        }

        let n = cursor.view.len();
        (1..n)
            .map(|step| &cursor.view[(cursor.index + step) % n])
            .find_map(|survivor| addresses.iter().position(|e| e == survivor))
            .unwrap_or(0)
    }
}

impl SelectionStrategy for RoundRobinStrategy {
    fn select(&mut self, addresses: &[Endpoint]) -> Option<Endpoint> {
        if addresses.is_empty() {
            return None;
        }

        let idx = self.next_position(addresses);
        let picked = addresses[idx].clone();
        match &mut self.cursor {
            Some(cursor) => {
                cursor.last = picked.clone();
                cursor.index = idx;
                if cursor.view != addresses {
                    cursor.view.clear();
                    cursor.view.extend_from_slice(addresses);
                }
            }
            None => {
                self.cursor = Some(Cursor {
                    last: picked.clone(),
                    index: idx,
                    view: addresses.to_vec(),
                });
            }
        }
        Some(picked)
    }
}
