//! 复制组的节点地址选择
//!
//! 为每个复制组维护当前成员，并在每次建立连接前按可插拔策略交出一个地址。
//! 选择与成员变更在同一把锁下串行，任何时刻都可以并发调用。
//!
//! ```
//! use replica_selector::{Endpoint, StrategyHost, StrategyKind};
//!
//! let host = StrategyHost::new("group1", StrategyKind::RoundRobin);
//! host.update_addresses(
//!     ["sdb1:11820".parse::<Endpoint>().unwrap(), "sdb2:11820".parse().unwrap()],
//!     [],
//! );
//!
//! assert_eq!(host.get_address(), Some(Endpoint::new("sdb1", 11820)));
//! assert_eq!(host.get_address(), Some(Endpoint::new("sdb2", 11820)));
//!
//! host.update_addresses([], [Endpoint::new("sdb1", 11820), Endpoint::new("sdb2", 11820)]);
//! assert_eq!(host.get_address(), None);
//! ```

pub mod address_set;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod host;
pub mod metrics;
pub mod registry;
pub mod strategy;

pub use address_set::{AddressSet, Snapshot};
pub use endpoint::{DEFAULT_PORT, Endpoint};
pub use error::{Error, Result};
pub use host::StrategyHost;
pub use registry::GroupRegistry;
pub use strategy::{
    RandomStrategy, RoundRobinStrategy, SelectionStrategy, Strategy, StrategyConfig, StrategyKind,
};
