use prometheus::{Encoder, IntCounterVec, IntGaugeVec, TextEncoder, register_int_counter_vec, register_int_gauge_vec};
use once_cell::sync::Lazy;

use crate::strategy::StrategyKind;

pub static SELECTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "replica_selector_selections_total",
        "Total address selections by outcome",
        &["group", "strategy", "outcome"]
    )
    .unwrap()
});

pub static GROUP_MEMBERS: Lazy<IntGaugeVec> = Lazy::new(|| {
    register_int_gauge_vec!(
        "replica_selector_group_members",
        "Current number of endpoints in each replica group",
        &["group"]
    )
    .unwrap()
});

pub(crate) fn record_selection(group: &str, strategy: &str, hit: bool) {
    let outcome = if hit { "hit" } else { "none" };
    SELECTIONS.with_label_values(&[group, strategy, outcome]).inc();
}

pub(crate) fn record_members(group: &str, size: usize) {
    GROUP_MEMBERS
        .with_label_values(&[group])
        .set(i64::try_from(size).unwrap_or(i64::MAX));
}

/// 组被移除后清掉它的标签，避免标签只增不减
pub(crate) fn forget_group(group: &str) {
    let _ = GROUP_MEMBERS.remove_label_values(&[group]);
    for strategy in [StrategyKind::Random, StrategyKind::RoundRobin] {
        for outcome in ["hit", "none"] {
            let _ = SELECTIONS.remove_label_values(&[group, strategy.as_str(), outcome]);
        }
    }
}

/// 以 Prometheus 文本格式导出所有指标
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_render() {
        record_selection("metrics-test", "random", true);
        record_selection("metrics-test", "random", false);
        record_selection("metrics-test", "random", false);
        record_members("metrics-test", 3);

        let hits = SELECTIONS.with_label_values(&["metrics-test", "random", "hit"]).get();
        let misses = SELECTIONS.with_label_values(&["metrics-test", "random", "none"]).get();
        assert_eq!(hits, 1);
        assert_eq!(misses, 2);
        assert_eq!(GROUP_MEMBERS.with_label_values(&["metrics-test"]).get(), 3);

        let text = render_metrics().unwrap();
        assert!(text.contains("replica_selector_selections_total"));
        assert!(text.contains("group=\"metrics-test\""));
    }

    #[test]
    fn test_forget_group_drops_labels() {
        record_members("metrics-forget", 2);
        record_selection("metrics-forget", "round-robin", true);
        record_selection("metrics-forget", "random", false);
        assert!(render_metrics().unwrap().contains("group=\"metrics-forget\""));

        forget_group("metrics-forget");
        assert!(!render_metrics().unwrap().contains("group=\"metrics-forget\""));

        // 没有记录过的组也可以安全清理
        forget_group("metrics-never-seen");
    }
}
