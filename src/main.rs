use serde::Serialize;
use tracing_subscriber::EnvFilter;

use replica_selector::config;
use replica_selector::metrics;
use replica_selector::{Endpoint, GroupRegistry};

#[derive(Debug, Serialize)]
struct Probe {
    group: String,
    strategy: String,
    members: Vec<Endpoint>,
    picks: Vec<Option<Endpoint>>,
}

fn probe(registry: &GroupRegistry, group: &str, rounds: usize) -> Probe {
    let host = registry.host(group);
    let picks = (0..rounds).map(|_| host.get_address()).collect();
    Probe {
        group: group.to_string(),
        strategy: host.strategy_kind().to_string(),
        members: host.snapshot().to_vec(),
        picks,
    }
}

fn main() -> anyhow::Result<()> {
    // 初始化日志：若无 RUST_LOG 则默认 info
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    // 用法：replica-selector [--metrics] [group ...]，不指定组时探测全部
    let mut show_metrics = false;
    let mut groups = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--metrics" => show_metrics = true,
            _ => groups.push(arg),
        }
    }

    let settings = config::load_settings()?;
    let registry = settings.build_registry()?;
    tracing::info!(
        strategy = %settings.strategy,
        groups = registry.len(),
        "replica selector configured"
    );

    if groups.is_empty() {
        groups = registry.groups();
    }
    for group in &groups {
        let result = probe(&registry, group, settings.probe_rounds());
        println!("{}", serde_json::to_string(&result)?);
    }

    if show_metrics {
        print!("{}", metrics::render_metrics()?);
    }
    Ok(())
}
