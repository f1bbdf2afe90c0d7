//! Same seed, same configuration: the request log must be identical,
//! run after run. Downstream simulations compare revenue across
//! scenarios and rely on this.

use trademgen_core::{
    config::DemandConfig, demand_manager::DemandManager, event_queue::TimelineQueue,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn request_log(config: &DemandConfig) -> Vec<String> {
    init_logging();
    let mut manager = DemandManager::from_config(config).expect("manager");
    let mut queue = TimelineQueue::new();
    let mut log = Vec::new();
    manager
        .play_all(&mut queue, |event| {
            log.push(serde_json::to_string(event).expect("serialize event"));
        })
        .expect("run");
    log
}

fn weekly_config(seed: u64) -> DemandConfig {
    let mut config = DemandConfig::sample();
    config.seed = seed;
    config.demands[0].date_to = config.demands[0].date_from + chrono::Duration::days(13);
    config.demands[0].demand_mean = 40.0;
    config.demands[0].demand_std_dev = 6.0;
    config
}

#[test]
fn same_seed_produces_identical_request_logs() {
    const SEED: u64 = 0xDEAD_BEEF;

    let log_a = request_log(&weekly_config(SEED));
    let log_b = request_log(&weekly_config(SEED));

    assert!(!log_a.is_empty(), "run produced no requests");
    assert_eq!(
        log_a.len(), log_b.len(),
        "Request log lengths differ: {} vs {}",
        log_a.len(), log_b.len()
    );
    for (i, (a, b)) in log_a.iter().zip(log_b.iter()).enumerate() {
        assert_eq!(a, b, "Request log diverged at entry {i}:\n  A: {a}\n  B: {b}");
    }
}

#[test]
fn different_seeds_produce_different_logs() {
    let log_a = request_log(&weekly_config(42));
    let log_b = request_log(&weekly_config(99));

    let any_different =
        log_a.len() != log_b.len() || log_a.iter().zip(log_b.iter()).any(|(a, b)| a != b);
    assert!(any_different, "Different seeds produced identical logs, seed is not being used");
}

#[test]
fn adding_a_demand_does_not_disturb_earlier_streams() {
    // Seeds are handed out in creation order: appending a definition
    // leaves every earlier stream's sequence untouched.
    let base = weekly_config(7);
    let mut extended = base.clone();
    let mut extra = extended.demands[0].clone();
    extra.destination = "HKG".into();
    extended.demands.push(extra);

    let keep = |log: Vec<String>| -> Vec<String> {
        log.into_iter().filter(|line| line.contains("SIN-BKK")).collect()
    };
    let a = keep(request_log(&base));
    let b = keep(request_log(&extended));
    assert_eq!(a.len(), b.len());
    // Timestamps may be nudged when HKG events collide; compare requests.
    let requests = |log: &[String]| -> Vec<serde_json::Value> {
        log.iter()
            .map(|l| serde_json::from_str::<serde_json::Value>(l).expect("json")["request"].clone())
            .collect()
    };
    assert_eq!(requests(&a), requests(&b));
}
