// tests/config_env.rs
use alert_simulator::config::pools::ENV_POOLS_PATH;
use alert_simulator::config::{AppConfig, PoolsConfig, SinkKind};
use alert_simulator::{SchedulePolicy, UrgencyLevel};
use std::{env, fs};

const VARS: [&str; 6] = [
    "ALERTS_LISTEN_PORT",
    "ALERTS_ENDPOINT_HOST",
    "ALERTS_APP_TOKEN",
    "ALERTS_PERIOD_MS",
    "ALERTS_SCHEDULE_POLICY",
    ENV_POOLS_PATH,
];

fn clear_env() {
    for v in VARS {
        env::remove_var(v);
    }
}

#[test]
fn pools_file_formats() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("pools.toml");
    fs::write(
        &p_toml,
        r#"
titles = ["App Crashed", " Disk Full ", ""]
messages = ["Something really bad has happened", "New User just signed up"]
urgencies = ["LOW", "high"]
"#,
    )
    .unwrap();
    let p = PoolsConfig::load_from(&p_toml).unwrap();
    assert_eq!(p.titles, vec!["App Crashed".to_string(), "Disk Full".to_string()]);
    assert_eq!(p.messages.as_ref().map(|m| m.len()), Some(2));
    assert_eq!(p.urgencies, vec![UrgencyLevel::Low, UrgencyLevel::High]);

    let p_json = dir.path().join("pools.json");
    fs::write(&p_json, r#"{"titles": ["X"], "body_len": 5}"#).unwrap();
    let pj = PoolsConfig::load_from(&p_json).unwrap();
    assert_eq!(pj.titles, vec!["X".to_string()]);
    assert_eq!(pj.body_len, 5);
    assert!(pj.messages.is_none());
}

#[serial_test::serial]
#[test]
fn from_env_reads_process_environment() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("pools.toml");
    fs::write(&p, r#"titles = ["A", "B"]"#).unwrap();

    env::set_var("ALERTS_LISTEN_PORT", "9444");
    env::set_var("ALERTS_ENDPOINT_HOST", "collector.local");
    env::set_var("ALERTS_APP_TOKEN", "ec033ff6");
    env::set_var("ALERTS_PERIOD_MS", "500");
    env::set_var("ALERTS_SCHEDULE_POLICY", "fixed-delay");
    env::set_var(ENV_POOLS_PATH, p.display().to_string());

    let cfg = AppConfig::from_env().unwrap();
    assert_eq!(cfg.listen_port, 9444);
    assert_eq!(cfg.sink, SinkKind::Http);
    assert_eq!(cfg.app_token, "ec033ff6");
    assert_eq!(cfg.schedule.period.as_millis(), 500);
    assert_eq!(cfg.schedule.policy, SchedulePolicy::FixedDelay);
    assert_eq!(cfg.pools.titles, vec!["A".to_string(), "B".to_string()]);

    clear_env();
}

#[serial_test::serial]
#[test]
fn malformed_values_are_fatal() {
    clear_env();
    env::set_var("ALERTS_LISTEN_PORT", "not-a-port");
    let err = AppConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("ALERTS_LISTEN_PORT"), "{err}");

    clear_env();
    env::set_var(ENV_POOLS_PATH, "/no/such/pools.toml");
    assert!(AppConfig::from_env().is_err());

    clear_env();
}
