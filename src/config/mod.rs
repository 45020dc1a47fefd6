// src/config/mod.rs
//! Process-wide configuration, read once at startup from the environment.

pub mod pools;

use anyhow::Result;
use reqwest::Url;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::scheduler::{ScheduleCfg, SchedulePolicy};
pub use pools::PoolsConfig;

// --- env names ---
pub const ENV_LISTEN_HOST: &str = "ALERTS_LISTEN_HOST";
pub const ENV_LISTEN_PORT: &str = "ALERTS_LISTEN_PORT";
pub const ENV_ENDPOINT_HOST: &str = "ALERTS_ENDPOINT_HOST";
pub const ENV_ENDPOINT_PORT: &str = "ALERTS_ENDPOINT_PORT";
pub const ENV_APP_TOKEN: &str = "ALERTS_APP_TOKEN";
pub const ENV_SINK: &str = "ALERTS_SINK";
pub const ENV_INITIAL_DELAY_MS: &str = "ALERTS_INITIAL_DELAY_MS";
pub const ENV_PERIOD_MS: &str = "ALERTS_PERIOD_MS";
pub const ENV_SCHEDULE_POLICY: &str = "ALERTS_SCHEDULE_POLICY";
pub const ENV_QUEUE_CAPACITY: &str = "ALERTS_QUEUE_CAPACITY";
pub const ENV_METRICS_ADDR: &str = "ALERTS_METRICS_ADDR";
pub const ENV_LOG_FORMAT: &str = "ALERTS_LOG_FORMAT";

// --- defaults ---
pub const DEFAULT_LISTEN_HOST: &str = "0.0.0.0";
pub const DEFAULT_LISTEN_PORT: u16 = 9333;
pub const DEFAULT_ENDPOINT_PORT: u16 = 7002;
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 2000;
pub const DEFAULT_PERIOD_MS: u64 = 2000;
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;
pub const MAX_QUEUE_CAPACITY: usize = 65_536;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: invalid value {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub hostname: String,
    pub port: u16,
}

impl Endpoint {
    /// `http://{hostname}:{port}/`. The hostname must survive URL parsing
    /// unchanged, so paths, queries and stray characters are rejected.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::Invalid {
            var: ENV_ENDPOINT_HOST,
            value: self.hostname.clone(),
            reason,
        };
        if self.hostname.is_empty() {
            return Err(ConfigError::Empty {
                var: ENV_ENDPOINT_HOST,
            });
        }
        let url = Url::parse(&format!("http://{}:{}/", self.hostname, self.port))
            .map_err(|e| invalid(e.to_string()))?;
        let host_ok = url
            .host_str()
            .is_some_and(|h| h.eq_ignore_ascii_case(&self.hostname));
        if !host_ok || url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("not a bare hostname".into()));
        }
        Ok(url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Log,
    Http,
}

impl FromStr for SinkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(SinkKind::Log),
            "http" => Ok(SinkKind::Http),
            _ => Err("expected `log` or `http`".into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err("expected `compact` or `json`".into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_host: String,
    pub listen_port: u16,
    pub endpoint: Option<Endpoint>,
    pub app_token: String,
    pub sink: SinkKind,
    pub schedule: ScheduleCfg,
    pub queue_capacity: usize,
    pub pools: PoolsConfig,
    pub metrics_addr: Option<SocketAddr>,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_host: DEFAULT_LISTEN_HOST.to_string(),
            listen_port: DEFAULT_LISTEN_PORT,
            endpoint: None,
            app_token: String::new(),
            sink: SinkKind::Log,
            schedule: ScheduleCfg {
                initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
                period: Duration::from_millis(DEFAULT_PERIOD_MS),
                policy: SchedulePolicy::FixedRate,
            },
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            pools: PoolsConfig::default(),
            metrics_addr: None,
            log_format: LogFormat::Compact,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build config from an arbitrary key lookup (env in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());

        let listen_host = get(ENV_LISTEN_HOST).unwrap_or_else(|| DEFAULT_LISTEN_HOST.to_string());
        let listen_port = parse_var(&get, ENV_LISTEN_PORT, DEFAULT_LISTEN_PORT)?;

        let endpoint = match get(ENV_ENDPOINT_HOST) {
            Some(host) => Some(Endpoint {
                hostname: host.trim().to_string(),
                port: parse_var(&get, ENV_ENDPOINT_PORT, DEFAULT_ENDPOINT_PORT)?,
            }),
            None => None,
        };
        if let Some(ep) = &endpoint {
            ep.base_url()?;
        }
        let app_token = get(ENV_APP_TOKEN).unwrap_or_default();

        let default_sink = if endpoint.is_some() {
            SinkKind::Http
        } else {
            SinkKind::Log
        };
        let sink = parse_var(&get, ENV_SINK, default_sink)?;
        if sink == SinkKind::Http {
            if endpoint.is_none() {
                return Err(ConfigError::Empty {
                    var: ENV_ENDPOINT_HOST,
                }
                .into());
            }
            if app_token.trim().is_empty() {
                return Err(ConfigError::Empty { var: ENV_APP_TOKEN }.into());
            }
        }

        let initial_delay_ms = parse_var(&get, ENV_INITIAL_DELAY_MS, DEFAULT_INITIAL_DELAY_MS)?;
        let period_ms = parse_var(&get, ENV_PERIOD_MS, DEFAULT_PERIOD_MS)?;
        if period_ms == 0 {
            return Err(ConfigError::Invalid {
                var: ENV_PERIOD_MS,
                value: "0".into(),
                reason: "period must be positive".into(),
            }
            .into());
        }
        let policy = parse_var(&get, ENV_SCHEDULE_POLICY, SchedulePolicy::FixedRate)?;

        let queue_capacity = parse_var(&get, ENV_QUEUE_CAPACITY, DEFAULT_QUEUE_CAPACITY)?;
        if !(1..=MAX_QUEUE_CAPACITY).contains(&queue_capacity) {
            return Err(ConfigError::Invalid {
                var: ENV_QUEUE_CAPACITY,
                value: queue_capacity.to_string(),
                reason: format!("must be between 1 and {MAX_QUEUE_CAPACITY}"),
            }
            .into());
        }
        let metrics_addr: Option<SocketAddr> = parse_opt(&get, ENV_METRICS_ADDR)?;
        let log_format = parse_var(&get, ENV_LOG_FORMAT, LogFormat::Compact)?;

        let pools = PoolsConfig::load_default(&get)?;

        Ok(Self {
            listen_host,
            listen_port,
            endpoint,
            app_token,
            sink,
            schedule: ScheduleCfg {
                initial_delay: Duration::from_millis(initial_delay_ms),
                period: Duration::from_millis(period_ms),
                policy,
            },
            queue_capacity,
            pools,
            metrics_addr,
            log_format,
        })
    }
}

fn parse_var<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            var,
            value: raw,
            reason: e.to_string(),
        }),
    }
}

fn parse_opt<T, G>(get: &G, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(var)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                var,
                value: raw.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.listen_port, 9333);
        assert_eq!(cfg.listen_host, "0.0.0.0");
        assert_eq!(cfg.sink, SinkKind::Log);
        assert!(cfg.endpoint.is_none());
        assert_eq!(cfg.schedule.period, Duration::from_millis(2000));
        assert_eq!(cfg.schedule.policy, SchedulePolicy::FixedRate);
    }

    #[test]
    fn endpoint_switches_default_sink_to_http() {
        let cfg = AppConfig::from_lookup(lookup(&[
            (ENV_ENDPOINT_HOST, "collector.local"),
            (ENV_APP_TOKEN, "tok"),
        ]))
        .unwrap();
        assert_eq!(cfg.sink, SinkKind::Http);
        assert_eq!(
            cfg.endpoint,
            Some(Endpoint {
                hostname: "collector.local".into(),
                port: DEFAULT_ENDPOINT_PORT
            })
        );
    }

    #[test]
    fn http_sink_requires_token() {
        let err = AppConfig::from_lookup(lookup(&[(ENV_ENDPOINT_HOST, "collector.local")]))
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::Empty { var: ENV_APP_TOKEN })
        );
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[(ENV_LISTEN_PORT, "70000")])).unwrap_err();
        let cfg_err = err.downcast_ref::<ConfigError>().unwrap();
        assert!(matches!(
            cfg_err,
            ConfigError::Invalid {
                var: ENV_LISTEN_PORT,
                ..
            }
        ));
    }

    #[test]
    fn zero_period_is_rejected() {
        assert!(AppConfig::from_lookup(lookup(&[(ENV_PERIOD_MS, "0")])).is_err());
    }

    #[test]
    fn schedule_values_are_read() {
        let cfg = AppConfig::from_lookup(lookup(&[
            (ENV_INITIAL_DELAY_MS, "1000"),
            (ENV_PERIOD_MS, "500"),
            (ENV_SCHEDULE_POLICY, "fixed-delay"),
            (ENV_LOG_FORMAT, "json"),
            (ENV_METRICS_ADDR, "127.0.0.1:9100"),
        ]))
        .unwrap();
        assert_eq!(cfg.schedule.initial_delay, Duration::from_millis(1000));
        assert_eq!(cfg.schedule.period, Duration::from_millis(500));
        assert_eq!(cfg.schedule.policy, SchedulePolicy::FixedDelay);
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.metrics_addr, Some("127.0.0.1:9100".parse().unwrap()));
    }

    #[test]
    fn malformed_endpoint_host_is_rejected() {
        for host in ["not a host/??", "collector.local/messages", "collector.local?x=1"] {
            let err = AppConfig::from_lookup(lookup(&[(ENV_ENDPOINT_HOST, host), (ENV_APP_TOKEN, "t")]))
                .unwrap_err();
            assert!(
                matches!(
                    err.downcast_ref::<ConfigError>(),
                    Some(ConfigError::Invalid {
                        var: ENV_ENDPOINT_HOST,
                        ..
                    })
                ),
                "{host:?} was accepted: {err:#}"
            );
        }
    }

    #[test]
    fn ip_endpoint_host_is_accepted() {
        let cfg = AppConfig::from_lookup(lookup(&[(ENV_ENDPOINT_HOST, "127.0.0.1"), (ENV_APP_TOKEN, "t")]))
            .unwrap();
        let url = cfg.endpoint.unwrap().base_url().unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:7002/");
    }

    #[test]
    fn queue_capacity_bounds() {
        for raw in ["0", "65537", "18446744073709551615"] {
            let err = AppConfig::from_lookup(lookup(&[(ENV_QUEUE_CAPACITY, raw)])).unwrap_err();
            assert!(
                matches!(
                    err.downcast_ref::<ConfigError>(),
                    Some(ConfigError::Invalid {
                        var: ENV_QUEUE_CAPACITY,
                        ..
                    })
                ),
                "capacity {raw} was accepted"
            );
        }
        let cfg = AppConfig::from_lookup(lookup(&[(ENV_QUEUE_CAPACITY, "1")])).unwrap();
        assert_eq!(cfg.queue_capacity, 1);
        let cfg = AppConfig::from_lookup(lookup(&[(ENV_QUEUE_CAPACITY, "65536")])).unwrap();
        assert_eq!(cfg.queue_capacity, MAX_QUEUE_CAPACITY);
    }

    #[test]
    fn blank_pools_path_falls_back() {
        let cfg = AppConfig::from_lookup(lookup(&[("ALERTS_POOLS_PATH", "  ")])).unwrap();
        assert!(!cfg.pools.titles.is_empty());
    }
}
