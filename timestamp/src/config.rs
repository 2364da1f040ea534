use datainput::config::Config as DataInputConfig;
use serde::Deserialize;
use std::fs::File;

/// Hosting-platform variables that override values from the file
pub const HOSTNAME_ENV: &str = "WEBSITE_HOSTNAME";
pub const DOWNSTREAM_KEY_ENV: &str = "HTMLGENERATOR_KEY";
pub const NOTIFIER_ID_ENV: &str = "WIREPUSHER_ID";

#[derive(Deserialize, Debug)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
}

#[derive(Deserialize, Debug)]
pub struct LoggingConfig {
    pub sentry_dsn: Option<String>,
    /// `EnvFilter` directives, e.g. `info,datainput=debug`. `RUST_LOG` wins.
    pub log_filter: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct CommonConfig {
    pub metrics: Option<MetricsConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(flatten)]
    pub common: CommonConfig,
    pub datainput: DataInputConfig,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let data = serde_yaml::from_reader(file)?;

        Ok(data)
    }

    /// Non-empty variables replace the values from the file.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.is_empty());

        if let Some(host) = non_empty(HOSTNAME_ENV) {
            self.datainput.downstream.host = host;
        }
        if let Some(key) = non_empty(DOWNSTREAM_KEY_ENV) {
            self.datainput.downstream.key = key;
        }
        if let Some(id) = non_empty(NOTIFIER_ID_ENV) {
            self.datainput.notifier.device_id = id;
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use datainput::config::StorageConfig;
    use std::collections::HashMap;
    use std::io::Write;

    fn write_tmp_file(s: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(tmp, "{}", s).expect("write yaml");

        tmp
    }

    const CONFIG_YAML: &str = r#"
            logging:
                sentry_dsn: https://public@sentry.example.com/1
            metrics:
                statsd_host: 127.0.0.1
                statsd_port: 8125
            datainput:
                listener:
                    host: 0.0.0.0
                    port: 7071
                storage:
                    type: filesystem
                    base_dir: /var/lib/timestamp/
                downstream:
                    host: timestamp.example.net
                    key: from-file
                notifier:
                    device_id: device-1
            "#;

    #[test]
    fn datainput_config() {
        let tmp = write_tmp_file(CONFIG_YAML);
        let config = Config::from_file(tmp.path()).expect("load config");

        let metrics = config.common.metrics.expect("metrics config");
        assert_eq!(metrics.statsd_port, 8125);
        assert!(config.common.logging.expect("logging").sentry_dsn.is_some());

        assert_eq!(config.datainput.listener.port, 7071);
        assert_eq!(
            config.datainput.storage,
            StorageConfig::Filesystem {
                base_dir: "/var/lib/timestamp/".into()
            }
        );
    }

    #[test]
    fn env_overrides() {
        let tmp = write_tmp_file(CONFIG_YAML);
        let mut config = Config::from_file(tmp.path()).expect("load config");

        let env = HashMap::from([
            (HOSTNAME_ENV, "timestamp.azurewebsites.net"),
            (DOWNSTREAM_KEY_ENV, "from-env"),
            (NOTIFIER_ID_ENV, ""),
        ]);
        config.apply_env_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(
            config.datainput.downstream.host,
            "timestamp.azurewebsites.net"
        );
        assert_eq!(config.datainput.downstream.key, "from-env");
        // Empty variables do not clear file values
        assert_eq!(config.datainput.notifier.device_id, "device-1");
        assert!(config.datainput.validate().is_ok());
    }

    #[test]
    fn secrets_only_from_env() {
        let yaml = r#"
            datainput:
                listener: {host: 0.0.0.0, port: 7071}
                storage: {type: filesystem, base_dir: /tmp/timestamp}
                downstream: {}
                notifier: {}
            "#;
        let tmp = write_tmp_file(yaml);
        let mut config = Config::from_file(tmp.path()).expect("load config");
        assert!(config.common.metrics.is_none());

        config.apply_env_overrides(|_| None);
        assert!(config.datainput.validate().is_err());

        config.apply_env_overrides(|name| match name {
            HOSTNAME_ENV => Some("timestamp.example.net".into()),
            DOWNSTREAM_KEY_ENV => Some("k".into()),
            NOTIFIER_ID_ENV => Some("d".into()),
            _ => None,
        });
        assert!(config.datainput.validate().is_ok());
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            Config::from_file(std::path::Path::new("/nonexistent/timestamp.yaml")),
            Err(ConfigError::LoadError(_))
        ));

        let tmp = write_tmp_file("datainput: [not, a, map]");
        assert!(matches!(
            Config::from_file(tmp.path()),
            Err(ConfigError::ParseError(_))
        ));
    }
}
