// SPDX-License-Identifier: MIT

use std::time::Duration;

use serde::Deserialize;

use crate::elastic::client::DEFAULT_TIMEOUT;
use crate::elastic::{Client, ClientBuilder};
use crate::error::ConnectorError;
use crate::prelude::*;

pub const ENV_PREFIX: &str = "ES_CONNECTOR";

/// Settings for a single Elasticsearch asset.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AssetConfig {
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_true", alias = "verify")]
    pub verify_server_cert: bool,
    #[serde(default)]
    pub timeout: Option<Timeout>,

    #[serde(default)]
    pub ingest_index: Option<String>,
    #[serde(default)]
    pub ingest_query: Option<String>,
    #[serde(default)]
    pub ingest_type: Option<String>,
    #[serde(default)]
    pub ingest_routing: Option<String>,
    /// Name of a registered ingest parser.
    #[serde(default)]
    pub ingest_parser: Option<String>,
    #[serde(default)]
    pub ingest: IngestSettings,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct IngestSettings {
    #[serde(default)]
    pub container_label: Option<String>,
}

/// A timeout given either as seconds or as a human readable duration
/// such as "90s" or "2m".
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Timeout {
    Seconds(u64),
    Human(String),
}

impl Timeout {
    pub fn duration(&self) -> Result<Duration, ConnectorError> {
        match self {
            Timeout::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            Timeout::Human(s) => humantime::parse_duration(s)
                .map_err(|err| ConnectorError::Config(format!("invalid timeout {s:?}: {err}"))),
        }
    }
}

fn default_true() -> bool {
    true
}

impl AssetConfig {
    pub fn from_json(value: serde_json::Value) -> Result<Self, ConnectorError> {
        serde_json::from_value(value)
            .map_err(|err| ConnectorError::Config(format!("invalid asset configuration: {err}")))
    }

    /// Build the asset configuration from the layered loader.
    pub fn from_loader(loader: &Config) -> Result<Self, ConnectorError> {
        let url = loader
            .get_string("url")?
            .ok_or_else(|| ConnectorError::Config("no url provided".to_string()))?;
        let verify_server_cert = if loader.get_bool("no-check-certificate")? {
            false
        } else {
            loader.get_bool_opt("verify_server_cert")?.unwrap_or(true)
        };
        Ok(Self {
            url,
            username: loader.get_string("username")?,
            password: loader.get_string("password")?,
            verify_server_cert,
            timeout: loader.get_string("timeout")?.map(|timeout| {
                match timeout.parse::<u64>() {
                    Ok(secs) => Timeout::Seconds(secs),
                    Err(_) => Timeout::Human(timeout),
                }
            }),
            ingest_index: loader.get_string("ingest_index")?,
            ingest_query: loader.get_string("ingest_query")?,
            ingest_type: loader.get_string("ingest_type")?,
            ingest_routing: loader.get_string("ingest_routing")?,
            ingest_parser: loader.get_string("ingest_parser")?,
            ingest: IngestSettings {
                container_label: loader.get_string("ingest.container_label")?,
            },
        })
    }

    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Result<Duration, ConnectorError> {
        match &self.timeout {
            Some(timeout) => timeout.duration(),
            None => Ok(DEFAULT_TIMEOUT),
        }
    }

    /// Basic authentication is used only when both a username and
    /// password are configured.
    pub fn has_auth(&self) -> bool {
        matches!((&self.username, &self.password), (Some(u), Some(p)) if !u.is_empty() && !p.is_empty())
    }

    pub fn client(&self) -> Result<Client, ConnectorError> {
        let mut builder = ClientBuilder::new(self.base_url())
            .disable_certificate_validation(!self.verify_server_cert)
            .with_timeout(self.request_timeout()?);
        if self.has_auth() {
            if let (Some(username), Some(password)) = (&self.username, &self.password) {
                builder = builder.with_username(username).with_password(password);
            }
        }
        builder.build()
    }
}

/// Layered configuration lookup: command line arguments, then environment
/// variables, then a YAML configuration file, then clap defaults.
pub struct Config {
    config: serde_yaml::Value,
    args: Option<clap::ArgMatches>,
}

impl Config {
    pub fn new(args: &clap::ArgMatches, filename: Option<&str>) -> Result<Self, ConnectorError> {
        let config = match filename {
            Some(filename) => Self::load_file(filename)?,
            None => serde_yaml::Value::Null,
        };
        Ok(Self {
            config,
            args: Some(args.clone()),
        })
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConnectorError> {
        let config: serde_yaml::Value = serde_yaml::from_str(yaml)
            .map_err(|err| ConnectorError::Config(err.to_string()))?;
        Ok(Self { config, args: None })
    }

    fn load_file(filename: &str) -> Result<serde_yaml::Value, ConnectorError> {
        debug!("Loading configuration file {}", filename);
        let file = std::fs::File::open(filename)
            .map_err(|err| ConnectorError::Config(format!("{filename}: {err}")))?;
        serde_yaml::from_reader(file).map_err(|err| ConnectorError::Config(format!("{filename}: {err}")))
    }

    pub fn env_key(&self, key: &str) -> String {
        let xform = key.replace(['.', '-'], "_");
        format!("{}_{}", ENV_PREFIX, xform.to_uppercase())
    }

    fn arg_string(&self, key: &str) -> (Option<String>, Option<String>) {
        let Some(args) = &self.args else {
            return (None, None);
        };
        let Ok(Some(value)) = args.try_get_one::<String>(key) else {
            return (None, None);
        };
        match args.value_source(key) {
            Some(clap::parser::ValueSource::DefaultValue) => (None, Some(value.clone())),
            _ => (Some(value.clone()), None),
        }
    }

    pub fn get_string(&self, key: &str) -> Result<Option<String>, ConnectorError> {
        let (explicit, default) = self.arg_string(key);
        if explicit.is_some() {
            return Ok(explicit);
        }

        if let Ok(val) = std::env::var(self.env_key(key)) {
            return Ok(Some(val));
        }

        let value = match self.find_value(key) {
            serde_yaml::Value::String(s) => Some(s.clone()),
            serde_yaml::Value::Number(n) => Some(n.to_string()),
            serde_yaml::Value::Bool(b) => Some(b.to_string()),
            serde_yaml::Value::Null => None,
            _ => {
                return Err(ConnectorError::Config(format!(
                    "{key}: value not convertible to string"
                )))
            }
        };
        if value.is_some() {
            return Ok(value);
        }

        Ok(default)
    }

    /// Get a value as a bool, returning false if the key does not exist.
    pub fn get_bool(&self, key: &str) -> Result<bool, ConnectorError> {
        Ok(self.get_bool_opt(key)?.unwrap_or(false))
    }

    pub fn get_bool_opt(&self, key: &str) -> Result<Option<bool>, ConnectorError> {
        if let Some(args) = &self.args {
            if let Ok(Some(true)) = args.try_get_one::<bool>(key) {
                return Ok(Some(true));
            }
        }

        if let Ok(val) = std::env::var(self.env_key(key)) {
            return match val.to_lowercase().as_ref() {
                "true" | "yes" | "1" => Ok(Some(true)),
                _ => Ok(Some(false)),
            };
        }

        match self.find_value(key) {
            serde_yaml::Value::Bool(v) => Ok(Some(*v)),
            serde_yaml::Value::Null => Ok(None),
            _ => Err(ConnectorError::Config(format!("{key}: not a boolean"))),
        }
    }

    fn find_value(&self, key: &str) -> &serde_yaml::Value {
        let val = &self.config[key];
        if !val.is_null() {
            return val;
        }
        let mut value = &self.config;
        for part in key.split('.') {
            value = &value[part];
        }
        value
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    const ASSET_YAML: &str = r#"
url: https://10.16.1.10:9200/
username: elastic
password: changeme
verify_server_cert: false
timeout: 90s
ingest_index: "logstash-*"
ingest_query: '{"query": {"match_all": {}}}'
ingest:
  container_label: events
"#;

    #[test]
    fn test_config_loader() {
        let loader = Config::from_yaml_str(ASSET_YAML).unwrap();
        let config = AssetConfig::from_loader(&loader).unwrap();
        assert_eq!(config.base_url(), "https://10.16.1.10:9200");
        assert_eq!(config.username.as_deref(), Some("elastic"));
        assert!(config.has_auth());
        assert!(!config.verify_server_cert);
        assert_eq!(config.request_timeout().unwrap(), Duration::from_secs(90));
        assert_eq!(config.ingest_index.as_deref(), Some("logstash-*"));
        assert_eq!(config.ingest.container_label.as_deref(), Some("events"));
        assert!(config.ingest_routing.is_none());
        assert!(config.client().is_ok());
    }

    #[test]
    fn test_demo_asset() {
        let loader = Config::from_yaml_str(include_str!("../demos/asset.yaml")).unwrap();
        let config = AssetConfig::from_loader(&loader).unwrap();
        assert_eq!(config.request_timeout().unwrap(), Duration::from_secs(60));
        assert_eq!(config.ingest_index.as_deref(), Some("logstash-*"));
        assert!(config.ingest_parser.is_none());
    }

    #[test]
    fn test_config_loader_requires_url() {
        let loader = Config::from_yaml_str("username: elastic\n").unwrap();
        assert!(matches!(
            AssetConfig::from_loader(&loader),
            Err(ConnectorError::Config(_))
        ));
    }

    #[test]
    fn test_env_key() {
        let loader = Config::from_yaml_str("{}").unwrap();
        assert_eq!(
            loader.env_key("ingest.container-label"),
            "ES_CONNECTOR_INGEST_CONTAINER_LABEL"
        );
    }

    #[test]
    fn test_from_json() {
        let config = AssetConfig::from_json(json!({
            "url": "http://localhost:9200",
            "timeout": 5,
            "ingest_index": "idx",
        }))
        .unwrap();
        assert!(config.verify_server_cert);
        assert!(!config.has_auth());
        assert_eq!(config.request_timeout().unwrap(), Duration::from_secs(5));

        let config = AssetConfig::from_json(json!({"url": "http://localhost:9200"})).unwrap();
        assert_eq!(config.request_timeout().unwrap(), DEFAULT_TIMEOUT);

        assert!(AssetConfig::from_json(json!({"username": "x"})).is_err());
    }

    #[test]
    fn test_bad_timeout() {
        let config = AssetConfig::from_json(json!({
            "url": "http://localhost:9200",
            "timeout": "soon",
        }))
        .unwrap();
        assert!(config.request_timeout().is_err());
        assert!(config.client().is_err());
    }

    #[test]
    fn test_empty_password_is_no_auth() {
        let config = AssetConfig {
            url: "http://localhost:9200".to_string(),
            username: Some("elastic".to_string()),
            password: Some(String::new()),
            ..Default::default()
        };
        assert!(!config.has_auth());
    }
}
