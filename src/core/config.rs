use crate::core::error_capability::ConfigError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Raw configuration document. Nested objects are flattened into dotted keys
/// when turned into a [`Config`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigDto(pub BTreeMap<String, Value>);

/// Immutable key-value snapshot handed to every module through the container.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Config {
    values: BTreeMap<String, Value>,
}

impl Config {
    pub fn new(dto: ConfigDto) -> Self {
        let mut values = BTreeMap::new();
        for (key, value) in dto.0 {
            flatten_into(&mut values, key, value);
        }
        Self { values }
    }

    pub fn from_json_str(document: &str) -> Result<Self, ConfigError> {
        let dto: ConfigDto =
            serde_json::from_str(document).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(Self::new(dto))
    }

    /// `APP_DB_URL=postgres://..` with prefix `APP` becomes key `db.url`.
    /// Booleans and numbers are parsed, everything else stays a string.
    pub fn from_env_vars<I>(prefix: &str, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let prefix = format!("{}_", prefix.trim_end_matches('_').to_uppercase());
        let values = vars
            .into_iter()
            .filter_map(|(name, raw)| {
                let rest = name.strip_prefix(&prefix)?;
                if rest.is_empty() {
                    return None;
                }
                let key = rest.to_lowercase().replace('_', ".");
                Some((key, parse_scalar(raw)))
            })
            .collect();
        Self { values }
    }

    pub fn from_env(prefix: &str) -> Self {
        Self::from_env_vars(prefix, std::env::vars())
    }

    /// Returns a new snapshot where keys of `other` win.
    pub fn merge(mut self, other: Config) -> Config {
        self.values.extend(other.values);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    /// Deserializes a single key, or every key under `key.` when the key
    /// itself is absent (`smtp` collects `smtp.host`, `smtp.port`).
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        let value = match self.get(key) {
            Some(value) => value.clone(),
            None => {
                let section = self.section(key);
                if section.is_empty() {
                    return Ok(None);
                }
                Value::Object(section.into_iter().collect())
            }
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| ConfigError::Deserialize(key.to_string(), e.to_string()))
    }

    pub fn require_str(&self, key: &str) -> Result<&str, ConfigError> {
        match self.get(key) {
            None => Err(ConfigError::Missing(key.to_string())),
            Some(value) => value
                .as_str()
                .ok_or_else(|| ConfigError::InvalidType(key.to_string(), "string")),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn section(&self, key: &str) -> BTreeMap<String, Value> {
        let prefix = format!("{key}.");
        self.values
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix(&prefix)
                    .filter(|rest| !rest.contains('.'))
                    .map(|rest| (rest.to_string(), v.clone()))
            })
            .collect()
    }
}

fn flatten_into(values: &mut BTreeMap<String, Value>, key: String, value: Value) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (child, nested) in map {
                flatten_into(values, format!("{key}.{child}"), nested);
            }
        }
        other => {
            values.insert(key, other);
        }
    }
}

fn parse_scalar(raw: String) -> Value {
    match serde_json::from_str::<Value>(&raw) {
        Ok(value @ (Value::Bool(_) | Value::Number(_))) => value,
        _ => Value::String(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Smtp {
        host: String,
        port: u16,
    }

    #[test]
    fn test_from_json_flattens_nested_objects() {
        let config = Config::from_json_str(
            r#"{"db": {"url": "postgres://localhost", "pool": 4}, "debug": true}"#,
        )
        .unwrap();

        assert_eq!(config.get_str("db.url"), Some("postgres://localhost"));
        assert_eq!(config.get_i64("db.pool"), Some(4));
        assert_eq!(config.get_bool("debug"), Some(true));
        assert_eq!(config.len(), 3);
    }

    #[test]
    fn test_from_json_invalid_document() {
        let err = Config::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_env_vars_maps_names_and_scalars() {
        let vars = vec![
            ("APP_DB_URL".to_string(), "postgres://db".to_string()),
            ("APP_SMTP_PORT".to_string(), "2525".to_string()),
            ("APP_FEATURE_SIGNUP".to_string(), "false".to_string()),
            ("APP_".to_string(), "ignored".to_string()),
            ("OTHER_DB_URL".to_string(), "ignored".to_string()),
        ];
        let config = Config::from_env_vars("app", vars);

        assert_eq!(config.get_str("db.url"), Some("postgres://db"));
        assert_eq!(config.get_i64("smtp.port"), Some(2525));
        assert_eq!(config.get_bool("feature.signup"), Some(false));
        assert_eq!(config.len(), 3);
    }

    #[test]
    fn test_merge_prefers_other() {
        let base = Config::from_json_str(r#"{"a": 1, "b": 2}"#).unwrap();
        let overlay = Config::from_env_vars("X", vec![("X_B".to_string(), "3".to_string())]);
        let merged = base.merge(overlay);

        assert_eq!(merged.get_i64("a"), Some(1));
        assert_eq!(merged.get_i64("b"), Some(3));
    }

    #[test]
    fn test_get_as_reads_sections() {
        let config =
            Config::from_json_str(r#"{"smtp": {"host": "mail.local", "port": 25}}"#).unwrap();

        let smtp: Smtp = config.get_as("smtp").unwrap().unwrap();
        assert_eq!(
            smtp,
            Smtp {
                host: "mail.local".into(),
                port: 25
            }
        );
        assert_eq!(config.get_as::<Smtp>("missing").unwrap(), None);
        assert!(matches!(
            config.get_as::<u16>("smtp.host"),
            Err(ConfigError::Deserialize(key, _)) if key == "smtp.host"
        ));
    }

    #[test]
    fn test_require_str() {
        let config = Config::from_json_str(r#"{"name": "host", "port": 80}"#).unwrap();

        assert_eq!(config.require_str("name").unwrap(), "host");
        assert_eq!(
            config.require_str("port").unwrap_err(),
            ConfigError::InvalidType("port".into(), "string")
        );
        assert_eq!(
            config.require_str("nope").unwrap_err(),
            ConfigError::Missing("nope".into())
        );
    }
}
