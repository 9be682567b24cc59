//! Process configuration read from `WORDRUSH_*` environment variables.

use std::path::PathBuf;

use serde::Deserialize;
use wordrush_room::RegistryConfig;

/// Default listen address.
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// The flat environment view, one field per `WORDRUSH_*` variable.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct EnvSettings {
    bind: String,
    max_rooms: usize,
    enabled: bool,
    words: Option<PathBuf>,
}

impl Default for EnvSettings {
    fn default() -> Self {
        let registry = RegistryConfig::default();
        Self {
            bind: DEFAULT_BIND.to_owned(),
            max_rooms: registry.max_rooms,
            enabled: registry.enabled,
            words: None,
        }
    }
}

/// Settings the `wordrush` binary starts with.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `WORDRUSH_BIND`
    pub bind: String,
    /// `WORDRUSH_MAX_ROOMS` and `WORDRUSH_ENABLED`
    pub registry: RegistryConfig,
    /// `WORDRUSH_WORDS`: a JSON catalogue file. `None` means the built-in
    /// catalogue.
    pub words_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        EnvSettings::default().into()
    }
}

impl From<EnvSettings> for ServerConfig {
    fn from(env: EnvSettings) -> Self {
        let registry = RegistryConfig {
            max_rooms: env.max_rooms,
            enabled: env.enabled,
            ..RegistryConfig::default()
        };
        Self {
            bind: env.bind,
            registry,
            words_path: env.words.filter(|p| !p.as_os_str().is_empty()),
        }
    }
}

impl ServerConfig {
    /// Reads the `WORDRUSH_*` environment variables. Unset variables keep
    /// their defaults.
    ///
    /// # Errors
    /// Returns a `ConfigError` if a variable is set but can't be parsed.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::load(config::Environment::with_prefix("WORDRUSH"))
    }

    fn load(source: config::Environment) -> Result<Self, config::ConfigError> {
        let settings: EnvSettings = config::Config::builder()
            .add_source(source.try_parsing(true))
            .build()?
            .try_deserialize()?;
        Ok(settings.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, config::ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ServerConfig::load(config::Environment::with_prefix("WORDRUSH").source(Some(vars)))
    }

    #[test]
    fn test_defaults_when_unset() {
        let c = load(&[]).unwrap();
        assert_eq!(c.bind, DEFAULT_BIND);
        assert_eq!(c.registry.max_rooms, 100);
        assert!(c.registry.enabled);
        assert!(c.words_path.is_none());
    }

    #[test]
    fn test_reads_every_variable() {
        let c = load(&[
            ("WORDRUSH_BIND", "127.0.0.1:9000"),
            ("WORDRUSH_MAX_ROOMS", "12"),
            ("WORDRUSH_ENABLED", "false"),
            ("WORDRUSH_WORDS", "/srv/words.json"),
        ])
        .unwrap();
        assert_eq!(c.bind, "127.0.0.1:9000");
        assert_eq!(c.registry.max_rooms, 12);
        assert!(!c.registry.enabled);
        assert_eq!(c.words_path, Some(PathBuf::from("/srv/words.json")));
    }

    #[test]
    fn test_unrelated_variables_are_ignored() {
        let c = load(&[("HOME", "/root"), ("WORDRUSH_MAX_ROOMS", "3")]).unwrap();
        assert_eq!(c.registry.max_rooms, 3);
        assert_eq!(c.bind, DEFAULT_BIND);
    }

    #[test]
    fn test_unparsable_value_is_an_error() {
        assert!(load(&[("WORDRUSH_MAX_ROOMS", "lots")]).is_err());
    }
}
