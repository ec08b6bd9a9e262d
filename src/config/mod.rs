use crate::error::{BridgeError, Result};
use serde::Deserialize;
use std::env;

const ENV_PREFIX: &str = "MESHESTRA_";

/// Resolver settings
///
/// Loaded from JSON, from `MESHESTRA_*` environment variables, or built in
/// code starting from [`Default`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Request attribute holding the controller reference
    pub controller_attribute: String,

    /// Inject the request into the first request-typed parameter only.
    ///
    /// A second parameter of the request type is then left to the other
    /// strategies and usually fails to resolve. Turn off to fill all of them.
    pub inject_request_once: bool,

    /// Instantiate controllers from the class registry when the container
    /// has no entry for them
    pub class_fallback: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            controller_attribute: "_controller".to_string(),
            inject_request_once: true,
            class_fallback: false,
        }
    }
}

impl ResolverConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| BridgeError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_vars(env::vars())
    }

    /// Read `MESHESTRA_CONTROLLER_ATTRIBUTE`, `MESHESTRA_INJECT_REQUEST_ONCE`
    /// and `MESHESTRA_CLASS_FALLBACK`; other keys are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref();
            match name {
                "CONTROLLER_ATTRIBUTE" => config.controller_attribute = value.to_string(),
                "INJECT_REQUEST_ONCE" => config.inject_request_once = parse_flag(name, value)?,
                "CLASS_FALLBACK" => config.class_fallback = parse_flag(name, value)?,
                _ => {}
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.controller_attribute.trim().is_empty() {
            return Err(BridgeError::InvalidConfig(
                "controller_attribute must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(BridgeError::InvalidConfig(format!(
            "{}{} expects a boolean, got `{}`",
            ENV_PREFIX, name, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.controller_attribute, "_controller");
        assert!(config.inject_request_once);
        assert!(!config.class_fallback);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ResolverConfig::from_json(r#"{ "class_fallback": true }"#).unwrap();
        assert!(config.class_fallback);
        assert_eq!(config.controller_attribute, "_controller");
    }

    #[test]
    fn vars_override() {
        let config = ResolverConfig::from_vars([
            ("MESHESTRA_CONTROLLER_ATTRIBUTE", "_action"),
            ("MESHESTRA_INJECT_REQUEST_ONCE", "off"),
            ("PATH", "/usr/bin"),
        ])
        .unwrap();
        assert_eq!(config.controller_attribute, "_action");
        assert!(!config.inject_request_once);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(ResolverConfig::from_vars([("MESHESTRA_CLASS_FALLBACK", "maybe")]).is_err());
        assert!(ResolverConfig::from_json(r#"{ "controller_attribute": " " }"#).is_err());
        assert!(ResolverConfig::from_json("not json").is_err());
    }
}
