//! Client configuration: which deployment to talk to and which data source
//! to request.

use std::str::FromStr;
use std::time::Duration;

use crate::error::ApiError;

/// Deployments of the statistics API. They serve the same endpoints and
/// differ only in base URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiVariant {
    #[default]
    Default,
    Mirror,
}

impl ApiVariant {
    pub fn base_url(&self) -> &'static str {
        match self {
            ApiVariant::Default => "https://covid-tracker-us.herokuapp.com",
            ApiVariant::Mirror => "https://cvtapi.nl",
        }
    }
}

impl FromStr for ApiVariant {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(ApiVariant::Default),
            "mirror" => Ok(ApiVariant::Mirror),
            other => Err(ApiError::Configuration {
                setting: "API variant",
                requested: other.to_string(),
                available: vec!["default".to_string(), "mirror".to_string()],
            }),
        }
    }
}

/// Settings used to construct a [`Covid19`](crate::Covid19) client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Upstream provider identifier, validated against `/v2/sources`.
    pub data_source: String,
    /// Overall per-request timeout applied by the transport.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_variant(ApiVariant::Default)
    }
}

impl ClientConfig {
    pub fn for_variant(variant: ApiVariant) -> Self {
        Self {
            base_url: variant.base_url().to_string(),
            data_source: "jhu".to_string(),
            timeout: Some(Duration::from_secs(30)),
            user_agent: format!("covid-core/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_data_source(mut self, data_source: impl Into<String>) -> Self {
        self.data_source = data_source.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Defaults overlaid with `COVID19_API_VARIANT`, `COVID19_API_URL` and
    /// `COVID19_DATA_SOURCE` from the process environment.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let variant = match lookup("COVID19_API_VARIANT") {
            Some(name) => name.parse()?,
            None => ApiVariant::Default,
        };
        let mut config = Self::for_variant(variant);
        if let Some(url) = lookup("COVID19_API_URL") {
            config.base_url = url;
        }
        if let Some(source) = lookup("COVID19_DATA_SOURCE") {
            config.data_source = source;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_targets_primary_deployment_with_jhu() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://covid-tracker-us.herokuapp.com");
        assert_eq!(config.data_source, "jhu");
        assert!(config.user_agent.starts_with("covid-core/"));
    }

    #[test]
    fn mirror_differs_only_in_base_url() {
        let mirror = ClientConfig::for_variant(ApiVariant::Mirror);
        let default = ClientConfig::default();
        assert_eq!(mirror.base_url, "https://cvtapi.nl");
        assert_eq!(mirror.clone().with_base_url(default.base_url.clone()), default);
    }

    #[test]
    fn env_overrides_apply_in_order() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("COVID19_API_VARIANT", "mirror"),
            ("COVID19_DATA_SOURCE", "csbs"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://cvtapi.nl");
        assert_eq!(config.data_source, "csbs");

        let config = ClientConfig::from_lookup(lookup(&[
            ("COVID19_API_VARIANT", "mirror"),
            ("COVID19_API_URL", "http://127.0.0.1:3000"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:3000");
    }

    #[test]
    fn env_rejects_unknown_variant() {
        let err = ClientConfig::from_lookup(lookup(&[("COVID19_API_VARIANT", "backup")])).unwrap_err();
        assert!(matches!(err, ApiError::Configuration { setting: "API variant", .. }));
    }
}
