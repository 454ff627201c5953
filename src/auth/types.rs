//! Auth configuration types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Authentication configuration (after template interpolation)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// No authentication required
    #[default]
    None,

    /// HTTP Basic authentication
    Basic {
        /// Username
        username: String,
        /// Password
        password: String,
    },

    /// Bearer token authentication (e.g. a JWT accepted by the server)
    Bearer {
        /// The bearer token
        token: String,
    },

    /// Custom headers, e.g. for proxy authentication
    CustomHeaders {
        /// Headers to add to each request
        headers: HashMap<String, String>,
    },
}

impl AuthConfig {
    /// Create a basic auth config
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Does this config send any credentials?
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn test_auth_config_default() {
        let config = AuthConfig::default();
        assert!(config.is_none());
    }

    #[test]
    fn test_auth_config_deserialize() {
        let config: AuthConfig = serde_yaml::from_str(
            "type: basic\nusername: admin\npassword: secret\n",
        )
        .unwrap();
        assert_eq!(config, AuthConfig::basic("admin", "secret"));

        let config: AuthConfig = serde_yaml::from_str("type: bearer\ntoken: abc\n").unwrap();
        assert_eq!(
            config,
            AuthConfig::Bearer {
                token: "abc".to_string()
            }
        );
    }
}
