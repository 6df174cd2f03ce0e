//! HTTP server configuration.

use super::{flag_or, parse_or};
use std::{env, path::Path};

pub const DEFAULT_PORT: u16 = 5555;
pub const DEFAULT_WELCOME_MESSAGE: &str = "Welcome to EQ Works 😎";

/// Configuration for the HTTP listener and the static welcome route
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub welcome_message: String,
    /// Probe the query catalog from `/api/health`.
    pub health_check_database: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
            health_check_database: false,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let dockerenv_exists = Path::new("/.dockerenv").exists();
        Self::from_lookup(|key| env::var(key).ok(), dockerenv_exists)
    }

    pub fn from_lookup<F>(lookup: F, dockerenv_exists: bool) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let in_container = is_container_environment(
            lookup("KUBERNETES_SERVICE_HOST").as_deref(),
            lookup("DOCKER_CONTAINER").as_deref(),
            dockerenv_exists,
        );

        Self {
            host: bind_host(lookup("BIND_ADDRESS").as_deref(), in_container),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT),
            welcome_message: lookup("WELCOME_MESSAGE")
                .unwrap_or_else(|| DEFAULT_WELCOME_MESSAGE.to_string()),
            health_check_database: flag_or(&lookup, "HEALTH_CHECK_DATABASE", false),
        }
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

/// Containers need the listener on every interface to be reachable.
pub fn is_container_environment(
    k8s_service_host: Option<&str>,
    docker_container: Option<&str>,
    dockerenv_exists: bool,
) -> bool {
    k8s_service_host.is_some() || docker_container.is_some() || dockerenv_exists
}

fn bind_host(bind_override: Option<&str>, in_container: bool) -> String {
    match bind_override.map(str::trim).filter(|v| !v.is_empty()) {
        Some(host) => host.to_string(),
        None if in_container => "0.0.0.0".to_string(),
        None => "127.0.0.1".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support::lookup;

    #[test]
    fn test_bind_address_detection() {
        let local = ServerConfig::from_lookup(lookup(&[]), false);
        assert_eq!(local.bind_address(), ("127.0.0.1".to_string(), 5555));

        let k8s = ServerConfig::from_lookup(
            lookup(&[("KUBERNETES_SERVICE_HOST", "kubernetes.default.svc")]),
            false,
        );
        assert_eq!(k8s.host, "0.0.0.0", "Should bind to all interfaces in Kubernetes");

        let docker = ServerConfig::from_lookup(lookup(&[]), true);
        assert_eq!(docker.host, "0.0.0.0", "Should detect Docker via .dockerenv file");

        let explicit = ServerConfig::from_lookup(
            lookup(&[
                ("KUBERNETES_SERVICE_HOST", "kubernetes.default.svc"),
                ("BIND_ADDRESS", "192.168.1.10"),
                ("PORT", "9090"),
            ]),
            false,
        );
        assert_eq!(explicit.bind_address(), ("192.168.1.10".to_string(), 9090));
    }

    #[test]
    fn test_container_environment_detection() {
        assert!(!is_container_environment(None, None, false));
        assert!(is_container_environment(Some("kubernetes.default.svc"), None, false));
        assert!(is_container_environment(None, Some("true"), false));
        assert!(is_container_environment(None, None, true));
    }

    #[test]
    fn test_welcome_message_override() {
        let config = ServerConfig::from_lookup(
            lookup(&[("WELCOME_MESSAGE", "hello"), ("HEALTH_CHECK_DATABASE", "true")]),
            false,
        );
        assert_eq!(config.welcome_message, "hello");
        assert!(config.health_check_database);
        assert_eq!(ServerConfig::default().welcome_message, DEFAULT_WELCOME_MESSAGE);
    }
}
