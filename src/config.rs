//! Server configuration from the environment.
//!
//! Only two knobs exist: `PORT` (default 3001) and `APP_ENV`. In production
//! no cross-origin access is granted; in development the local Vite and CRA
//! dev servers are allowed.

use std::env;

use actix_cors::Cors;

const DEFAULT_PORT: u16 = 3001;

const DEV_ORIGINS: &[&str] = &["http://localhost:5173", "http://localhost:3000"];

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub production: bool,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let production = env::var("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);
        Self { port, production }
    }
}

/// Build CORS middleware per the origin policy: same-origin only in
/// production, the local dev servers otherwise.
pub fn cors_middleware(config: &ServerConfig) -> Cors {
    if config.production {
        return Cors::default();
    }

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_any_header()
        .max_age(3600);
    for origin in DEV_ORIGINS {
        cors = cors.allowed_origin(origin);
    }
    cors
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test so the process-global env vars are not raced by the
    // parallel test runner.
    #[test]
    fn port_parsing_and_fallback() {
        std::env::remove_var("PORT");
        assert_eq!(ServerConfig::from_env().port, DEFAULT_PORT);

        std::env::set_var("PORT", "not-a-port");
        assert_eq!(ServerConfig::from_env().port, DEFAULT_PORT);

        std::env::set_var("PORT", "8080");
        assert_eq!(ServerConfig::from_env().port, 8080);
        std::env::remove_var("PORT");
    }
}
