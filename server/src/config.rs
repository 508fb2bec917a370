use anyhow::{Result, anyhow};
use axum::http::HeaderValue;
use platform_render::Issuer;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173";

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Empty means any origin.
    pub cors_allowed_origins: Vec<String>,
    pub issuer: Issuer,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.into())
            .split(',')
            .filter_map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect::<Vec<_>>();
        if let Some(bad) = cors_allowed_origins
            .iter()
            .find(|origin| origin.parse::<HeaderValue>().is_err())
        {
            return Err(anyhow!("invalid CORS origin {bad:?}"));
        }

        let defaults = Issuer::default();
        let setting = |key: &str, fallback: String| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or(fallback)
        };
        let issuer = Issuer {
            name: setting("ISSUER_NAME", defaults.name),
            address: setting("ISSUER_ADDRESS", defaults.address),
            city: setting("ISSUER_CITY", defaults.city),
            phone: setting("ISSUER_PHONE", defaults.phone),
            website: setting("ISSUER_WEBSITE", defaults.website),
            email: setting("ISSUER_EMAIL", defaults.email),
        };

        Ok(Self {
            cors_allowed_origins,
            issuer,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[]).unwrap();
        assert_eq!(config.cors_allowed_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.issuer, Issuer::default());
    }

    #[test]
    fn overrides_are_trimmed_and_blank_values_ignored() {
        let config = config(&[
            ("CORS_ALLOWED_ORIGINS", "https://a.test, ,https://b.test"),
            ("ISSUER_NAME", " Acme Payroll "),
            ("ISSUER_PHONE", "   "),
        ])
        .unwrap();
        assert_eq!(config.cors_allowed_origins, vec!["https://a.test", "https://b.test"]);
        assert_eq!(config.issuer.name, "Acme Payroll");
        assert_eq!(config.issuer.phone, Issuer::default().phone);
    }

    #[test]
    fn empty_origin_list_means_any() {
        assert!(config(&[("CORS_ALLOWED_ORIGINS", "")]).unwrap().cors_allowed_origins.is_empty());
        assert!(config(&[("CORS_ALLOWED_ORIGINS", "https://bad\norigin")]).is_err());
    }
}
