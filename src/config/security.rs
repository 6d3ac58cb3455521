use axum::http::{header, HeaderName, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use super::Config;

/// Security header values
const NOSNIFF: &str = "nosniff";
const DENY: &str = "DENY";
const XSS_BLOCK: &str = "1; mode=block";
const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";
const CSP_API_VALUE: &str = "default-src 'none'; frame-ancestors 'none'";
const REFERRER_POLICY_VALUE: &str = "strict-origin-when-cross-origin";
const PERMISSIONS_POLICY_VALUE: &str = "geolocation=(), microphone=(), camera=()";

const PERMISSIONS_POLICY: HeaderName = HeaderName::from_static("permissions-policy");

#[derive(Debug, Clone, Copy)]
pub struct SecurityHeaders {
    include_hsts: bool,
}

impl SecurityHeaders {
    pub fn new(include_hsts: bool) -> Self {
        Self { include_hsts }
    }

    pub fn from_config(config: &Config) -> Self {
        if config.production {
            tracing::info!("Security: HSTS header enabled (production mode)");
        } else {
            tracing::info!("Security: HSTS header disabled (development mode)");
        }

        Self::new(config.production)
    }

    fn headers(&self) -> Vec<(HeaderName, &'static str)> {
        let mut headers = vec![
            (header::X_CONTENT_TYPE_OPTIONS, NOSNIFF),
            (header::X_FRAME_OPTIONS, DENY),
            (header::X_XSS_PROTECTION, XSS_BLOCK),
            (header::CONTENT_SECURITY_POLICY, CSP_API_VALUE),
            (header::REFERRER_POLICY, REFERRER_POLICY_VALUE),
            (PERMISSIONS_POLICY, PERMISSIONS_POLICY_VALUE),
        ];
        // Only meaningful behind HTTPS
        if self.include_hsts {
            headers.push((header::STRICT_TRANSPORT_SECURITY, HSTS_VALUE));
        }
        headers
    }

    /// Wraps every route so each response carries the headers.
    pub fn apply<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        self.headers()
            .into_iter()
            .fold(router, |router, (name, value)| {
                router.layer(SetResponseHeaderLayer::overriding(
                    name,
                    HeaderValue::from_static(value),
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsts_only_when_enabled() {
        let has_hsts = |headers: Vec<(HeaderName, &str)>| {
            headers
                .iter()
                .any(|(name, _)| *name == header::STRICT_TRANSPORT_SECURITY)
        };
        assert!(!has_hsts(SecurityHeaders::new(false).headers()));
        assert!(has_hsts(SecurityHeaders::new(true).headers()));
    }

    #[test]
    fn test_from_config_follows_production_flag() {
        let config = Config {
            production: true,
            ..Config::default()
        };
        assert!(SecurityHeaders::from_config(&config).include_hsts);
        assert!(!SecurityHeaders::from_config(&Config::default()).include_hsts);
    }
}
