use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

const PREFLIGHT_MAX_AGE_SECS: u64 = 86400;

/// CORS for the API. Credentials are only allowed with an explicit origin
/// list; with no valid origins the layer falls back to `*` without them.
pub fn create_cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
        ])
        .expose_headers([
            header::CONTENT_LENGTH,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
        .max_age(std::time::Duration::from_secs(PREFLIGHT_MAX_AGE_SECS));

    match allowed_origins(origins) {
        Some(list) => layer.allow_origin(list).allow_credentials(true),
        None => layer.allow_origin(AllowOrigin::any()),
    }
}

fn allowed_origins(origins: &[String]) -> Option<AllowOrigin> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => {
                tracing::debug!("CORS: Allowing origin: {}", origin);
                Some(value)
            }
            Err(e) => {
                tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        tracing::warn!(
            "CORS: No valid origins configured, using permissive settings for development"
        );
        None
    } else {
        tracing::info!("CORS: Configured with {} allowed origin(s)", origins.len());
        Some(AllowOrigin::list(origins))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_ALLOWED_ORIGINS;

    #[test]
    fn test_default_origins_are_valid() {
        let origins: Vec<String> = DEFAULT_ALLOWED_ORIGINS
            .split(',')
            .map(String::from)
            .collect();
        assert!(allowed_origins(&origins).is_some());
    }

    #[test]
    fn test_invalid_origins_are_dropped() {
        let origins = vec!["bad\norigin".to_string()];
        assert!(allowed_origins(&origins).is_none());
        assert!(allowed_origins(&[]).is_none());
    }
}
