//! Errors from the GitHub and Bitrise REST clients

use std::fmt;

/// Errors that can occur when interacting with external APIs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 401 Unauthorized - token invalid or expired
    Unauthorized { provider: String },
    /// 403 Forbidden - token lacks required permissions
    Forbidden { provider: String },
    /// 404 Not Found - repository, file, branch or app does not exist
    NotFound { provider: String, resource: String },
    /// 429 Rate Limited
    RateLimited {
        provider: String,
        retry_after_secs: Option<u64>,
    },
    /// Network or timeout error
    NetworkError { provider: String, message: String },
    /// Other HTTP errors
    HttpError {
        provider: String,
        status: u16,
        message: String,
    },
    /// Provider not configured (no token)
    NotConfigured { provider: String },
    /// Response arrived but its content is unusable
    InvalidContent { provider: String, message: String },
}

impl ApiError {
    /// Check if this is an authentication error (401 or 403)
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ApiError::Unauthorized { .. } | ApiError::Forbidden { .. }
        )
    }

    /// Get the provider name for this error
    pub fn provider_name(&self) -> &str {
        match self {
            ApiError::Unauthorized { provider }
            | ApiError::Forbidden { provider }
            | ApiError::NotFound { provider, .. }
            | ApiError::RateLimited { provider, .. }
            | ApiError::NetworkError { provider, .. }
            | ApiError::HttpError { provider, .. }
            | ApiError::NotConfigured { provider }
            | ApiError::InvalidContent { provider, .. } => provider,
        }
    }

    pub fn unauthorized(provider: impl Into<String>) -> Self {
        ApiError::Unauthorized {
            provider: provider.into(),
        }
    }

    pub fn forbidden(provider: impl Into<String>) -> Self {
        ApiError::Forbidden {
            provider: provider.into(),
        }
    }

    pub fn not_found(provider: impl Into<String>, resource: impl Into<String>) -> Self {
        ApiError::NotFound {
            provider: provider.into(),
            resource: resource.into(),
        }
    }

    pub fn rate_limited(provider: impl Into<String>, retry_after: Option<u64>) -> Self {
        ApiError::RateLimited {
            provider: provider.into(),
            retry_after_secs: retry_after,
        }
    }

    pub fn network(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::NetworkError {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn http(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        ApiError::HttpError {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    pub fn not_configured(provider: impl Into<String>) -> Self {
        ApiError::NotConfigured {
            provider: provider.into(),
        }
    }

    pub fn invalid_content(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::InvalidContent {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Map a non-success status to an error, reading `Retry-After` and the body
    pub(crate) async fn from_response(
        provider: &str,
        resource: &str,
        response: reqwest::Response,
    ) -> Self {
        match response.status().as_u16() {
            401 => ApiError::unauthorized(provider),
            403 => ApiError::forbidden(provider),
            404 => ApiError::not_found(provider, resource),
            429 => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok());
                ApiError::rate_limited(provider, retry_after)
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                ApiError::http(provider, status, body)
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized { provider } => {
                write!(f, "{}: Unauthorized (401) - check the API token", provider)
            }
            ApiError::Forbidden { provider } => {
                write!(
                    f,
                    "{}: Forbidden (403) - insufficient permissions",
                    provider
                )
            }
            ApiError::NotFound { provider, resource } => {
                write!(f, "{}: Not found (404) - {}", provider, resource)
            }
            ApiError::RateLimited {
                provider,
                retry_after_secs,
            } => {
                if let Some(secs) = retry_after_secs {
                    write!(f, "{}: Rate limited - retry after {}s", provider, secs)
                } else {
                    write!(f, "{}: Rate limited", provider)
                }
            }
            ApiError::NetworkError { provider, message } => {
                write!(f, "{}: Network error - {}", provider, message)
            }
            ApiError::HttpError {
                provider,
                status,
                message,
            } => {
                write!(f, "{}: HTTP {} - {}", provider, status, message)
            }
            ApiError::NotConfigured { provider } => {
                write!(f, "{}: Not configured (no API token)", provider)
            }
            ApiError::InvalidContent { provider, message } => {
                write!(f, "{}: Invalid response - {}", provider, message)
            }
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_auth_error() {
        assert!(ApiError::unauthorized("test").is_auth_error());
        assert!(ApiError::forbidden("test").is_auth_error());
        assert!(!ApiError::rate_limited("test", None).is_auth_error());
        assert!(!ApiError::network("test", "timeout").is_auth_error());
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(ApiError::forbidden("github").provider_name(), "github");
        assert_eq!(
            ApiError::rate_limited("bitrise", Some(60)).provider_name(),
            "bitrise"
        );
        assert_eq!(
            ApiError::invalid_content("github", "bad json").provider_name(),
            "github"
        );
    }

    #[test]
    fn test_display() {
        let err = ApiError::rate_limited("github", Some(30));
        assert_eq!(err.to_string(), "github: Rate limited - retry after 30s");

        let err = ApiError::not_configured("bitrise");
        assert_eq!(err.to_string(), "bitrise: Not configured (no API token)");

        let err = ApiError::not_found("github", "version.json@main");
        assert_eq!(err.to_string(), "github: Not found (404) - version.json@main");
    }
}
