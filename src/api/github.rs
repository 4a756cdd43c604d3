//! GitHub source control: branch listing and version file lookup

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

use super::error::ApiError;
use crate::config::RepositoryConfig;
use crate::deliver::models::CurrentVersion;
use crate::deliver::ports::SourceControl;

const GITHUB_API_VERSION: &str = "2022-11-28";
const PROVIDER_NAME: &str = "github";
const BRANCHES_PER_PAGE: u32 = 100;

/// Reads branches and the version file of one repository
pub struct GitHubSource {
    token: Option<String>,
    client: reqwest::Client,
    base_url: String,
    repository: RepositoryConfig,
}

#[derive(Debug, Deserialize)]
struct BranchResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    content: String,
    #[serde(default)]
    encoding: String,
}

impl GitHubSource {
    pub fn new(
        token: Option<String>,
        base_url: impl Into<String>,
        repository: RepositoryConfig,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("deliver/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::network(PROVIDER_NAME, e.to_string()))?;

        Ok(Self {
            token: token.filter(|t| !t.is_empty()),
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            repository,
        })
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.base_url, self.repository.owner, self.repository.repo, path
        )
    }

    async fn get(&self, url: &str, query: &[(&str, &str)], resource: &str) -> Result<reqwest::Response, ApiError> {
        let mut request = self
            .client
            .get(url)
            .query(query)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::network(PROVIDER_NAME, e.to_string()))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(ApiError::from_response(PROVIDER_NAME, resource, response).await)
        }
    }
}

/// Pull the version and build number out of a JSON version file.
///
/// The build number may be stored as a number or a numeric string.
pub fn parse_version_file(
    bytes: &[u8],
    version_key: &str,
    build_version_key: &str,
) -> Result<CurrentVersion, ApiError> {
    let invalid = |message: String| ApiError::invalid_content(PROVIDER_NAME, message);

    let json: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| invalid(format!("version file is not JSON: {}", e)))?;

    let version = json
        .get(version_key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| invalid(format!("missing string field '{}'", version_key)))?
        .to_string();

    let build_version = match json.get(build_version_key) {
        Some(serde_json::Value::Number(n)) => n.as_u64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| invalid(format!("missing numeric field '{}'", build_version_key)))?;

    Ok(CurrentVersion {
        version,
        build_version,
    })
}

#[async_trait]
impl SourceControl for GitHubSource {
    async fn fetch_branches(&self) -> Result<Vec<String>, ApiError> {
        let url = self.repo_url("branches");
        let per_page = BRANCHES_PER_PAGE.to_string();
        let resource = format!("{}/{}", self.repository.owner, self.repository.repo);

        let branches: Vec<BranchResponse> = self
            .get(&url, &[("per_page", per_page.as_str())], &resource)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::network(PROVIDER_NAME, e.to_string()))?;

        tracing::debug!(repo = %resource, count = branches.len(), "Fetched branches");
        Ok(branches.into_iter().map(|b| b.name).collect())
    }

    async fn fetch_version(&self, branch: &str) -> Result<CurrentVersion, ApiError> {
        let path = self.repository.version_file.trim_start_matches('/');
        let url = self.repo_url(&format!("contents/{}", path));
        let resource = format!("{}@{}", path, branch);

        let content: ContentResponse = self
            .get(&url, &[("ref", branch)], &resource)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::network(PROVIDER_NAME, e.to_string()))?;

        if content.encoding != "base64" {
            return Err(ApiError::invalid_content(
                PROVIDER_NAME,
                format!("unexpected content encoding '{}'", content.encoding),
            ));
        }

        // GitHub wraps the base64 body at 60 columns
        let compact: String = content.content.split_whitespace().collect();
        let bytes = STANDARD
            .decode(compact)
            .map_err(|e| ApiError::invalid_content(PROVIDER_NAME, e.to_string()))?;

        parse_version_file(
            &bytes,
            &self.repository.version_key,
            &self.repository.build_version_key,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repository() -> RepositoryConfig {
        RepositoryConfig {
            owner: "acme".to_string(),
            repo: "app".to_string(),
            version_file: "version.json".to_string(),
            version_key: "version".to_string(),
            build_version_key: "buildVersion".to_string(),
        }
    }

    #[test]
    fn test_repo_url() {
        let source = GitHubSource::new(None, "https://api.github.com/", repository()).unwrap();
        assert_eq!(
            source.repo_url("branches"),
            "https://api.github.com/repos/acme/app/branches"
        );
    }

    #[test]
    fn test_empty_token_is_unauthenticated() {
        let source = GitHubSource::new(Some(String::new()), "https://api.github.com", repository()).unwrap();
        assert!(source.token.is_none());
    }

    #[test]
    fn test_parse_version_file_numbers() {
        let current = parse_version_file(br#"{"version":"2.3.1","buildVersion":4}"#, "version", "buildVersion").unwrap();
        assert_eq!(
            current,
            CurrentVersion {
                version: "2.3.1".to_string(),
                build_version: 4
            }
        );
    }

    #[test]
    fn test_parse_version_file_string_build_number() {
        let current =
            parse_version_file(br#"{"appVersion":"1.0.0","build":" 12 "}"#, "appVersion", "build").unwrap();
        assert_eq!(current.build_version, 12);
    }

    #[test]
    fn test_parse_version_file_missing_fields() {
        let err = parse_version_file(br#"{"version":"1.0.0"}"#, "version", "buildVersion").unwrap_err();
        assert!(matches!(err, ApiError::InvalidContent { .. }));

        let err = parse_version_file(b"not json", "version", "buildVersion").unwrap_err();
        assert!(err.to_string().contains("not JSON"));

        let err = parse_version_file(br#"{"version":"1.0.0","buildVersion":-1}"#, "version", "buildVersion")
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidContent { .. }));
    }

    #[test]
    fn test_content_response_base64_with_newlines() {
        let body = r#"{"content":"eyJ2ZXJzaW9uIjoiMi4z\nLjEiLCJidWlsZFZlcnNpb24iOjR9\n","encoding":"base64"}"#;
        let content: ContentResponse = serde_json::from_str(body).unwrap();
        let compact: String = content.content.split_whitespace().collect();
        let bytes = STANDARD.decode(compact).unwrap();
        let current = parse_version_file(&bytes, "version", "buildVersion").unwrap();
        assert_eq!(current.version, "2.3.1");
        assert_eq!(current.build_version, 4);
    }
}
