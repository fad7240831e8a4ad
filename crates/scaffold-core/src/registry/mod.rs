//! Package registry lookups
//!
//! Resolves the `latest` dist-tag of each requested dependency. Lookups are
//! independent and run concurrently up to a fixed fan-out limit; the first
//! failure cancels the rest.

pub mod version;

use crate::error::{Result, ScaffoldError};
use anyhow::Context;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Maximum number of lookups in flight at once
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Timeout for a single dist-tags request
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Body of `/-/package/<name>/dist-tags`
#[derive(Debug, Deserialize)]
struct DistTags {
    latest: String,
}

/// A dependency paired with the version the registry tags as latest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependency {
    pub name: String,
    /// The `latest` tag exactly as the registry published it
    pub version: String,
}

impl ResolvedDependency {
    /// Manifest value for this dependency (`^<version>`)
    pub fn range(&self) -> String {
        version::caret_range(&self.version)
    }
}

/// Registry client - queries dist-tags over HTTP
#[derive(Debug, Clone)]
pub struct RegistryClient {
    base: Url,
    client: reqwest::Client,
}

impl RegistryClient {
    /// Create a client for the registry at `base_url`
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base =
            Url::parse(base_url).with_context(|| format!("Invalid registry URL: {}", base_url))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("Registry URL cannot have path segments: {}", base_url);
        }
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { base, client })
    }

    /// Build `<base>/-/package/<dependency>/dist-tags`, preserving query parameters
    pub fn dist_tags_url(&self, dependency: &str) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ScaffoldError::resolution(dependency, "registry URL cannot be a base"))?
            .pop_if_empty()
            .extend(["-", "package", dependency, "dist-tags"]);
        Ok(url)
    }

    /// Fetch the `latest` dist-tag for one dependency
    pub async fn fetch_latest(&self, dependency: &str) -> Result<ResolvedDependency> {
        let url = self.dist_tags_url(dependency)?;
        tracing::debug!(%url, "fetching dist-tags");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ScaffoldError::resolution(dependency, e))?;

        if !response.status().is_success() {
            return Err(ScaffoldError::resolution(
                dependency,
                format!("HTTP {} from {}", response.status(), url),
            ));
        }

        let tags: DistTags = response
            .json()
            .await
            .map_err(|e| ScaffoldError::resolution(dependency, format!("unexpected response: {}", e)))?;
        version::parse_version(&tags.latest)
            .map_err(|e| ScaffoldError::resolution(dependency, e))?;

        tracing::debug!(dependency, version = %tags.latest, "resolved latest version");
        Ok(ResolvedDependency {
            name: dependency.to_string(),
            version: tags.latest,
        })
    }

    /// Resolve every dependency, at most `concurrency` at a time
    ///
    /// Duplicate names are looked up once. Results come back in first-seen
    /// input order. Any failure aborts the outstanding lookups and is
    /// returned with the failing dependency name.
    pub async fn resolve_all(
        &self,
        dependencies: &[&str],
        concurrency: usize,
    ) -> Result<Vec<ResolvedDependency>> {
        let mut unique: Vec<&str> = Vec::with_capacity(dependencies.len());
        for &dependency in dependencies {
            if !unique.contains(&dependency) {
                unique.push(dependency);
            }
        }

        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for (index, dependency) in unique.into_iter().enumerate() {
            let client = self.clone();
            let semaphore = Arc::clone(&semaphore);
            let dependency = dependency.to_string();
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| ScaffoldError::resolution(&dependency, e))?;
                let resolved = client.fetch_latest(&dependency).await?;
                Ok::<_, ScaffoldError>((index, resolved))
            });
        }

        let mut resolved = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(entry)) => resolved.push(entry),
                Ok(Err(e)) => {
                    tasks.abort_all();
                    return Err(e);
                }
                Err(e) => std::panic::resume_unwind(e.into_panic()),
            }
        }

        resolved.sort_by_key(|(index, _)| *index);
        Ok(resolved.into_iter().map(|(_, dep)| dep).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_latest(server: &MockServer, name: &str, latest: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/-/package/{}/dist-tags", name)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "latest": latest, "next": "99.0.0" })),
            )
            .mount(server)
            .await;
    }

    fn client_for(server: &MockServer) -> RegistryClient {
        RegistryClient::new(&server.uri(), "repo-gen-test", Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_dist_tags_url() {
        let client =
            RegistryClient::new("https://registry.npmjs.org", "test", DEFAULT_LOOKUP_TIMEOUT)
                .unwrap();
        assert_eq!(
            client.dist_tags_url("left-pad").unwrap().as_str(),
            "https://registry.npmjs.org/-/package/left-pad/dist-tags"
        );
    }

    #[test]
    fn test_dist_tags_url_encodes_scoped_names() {
        let client =
            RegistryClient::new("https://npm.example.com/mirror/?token=abc", "test", DEFAULT_LOOKUP_TIMEOUT)
                .unwrap();
        assert_eq!(
            client.dist_tags_url("@types/node").unwrap().as_str(),
            "https://npm.example.com/mirror/-/package/@types%2Fnode/dist-tags?token=abc"
        );
    }

    #[test]
    fn test_rejects_invalid_registry_url() {
        assert!(RegistryClient::new("not a url", "test", DEFAULT_LOOKUP_TIMEOUT).is_err());
        assert!(RegistryClient::new("mailto:npm@example.com", "test", DEFAULT_LOOKUP_TIMEOUT).is_err());
    }

    #[tokio::test]
    async fn test_fetch_latest() {
        let server = MockServer::start().await;
        mock_latest(&server, "left-pad", "1.2.3").await;

        let resolved = client_for(&server).fetch_latest("left-pad").await.unwrap();
        assert_eq!(resolved.name, "left-pad");
        assert_eq!(resolved.range(), "^1.2.3");
    }

    #[tokio::test]
    async fn test_fetch_latest_http_error() {
        let server = MockServer::start().await;
        Mock::given(path("/-/package/does-not-exist/dist-tags"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": "Not found"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_latest("does-not-exist")
            .await
            .unwrap_err();
        match err {
            ScaffoldError::DependencyResolutionError { dependency, reason } => {
                assert_eq!(dependency, "does-not-exist");
                assert!(reason.contains("404"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_latest_rejects_unexpected_shape() {
        let server = MockServer::start().await;
        Mock::given(path("/-/package/odd/dist-tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "beta": "2.0.0"
            })))
            .mount(&server)
            .await;
        mock_latest(&server, "garbled", "not-a-version").await;

        let client = client_for(&server);
        assert!(matches!(
            client.fetch_latest("odd").await,
            Err(ScaffoldError::DependencyResolutionError { .. })
        ));
        assert!(matches!(
            client.fetch_latest("garbled").await,
            Err(ScaffoldError::DependencyResolutionError { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_latest_times_out() {
        let server = MockServer::start().await;
        Mock::given(path("/-/package/slow/dist-tags"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "latest": "1.0.0" }))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client =
            RegistryClient::new(&server.uri(), "test", Duration::from_millis(200)).unwrap();
        let err = client.fetch_latest("slow").await.unwrap_err();
        assert!(matches!(
            err,
            ScaffoldError::DependencyResolutionError { ref dependency, .. } if dependency == "slow"
        ));
    }

    #[tokio::test]
    async fn test_resolve_all_keeps_input_order_and_dedupes() {
        let server = MockServer::start().await;
        mock_latest(&server, "zod", "3.23.8").await;
        mock_latest(&server, "left-pad", "1.3.0").await;

        let resolved = client_for(&server)
            .resolve_all(&["zod", "left-pad", "zod"], 1)
            .await
            .unwrap();

        let names: Vec<_> = resolved.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["zod", "left-pad"]);
        assert_eq!(resolved[0].range(), "^3.23.8");
    }

    #[tokio::test]
    async fn test_resolve_all_fails_with_dependency_name() {
        let server = MockServer::start().await;
        mock_latest(&server, "left-pad", "1.3.0").await;
        Mock::given(path("/-/package/does-not-exist/dist-tags"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .resolve_all(&["left-pad", "does-not-exist"], DEFAULT_CONCURRENCY)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ScaffoldError::DependencyResolutionError { ref dependency, .. } if dependency == "does-not-exist"
        ));
    }

    #[tokio::test]
    async fn test_resolve_all_empty() {
        let server = MockServer::start().await;
        let resolved = client_for(&server).resolve_all(&[], 4).await.unwrap();
        assert!(resolved.is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    async fn mock_delayed(server: &MockServer, name: &str, status: u16, delay: Duration) {
        Mock::given(path(format!("/-/package/{}/dist-tags", name)))
            .respond_with(
                ResponseTemplate::new(status)
                    .set_body_json(serde_json::json!({ "latest": "1.0.0" }))
                    .set_delay(delay),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_fetch_latest_keeps_published_tag() {
        let server = MockServer::start().await;
        mock_latest(&server, "prefixed", "v2.0.0").await;

        let resolved = client_for(&server).fetch_latest("prefixed").await.unwrap();
        assert_eq!(resolved.version, "v2.0.0");
        assert_eq!(resolved.range(), "^v2.0.0");
    }

    #[tokio::test]
    async fn test_resolve_all_limits_lookups_in_flight() {
        let server = MockServer::start().await;
        let names = ["a", "b", "c", "d"];
        for name in names {
            mock_delayed(&server, name, 200, Duration::from_millis(300)).await;
        }
        let client = client_for(&server);

        let started = std::time::Instant::now();
        let resolved = client.resolve_all(&names, 1).await.unwrap();
        let serial = started.elapsed();
        assert_eq!(resolved.len(), 4);
        assert!(serial >= Duration::from_millis(1200), "took {:?}", serial);

        let started = std::time::Instant::now();
        client.resolve_all(&names, 8).await.unwrap();
        let parallel = started.elapsed();
        assert!(parallel < Duration::from_millis(1000), "took {:?}", parallel);
    }

    #[tokio::test]
    async fn test_resolve_all_cancels_outstanding_lookups_on_failure() {
        let server = MockServer::start().await;
        mock_delayed(&server, "slow", 200, Duration::from_secs(3)).await;
        Mock::given(path("/-/package/bad/dist-tags"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let client =
            RegistryClient::new(&server.uri(), "repo-gen-test", DEFAULT_LOOKUP_TIMEOUT).unwrap();

        let started = std::time::Instant::now();
        let err = client
            .resolve_all(&["slow", "bad"], DEFAULT_CONCURRENCY)
            .await
            .unwrap_err();
        let elapsed = started.elapsed();

        assert!(matches!(
            err,
            ScaffoldError::DependencyResolutionError { ref dependency, .. } if dependency == "bad"
        ));
        assert!(elapsed < Duration::from_secs(2), "took {:?}", elapsed);
    }
}
