//! Example harvesting pipeline.
//!
//! Fetches a documentation page, pulls the JSON payload embedded in its
//! markup, walks the schema document inside it, and writes every discovered
//! response example to a file named after its schema type:
//!
//! ```text
//! fetch → scan → (snapshot cache) → walk → persist
//! ```
//!
//! The steps run strictly in sequence. A snapshot of the captured payload is
//! kept next to the output so later runs can skip the fetch and scan
//! entirely; see [`PayloadCache`] for the invalidation policy.
//!
//! # Example
//!
//! ```rust,no_run
//! use specimen_core::harvest::Harvester;
//!
//! # async fn example() -> Result<(), specimen_core::harvest::HarvestError> {
//! let harvester = Harvester::builder()
//!     .with_out_dir("jira")
//!     .build()?;
//! let report = harvester.run().await?;
//! println!("wrote {} example files", report.written);
//! # Ok(())
//! # }
//! ```

mod cache;
mod error;
mod fetch;
mod persist;
mod scan;
mod walk;

use std::path::PathBuf;

use serde_json::Value;
use tracing::info;
use url::Url;

use self::persist::ExampleWriter;

pub use self::cache::{InvalidationPolicy, PayloadCache};
pub use self::error::{HarvestError, WalkError};
pub use self::walk::{SchemaWalker, TypedExample};

/// Documentation page harvested when no URL is configured.
pub const DEFAULT_DOCUMENTATION_URL: &str =
    "https://developer.atlassian.com/cloud/jira/platform/rest/v3/";

/// Output directory used when none is configured.
pub const DEFAULT_OUT_DIR: &str = "jira";

/// Snapshot file used when none is configured.
pub const DEFAULT_SNAPSHOT_PATH: &str = "json.log";

/// Runs the harvesting pipeline end to end.
///
/// Configuration comes from [`HarvesterBuilder`]; the defaults reproduce a
/// plain run against the Jira Cloud platform REST v3 documentation with
/// output under `jira/` and the snapshot in `json.log`.
#[derive(Debug)]
pub struct Harvester {
    client: reqwest::Client,
    url: Url,
    writer: ExampleWriter,
    cache: PayloadCache,
}

impl Harvester {
    /// Starts building a harvester with the default configuration.
    pub fn builder() -> HarvesterBuilder {
        HarvesterBuilder::default()
    }

    /// Fetches, scans, walks, and persists, returning the run's counters.
    ///
    /// When the snapshot cache admits an existing capture, the fetch and
    /// scan are skipped and the walk starts from the snapshot.
    ///
    /// # Errors
    ///
    /// Transport, filesystem, and payload-shape failures are fatal, as is
    /// the walker's missing `application/json` precondition. Per-entry
    /// gaps (no schema reference, no example, unparseable example string)
    /// are counted as skips instead.
    pub async fn run(&self) -> Result<HarvestReport, HarvestError> {
        let (payload, from_cache) = match self.cache.load()? {
            Some(snapshot) => (snapshot, true),
            None => {
                let page = fetch::fetch_page(&self.client, &self.url).await?;
                let payload =
                    scan::extract_embedded_json(&page).ok_or(HarvestError::MissingPayload)?;
                // Snapshot before parsing, so the capture survives even a
                // malformed payload.
                self.cache.store(&payload)?;
                (payload, false)
            }
        };

        let document = parse_payload(&payload)?;
        let Some(paths) = document
            .get("schema")
            .and_then(|schema| schema.get("paths"))
            .and_then(Value::as_object)
        else {
            return Err(HarvestError::MissingSchemaPaths);
        };

        self.writer.prepare()?;
        let mut written = 0;
        let mut walker = SchemaWalker::new(paths);
        for item in walker.by_ref() {
            let example = item?;
            self.writer.write(&example)?;
            written += 1;
        }

        let report = HarvestReport {
            written,
            skipped: walker.skipped(),
            from_cache,
        };
        info!(
            written = report.written,
            skipped = report.skipped,
            from_cache = report.from_cache,
            out_dir = %self.writer.out_dir().display(),
            "harvest complete"
        );
        Ok(report)
    }
}

/// Parses the captured payload, labelling failures with their JSON path.
fn parse_payload(payload: &str) -> Result<Value, HarvestError> {
    let deserializer = &mut serde_json::Deserializer::from_str(payload);
    serde_path_to_error::deserialize(deserializer).map_err(|err| HarvestError::PayloadParse {
        path: err.path().to_string(),
        error: err.into_inner(),
    })
}

/// Counters describing a completed harvest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestReport {
    /// Example files written.
    pub written: usize,
    /// Response entries skipped for lack of content, reference, or usable
    /// example.
    pub skipped: usize,
    /// Whether the payload came from the snapshot instead of the network.
    pub from_cache: bool,
}

/// Builder for [`Harvester`] instances.
///
/// # Example
///
/// ```rust
/// use specimen_core::harvest::{Harvester, InvalidationPolicy};
///
/// # fn example() -> Result<(), specimen_core::harvest::HarvestError> {
/// let harvester = Harvester::builder()
///     .with_url("https://developer.atlassian.com/cloud/jira/platform/rest/v3/")
///     .with_out_dir("target/samples")
///     .with_snapshot_path("target/json.log")
///     .with_invalidation_policy(InvalidationPolicy::Refresh)
///     .build()?;
/// # let _ = harvester;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HarvesterBuilder {
    client: reqwest::Client,
    url: String,
    out_dir: PathBuf,
    snapshot: PathBuf,
    policy: InvalidationPolicy,
}

impl Default for HarvesterBuilder {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
            url: DEFAULT_DOCUMENTATION_URL.to_string(),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            snapshot: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            policy: InvalidationPolicy::default(),
        }
    }
}

impl HarvesterBuilder {
    /// Builds the harvester, validating the configured URL.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::UrlError`] when the URL does not parse.
    pub fn build(self) -> Result<Harvester, HarvestError> {
        let Self {
            client,
            url,
            out_dir,
            snapshot,
            policy,
        } = self;

        let url = Url::parse(&url)?;

        Ok(Harvester {
            client,
            url,
            writer: ExampleWriter::new(out_dir),
            cache: PayloadCache::new(snapshot).with_policy(policy),
        })
    }

    /// Sets the documentation page URL.
    ///
    /// Defaults to [`DEFAULT_DOCUMENTATION_URL`].
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Sets the directory example files are written to.
    ///
    /// Defaults to [`DEFAULT_OUT_DIR`], created on demand.
    #[must_use]
    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = out_dir.into();
        self
    }

    /// Sets the snapshot file location.
    ///
    /// Defaults to [`DEFAULT_SNAPSHOT_PATH`].
    #[must_use]
    pub fn with_snapshot_path(mut self, snapshot: impl Into<PathBuf>) -> Self {
        self.snapshot = snapshot.into();
        self
    }

    /// Sets the snapshot invalidation policy.
    ///
    /// Defaults to [`InvalidationPolicy::Never`]: an existing snapshot is
    /// always served.
    #[must_use]
    pub fn with_invalidation_policy(mut self, policy: InvalidationPolicy) -> Self {
        self.policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn documentation_page() -> String {
        let payload = json!({
            "schema": {
                "paths": {
                    "/alpha": {
                        "get": {
                            "responses": {
                                "200": {
                                    "content": {
                                        "application/json": {
                                            "schema": {"$ref": "#/components/schemas/Alpha"},
                                            "example": {"id": 1}
                                        }
                                    }
                                }
                            }
                        },
                        "post": {
                            "responses": {
                                "201": {
                                    "content": {
                                        "application/json": {
                                            "schema": {"$ref": "#/components/schemas/Beta"},
                                            "example": r#"{"ok": true}"#
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "/alpha/{id}": {
                        "get": {
                            "responses": {
                                "200": {
                                    "content": {
                                        "application/json": {
                                            "schema": {"$ref": "#/components/schemas/Alpha"},
                                            "example": {"id": 2}
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "/gaps": {
                        "get": {
                            "responses": {
                                "200": {
                                    "content": {
                                        "application/json": {
                                            "schema": {"$ref": "#/components/schemas/Gap"}
                                        }
                                    }
                                }
                            }
                        },
                        "put": {
                            "responses": {
                                "200": {
                                    "content": {
                                        "application/json": {
                                            "schema": {"$ref": "#/components/schemas/Bad"},
                                            "example": "{not valid json"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        });
        format!(
            "<html><head><script>window.__DATA__ = {payload};</script></head><body></body></html>"
        )
    }

    async fn serve_page(expected_hits: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(documentation_page()))
            .expect(expected_hits)
            .mount(&server)
            .await;
        server
    }

    fn harvester_in(dir: &Path, server: &MockServer) -> Harvester {
        Harvester::builder()
            .with_url(server.uri())
            .with_out_dir(dir.join("jira"))
            .with_snapshot_path(dir.join("json.log"))
            .build()
            .expect("harvester should build")
    }

    fn read_json(path: impl AsRef<Path>) -> Value {
        let contents = fs::read_to_string(path).expect("example file");
        serde_json::from_str(&contents).expect("valid JSON in example file")
    }

    #[tokio::test]
    async fn should_write_example_files_from_a_fetched_page() {
        let server = serve_page(1).await;
        let dir = tempfile::tempdir().expect("tempdir");

        let report = harvester_in(dir.path(), &server)
            .run()
            .await
            .expect("harvest should succeed");

        assert_eq!(
            report,
            HarvestReport {
                written: 3,
                skipped: 2,
                from_cache: false
            }
        );
        // Last write for a recurring type wins.
        assert_eq!(
            read_json(dir.path().join("jira/Alpha.json")),
            json!({"id": 2})
        );
        assert_eq!(
            read_json(dir.path().join("jira/Beta.json")),
            json!({"ok": true})
        );
        assert!(!dir.path().join("jira/Gap.json").exists());
        assert!(!dir.path().join("jira/Bad.json").exists());
        assert!(dir.path().join("json.log").is_file());
    }

    #[tokio::test]
    async fn should_serve_the_second_run_from_the_snapshot() {
        let server = serve_page(1).await;
        let dir = tempfile::tempdir().expect("tempdir");
        let harvester = harvester_in(dir.path(), &server);

        let first = harvester.run().await.expect("first run");
        let second = harvester.run().await.expect("second run");

        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(first.written, second.written);
        assert_eq!(
            read_json(dir.path().join("jira/Alpha.json")),
            json!({"id": 2})
        );
    }

    #[tokio::test]
    async fn should_refetch_under_the_refresh_policy() {
        let server = serve_page(2).await;
        let dir = tempfile::tempdir().expect("tempdir");

        harvester_in(dir.path(), &server)
            .run()
            .await
            .expect("first run");

        let refreshed = Harvester::builder()
            .with_url(server.uri())
            .with_out_dir(dir.path().join("jira"))
            .with_snapshot_path(dir.path().join("json.log"))
            .with_invalidation_policy(InvalidationPolicy::Refresh)
            .build()
            .expect("harvester should build")
            .run()
            .await
            .expect("refreshed run");

        assert!(!refreshed.from_cache);
    }

    #[tokio::test]
    async fn should_fail_when_the_page_has_no_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<html><body>nothing</body></html>"),
            )
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().expect("tempdir");

        let result = harvester_in(dir.path(), &server).run().await;

        assert!(matches!(result, Err(HarvestError::MissingPayload)));
    }

    #[tokio::test]
    async fn should_fail_on_a_corrupt_snapshot_without_fetching() {
        let server = serve_page(0).await;
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("json.log"), "{broken").expect("seed snapshot");

        let result = harvester_in(dir.path(), &server).run().await;

        assert!(matches!(result, Err(HarvestError::PayloadParse { .. })));
    }

    #[tokio::test]
    async fn should_fail_when_the_payload_has_no_paths() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><script>window.__DATA__ = {"schema": {}};</script></html>"#,
            ))
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().expect("tempdir");

        let result = harvester_in(dir.path(), &server).run().await;

        assert!(matches!(result, Err(HarvestError::MissingSchemaPaths)));
    }

    #[test]
    fn should_reject_an_invalid_url() {
        let result = Harvester::builder().with_url("not a url").build();
        assert!(matches!(result, Err(HarvestError::UrlError(_))));
    }
}
