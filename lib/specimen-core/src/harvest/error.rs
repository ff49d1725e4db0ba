use std::fmt::Debug;

/// Errors that can terminate a harvest run.
///
/// Recoverable conditions (a skipped response entry, an example string that
/// fails to parse) never surface here; they are logged and counted instead.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum HarvestError {
    /// Transport error from the underlying reqwest client.
    ///
    /// Occurs when the documentation page cannot be fetched.
    FetchError(reqwest::Error),

    /// URL parsing error when configuring the harvester.
    UrlError(url::ParseError),

    /// Filesystem error touching the snapshot file or the output directory.
    IoError(std::io::Error),

    /// The fetched document carries no embedded JSON payload.
    ///
    /// Raised when no `<script>` element contains the page data assignment.
    #[display("no JSON available in the fetched document")]
    MissingPayload,

    /// The captured payload is not valid JSON.
    #[display("failed to parse captured payload at '{path}': {error}")]
    #[from(skip)]
    PayloadParse {
        /// Location of the failure inside the payload.
        path: String,
        /// The underlying JSON parsing error.
        error: serde_json::Error,
    },

    /// The parsed payload has no `schema.paths` mapping to walk.
    #[display("captured payload has no schema.paths mapping")]
    MissingSchemaPaths,

    /// A declared JSON response did not carry an `application/json` entry.
    WalkError(WalkError),
}

/// Fatal precondition failures while walking the schema document.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum WalkError {
    /// A 200/201 response declares `content` without an `application/json`
    /// media type.
    #[display("no application/json content for {method} {path} ({status})")]
    #[from(skip)]
    MissingJsonContent {
        /// API path of the offending response.
        path: String,
        /// HTTP method of the offending response.
        method: String,
        /// Response status code.
        status: String,
    },

    /// An example value could not be re-encoded as JSON text.
    ExampleEncode(serde_json::Error),
}
