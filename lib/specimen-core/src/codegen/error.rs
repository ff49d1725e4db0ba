/// Errors that can abort model generation.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum CodegenError {
    /// Filesystem error reading a sample or schema file.
    IoError(std::io::Error),

    /// A source file is not valid JSON, or the schema file does not match
    /// the expected document shape.
    #[display("failed to decode '{file}' at '{path}': {error}")]
    #[from(skip)]
    DecodeError {
        /// The offending file.
        file: String,
        /// Location of the failure inside the document.
        path: String,
        /// The underlying JSON decoding error.
        error: serde_json::Error,
    },

    /// A sample file holds a top-level value no struct can be derived from.
    #[display("cannot derive a type from '{file}': top-level value is {kind}")]
    #[from(skip)]
    UnsupportedSource {
        /// The offending file.
        file: String,
        /// Human-readable shape of the rejected value.
        kind: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codegen_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<CodegenError>();
        assert_sync::<CodegenError>();
    }

    #[test]
    fn should_name_the_rejected_file() {
        let error = CodegenError::UnsupportedSource {
            file: "samples/count.json".to_string(),
            kind: "a number",
        };
        insta::assert_snapshot!(error, @"cannot derive a type from 'samples/count.json': top-level value is a number");
    }
}
