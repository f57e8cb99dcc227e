//! Error taxonomy shared by every pipeline step

/// Failure raised by an extract, transform or load step
///
/// Nothing in the pipelines recovers from these; the command layer attaches
/// context and the process exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EtlError {
    /// A source could not be opened or queried (missing file, unreachable
    /// server, rejected credentials, driver not compiled in)
    SourceUnavailable { source: String, reason: String },
    /// Input was read but does not have the expected shape or content
    MalformedInput { context: String, reason: String },
    /// A destination could not be written
    SinkUnavailable { sink: String, reason: String },
}

impl EtlError {
    pub fn source_unavailable(source: impl Into<String>, reason: impl ToString) -> Self {
        EtlError::SourceUnavailable {
            source: source.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(context: impl Into<String>, reason: impl ToString) -> Self {
        EtlError::MalformedInput {
            context: context.into(),
            reason: reason.to_string(),
        }
    }

    pub fn sink_unavailable(sink: impl Into<String>, reason: impl ToString) -> Self {
        EtlError::SinkUnavailable {
            sink: sink.into(),
            reason: reason.to_string(),
        }
    }

    /// Short name of the error category
    pub fn kind(&self) -> &'static str {
        match self {
            EtlError::SourceUnavailable { .. } => "SourceUnavailable",
            EtlError::MalformedInput { .. } => "MalformedInput",
            EtlError::SinkUnavailable { .. } => "SinkUnavailable",
        }
    }
}

impl std::fmt::Display for EtlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EtlError::SourceUnavailable { source, reason } => {
                write!(f, "source '{}' is unavailable: {}", source, reason)
            }
            EtlError::MalformedInput { context, reason } => {
                write!(f, "malformed input in {}: {}", context, reason)
            }
            EtlError::SinkUnavailable { sink, reason } => {
                write!(f, "cannot write to '{}': {}", sink, reason)
            }
        }
    }
}

impl std::error::Error for EtlError {}

pub type EtlResult<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_failing_party() {
        let err = EtlError::source_unavailable("data.xlsx", "No such file or directory");
        assert_eq!(
            err.to_string(),
            "source 'data.xlsx' is unavailable: No such file or directory"
        );
        assert_eq!(err.kind(), "SourceUnavailable");

        let err = EtlError::malformed("column 'OrderDate' row 3", "cannot parse 'soon'");
        assert_eq!(err.kind(), "MalformedInput");
        assert!(err.to_string().contains("row 3"));
    }

    #[test]
    fn test_converts_into_anyhow() {
        let err: anyhow::Error = EtlError::sink_unavailable("target_table", "disk full").into();
        assert!(err.downcast_ref::<EtlError>().is_some());
    }
}
