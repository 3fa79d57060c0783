#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// A single list entry in a job payload that could not be turned into a
/// view element.
///
/// Render errors never abort a render pass. The entry that produced one is
/// replaced by a placeholder and its siblings render normally.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("{entity} entry {index} is malformed: {reason}")]
    Malformed {
        entity: &'static str,
        index: usize,
        reason: String,
    },

    #[error("inline image {index} is not valid base64")]
    InvalidInlineImage { index: usize },
}
