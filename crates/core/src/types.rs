/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Outcome carried by a response envelope once its `success` flag has been
/// interpreted.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// `success: true` with the normalized payload.
    Success(T),
    /// `success: false` with the server-provided error message.
    Failure(String),
}

/// A list entry that either passed validation or carries the reason it did not.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<T> {
    Valid(T),
    Invalid(crate::error::RenderError),
}

impl<T> Slot<T> {
    /// The validated value, if any.
    pub fn valid(&self) -> Option<&T> {
        match self {
            Slot::Valid(value) => Some(value),
            Slot::Invalid(_) => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Slot::Valid(_))
    }
}
