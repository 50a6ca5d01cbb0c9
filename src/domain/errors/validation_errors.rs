/// Validation errors for incoming payloads and value objects
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    // Field errors on a product or category payload
    MissingField { field: &'static str },
    EmptyField { field: &'static str },
    NotANumber { field: &'static str, value: String },
    Negative { field: &'static str },

    // DocumentId validation errors
    EmptyDocumentId,
    DocumentIdTooLong { actual: usize, max: usize },
    InvalidDocumentIdCharacter(char),

    /// Request body could not be decoded at all
    MalformedBody(String),
}

impl ValidationError {
    /// Name of the offending field, if the error is about a single field
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::MissingField { field }
            | ValidationError::EmptyField { field }
            | ValidationError::NotANumber { field, .. }
            | ValidationError::Negative { field } => Some(field),
            _ => None,
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingField { field } => {
                write!(f, "The field {} must not be null", field)
            }
            ValidationError::EmptyField { field } => {
                write!(f, "The field {} must not be empty", field)
            }
            ValidationError::NotANumber { field, value } => {
                write!(f, "The field {} must be a number (got '{}')", field, value)
            }
            ValidationError::Negative { field } => {
                write!(f, "The field {} must be greater than or equal to 0", field)
            }

            // DocumentId errors
            ValidationError::EmptyDocumentId => write!(f, "Document id cannot be empty"),
            ValidationError::DocumentIdTooLong { actual, max } => {
                write!(f, "Document id too long: {} characters (max: {})", actual, max)
            }
            ValidationError::InvalidDocumentIdCharacter(c) => {
                write!(f, "Invalid character in document id: '{}'", c)
            }

            ValidationError::MalformedBody(reason) => {
                write!(f, "The request body is malformed: {}", reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}
