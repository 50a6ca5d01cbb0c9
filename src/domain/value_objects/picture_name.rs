use uuid::Uuid;

/// Characters stripped from an uploaded file name before it is stored
const STRIPPED: [char; 4] = [' ', ':', '\\', '/'];

/// Name under which an uploaded picture is stored: `<uuid>-<sanitized original>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PictureName(String);

impl PictureName {
    /// Generate a collision-resistant stored name for an uploaded file
    pub fn generate(original_filename: &str) -> Self {
        Self(format!(
            "{}-{}",
            Uuid::new_v4(),
            Self::sanitize(original_filename)
        ))
    }

    /// Wrap an already stored name
    pub fn from_stored(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Remove spaces, colons and path separators from a client-supplied file name
    pub fn sanitize(original_filename: &str) -> String {
        original_filename
            .chars()
            .filter(|c| !STRIPPED.contains(c))
            .collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for PictureName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
