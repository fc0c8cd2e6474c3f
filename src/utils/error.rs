use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Rot-ID saknas")]
    MissingRootId,

    #[error("Ogiltig indata: {0}")]
    InvalidInput(String),

    #[error("IO-fel: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON-fel: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML-fel: {0}")]
    Toml(#[from] toml::de::Error),
}

impl LayoutError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

pub type LayoutResult<T> = Result<T, LayoutError>;

/// Kontrollera att ett rot-ID är angivet (ej tomt eller bara blanksteg)
pub fn require_root_id(root_id: &str) -> LayoutResult<&str> {
    let trimmed = root_id.trim();
    if trimmed.is_empty() {
        return Err(LayoutError::MissingRootId);
    }
    Ok(trimmed)
}
