use thiserror::Error;

/// Feil som kan krysse grensen mellom verten og motoren.
///
/// Selve deteksjonen feiler aldri; manglende data gir bare færre funn.
/// Disse variantene dekker parsing av nøkler, payload og arkivregler.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown duration key: {0:?}")]
    UnknownDuration(String),

    #[error("unknown fatigue state: {0:?}")]
    UnknownFatigueState(String),

    #[error("unknown power mode: {0:?}")]
    UnknownMode(String),

    #[error("unknown role: {0:?}")]
    UnknownRole(String),

    #[error("payload parse error at {path}: {message}")]
    Payload { path: String, message: String },

    #[error("season {0} is already archived")]
    AlreadyArchived(i32),

    #[error("season {season} may not be archived yet: {reason}")]
    ArchiveRefused { season: i32, reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Bygg en payload-feil fra serde_path_to_error, med JSON-sti.
    pub fn from_path_error(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let path = e.path().to_string();
        EngineError::Payload {
            path,
            message: e.into_inner().to_string(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
