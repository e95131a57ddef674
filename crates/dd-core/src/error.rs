use thiserror::Error;

/// Erreurs terminales du pipeline de dé-tramage.
///
/// Aucune n'est récupérable : le run s'arrête sans écrire de sortie.
#[derive(Error, Debug)]
pub enum DeditherError {
    /// File missing, unreadable, undecodable or unwritable.
    #[error("Erreur d'E/S sur {path} : {reason}")]
    Io {
        /// Path involved.
        path: String,
        /// Underlying cause.
        reason: String,
    },

    /// Color mode outside grayscale, grayscale+alpha, RGB, RGBA.
    #[error("Mode couleur non supporté : {mode}")]
    UnsupportedMode {
        /// Name of the offending mode.
        mode: String,
    },

    /// Trimming found no row or column that differs from its reference.
    #[error("Aucun contenu après rognage ({width}×{height}, image uniforme)")]
    EmptyContent {
        /// Width of the grid being trimmed.
        width: u32,
        /// Height of the grid being trimmed.
        height: u32,
    },

    /// Channel depth outside 1..=4.
    #[error("Profondeur de canal non supportée : {depth}")]
    UnsupportedDepth {
        /// Offending depth.
        depth: usize,
    },

    /// Grid, crop or resize dimensions that cannot be honoured.
    #[error("Dimensions invalides : {width}×{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },
}

impl DeditherError {
    /// Raccourci pour une erreur d'E/S.
    pub fn io(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
