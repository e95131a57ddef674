use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::DeditherError;
use crate::frame::ColorMode;

/// Options du chargeur de grille, appliquées dans l'ordre :
/// palette → RGB, conversion de mode, recadrage centré, redimensionnement.
///
/// # Example
/// ```
/// use dd_core::config::LoadOptions;
/// let opts = LoadOptions::default();
/// assert!(opts.size.is_none() && opts.crop.is_none() && opts.mode.is_none());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoadOptions {
    /// Resize target (width, height), applied last.
    pub size: Option<(u32, u32)>,
    /// Centre-crop size (width, height).
    pub crop: Option<(u32, u32)>,
    /// Target color mode.
    pub mode: Option<ColorMode>,
}

/// Politique de nommage et d'encodage de la sortie.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct OutputPolicy {
    /// Suffix appended to the input stem when no explicit path is given.
    pub suffix: String,
    /// Extension (and thus encoder) of derived output names.
    pub format: String,
    /// Directory for derived output names. `None` = beside the input.
    pub target_dir: Option<PathBuf>,
}

impl Default for OutputPolicy {
    fn default() -> Self {
        Self {
            suffix: "_dedithered".to_string(),
            format: "png".to_string(),
            target_dir: None,
        }
    }
}

/// Configuration complète d'un run.
///
/// Les constantes de l'algorithme ne sont pas configurables ; seules les
/// entrées/sorties le sont.
///
/// # Example
/// ```
/// use dd_core::config::DeditherConfig;
/// let config = DeditherConfig::default();
/// assert_eq!(config.output.format, "png");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeditherConfig {
    /// Loader options.
    pub input: LoadOptions,
    /// Output naming.
    pub output: OutputPolicy,
}

impl DeditherConfig {
    /// Reject sizes the loader cannot honour.
    ///
    /// # Errors
    /// Returns `InvalidDimensions` for a zero crop or resize dimension and
    /// an error for an empty output format.
    pub fn validate(&self) -> Result<()> {
        for (w, h) in [self.input.size, self.input.crop].into_iter().flatten() {
            if w == 0 || h == 0 {
                return Err(DeditherError::InvalidDimensions { width: w, height: h }.into());
            }
        }
        if self.output.format.trim().is_empty() {
            anyhow::bail!("Format de sortie vide");
        }
        Ok(())
    }
}

/// Structure TOML intermédiaire, tous les champs optionnels.
#[derive(Deserialize)]
struct ConfigFile {
    input: Option<InputSection>,
    output: Option<OutputSection>,
}

#[derive(Deserialize)]
struct InputSection {
    size: Option<(u32, u32)>,
    crop: Option<(u32, u32)>,
    mode: Option<String>,
}

#[derive(Deserialize)]
struct OutputSection {
    suffix: Option<String>,
    format: Option<String>,
    target_dir: Option<PathBuf>,
}

/// Parse TOML text and merge it over the defaults.
///
/// # Errors
/// Returns an error on malformed TOML, an unknown mode or invalid sizes.
///
/// # Example
/// ```
/// use dd_core::config::parse_config;
/// use dd_core::frame::ColorMode;
/// let config = parse_config("[input]\nmode = \"rgb\"\ncrop = [64, 32]\n").unwrap();
/// assert_eq!(config.input.mode, Some(ColorMode::Rgb));
/// assert_eq!(config.input.crop, Some((64, 32)));
/// ```
pub fn parse_config(content: &str) -> Result<DeditherConfig> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;
    let mut config = DeditherConfig::default();

    if let Some(i) = file.input {
        if let Some(v) = i.size {
            config.input.size = Some(v);
        }
        if let Some(v) = i.crop {
            config.input.crop = Some(v);
        }
        if let Some(v) = i.mode {
            config.input.mode = Some(ColorMode::parse(&v)?);
        }
    }
    if let Some(o) = file.output {
        if let Some(v) = o.suffix {
            config.output.suffix = v;
        }
        if let Some(v) = o.format {
            config.output.format = v;
        }
        if let Some(v) = o.target_dir {
            config.output.target_dir = Some(v);
        }
    }

    config.validate()?;
    Ok(config)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use dd_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("dedither.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<DeditherConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Configuration invalide : {}", path.display()))
}
