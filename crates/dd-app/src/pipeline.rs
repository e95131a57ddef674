use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use dd_core::config::LoadOptions;
use dd_core::frame::IndexGrid;
use dd_palette::Dedither;
use dd_palette::trim::trim_borders;
use dd_source::image::load_grid;
use dd_source::writer::write_indexed;

/// Étapes du pipeline, dans l'ordre d'exécution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Load,
    Trim,
    Detect,
    Palette,
    Toggle,
    Reconstruct,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Load => "load",
            Self::Trim => "trim",
            Self::Detect => "detect",
            Self::Palette => "palette",
            Self::Toggle => "toggle",
            Self::Reconstruct => "reconstruct",
            Self::Write => "write",
        };
        f.write_str(name)
    }
}

/// Résultat d'un passage complet sur une image.
#[derive(Debug)]
pub struct Outcome {
    /// Size of the trimmed grid (width, height).
    pub trimmed: (u32, u32),
    /// Engine state derived from the trimmed grid.
    pub dedither: Dedither,
    /// Reconstructed indices (`None` in analysis mode).
    pub indices: Option<IndexGrid>,
}

/// Exécute les étapes 1 à 6 puis écrit `output` si fourni.
///
/// Sans `output` le pipeline s'arrête après la construction des bascules
/// (mode analyse) : rien n'est reconstruit ni écrit.
///
/// # Errors
/// Any stage failure, tagged with the stage name.
pub fn run(input: &Path, opts: &LoadOptions, output: Option<&Path>) -> Result<Outcome> {
    let original =
        load_grid(input, opts).with_context(|| format!("[{}] {}", Stage::Load, input.display()))?;
    let background = original.rgb(0, 0);

    let trimmed =
        trim_borders(&original).with_context(|| format!("[{}] {}", Stage::Trim, input.display()))?;
    log::info!(
        "[{}] {}×{} → {}×{}",
        Stage::Trim,
        original.width,
        original.height,
        trimmed.width,
        trimmed.height
    );

    // detect, palette et toggle ne peuvent pas échouer.
    let dedither = Dedither::analyze(&trimmed, background);
    log::info!(
        "[{}/{}/{}] {} points, K = {}, {} couleurs observées",
        Stage::Detect,
        Stage::Palette,
        Stage::Toggle,
        dedither.detection.midpoints,
        dedither.palette.len(),
        dedither.toggles.len()
    );

    let Some(output) = output else {
        return Ok(Outcome {
            trimmed: (trimmed.width, trimmed.height),
            dedither,
            indices: None,
        });
    };

    let rec = dedither.reconstruct(&trimmed);
    log::info!(
        "[{}] {}×{}, {} cellules bornées",
        Stage::Reconstruct,
        rec.indices.width,
        rec.indices.height,
        rec.clamped
    );

    write_indexed(&rec.indices, dedither.palette.colors(), output)
        .with_context(|| format!("[{}] {}", Stage::Write, output.display()))?;

    Ok(Outcome {
        trimmed: (trimmed.width, trimmed.height),
        dedither,
        indices: Some(rec.indices),
    })
}

/// Rapport texte du mode `--analyze`.
#[must_use]
pub fn report(input: &Path, outcome: &Outcome) -> String {
    use std::fmt::Write as _;

    let dd = &outcome.dedither;
    let (w, h) = outcome.trimmed;
    let mut out = String::new();
    let _ = writeln!(out, "{}", input.display());
    let _ = writeln!(out, "  grille rognée : {w}×{h}");
    let _ = writeln!(out, "  points de mélange : {}", dd.detection.midpoints);
    let _ = writeln!(out, "  palette (K = {}) :", dd.palette.len());
    for (i, c) in dd.palette.colors().iter().enumerate() {
        let _ = writeln!(out, "    [{i:3}] {c}  luma {}", c.luma());
    }
    let _ = writeln!(out, "  couleurs observées : {}", dd.toggles.len());
    let _ = writeln!(out, "  histogramme des bascules :");
    for (t, n) in dd.toggles.histogram() {
        let _ = writeln!(out, "    t = {t:3} : {n}");
    }
    let _ = writeln!(out, "  asymétries : {}", dd.toggles.mismatches());
    out
}
