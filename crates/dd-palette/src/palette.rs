use std::collections::BTreeSet;
use std::ops::Index;

use dd_core::color::Color;

/// Palette ordonnée de K couleurs uniques.
///
/// Tri croissant par luminance pondérée `r + 2g + b`, égalités départagées
/// par l'ordre lexicographique des composantes. Immuable une fois construite.
///
/// # Example
/// ```
/// use dd_core::color::Color;
/// use dd_palette::palette::Palette;
/// let p = Palette::from_candidates([Color::gray(255), Color::gray(0), Color::gray(255)]);
/// assert_eq!(p.colors(), &[Color::gray(0), Color::gray(255)]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// Deduplicate and order a candidate pool.
    #[must_use]
    pub fn from_candidates(candidates: impl IntoIterator<Item = Color>) -> Self {
        let unique: BTreeSet<Color> = candidates.into_iter().collect();
        let mut colors: Vec<Color> = unique.into_iter().collect();
        colors.sort_by_key(|c| c.palette_key());
        log::info!("Palette : K = {}", colors.len());
        for (i, c) in colors.iter().enumerate() {
            log::debug!("  [{i:3}] {c} luma={}", c.luma());
        }
        Self { colors }
    }

    /// Nombre de couleurs K.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// True for an empty palette (never produced by the detector).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Couleurs dans l'ordre de la palette.
    #[must_use]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }
}

impl Index<usize> for Palette {
    type Output = Color;

    fn index(&self, i: usize) -> &Color {
        &self.colors[i]
    }
}
