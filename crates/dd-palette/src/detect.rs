//! Détection des paires de tramage.
//!
//! Un pixel est un point de mélange quand il se trouve sur une interpolation
//! linéaire entre ses voisins gauche et droite, et que ces voisins sont
//! suffisamment distincts. Les voisins retenus forment le réservoir de
//! couleurs pures candidates.

use std::collections::BTreeSet;

use dd_core::color::{Color, is_near};
use dd_core::frame::PixelGrid;
use rayon::prelude::*;

/// Colonnes ignorées à chaque bord (artefacts du décalage circulaire).
pub const EDGE_COLUMNS: u32 = 2;

/// `near(2c - l - r) && !near(l - r)`.
///
/// # Example
/// ```
/// use dd_palette::detect::is_dither_midpoint;
/// let black = [0.0; 3];
/// let gray = [128.0; 3];
/// let white = [255.0; 3];
/// assert!(is_dither_midpoint(black, gray, white));
/// assert!(!is_dither_midpoint(gray, gray, gray));
/// assert!(!is_dither_midpoint(black, white, black));
/// ```
#[inline(always)]
#[must_use]
pub fn is_dither_midpoint(left: [f64; 3], center: [f64; 3], right: [f64; 3]) -> bool {
    let blend = [
        2.0 * center[0] - left[0] - right[0],
        2.0 * center[1] - left[1] - right[1],
        2.0 * center[2] - left[2] - right[2],
    ];
    let spread = [left[0] - right[0], left[1] - right[1], left[2] - right[2]];
    is_near(blend) && !is_near(spread)
}

/// Résultat du balayage : voisins gauche et droite de chaque point de mélange.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Detection {
    /// Number of marked midpoints.
    pub midpoints: usize,
    /// Distinct left-neighbor colors at marked positions.
    pub left: BTreeSet<Color>,
    /// Distinct right-neighbor colors at marked positions.
    pub right: BTreeSet<Color>,
}

impl Detection {
    fn merge(mut self, other: Self) -> Self {
        self.midpoints += other.midpoints;
        self.left.extend(other.left);
        self.right.extend(other.right);
        self
    }

    /// Réservoir de couleurs pures : gauche ∪ droite ∪ {fond}.
    ///
    /// Sans point de mélange, le réservoir se réduit au fond (K = 1).
    ///
    /// # Example
    /// ```
    /// use dd_core::color::Color;
    /// use dd_palette::detect::Detection;
    /// let pool = Detection::default().candidate_pool(Color::gray(7));
    /// assert_eq!(pool.len(), 1);
    /// ```
    #[must_use]
    pub fn candidate_pool(&self, background: Color) -> BTreeSet<Color> {
        let mut pool: BTreeSet<Color> = self.left.union(&self.right).copied().collect();
        pool.insert(background);
        pool
    }
}

/// Scan one row, horizontal neighbors taken with circular wraparound.
fn detect_row(grid: &PixelGrid, y: u32) -> Detection {
    let mut found = Detection::default();
    let w = grid.width;
    if w <= 2 * EDGE_COLUMNS {
        return found;
    }
    for x in EDGE_COLUMNS..w - EDGE_COLUMNS {
        let left = grid.rgb((x + w - 1) % w, y);
        let center = grid.rgb(x, y);
        let right = grid.rgb((x + 1) % w, y);
        if is_dither_midpoint(left.to_f64(), center.to_f64(), right.to_f64()) {
            found.midpoints += 1;
            found.left.insert(left);
            found.right.insert(right);
        }
    }
    found
}

/// Balaye toutes les lignes de la grille rognée en parallèle.
///
/// # Example
/// ```
/// use dd_core::color::Color;
/// use dd_core::frame::PixelGrid;
/// use dd_palette::detect::detect_pairs;
/// let (k, g, w) = (Color::gray(0), Color::gray(128), Color::gray(255));
/// let grid = PixelGrid::from_rows(&[vec![k, k, k, g, w, w, w]]).unwrap();
/// let found = detect_pairs(&grid);
/// assert_eq!(found.midpoints, 1);
/// assert!(found.left.contains(&k) && found.right.contains(&w));
/// ```
#[must_use]
pub fn detect_pairs(grid: &PixelGrid) -> Detection {
    let found = (0..grid.height)
        .into_par_iter()
        .map(|y| detect_row(grid, y))
        .reduce(Detection::default, Detection::merge);
    log::info!(
        "Détection : {} points de mélange, {} voisins gauche, {} voisins droite",
        found.midpoints,
        found.left.len(),
        found.right.len()
    );
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    const K: Color = Color::gray(0);
    const G: Color = Color::gray(128);
    const W: Color = Color::gray(255);

    #[test]
    fn edge_columns_are_ignored() {
        // Le seul mélange est en colonne 1.
        let grid = PixelGrid::from_rows(&[vec![K, G, W, W, W, W]]).unwrap();
        assert_eq!(detect_pairs(&grid).midpoints, 0);
    }

    #[test]
    fn narrow_grid_finds_nothing() {
        let grid = PixelGrid::from_rows(&[vec![K, G, W, G]]).unwrap();
        let found = detect_pairs(&grid);
        assert_eq!(found, Detection::default());
    }

    #[test]
    fn equal_channel_sum_neighbors_still_blend() {
        // Rouge et vert ont la même somme de canaux mais restent distincts.
        let red = Color::new(200, 0, 0);
        let green = Color::new(0, 200, 0);
        let mid = Color::new(100, 100, 0);
        assert!(is_dither_midpoint(red.to_f64(), mid.to_f64(), green.to_f64()));
        let grid = PixelGrid::from_rows(&[vec![K, K, red, mid, green, K, K]]).unwrap();
        let found = detect_pairs(&grid);
        assert_eq!(found.midpoints, 1);
        assert!(found.left.contains(&red) && found.right.contains(&green));
    }

    #[test]
    fn cancelling_channel_errors_are_not_a_blend() {
        // 2c - l - r = (100, -100, 0) : somme signée nulle, pas un mélange.
        let fake = Color::new(50, 0, 0);
        let green = Color::new(0, 100, 0);
        assert!(!is_dither_midpoint(K.to_f64(), fake.to_f64(), green.to_f64()));
        let grid =
            PixelGrid::from_rows(&[vec![K, K, K, fake, green, green, green]]).unwrap();
        let found = detect_pairs(&grid);
        assert_eq!(found.midpoints, 0);
        assert_eq!(found.candidate_pool(K).len(), 1);
    }

    #[test]
    fn rows_are_merged() {
        let red = Color::new(220, 40, 40);
        let dim = Color::new(110, 20, 20);
        let grid = PixelGrid::from_rows(&[
            vec![K, K, K, G, W, W, W],
            vec![W, W, red, dim, K, K, K],
        ])
        .unwrap();
        let found = detect_pairs(&grid);
        assert_eq!(found.midpoints, 2);
        let pool = found.candidate_pool(K);
        assert_eq!(pool.into_iter().collect::<Vec<_>>(), vec![K, red, W]);
    }
}
