use dd_core::frame::{IndexGrid, PixelGrid};
use rayon::prelude::*;

use crate::blend::ToggleMap;

/// Récurrence de parité d'une ligne : `p' = t - p`, `p` initial à 0.
///
/// Valeurs brutes, non bornées à la palette.
///
/// # Example
/// ```
/// use dd_palette::reconstruct::parity_row;
/// let (t0, t1, t2) = (3, 5, 4);
/// assert_eq!(parity_row(&[t0, t1, t2]), vec![t0, t1 - t0, t2 - t1 + t0]);
/// ```
#[must_use]
pub fn parity_row(toggles: &[i64]) -> Vec<i64> {
    let mut parity = 0i64;
    toggles
        .iter()
        .map(|&t| {
            parity = t - parity;
            parity
        })
        .collect()
}

/// Grille d'indices reconstruite.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconstruction {
    /// One palette index per cell of the trimmed grid.
    pub indices: IndexGrid,
    /// Cells whose parity left `0..K` and was clamped into range.
    pub clamped: usize,
}

/// Parcourt chaque ligne de gauche à droite et choisit un indice de palette
/// par pixel.
///
/// Les lignes sont indépendantes et traitées en parallèle ; à l'intérieur
/// d'une ligne l'ordre est strict. Pour chaque pixel : couleur observée la
/// plus proche, sa bascule `t`, puis `p = t - p`. La valeur brute continue
/// la récurrence ; la cellule reçoit `p` borné à `0..K`.
///
/// # Example
/// ```
/// use dd_core::color::Color;
/// use dd_core::frame::PixelGrid;
/// use dd_palette::blend::{BlendTable, ToggleMap};
/// use dd_palette::palette::Palette;
/// use dd_palette::reconstruct::reconstruct;
/// let (k, g, w) = (Color::gray(0), Color::gray(128), Color::gray(255));
/// let p = Palette::from_candidates([k, w]);
/// let grid = PixelGrid::from_rows(&[vec![k, g, w, g, k]]).unwrap();
/// let map = ToggleMap::build(&grid, &BlendTable::new(&p));
/// let rec = reconstruct(&grid, &map, p.len());
/// assert_eq!(rec.indices.row(0), &[0, 1, 1, 0, 0]);
/// assert_eq!(rec.clamped, 0);
/// ```
#[must_use]
pub fn reconstruct(grid: &PixelGrid, toggles: &ToggleMap, k: usize) -> Reconstruction {
    let mut indices = IndexGrid::new(grid.width, grid.height);
    if indices.cells.is_empty() {
        return Reconstruction {
            indices,
            clamped: 0,
        };
    }
    let max_index = k.saturating_sub(1) as i64;

    let clamped: usize = indices
        .cells
        .par_chunks_mut(grid.width as usize)
        .enumerate()
        .map(|(y, row)| {
            let row_toggles: Vec<i64> = (0..grid.width)
                .map(|x| toggles.nearest_toggle(grid.rgb(x, y as u32)).unwrap_or(0))
                .collect();
            let mut clamped = 0usize;
            for (cell, parity) in row.iter_mut().zip(parity_row(&row_toggles)) {
                let idx = parity.clamp(0, max_index);
                if idx != parity {
                    clamped += 1;
                }
                *cell = idx as usize;
            }
            clamped
        })
        .sum();

    if clamped > 0 {
        log::warn!("{clamped} cellules hors palette (K = {k}) ramenées dans 0..{k}");
    }
    Reconstruction { indices, clamped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blend::BlendTable;
    use crate::palette::Palette;
    use dd_core::color::Color;

    #[test]
    fn parity_of_three_pixel_row() {
        for (t0, t1, t2) in [(0, 1, 2), (2, 1, 0), (4, 2, 3)] {
            assert_eq!(parity_row(&[t0, t1, t2]), vec![t0, t1 - t0, t2 - t1 + t0]);
        }
    }

    #[test]
    fn parity_restarts_on_every_row() {
        let (k, g, w) = (Color::gray(0), Color::gray(128), Color::gray(255));
        let p = Palette::from_candidates([k, w]);
        let grid = PixelGrid::from_rows(&[vec![k, g, w], vec![k, g, w]]).unwrap();
        let map = ToggleMap::build(&grid, &BlendTable::new(&p));
        let rec = reconstruct(&grid, &map, p.len());
        assert_eq!(rec.indices.row(0), rec.indices.row(1));
        assert_eq!(rec.indices.row(0), &[0, 1, 1]);
    }

    #[test]
    fn out_of_range_parity_is_clamped_and_counted() {
        // Premier pixel blanc pur : t = 2, p = 2 ≥ K.
        let (k, w) = (Color::gray(0), Color::gray(255));
        let p = Palette::from_candidates([k, w]);
        let grid = PixelGrid::from_rows(&[vec![w, k]]).unwrap();
        let map = ToggleMap::build(&grid, &BlendTable::new(&p));
        let rec = reconstruct(&grid, &map, p.len());
        // Parité brute [2, -2].
        assert_eq!(rec.indices.row(0), &[1, 0]);
        assert_eq!(rec.clamped, 2);
    }

    #[test]
    fn cells_follow_parity_of_nearest_toggles() {
        let (k, g, w) = (Color::gray(0), Color::gray(128), Color::gray(255));
        let p = Palette::from_candidates([k, w]);
        let row = vec![k, g, w, w, g, k, g, w];
        let grid = PixelGrid::from_rows(&[row.clone()]).unwrap();
        let map = ToggleMap::build(&grid, &BlendTable::new(&p));
        let toggles: Vec<i64> = row.iter().filter_map(|&c| map.toggle_of(c)).collect();
        let expected: Vec<usize> = parity_row(&toggles).iter().map(|&v| v as usize).collect();
        let rec = reconstruct(&grid, &map, p.len());
        assert_eq!(rec.indices.row(0), expected.as_slice());
        assert_eq!(rec.clamped, 0);
    }

    #[test]
    fn empty_grid_reconstructs_to_empty() {
        let grid = PixelGrid::new(0, 3, 3).unwrap();
        let rec = reconstruct(&grid, &ToggleMap::default(), 1);
        assert!(rec.indices.cells.is_empty());
    }
}
