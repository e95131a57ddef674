/// Moteur de dé-tramage : rognage, détection des paires, palette, table de
/// bascule et reconstruction ligne par ligne.
///
/// Data flows strictly forward: trim → detect → palette → blend/toggle →
/// reconstruct. Every stage returns a fresh value.

pub mod blend;
pub mod detect;
pub mod palette;
pub mod reconstruct;
pub mod trim;

use dd_core::color::Color;
use dd_core::frame::PixelGrid;

use crate::blend::{BlendTable, ToggleMap};
use crate::detect::Detection;
use crate::palette::Palette;
use crate::reconstruct::Reconstruction;

/// État dérivé d'une grille rognée : palette, mélanges et bascules.
///
/// Lecture seule pendant la reconstruction.
///
/// # Example
/// ```
/// use dd_core::color::Color;
/// use dd_core::frame::PixelGrid;
/// use dd_palette::Dedither;
/// let (k, g, w) = (Color::gray(0), Color::gray(128), Color::gray(255));
/// let grid = PixelGrid::from_rows(&[vec![k, k, k, g, w, w, w]]).unwrap();
/// let dd = Dedither::analyze(&grid, k);
/// assert_eq!(dd.palette.colors(), &[k, w]);
/// let rec = dd.reconstruct(&grid);
/// assert_eq!(rec.indices.row(0), &[0, 0, 0, 1, 1, 1, 1]);
/// ```
#[derive(Clone, Debug)]
pub struct Dedither {
    /// Dither-pair scan of the trimmed grid.
    pub detection: Detection,
    /// Ordered pure-color palette.
    pub palette: Palette,
    /// K² pairwise midpoints.
    pub table: BlendTable,
    /// Toggle of every distinct observed color.
    pub toggles: ToggleMap,
}

impl Dedither {
    /// Étapes 3 à 5 sur une grille déjà rognée.
    ///
    /// `background` est le pixel (0, 0) de l'image avant rognage.
    #[must_use]
    pub fn analyze(trimmed: &PixelGrid, background: Color) -> Self {
        let detection = detect::detect_pairs(trimmed);
        if detection.midpoints == 0 {
            log::warn!("Aucun point de mélange : palette réduite au fond {background}");
        }
        let palette = Palette::from_candidates(detection.candidate_pool(background));
        let table = BlendTable::new(&palette);
        let toggles = ToggleMap::build(trimmed, &table);
        Self {
            detection,
            palette,
            table,
            toggles,
        }
    }

    /// Étape 6 : indices de palette pour chaque cellule de `trimmed`.
    #[must_use]
    pub fn reconstruct(&self, trimmed: &PixelGrid) -> Reconstruction {
        reconstruct::reconstruct(trimmed, &self.toggles, self.palette.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dd_core::color::midpoint;

    /// Chaque pixel observé est la moyenne arrondie de deux pixels
    /// consécutifs de la ligne d'origine.
    fn observe(orig: &[usize], colors: &[Color]) -> Vec<Color> {
        orig.windows(2)
            .map(|w| Color::from_f64_rounded(midpoint(colors[w[0]], colors[w[1]])))
            .collect()
    }

    /// Ajoute une marge uniforme de `pad` pixels autour des lignes.
    fn framed(rows: &[Vec<Color>], border: Color, pad: usize) -> PixelGrid {
        let width = rows[0].len() + 2 * pad;
        let mut out = vec![vec![border; width]; pad];
        for row in rows {
            let mut line = vec![border; pad];
            line.extend_from_slice(row);
            line.extend(std::iter::repeat_n(border, pad));
            out.push(line);
        }
        out.extend(std::iter::repeat_n(vec![border; width], pad));
        PixelGrid::from_rows(&out).unwrap()
    }

    const ORIG_A: [usize; 11] = [0, 0, 1, 1, 1, 0, 0, 0, 1, 1, 0];
    const ORIG_B: [usize; 11] = [0, 1, 1, 0, 0, 1, 1, 1, 0, 0, 0];

    #[test]
    fn two_colors_recover_exactly_that_palette() {
        let pairs = [
            (Color::gray(0), Color::gray(255)),
            (Color::new(255, 255, 255), Color::new(53, 40, 121)),
            (Color::new(104, 55, 43), Color::new(154, 210, 132)),
            (Color::new(0, 0, 170), Color::new(238, 238, 119)),
        ];
        for (a, b) in pairs {
            let colors = [a, b];
            let rows = vec![observe(&ORIG_A, &colors), observe(&ORIG_B, &colors)];
            let original = framed(&rows, a, 3);
            let trimmed = trim::trim_borders(&original).unwrap();
            let dd = Dedither::analyze(&trimmed, original.rgb(0, 0));

            let mut expected = vec![a, b];
            expected.sort_by_key(|c| c.luma());
            assert_eq!(dd.palette.colors(), expected.as_slice(), "pair {a} / {b}");
        }
    }

    #[test]
    fn dithered_block_reconstructs_without_intermediate_values() {
        let (k, w) = (Color::gray(0), Color::gray(255));
        let colors = [k, w];
        let rows = vec![observe(&ORIG_A, &colors), observe(&ORIG_B, &colors)];
        let original = framed(&rows, k, 2);

        let trimmed = trim::trim_borders(&original).unwrap();
        assert_eq!((trimmed.width, trimmed.height), (10, 2));

        let dd = Dedither::analyze(&trimmed, original.rgb(0, 0));
        assert_eq!(dd.palette.colors(), &[k, w]);
        assert_eq!(dd.toggles.mismatches(), 0);

        let rec = dd.reconstruct(&trimmed);
        assert_eq!(rec.clamped, 0);
        assert_eq!(rec.indices.row(0), &ORIG_A[1..]);
        assert_eq!(rec.indices.row(1), &ORIG_B[1..]);

        // Aucune valeur intermédiaire : chaque cellule est noire ou blanche.
        assert!(rec.indices.cells.iter().all(|&i| i < 2));
    }

    #[test]
    fn no_midpoint_degenerates_to_background() {
        let (k, w) = (Color::gray(0), Color::gray(255));
        // Damier pur : aucun pixel n'est une moyenne de ses voisins.
        let rows: Vec<Vec<Color>> = (0..4)
            .map(|y| (0..8).map(|x| if (x + y) % 2 == 0 { w } else { k }).collect())
            .collect();
        let grid = PixelGrid::from_rows(&rows).unwrap();
        let trimmed = trim::trim_borders(&grid).unwrap();
        let dd = Dedither::analyze(&trimmed, grid.rgb(0, 0));
        assert_eq!(dd.detection.midpoints, 0);
        assert_eq!(dd.palette.colors(), &[w]);
        assert_eq!(dd.table.len(), 1);
        let rec = dd.reconstruct(&trimmed);
        assert!(rec.indices.cells.iter().all(|&i| i == 0));
    }
}
