//! Table des mélanges et table de bascule.
//!
//! La table des mélanges contient les K² moyennes de paires de la palette.
//! Chaque couleur observée est rapprochée de ses deux mélanges les plus
//! proches ; la bascule d'une couleur est la somme des deux indices de
//! palette de son meilleur mélange.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use dd_core::color::{Color, midpoint, weighted_distance};
use dd_core::frame::PixelGrid;
use rayon::prelude::*;

use crate::palette::Palette;

/// Matrice K×K des moyennes de paires, aplatie en `j*K + i`.
///
/// # Example
/// ```
/// use dd_core::color::Color;
/// use dd_palette::blend::BlendTable;
/// use dd_palette::palette::Palette;
/// let p = Palette::from_candidates([Color::gray(0), Color::gray(255)]);
/// let t = BlendTable::new(&p);
/// assert_eq!(t.len(), 4);
/// assert_eq!(t.get(1, 0), [127.5; 3]);
/// assert_eq!(t.decode(2), (0, 1));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BlendTable {
    k: usize,
    entries: Vec<[f64; 3]>,
}

impl BlendTable {
    /// Compute all pairwise midpoints of `palette`.
    #[must_use]
    pub fn new(palette: &Palette) -> Self {
        let k = palette.len();
        let mut entries = Vec::with_capacity(k * k);
        for j in 0..k {
            for i in 0..k {
                entries.push(midpoint(palette[i], palette[j]));
            }
        }
        Self { k, entries }
    }

    /// Nombre d'entrées, K².
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when built from an empty palette.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mélange des entrées `i` et `j` de la palette.
    #[inline(always)]
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> [f64; 3] {
        self.entries[j * self.k + i]
    }

    /// Flat index → (i, j).
    #[inline(always)]
    #[must_use]
    pub fn decode(&self, flat: usize) -> (usize, usize) {
        (flat % self.k, flat / self.k)
    }

    /// Two nearest entries (flat indices), ties resolved by iteration order.
    ///
    /// The second pick is `None` when the table has a single entry.
    #[must_use]
    pub fn two_nearest(&self, color: [f64; 3]) -> Option<(usize, Option<usize>)> {
        let mut best: Option<(usize, f64)> = None;
        let mut second: Option<(usize, f64)> = None;
        for (flat, entry) in self.entries.iter().enumerate() {
            let d = weighted_distance(color, *entry);
            if best.is_none_or(|(_, bd)| d < bd) {
                second = best;
                best = Some((flat, d));
            } else if second.is_none_or(|(_, sd)| d < sd) {
                second = Some((flat, d));
            }
        }
        best.map(|(b, _)| (b, second.map(|(s, _)| s)))
    }
}

/// Appariement d'une couleur observée avec la table des mélanges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlendMatch {
    /// Best pair (a, b).
    pub best: (usize, usize),
    /// Second-best pair (c, d), absent when K = 1.
    pub second: Option<(usize, usize)>,
}

impl BlendMatch {
    /// Bascule : `a + b`.
    #[must_use]
    pub fn toggle(&self) -> i64 {
        (self.best.0 + self.best.1) as i64
    }

    /// Pour un meilleur mélange mixte (a ≠ b), le second doit être la paire
    /// inversée (b, a). Les mélanges purs ne sont pas vérifiés.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        let (a, b) = self.best;
        if a == b {
            return true;
        }
        self.second == Some((b, a))
    }
}

/// Rapproche une couleur de la table.
///
/// # Example
/// ```
/// use dd_core::color::Color;
/// use dd_palette::blend::{BlendTable, match_color};
/// use dd_palette::palette::Palette;
/// let p = Palette::from_candidates([Color::gray(0), Color::gray(255)]);
/// let t = BlendTable::new(&p);
/// let m = match_color(&t, Color::gray(128)).unwrap();
/// assert_eq!(m.best, (1, 0));
/// assert_eq!(m.second, Some((0, 1)));
/// assert_eq!(m.toggle(), 1);
/// assert!(m.is_symmetric());
/// ```
#[must_use]
pub fn match_color(table: &BlendTable, color: Color) -> Option<BlendMatch> {
    let (best, second) = table.two_nearest(color.to_f64())?;
    Some(BlendMatch {
        best: table.decode(best),
        second: second.map(|s| table.decode(s)),
    })
}

/// Bascule de chaque couleur distincte observée dans la grille rognée.
///
/// Construite une fois, immuable ensuite.
#[derive(Clone, Debug, Default)]
pub struct ToggleMap {
    /// Distinct observed colors, lexicographic order.
    colors: Vec<Color>,
    /// Toggle of `colors[i]`.
    toggles: Vec<i64>,
    lookup: HashMap<Color, usize>,
    /// Colors whose blend pair failed the symmetry check.
    mismatches: usize,
}

impl ToggleMap {
    /// Match every distinct color of `grid` against `table`.
    ///
    /// Une asymétrie de paire est signalée en `warn!` et n'interrompt rien.
    ///
    /// # Example
    /// ```
    /// use dd_core::color::Color;
    /// use dd_core::frame::PixelGrid;
    /// use dd_palette::blend::{BlendTable, ToggleMap};
    /// use dd_palette::palette::Palette;
    /// let (k, g, w) = (Color::gray(0), Color::gray(128), Color::gray(255));
    /// let p = Palette::from_candidates([k, w]);
    /// let grid = PixelGrid::from_rows(&[vec![k, g, w]]).unwrap();
    /// let map = ToggleMap::build(&grid, &BlendTable::new(&p));
    /// assert_eq!(map.toggle_of(k), Some(0));
    /// assert_eq!(map.toggle_of(g), Some(1));
    /// assert_eq!(map.toggle_of(w), Some(2));
    /// ```
    #[must_use]
    pub fn build(grid: &PixelGrid, table: &BlendTable) -> Self {
        let mut distinct = BTreeSet::new();
        for y in 0..grid.height {
            for x in 0..grid.width {
                distinct.insert(grid.rgb(x, y));
            }
        }
        let colors: Vec<Color> = distinct.into_iter().collect();

        let matches: Vec<Option<BlendMatch>> =
            colors.par_iter().map(|&c| match_color(table, c)).collect();

        let mut toggles = Vec::with_capacity(colors.len());
        let mut mismatches = 0;
        for (color, m) in colors.iter().zip(&matches) {
            let Some(m) = m else {
                toggles.push(0);
                continue;
            };
            if !m.is_symmetric() {
                mismatches += 1;
                let (a, b) = m.best;
                log::warn!(
                    "Paire asymétrique pour {color} : meilleure {:?} ({:?}), seconde {:?}",
                    m.best,
                    table.get(a, b),
                    m.second
                );
            }
            toggles.push(m.toggle());
        }

        let lookup = colors.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        log::info!(
            "Bascules : {} couleurs distinctes, {} asymétries",
            colors.len(),
            mismatches
        );
        Self {
            colors,
            toggles,
            lookup,
            mismatches,
        }
    }

    /// Nombre de couleurs distinctes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// True when no color was observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Liste énumérée des couleurs distinctes.
    #[must_use]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Number of symmetry-check mismatches seen while building.
    #[must_use]
    pub fn mismatches(&self) -> usize {
        self.mismatches
    }

    /// Bascule d'une couleur observée, par égalité exacte.
    #[must_use]
    pub fn toggle_of(&self, color: Color) -> Option<i64> {
        self.lookup.get(&color).map(|&i| self.toggles[i])
    }

    /// Index of the distinct color nearest to `color` (weights 1, 2, 1).
    ///
    /// An exact hit short-circuits the scan; ties keep the lowest index.
    #[must_use]
    pub fn nearest_index(&self, color: Color) -> Option<usize> {
        if let Some(&i) = self.lookup.get(&color) {
            return Some(i);
        }
        let target = color.to_f64();
        let mut best: Option<(usize, f64)> = None;
        for (i, c) in self.colors.iter().enumerate() {
            let d = weighted_distance(c.to_f64(), target);
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Bascule de la couleur observée la plus proche de `color`.
    #[must_use]
    pub fn nearest_toggle(&self, color: Color) -> Option<i64> {
        self.toggle_of(color)
            .or_else(|| self.nearest_index(color).map(|i| self.toggles[i]))
    }

    /// Nombre de couleurs distinctes par valeur de bascule.
    #[must_use]
    pub fn histogram(&self) -> BTreeMap<i64, usize> {
        let mut h = BTreeMap::new();
        for &t in &self.toggles {
            *h.entry(t).or_insert(0) += 1;
        }
        h
    }
}
