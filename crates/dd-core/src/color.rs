use std::fmt;

/// Seuil de proximité pour la détection des points de mélange.
///
/// Un delta de pixel est "proche" quand `|Δr| + |Δg| + |Δb| < DITHER_EPSILON`.
pub const DITHER_EPSILON: f64 = 8.0;

/// Poids (r, g, b) de la projection de luminance et de la distance couleur.
pub const LUMA_WEIGHTS: [u32; 3] = [1, 2, 1];

/// Couleur RGB 8 bits, valeur fixe à trois composantes.
///
/// L'égalité, le hash et l'ordre sont structurels : l'ordre dérivé est
/// lexicographique (r, puis g, puis b).
///
/// # Example
/// ```
/// use dd_core::color::Color;
/// let black = Color::new(0, 0, 0);
/// let white = Color::new(255, 255, 255);
/// assert!(black < white);
/// assert_eq!(white.luma(), 1020);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color {
    /// Rouge.
    pub r: u8,
    /// Vert.
    pub g: u8,
    /// Bleu.
    pub b: u8,
}

impl Color {
    /// Build a color from its components.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Gray level replicated on all three channels.
    #[must_use]
    pub const fn gray(l: u8) -> Self {
        Self { r: l, g: l, b: l }
    }

    /// Projection de luminance pondérée `r*1 + g*2 + b*1`.
    ///
    /// Sert à la fois à ordonner la palette et au signal de rognage.
    #[inline(always)]
    #[must_use]
    pub fn luma(self) -> u32 {
        u32::from(self.r) * LUMA_WEIGHTS[0]
            + u32::from(self.g) * LUMA_WEIGHTS[1]
            + u32::from(self.b) * LUMA_WEIGHTS[2]
    }

    /// Composantes en arithmétique réelle.
    #[inline(always)]
    #[must_use]
    pub fn to_f64(self) -> [f64; 3] {
        [f64::from(self.r), f64::from(self.g), f64::from(self.b)]
    }

    /// Round a real-valued triple back to the nearest 8-bit color.
    ///
    /// # Example
    /// ```
    /// use dd_core::color::Color;
    /// assert_eq!(Color::from_f64_rounded([127.5, -3.0, 300.0]), Color::new(128, 0, 255));
    /// ```
    #[must_use]
    pub fn from_f64_rounded(c: [f64; 3]) -> Self {
        let q = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        Self::new(q(c[0]), q(c[1]), q(c[2]))
    }

    /// Components as a byte triple.
    #[must_use]
    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Ordering key used by the palette: luminance first, then components.
    #[must_use]
    pub fn palette_key(self) -> (u32, Self) {
        (self.luma(), self)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Distance quadratique pondérée `Σ w_k (a_k - b_k)²` avec les poids (1, 2, 1).
///
/// # Example
/// ```
/// use dd_core::color::weighted_distance;
/// assert_eq!(weighted_distance([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]), 4.0);
/// ```
#[inline(always)]
#[must_use]
pub fn weighted_distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    f64::from(LUMA_WEIGHTS[0]) * dr * dr
        + f64::from(LUMA_WEIGHTS[1]) * dg * dg
        + f64::from(LUMA_WEIGHTS[2]) * db * db
}

/// Test de proximité à poids unitaires : `|Δr| + |Δg| + |Δb| < DITHER_EPSILON`.
///
/// Distinct de la projection de luminance : les trois canaux comptent pareil,
/// et des écarts de signes opposés ne se compensent pas.
///
/// # Example
/// ```
/// use dd_core::color::is_near;
/// assert!(is_near([3.0, -2.0, 2.0]));
/// assert!(!is_near([100.0, -100.0, 0.0]));
/// ```
#[inline(always)]
#[must_use]
pub fn is_near(delta: [f64; 3]) -> bool {
    delta.iter().map(|d| d.abs()).sum::<f64>() < DITHER_EPSILON
}

/// Moyenne composante par composante, non arrondie.
#[inline(always)]
#[must_use]
pub fn midpoint(a: Color, b: Color) -> [f64; 3] {
    let a = a.to_f64();
    let b = b.to_f64();
    [
        (a[0] + b[0]) / 2.0,
        (a[1] + b[1]) / 2.0,
        (a[2] + b[2]) / 2.0,
    ]
}
