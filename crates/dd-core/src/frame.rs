use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::DeditherError;

/// Mode couleur d'une grille : nombre et sens des canaux.
///
/// # Example
/// ```
/// use dd_core::frame::ColorMode;
/// assert_eq!(ColorMode::from_channels(2), Some(ColorMode::La));
/// assert_eq!(ColorMode::from_channels(5), None);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Grayscale.
    L,
    /// Grayscale + alpha.
    La,
    /// RGB.
    Rgb,
    /// RGB + alpha.
    Rgba,
}

impl ColorMode {
    /// Mode correspondant à une profondeur de canal, `None` hors de 1..=4.
    #[must_use]
    pub const fn from_channels(depth: usize) -> Option<Self> {
        match depth {
            1 => Some(Self::L),
            2 => Some(Self::La),
            3 => Some(Self::Rgb),
            4 => Some(Self::Rgba),
            _ => None,
        }
    }

    /// Parse a CLI/TOML mode name.
    ///
    /// # Errors
    /// Returns `UnsupportedMode` for any other name.
    pub fn parse(name: &str) -> Result<Self, DeditherError> {
        match name.to_ascii_lowercase().as_str() {
            "l" | "gray" | "grayscale" => Ok(Self::L),
            "la" => Ok(Self::La),
            "rgb" => Ok(Self::Rgb),
            "rgba" => Ok(Self::Rgba),
            _ => Err(DeditherError::UnsupportedMode {
                mode: name.to_string(),
            }),
        }
    }
}

/// Grille de pixels 8 bits indexée (ligne, colonne, canal).
///
/// Stockage row-major, `channels` octets par pixel. Toutes les lignes ont
/// la même largeur et la même profondeur ; les transformations produisent
/// une nouvelle grille plutôt que de muter celle-ci.
///
/// # Example
/// ```
/// use dd_core::frame::PixelGrid;
/// let grid = PixelGrid::new(4, 2, 3).unwrap();
/// assert_eq!(grid.data.len(), 4 * 2 * 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    /// Samples, row-major, `channels` bytes per pixel.
    pub data: Vec<u8>,
    /// Width in pixels (columns).
    pub width: u32,
    /// Height in pixels (rows).
    pub height: u32,
    /// Channels per pixel, 1..=4.
    pub channels: usize,
}

impl PixelGrid {
    /// Grille à zéro aux dimensions données.
    ///
    /// # Errors
    /// Returns `UnsupportedDepth` if `channels` is outside 1..=4.
    pub fn new(width: u32, height: u32, channels: usize) -> Result<Self, DeditherError> {
        if ColorMode::from_channels(channels).is_none() {
            return Err(DeditherError::UnsupportedDepth { depth: channels });
        }
        Ok(Self {
            data: vec![0u8; width as usize * height as usize * channels],
            width,
            height,
            channels,
        })
    }

    /// Wrap an existing sample buffer.
    ///
    /// # Errors
    /// Returns `UnsupportedDepth` for a bad channel count and
    /// `InvalidDimensions` if the buffer length does not match.
    ///
    /// # Example
    /// ```
    /// use dd_core::frame::PixelGrid;
    /// let grid = PixelGrid::from_raw(2, 1, 1, vec![0, 255]).unwrap();
    /// assert_eq!(grid.pixel(1, 0), &[255]);
    /// assert!(PixelGrid::from_raw(2, 2, 1, vec![0, 255]).is_err());
    /// ```
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: usize,
        data: Vec<u8>,
    ) -> Result<Self, DeditherError> {
        if ColorMode::from_channels(channels).is_none() {
            return Err(DeditherError::UnsupportedDepth { depth: channels });
        }
        if data.len() != width as usize * height as usize * channels {
            return Err(DeditherError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// Build an RGB grid from rows of colors. All rows must share one width.
    ///
    /// # Errors
    /// Returns `InvalidDimensions` on ragged input.
    ///
    /// # Example
    /// ```
    /// use dd_core::color::Color;
    /// use dd_core::frame::PixelGrid;
    /// let k = Color::gray(0);
    /// let grid = PixelGrid::from_rows(&[vec![k, k], vec![k, k]]).unwrap();
    /// assert_eq!((grid.width, grid.height, grid.channels), (2, 2, 3));
    /// ```
    pub fn from_rows(rows: &[Vec<Color>]) -> Result<Self, DeditherError> {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, Vec::len) as u32;
        if rows.iter().any(|r| r.len() != width as usize) {
            return Err(DeditherError::InvalidDimensions { width, height });
        }
        let data = rows
            .iter()
            .flat_map(|r| r.iter().flat_map(|c| c.to_array()))
            .collect();
        Self::from_raw(width, height, 3, data)
    }

    /// True when the grid has no pixel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline(always)]
    fn offset(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        (y as usize * self.width as usize + x as usize) * self.channels
    }

    /// All channels of pixel (x, y).
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let idx = self.offset(x, y);
        &self.data[idx..idx + self.channels]
    }

    /// Couleur RGB du pixel (x, y). L'alpha est ignoré ; le gris est répliqué.
    ///
    /// # Example
    /// ```
    /// use dd_core::color::Color;
    /// use dd_core::frame::PixelGrid;
    /// let grid = PixelGrid::from_raw(1, 1, 2, vec![40, 255]).unwrap();
    /// assert_eq!(grid.rgb(0, 0), Color::gray(40));
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn rgb(&self, x: u32, y: u32) -> Color {
        let p = self.pixel(x, y);
        if self.channels < 3 {
            Color::gray(p[0])
        } else {
            Color::new(p[0], p[1], p[2])
        }
    }

    /// Luminance pondérée `r + 2g + b` du pixel (x, y).
    #[inline(always)]
    #[must_use]
    pub fn luma(&self, x: u32, y: u32) -> i64 {
        i64::from(self.rgb(x, y).luma())
    }

    /// Extract the `width`×`height` window whose top-left corner is (x, y).
    ///
    /// # Errors
    /// Returns `InvalidDimensions` if the window leaves the grid.
    ///
    /// # Example
    /// ```
    /// use dd_core::frame::PixelGrid;
    /// let grid = PixelGrid::from_raw(3, 1, 1, vec![1, 2, 3]).unwrap();
    /// let sub = grid.crop(1, 0, 2, 1).unwrap();
    /// assert_eq!(sub.data, vec![2, 3]);
    /// ```
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Self, DeditherError> {
        let fits_x = x.checked_add(width).is_some_and(|r| r <= self.width);
        let fits_y = y.checked_add(height).is_some_and(|b| b <= self.height);
        if !fits_x || !fits_y {
            return Err(DeditherError::InvalidDimensions { width, height });
        }
        let row_len = width as usize * self.channels;
        let mut data = Vec::with_capacity(row_len * height as usize);
        for row in y..y + height {
            if width > 0 {
                let start = self.offset(x, row);
                data.extend_from_slice(&self.data[start..start + row_len]);
            }
        }
        Self::from_raw(width, height, self.channels, data)
    }
}

/// Grille d'indices de palette, même forme (lignes, colonnes) que l'entrée rognée.
///
/// # Example
/// ```
/// use dd_core::frame::IndexGrid;
/// let grid = IndexGrid::new(3, 2);
/// assert_eq!(grid.row(1), &[0, 0, 0]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexGrid {
    /// Palette indices, row-major.
    pub cells: Vec<usize>,
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
}

impl IndexGrid {
    /// Grille pré-allouée, tous les indices à 0.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            cells: vec![0; width as usize * height as usize],
            width,
            height,
        }
    }

    /// Ligne `y` complète.
    #[must_use]
    pub fn row(&self, y: u32) -> &[usize] {
        let start = y as usize * self.width as usize;
        &self.cells[start..start + self.width as usize]
    }
}
