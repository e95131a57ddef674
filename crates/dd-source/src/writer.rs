use std::io::{Cursor, Write};
use std::path::Path;

use anyhow::{Context, Result};
use dd_core::color::Color;
use dd_core::error::DeditherError;
use dd_core::frame::{IndexGrid, PixelGrid};
use image::{ColorType, ImageFormat};
use tempfile::NamedTempFile;

/// Développe une grille d'indices en grille RGB via la palette.
///
/// # Errors
/// Returns an error if an index falls outside the palette.
///
/// # Example
/// ```
/// use dd_source::writer::palette_to_grid;
/// use dd_core::color::Color;
/// use dd_core::frame::IndexGrid;
/// let palette = [Color::gray(0), Color::gray(255)];
/// let mut indices = IndexGrid::new(2, 1);
/// indices.cells[1] = 1;
/// let grid = palette_to_grid(&indices, &palette).unwrap();
/// assert_eq!(grid.data, vec![0, 0, 0, 255, 255, 255]);
/// ```
pub fn palette_to_grid(indices: &IndexGrid, palette: &[Color]) -> Result<PixelGrid> {
    let mut data = Vec::with_capacity(indices.cells.len() * 3);
    for &idx in &indices.cells {
        let color = palette.get(idx).with_context(|| {
            format!("Index de palette {idx} hors limites (K = {})", palette.len())
        })?;
        data.extend_from_slice(&color.to_array());
    }
    Ok(PixelGrid::from_raw(indices.width, indices.height, 3, data)?)
}

/// Type de couleur de l'encodeur selon la profondeur.
///
/// # Errors
/// Returns `UnsupportedDepth` outside 1..=4.
pub fn color_type(channels: usize) -> Result<ColorType, DeditherError> {
    match channels {
        1 => Ok(ColorType::L8),
        2 => Ok(ColorType::La8),
        3 => Ok(ColorType::Rgb8),
        4 => Ok(ColorType::Rgba8),
        depth => Err(DeditherError::UnsupportedDepth { depth }),
    }
}

/// Encode `grid` to `path`, format chosen by extension (PNG by default).
///
/// Encoding happens in memory first, then the bytes go to a temporary file
/// in the destination directory which is renamed over `path`. A failure at
/// any point leaves no partial output behind.
///
/// # Errors
/// `UnsupportedDepth` for a depth outside 1..=4, `Io` if encoding or the
/// write fails.
///
/// # Example
/// ```no_run
/// use dd_source::writer::write_grid;
/// use dd_core::frame::PixelGrid;
/// use std::path::Path;
/// let grid = PixelGrid::new(8, 8, 3).unwrap();
/// write_grid(&grid, Path::new("out.png")).unwrap();
/// ```
pub fn write_grid(grid: &PixelGrid, path: &Path) -> Result<()> {
    let color = color_type(grid.channels)?;
    let format = ImageFormat::from_path(path).unwrap_or(ImageFormat::Png);
    let shown = path.display().to_string();

    let mut encoded = Cursor::new(Vec::new());
    image::write_buffer_with_format(
        &mut encoded,
        &grid.data,
        grid.width,
        grid.height,
        color,
        format,
    )
    .map_err(|e| DeditherError::io(shown.clone(), e))?;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| DeditherError::io(shown.clone(), e))?;
    tmp.write_all(encoded.get_ref())
        .map_err(|e| DeditherError::io(shown.clone(), e))?;
    tmp.persist(path)
        .map_err(|e| DeditherError::io(shown.clone(), e.error))?;

    log::info!(
        "Écrit {} ({}×{}, {:?})",
        shown,
        grid.width,
        grid.height,
        format
    );
    Ok(())
}

/// Développe `indices` via `palette` puis encode vers `path`.
///
/// # Errors
/// See [`palette_to_grid`] and [`write_grid`].
pub fn write_indexed(indices: &IndexGrid, palette: &[Color], path: &Path) -> Result<()> {
    let grid = palette_to_grid(indices, palette)?;
    write_grid(&grid, path)
}
