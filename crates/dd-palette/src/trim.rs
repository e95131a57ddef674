use dd_core::error::DeditherError;
use dd_core::frame::PixelGrid;

/// Signal de rognage par ligne.
///
/// Pour chaque ligne : `max |luma(x, y) - luma(0, y)|` sur toutes les
/// colonnes. Une ligne uniforme donne 0, une ligne avec du contenu > 0.
///
/// # Example
/// ```
/// use dd_core::color::Color;
/// use dd_core::frame::PixelGrid;
/// use dd_palette::trim::row_signal;
/// let k = Color::gray(0);
/// let w = Color::gray(255);
/// let grid = PixelGrid::from_rows(&[vec![k, k], vec![k, w]]).unwrap();
/// assert_eq!(row_signal(&grid), vec![0, 1020]);
/// ```
#[must_use]
pub fn row_signal(grid: &PixelGrid) -> Vec<i64> {
    (0..grid.height)
        .map(|y| {
            let reference = grid.luma(0, y);
            (0..grid.width)
                .map(|x| (grid.luma(x, y) - reference).abs())
                .max()
                .unwrap_or(0)
        })
        .collect()
}

/// Même signal sur la grille transposée : référence en ligne 0 de chaque colonne.
#[must_use]
pub fn column_signal(grid: &PixelGrid) -> Vec<i64> {
    (0..grid.width)
        .map(|x| {
            let reference = grid.luma(x, 0);
            (0..grid.height)
                .map(|y| (grid.luma(x, y) - reference).abs())
                .max()
                .unwrap_or(0)
        })
        .collect()
}

/// Inclusive range from the first to the last nonzero entry.
///
/// # Example
/// ```
/// use dd_palette::trim::content_range;
/// assert_eq!(content_range(&[0, 3, 0, 2, 0]), Some((1, 3)));
/// assert_eq!(content_range(&[0, 0]), None);
/// ```
#[must_use]
pub fn content_range(signal: &[i64]) -> Option<(usize, usize)> {
    let first = signal.iter().position(|&v| v != 0)?;
    let last = signal.iter().rposition(|&v| v != 0)?;
    Some((first, last))
}

/// Supprime les marges uniformes, lignes d'abord puis colonnes.
///
/// Retourne une nouvelle grille ; l'entrée n'est pas modifiée.
///
/// # Errors
/// Returns `EmptyContent` when either signal is zero everywhere.
///
/// # Example
/// ```
/// use dd_core::color::Color;
/// use dd_core::frame::PixelGrid;
/// use dd_palette::trim::trim_borders;
/// let k = Color::gray(0);
/// let w = Color::gray(255);
/// let grid = PixelGrid::from_rows(&[
///     vec![k, k, k, k],
///     vec![k, w, k, k],
///     vec![k, k, w, k],
///     vec![k, k, k, k],
/// ])
/// .unwrap();
/// let trimmed = trim_borders(&grid).unwrap();
/// assert_eq!((trimmed.width, trimmed.height), (2, 2));
/// ```
pub fn trim_borders(grid: &PixelGrid) -> Result<PixelGrid, DeditherError> {
    let empty = || DeditherError::EmptyContent {
        width: grid.width,
        height: grid.height,
    };
    if grid.is_empty() {
        return Err(empty());
    }

    let (top, bottom) = content_range(&row_signal(grid)).ok_or_else(empty)?;
    let rows = grid.crop(0, top as u32, grid.width, (bottom - top + 1) as u32)?;

    let (left, right) = content_range(&column_signal(&rows)).ok_or_else(empty)?;
    let trimmed = rows.crop(left as u32, 0, (right - left + 1) as u32, rows.height)?;

    log::info!(
        "Rognage : {}×{} → {}×{} (lignes {top}..={bottom}, colonnes {left}..={right})",
        grid.width,
        grid.height,
        trimmed.width,
        trimmed.height
    );
    Ok(trimmed)
}
