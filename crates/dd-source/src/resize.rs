use anyhow::{Context, Result};
use dd_core::error::DeditherError;
use dd_core::frame::PixelGrid;
use fast_image_resize::images::Image;
use fast_image_resize::{PixelType, ResizeOptions, Resizer as FirResizer};

/// Type de pixel fast_image_resize correspondant à une profondeur 8 bits.
fn pixel_type(channels: usize) -> Result<PixelType> {
    match channels {
        1 => Ok(PixelType::U8),
        2 => Ok(PixelType::U8x2),
        3 => Ok(PixelType::U8x3),
        4 => Ok(PixelType::U8x4),
        depth => Err(DeditherError::UnsupportedDepth { depth }.into()),
    }
}

/// Resizer réutilisable wrappant fast_image_resize.
///
/// # Example
/// ```
/// use dd_source::resize::Resizer;
/// let r = Resizer::new();
/// ```
pub struct Resizer {
    inner: FirResizer,
    options: ResizeOptions,
    /// Scratch copy of the source (fast_image_resize wants `&mut` on it).
    src_buf: Vec<u8>,
}

impl Resizer {
    /// Create a new resizer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: FirResizer::new(),
            options: ResizeOptions::new(),
            src_buf: Vec::new(),
        }
    }

    /// Resize `src` into `dst`. Dimensions of `dst` determine output size.
    ///
    /// # Errors
    /// Returns an error if the depths differ or the resize operation fails.
    ///
    /// # Example
    /// ```
    /// use dd_source::resize::Resizer;
    /// use dd_core::frame::PixelGrid;
    /// let mut r = Resizer::new();
    /// let src = PixelGrid::new(100, 100, 3).unwrap();
    /// let mut dst = PixelGrid::new(50, 50, 3).unwrap();
    /// r.resize_into(&src, &mut dst).unwrap();
    /// ```
    pub fn resize_into(&mut self, src: &PixelGrid, dst: &mut PixelGrid) -> Result<()> {
        if src.channels != dst.channels {
            anyhow::bail!(
                "Profondeurs incompatibles : {} → {}",
                src.channels,
                dst.channels
            );
        }
        if src.width == dst.width && src.height == dst.height {
            dst.data.copy_from_slice(&src.data);
            return Ok(());
        }
        if src.is_empty() || dst.is_empty() {
            return Err(DeditherError::InvalidDimensions {
                width: dst.width,
                height: dst.height,
            }
            .into());
        }
        let kind = pixel_type(src.channels)?;

        self.src_buf.clear();
        self.src_buf.extend_from_slice(&src.data);

        let src_image = Image::from_slice_u8(src.width, src.height, &mut self.src_buf, kind)
            .context("Invalid source dimensions")?;
        let mut dst_image = Image::from_slice_u8(dst.width, dst.height, &mut dst.data, kind)
            .context("Invalid destination dimensions")?;

        self.inner
            .resize(&src_image, &mut dst_image, Some(&self.options))
            .context("Resize failed")?;

        Ok(())
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot resize to `width`×`height`, keeping the channel depth.
///
/// # Errors
/// Returns an error if the resize operation fails.
///
/// # Example
/// ```
/// use dd_source::resize::resize_grid;
/// use dd_core::frame::PixelGrid;
/// let src = PixelGrid::new(100, 100, 1).unwrap();
/// let dst = resize_grid(&src, 50, 20).unwrap();
/// assert_eq!((dst.width, dst.height, dst.channels), (50, 20, 1));
/// ```
pub fn resize_grid(src: &PixelGrid, width: u32, height: u32) -> Result<PixelGrid> {
    let mut dst = PixelGrid::new(width, height, src.channels)?;
    let mut resizer = Resizer::new();
    resizer.resize_into(src, &mut dst)?;
    Ok(dst)
}

/// Recadrage centré à `width`×`height`. Le décalage arrondit vers le haut-gauche.
///
/// # Errors
/// Returns `InvalidDimensions` if the crop is larger than the grid.
///
/// # Example
/// ```
/// use dd_source::resize::center_crop;
/// use dd_core::frame::PixelGrid;
/// let src = PixelGrid::from_raw(5, 1, 1, vec![0, 1, 2, 3, 4]).unwrap();
/// assert_eq!(center_crop(&src, 3, 1).unwrap().data, vec![1, 2, 3]);
/// ```
pub fn center_crop(src: &PixelGrid, width: u32, height: u32) -> Result<PixelGrid> {
    if width > src.width || height > src.height {
        return Err(DeditherError::InvalidDimensions { width, height }.into());
    }
    let x = (src.width - width) / 2;
    let y = (src.height - height) / 2;
    Ok(src.crop(x, y, width, height)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_size_is_a_copy() {
        let src = PixelGrid::from_raw(2, 1, 2, vec![1, 2, 3, 4]).unwrap();
        let dst = resize_grid(&src, 2, 1).unwrap();
        assert_eq!(dst, src);
    }

    #[test]
    fn uniform_grid_stays_uniform() {
        let src = PixelGrid::from_raw(4, 4, 3, vec![90; 48]).unwrap();
        let dst = resize_grid(&src, 2, 2).unwrap();
        assert!(dst.data.iter().all(|&v| v == 90));
    }

    #[test]
    fn oversized_crop_fails() {
        let src = PixelGrid::new(4, 4, 1).unwrap();
        let err = center_crop(&src, 5, 2).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DeditherError>(),
            Some(DeditherError::InvalidDimensions { width: 5, height: 2 })
        ));
    }

    #[test]
    fn depth_mismatch_fails() {
        let src = PixelGrid::new(4, 4, 1).unwrap();
        let mut dst = PixelGrid::new(2, 2, 3).unwrap();
        assert!(Resizer::new().resize_into(&src, &mut dst).is_err());
    }
}
