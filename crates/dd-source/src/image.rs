use std::path::Path;

use anyhow::{Context, Result};
use dd_core::config::LoadOptions;
use dd_core::error::DeditherError;
use dd_core::frame::{ColorMode, PixelGrid};
use image::{DynamicImage, ExtendedColorType, ImageDecoder, ImageFormat, ImageReader};

use crate::resize::{center_crop, resize_grid};

/// Charge une image et la convertit en grille de pixels 8 bits.
///
/// Les sources indexées (GIF, PNG à palette) sont ramenées en RGB avant
/// toute option, transparence comprise. Ensuite, dans l'ordre : conversion vers
/// `opts.mode`, recadrage centré `opts.crop`, redimensionnement `opts.size`.
///
/// # Errors
/// `Io` if the file cannot be opened or decoded, `UnsupportedMode` if the
/// decoded mode is not 8-bit L, LA, RGB or RGBA and no target mode was
/// requested, `InvalidDimensions` for an oversized crop.
///
/// # Example
/// ```no_run
/// use dd_source::image::load_grid;
/// use dd_core::config::LoadOptions;
/// use std::path::Path;
/// let grid = load_grid(Path::new("dithered.png"), &LoadOptions::default()).unwrap();
/// ```
pub fn load_grid(path: &Path, opts: &LoadOptions) -> Result<PixelGrid> {
    let (img, indexed) = decode(path)?;
    log::debug!(
        "{} : {}×{} {:?}{}",
        path.display(),
        img.width(),
        img.height(),
        img.color(),
        if indexed { " (indexée)" } else { "" }
    );

    let img = if indexed {
        convert_mode(img, ColorMode::Rgb)
    } else {
        img
    };
    let img = match opts.mode {
        Some(mode) => convert_mode(img, mode),
        None => img,
    };
    let mut grid = grid_from_image(img)?;

    if let Some((w, h)) = opts.crop {
        grid = center_crop(&grid, w, h)
            .with_context(|| format!("Recadrage {w}×{h} impossible"))?;
    }
    if let Some((w, h)) = opts.size {
        grid = resize_grid(&grid, w, h)
            .with_context(|| format!("Redimensionnement {w}×{h} impossible"))?;
    }
    Ok(grid)
}

/// Décode `path` et indique si la source était à palette.
///
/// Le décodeur GIF livre toujours du RGBA ; le PNG indexé se signale par
/// un type de couleur d'origine inconnu.
fn decode(path: &Path) -> Result<(DynamicImage, bool)> {
    let shown = path.display().to_string();
    let reader = ImageReader::open(path)
        .map_err(|e| DeditherError::io(shown.clone(), e))?
        .with_guessed_format()
        .map_err(|e| DeditherError::io(shown.clone(), e))?;
    let gif = reader.format() == Some(ImageFormat::Gif);
    let decoder = reader
        .into_decoder()
        .map_err(|e| DeditherError::io(shown.clone(), e))?;
    let indexed = gif || matches!(decoder.original_color_type(), ExtendedColorType::Unknown(_));
    let img = DynamicImage::from_decoder(decoder).map_err(|e| DeditherError::io(shown, e))?;
    Ok((img, indexed))
}

/// Convertit vers le mode demandé, échantillons ramenés à 8 bits.
#[must_use]
pub fn convert_mode(img: DynamicImage, mode: ColorMode) -> DynamicImage {
    match mode {
        ColorMode::L => DynamicImage::ImageLuma8(img.into_luma8()),
        ColorMode::La => DynamicImage::ImageLumaA8(img.into_luma_alpha8()),
        ColorMode::Rgb => DynamicImage::ImageRgb8(img.into_rgb8()),
        ColorMode::Rgba => DynamicImage::ImageRgba8(img.into_rgba8()),
    }
}

/// Wrap a decoded 8-bit image as a grid without copying its samples.
///
/// # Errors
/// Returns `UnsupportedMode` for 16-bit and float images.
///
/// # Example
/// ```
/// use dd_source::image::grid_from_image;
/// use image::{DynamicImage, GrayImage};
/// let grid = grid_from_image(DynamicImage::ImageLuma8(GrayImage::new(3, 2))).unwrap();
/// assert_eq!((grid.width, grid.height, grid.channels), (3, 2, 1));
/// ```
pub fn grid_from_image(img: DynamicImage) -> Result<PixelGrid> {
    let (width, height) = (img.width(), img.height());
    let (channels, data) = match img {
        DynamicImage::ImageLuma8(buf) => (1, buf.into_raw()),
        DynamicImage::ImageLumaA8(buf) => (2, buf.into_raw()),
        DynamicImage::ImageRgb8(buf) => (3, buf.into_raw()),
        DynamicImage::ImageRgba8(buf) => (4, buf.into_raw()),
        other => {
            return Err(DeditherError::UnsupportedMode {
                mode: format!("{:?}", other.color()),
            }
            .into());
        }
    };
    Ok(PixelGrid::from_raw(width, height, channels, data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn sixteen_bit_without_mode_is_unsupported() {
        let img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::new(2, 2);
        let err = grid_from_image(DynamicImage::ImageLuma16(img)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DeditherError>(),
            Some(DeditherError::UnsupportedMode { .. })
        ));
    }

    #[test]
    fn sixteen_bit_with_mode_is_converted() {
        let img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_pixel(2, 2, Luma([65535]));
        let grid = grid_from_image(convert_mode(DynamicImage::ImageLuma16(img), ColorMode::Rgb))
            .unwrap();
        assert_eq!(grid.channels, 3);
        assert!(grid.data.iter().all(|&v| v == 255));
    }

    #[test]
    fn rgb_samples_keep_layout() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(1, 0, Rgb([10, 20, 30]));
        let grid = grid_from_image(DynamicImage::ImageRgb8(img)).unwrap();
        assert_eq!(grid.pixel(1, 0), &[10, 20, 30]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_grid(Path::new("/nonexistent/nope.png"), &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DeditherError>(),
            Some(DeditherError::Io { .. })
        ));
    }

    #[test]
    fn gif_loads_as_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.gif");
        let mut img = RgbImage::new(4, 2);
        img.put_pixel(1, 0, Rgb([255, 255, 255]));
        img.save(&path).unwrap();

        let grid = load_grid(&path, &LoadOptions::default()).unwrap();
        assert_eq!(grid.channels, 3);
        assert_eq!((grid.width, grid.height), (4, 2));
        assert_eq!(grid.pixel(1, 0), &[255, 255, 255]);
        assert_eq!(grid.pixel(0, 0), &[0, 0, 0]);
    }

    #[test]
    fn gif_with_requested_mode_uses_that_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.gif");
        RgbImage::new(3, 3).save(&path).unwrap();
        let opts = LoadOptions {
            mode: Some(ColorMode::L),
            ..LoadOptions::default()
        };
        assert_eq!(load_grid(&path, &opts).unwrap().channels, 1);
    }

    #[test]
    fn truecolor_png_keeps_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 40])).save(&path).unwrap();
        let grid = load_grid(&path, &LoadOptions::default()).unwrap();
        assert_eq!(grid.channels, 4);
        assert_eq!(grid.pixel(0, 0), &[10, 20, 30, 40]);
    }
}
