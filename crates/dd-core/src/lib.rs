/// Types partagés, constantes et configuration pour dedither.
///
/// This crate holds the value types every stage exchanges: colors, pixel
/// and index grids, the error kinds and the optional TOML configuration.

pub mod color;
pub mod config;
pub mod error;
pub mod frame;

pub use color::{Color, DITHER_EPSILON, LUMA_WEIGHTS};
pub use config::{DeditherConfig, LoadOptions};
pub use error::DeditherError;
pub use frame::{ColorMode, IndexGrid, PixelGrid};
