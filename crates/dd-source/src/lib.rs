/// Entrées/sorties fichier pour dedither : chargement, recadrage,
/// redimensionnement et écriture atomique des grilles de pixels.

pub mod image;
pub mod resize;
pub mod writer;
