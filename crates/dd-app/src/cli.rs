use std::path::PathBuf;

use clap::Parser;

/// dedither : retrouve la palette pure d'une image tramée horizontalement.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Images à traiter. `*` et `?` sont acceptés dans le nom de fichier.
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// Chemin de sortie (une seule image en entrée).
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Dossier des sorties nommées automatiquement.
    #[arg(long)]
    pub target_dir: Option<PathBuf>,

    /// Redimensionnement final, au format WxH.
    #[arg(long, value_parser = parse_dims)]
    pub size: Option<(u32, u32)>,

    /// Recadrage centré, au format WxH.
    #[arg(long, value_parser = parse_dims)]
    pub crop: Option<(u32, u32)>,

    /// Mode de couleur : l, la, rgb, rgba.
    #[arg(long)]
    pub mode: Option<String>,

    /// Fichier de configuration TOML (optionnel).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Analyse seule : palette et bascules, aucune écriture.
    #[arg(long, default_value_t = false)]
    pub analyze: bool,

    /// Logs détaillés (équivaut à --log-level info).
    #[arg(short, long, default_value_t = false, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Erreurs uniquement.
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Niveau effectif : `-v` et `-q` l'emportent sur `--log-level`.
    #[must_use]
    pub fn level_filter(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Info
        } else if self.quiet {
            log::LevelFilter::Error
        } else {
            self.log_level.parse().unwrap_or(log::LevelFilter::Warn)
        }
    }

    /// `--out` only makes sense for a single input.
    ///
    /// # Errors
    /// Returns an error if `--out` is combined with several inputs.
    pub fn validate_out(&self, inputs: usize) -> anyhow::Result<()> {
        if self.out.is_some() && inputs > 1 {
            anyhow::bail!("--out n'accepte qu'une seule image ({inputs} fournies).");
        }
        Ok(())
    }
}

/// Parse `WxH` (ou `WXH`) en `(w, h)`.
///
/// # Errors
/// Returns a message when the text is not two positive integers.
pub fn parse_dims(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("format attendu WxH, reçu '{s}'"))?;
    let w: u32 = w.trim().parse().map_err(|e| format!("largeur '{w}' : {e}"))?;
    let h: u32 = h.trim().parse().map_err(|e| format!("hauteur '{h}' : {e}"))?;
    if w == 0 || h == 0 {
        return Err(format!("dimensions nulles : {s}"));
    }
    Ok((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dims_parse() {
        assert_eq!(parse_dims("320x200"), Ok((320, 200)));
        assert_eq!(parse_dims("64X48"), Ok((64, 48)));
        assert!(parse_dims("320").is_err());
        assert!(parse_dims("0x10").is_err());
        assert!(parse_dims("ax10").is_err());
    }

    #[test]
    fn verbose_and_quiet_override_log_level() {
        let cli = Cli::parse_from(["dedither", "-v", "--log-level", "error", "a.png"]);
        assert_eq!(cli.level_filter(), log::LevelFilter::Info);
        let cli = Cli::parse_from(["dedither", "-q", "a.png"]);
        assert_eq!(cli.level_filter(), log::LevelFilter::Error);
        let cli = Cli::parse_from(["dedither", "--log-level", "debug", "a.png"]);
        assert_eq!(cli.level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn out_requires_single_input() {
        let cli = Cli::parse_from(["dedither", "-o", "x.png", "a.png", "b.png"]);
        assert!(cli.validate_out(cli.inputs.len()).is_err());
        let cli = Cli::parse_from(["dedither", "-o", "x.png", "a.png"]);
        assert!(cli.validate_out(1).is_ok());
    }

    #[test]
    fn size_flag_is_parsed() {
        let cli = Cli::parse_from(["dedither", "--size", "32x16", "--crop", "8x8", "a.png"]);
        assert_eq!(cli.size, Some((32, 16)));
        assert_eq!(cli.crop, Some((8, 8)));
        assert!(Cli::try_parse_from(["dedither", "--size", "32", "a.png"]).is_err());
    }
}
