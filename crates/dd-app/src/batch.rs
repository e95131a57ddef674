use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use dd_core::config::{DeditherConfig, OutputPolicy};

use crate::pipeline;

/// `*` : n'importe quelle suite, `?` : un caractère.
#[must_use]
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let n: Vec<char> = name.chars().collect();
    let (mut pi, mut ni) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ni < n.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == n[ni]) {
            pi += 1;
            ni += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ni));
            pi += 1;
        } else if let Some((sp, sn)) = star {
            pi = sp + 1;
            ni = sn + 1;
            star = Some((sp, sn + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|&c| c == '*')
}

/// Développe les jokers du nom de fichier contre le contenu du dossier.
///
/// Les arguments sans joker passent tels quels. Les correspondances d'un
/// motif sont triées ; un motif sans correspondance est une erreur.
///
/// # Errors
/// Returns an error if a directory cannot be listed or a pattern matches nothing.
pub fn expand_inputs(args: &[String]) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for arg in args {
        let path = Path::new(arg);
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            inputs.push(path.to_path_buf());
            continue;
        };
        if !name.contains(['*', '?']) {
            inputs.push(path.to_path_buf());
            continue;
        }

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut found: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("Impossible de lister {}", dir.display()))?
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
            .filter(|e| e.file_name().to_str().is_some_and(|n| wildcard_match(name, n)))
            .map(|e| dir.join(e.file_name()))
            .collect();
        if found.is_empty() {
            anyhow::bail!("Aucun fichier ne correspond à '{arg}'");
        }
        found.sort();
        log::debug!("'{arg}' → {} fichiers", found.len());
        inputs.extend(found);
    }
    Ok(inputs)
}

/// `<stem><suffix>.<format>` à côté de l'entrée, ou dans `target_dir`.
#[must_use]
pub fn output_path(input: &Path, policy: &OutputPolicy) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    let name = format!("{stem}{}.{}", policy.suffix, policy.format);
    match &policy.target_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

/// Traite les entrées une par une ; la première erreur interrompt le lot.
///
/// # Errors
/// Returns the first pipeline failure, or an error if the target directory
/// cannot be created.
pub fn run_batch(
    inputs: &[PathBuf],
    config: &DeditherConfig,
    explicit_out: Option<&Path>,
    analyze: bool,
) -> Result<()> {
    let start = Instant::now();

    if !analyze && let Some(dir) = &config.output.target_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Impossible de créer {}", dir.display()))?;
    }

    for (i, input) in inputs.iter().enumerate() {
        log::info!("({}/{}) {}", i + 1, inputs.len(), input.display());
        if analyze {
            let outcome = pipeline::run(input, &config.input, None)?;
            print!("{}", pipeline::report(input, &outcome));
        } else {
            let output = explicit_out.map_or_else(
                || output_path(input, &config.output),
                Path::to_path_buf,
            );
            pipeline::run(input, &config.input, Some(&output))?;
        }
    }

    log::info!(
        "{} image(s) traitée(s) en {:.2?}",
        inputs.len(),
        start.elapsed()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dd_core::color::Color;
    use dd_core::frame::PixelGrid;
    use dd_source::writer::write_grid;

    fn sample() -> PixelGrid {
        let (k, g, w) = (Color::gray(0), Color::gray(128), Color::gray(255));
        PixelGrid::from_rows(&[vec![k, k, k, g, w, w, w], vec![w, w, w, g, k, k, k]]).unwrap()
    }

    #[test]
    fn wildcards() {
        assert!(wildcard_match("*.png", "a.png"));
        assert!(wildcard_match("*.png", ".png"));
        assert!(!wildcard_match("*.png", "a.gif"));
        assert!(wildcard_match("pic_??.gif", "pic_01.gif"));
        assert!(!wildcard_match("pic_??.gif", "pic_1.gif"));
        assert!(wildcard_match("a*b*c", "aXXbYbc"));
        assert!(wildcard_match("*", ""));
        assert!(!wildcard_match("?", ""));
    }

    #[test]
    fn derived_output_names() {
        let policy = OutputPolicy::default();
        assert_eq!(
            output_path(Path::new("art/pic.gif"), &policy),
            Path::new("art/pic_dedithered.png")
        );
        let policy = OutputPolicy {
            suffix: "-clean".into(),
            format: "bmp".into(),
            target_dir: Some(PathBuf::from("out")),
        };
        assert_eq!(
            output_path(Path::new("art/pic.gif"), &policy),
            Path::new("out/pic-clean.bmp")
        );
    }

    #[test]
    fn expansion_is_sorted_and_literal_paths_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.png", "c.gif"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let pattern = dir.path().join("*.png").display().to_string();
        let literal = "missing.png".to_string();
        let found = expand_inputs(&[pattern, literal]).unwrap();
        assert_eq!(
            found,
            vec![
                dir.path().join("a.png"),
                dir.path().join("b.png"),
                PathBuf::from("missing.png"),
            ]
        );
    }

    #[test]
    fn unmatched_pattern_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = dir.path().join("*.tiff").display().to_string();
        assert!(expand_inputs(&[pattern]).is_err());
    }

    #[test]
    fn batch_stops_at_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("a.png");
        let flat = dir.path().join("b.png");
        let last = dir.path().join("c.png");
        write_grid(&sample(), &good).unwrap();
        let uniform = PixelGrid::from_rows(&vec![vec![Color::gray(128); 4]; 4]).unwrap();
        write_grid(&uniform, &flat).unwrap();
        write_grid(&sample(), &last).unwrap();

        let config = DeditherConfig::default();
        let result = run_batch(&[good, flat, last], &config, None, false);
        assert!(result.is_err());
        assert!(dir.path().join("a_dedithered.png").exists());
        assert!(!dir.path().join("b_dedithered.png").exists());
        assert!(!dir.path().join("c_dedithered.png").exists());
    }

    #[test]
    fn target_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("pic.png");
        write_grid(&sample(), &input).unwrap();

        let mut config = DeditherConfig::default();
        config.output.target_dir = Some(dir.path().join("out"));
        run_batch(&[input], &config, None, false).unwrap();
        assert!(dir.path().join("out/pic_dedithered.png").exists());
    }
}
