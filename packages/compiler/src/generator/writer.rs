//! Script file output.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{CompilerError, Result};
use crate::types::slugify;

/// File stem used when a scenario name has no letters or digits.
const FALLBACK_STEM: &str = "scenario";

/// File stem for a scenario: its slug, or a fallback for empty slugs.
#[must_use]
pub fn script_stem(scenario_name: &str) -> String {
    let slug = slugify(scenario_name);
    if slug.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        slug
    }
}

/// `<output_dir>/<slug>.js`
#[must_use]
pub fn script_path(output_dir: &Path, scenario_name: &str) -> PathBuf {
    output_dir.join(format!("{}.js", script_stem(scenario_name)))
}

/// Write a script, creating parent directories as needed.
///
/// Writes to a temp file, syncs it, then renames over the destination, so a
/// reader never sees a half-written script.
///
/// # Errors
/// Returns `GenerationIo` naming the path that could not be written.
pub fn save_script(path: &Path, content: &str) -> Result<()> {
    let io_err = |source: std::io::Error| CompilerError::GenerationIo {
        path: path.to_path_buf(),
        source,
    };

    let dir = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(dir).map_err(io_err)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| FALLBACK_STEM.to_string());
    let temp_file = dir.join(format!(".{file_name}.tmp"));

    {
        let mut file = File::create(&temp_file).map_err(io_err)?;
        file.write_all(content.as_bytes()).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
    }

    // On Windows, rename fails if the destination already exists
    #[cfg(target_os = "windows")]
    if path.exists() {
        fs::remove_file(path).map_err(io_err)?;
    }

    fs::rename(&temp_file, path).map_err(io_err)?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "wrote script");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_script_path_uses_slug() {
        let path = script_path(Path::new("generated"), "Búsqueda bajo carga [Load Test — Row 1]");
        assert_eq!(
            path,
            Path::new("generated").join("búsqueda-bajo-carga-load-test-row-1.js")
        );
    }

    #[test]
    fn test_script_stem_fallback() {
        assert_eq!(script_stem("!!!"), "scenario");
    }

    #[test]
    fn test_save_script_creates_directories() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("out").join("smoke.js");

        save_script(&path, "export default function () {}\n").unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "export default function () {}\n"
        );
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_save_script_overwrites() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("smoke.js");

        save_script(&path, "first").unwrap();
        save_script(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_save_script_reports_path_on_failure() {
        let temp_dir = tempdir().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();
        let path = blocker.join("smoke.js");

        let err = save_script(&path, "x").unwrap_err();
        assert!(matches!(err, CompilerError::GenerationIo { path: p, .. } if p == path));
    }
}
