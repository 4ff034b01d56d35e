//! Settings file: the flattened `path=value` document.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use eyes_common::Settings;

/// Load settings. A missing or unparseable file is an error.
pub fn load(path: &Path) -> Result<Settings> {
    let text = fs::read_to_string(path).with_context(|| {
        format!(
            "reading {} (create it with --write-defaults)",
            path.display()
        )
    })?;
    Settings::from_flat(&text).map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))
}

/// Write settings, replacing the file atomically.
pub fn save(
    path: &Path,
    settings: &Settings,
) -> Result<()> {
    let mut document = String::new();
    settings.write_flat(&mut document)?;

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, document).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::env;

    use super::*;

    fn scratch(name: &str) -> std::path::PathBuf {
        env::temp_dir().join(format!("eyes-sim-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_save_then_load() {
        let path = scratch("round-trip.txt");
        let mut settings = Settings::default();
        settings.display.backlight = 40;

        save(&path, &settings).unwrap();
        let loaded = load(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load(&scratch("does-not-exist.txt")).unwrap_err();
        assert!(format!("{err:#}").contains("--write-defaults"));
    }

    #[test]
    fn test_bad_line_reports_line_number() {
        let path = scratch("bad.txt");
        fs::write(&path, "states.page=3\nstates.nope=1\n").unwrap();
        let err = load(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert!(err.to_string().contains("line 2"), "{err}");
    }
}
