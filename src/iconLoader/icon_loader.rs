use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Standard file names inside an installed midlet folder.
const MIDLET_ICON_FILE: &str = "icon.png";
const MIDLET_MANIFEST_FILE: &str = "MANIFEST.MF";
const MIDLET_RES_DIR: &str = "res";

/// Resolves an optional raster icon for an app locator. Failures are
/// swallowed; the bubble falls back to a glyph.
pub trait IconProvider {
    /// Returns the absolute path of the icon file, if one can be resolved.
    fn load_icon(&self, app_path: &str) -> Option<String>;
}

/// Filesystem resolver. Strategy, in order:
/// 1. `<appPath>/icon.png`
/// 2. `<appPath>/MANIFEST.MF` -> `<appPath>/res/<manifest icon>`
/// 3. none
pub struct FsIconProvider;

impl FsIconProvider {
    fn app_dir(app_path: &str) -> PathBuf {
        // Locators may carry a file:// prefix
        let trimmed = app_path.strip_prefix("file://").unwrap_or(app_path);
        PathBuf::from(trimmed)
    }

    fn icon_from_manifest(app_dir: &Path) -> Option<PathBuf> {
        let manifest_path = app_dir.join(MIDLET_MANIFEST_FILE);
        let text = std::fs::read_to_string(&manifest_path).ok()?;
        let manifest = parse_manifest(&text);

        let icon_name = manifest
            .get("MIDlet-Icon")
            .cloned()
            .or_else(|| {
                // MIDlet-1: Name, Icon, Class
                manifest
                    .get("MIDlet-1")
                    .and_then(|line| line.split(',').nth(1))
                    .map(|s| s.trim().to_string())
            })
            .filter(|name| !name.is_empty())?;

        Some(
            app_dir
                .join(MIDLET_RES_DIR)
                .join(icon_name.trim_start_matches('/')),
        )
    }
}

impl IconProvider for FsIconProvider {
    fn load_icon(&self, app_path: &str) -> Option<String> {
        let app_dir = Self::app_dir(app_path);

        let mut icon_file = app_dir.join(MIDLET_ICON_FILE);
        if !icon_file.exists() {
            match Self::icon_from_manifest(&app_dir) {
                Some(path) => icon_file = path,
                None => {
                    println!("[ICON] No icon entry for app at {}", app_path);
                    return None;
                }
            }
        }

        if icon_file.exists() {
            Some(icon_file.to_string_lossy().to_string())
        } else {
            println!("[ICON] Resolved icon missing on disk: {:?}", icon_file);
            None
        }
    }
}

/// Parse a JAR-style manifest: `Key: Value` lines, continuation lines start
/// with a single space and append to the previous value.
fn parse_manifest(text: &str) -> HashMap<String, String> {
    let mut map: HashMap<String, String> = HashMap::new();
    let mut last_key: Option<String> = None;

    for line in text.lines() {
        if let Some(rest) = line.strip_prefix(' ') {
            if let Some(key) = &last_key {
                if let Some(value) = map.get_mut(key) {
                    value.push_str(rest);
                }
            }
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim().to_string();
            map.insert(key.clone(), value.trim().to_string());
            last_key = Some(key);
        }
    }
    map
}
