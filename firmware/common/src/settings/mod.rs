//! Typed settings tree.
//!
//! Every persisted value lives here. The tree has fixed sections (`states`,
//! `display`, `motions` and the three banner formats) plus an open `skins`
//! section mapping skin name to option name to [`Value`].
//!
//! The wire and storage form is the dotted-path flattening produced by
//! [`Settings::leaves`]: one `path=json` line per leaf, e.g.
//!
//! ```text
//! states.page=3
//! motions.left_point=[50, 120]
//! skins.simple.bg_color="#000000"
//! ```
//!
//! Loading applies such lines over [`Settings::default`].

mod flat;
mod value;

use core::fmt;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::Point;
use heapless::LinearMap;

pub use self::flat::{Leaf, Leaves, PATH_LEN, Path, Scope, write_prefixed};
pub use self::value::{KEY_LEN, Key, LIST_LEN, TEXT_LEN, Text, Value, key, parse_digits, parse_int, text};
use crate::colors::color_or_black;
use crate::config::MAX_BACKLIGHT;
use crate::motion::MotionMode;
use crate::state::{PageSelection, VisualPage};

/// Most skins the tree can hold.
pub const MAX_SKINS: usize = 6;
/// Most options per skin.
pub const MAX_OPTIONS: usize = 8;

/// Options of one skin.
pub type SkinOptions = LinearMap<Key, Value, MAX_OPTIONS>;
/// All skins by name.
pub type Skins = LinearMap<Key, SkinOptions, MAX_SKINS>;

// =============================================================================
// Errors
// =============================================================================

/// Reason a settings path or value was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// The path names no leaf of the tree.
    UnknownPath,
    /// The value has the wrong shape for the leaf (e.g. text for a number).
    TypeMismatch,
    /// The value could not be parsed or is out of range.
    BadValue,
    /// A fixed-capacity string, list or map is full.
    Capacity,
    /// A line has no `=` separator.
    MalformedLine,
}

impl fmt::Display for SettingsError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::UnknownPath => write!(f, "unknown settings path"),
            Self::TypeMismatch => write!(f, "value has the wrong type"),
            Self::BadValue => write!(f, "value could not be parsed"),
            Self::Capacity => write!(f, "value exceeds capacity"),
            Self::MalformedLine => write!(f, "expected path=value"),
        }
    }
}

/// A settings document failed to load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoadError {
    /// One-based line number.
    pub line: usize,
    pub error: SettingsError,
}

impl fmt::Display for LoadError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.error)
    }
}

// =============================================================================
// Sections
// =============================================================================

/// `states` section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct States {
    pub page: PageSelection,
    pub motion: MotionMode,
    /// Code shown by the error banner.
    pub error: u32,
}

/// `display` section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplaySettings {
    /// SPI clock of both panels in Hz.
    pub speed: u32,
    /// Backlight percentage (0-100).
    pub backlight: u8,
}

/// `motions` section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotionSettings {
    /// Sweep speed; clamped to 0-100 when used.
    pub speed: u32,
    pub left_point: Point,
    pub right_point: Point,
    pub center_point: Point,
    /// Manual target position.
    pub pos: Point,
}

/// Styling shared by the text banners.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BannerFormat {
    pub color: Text,
    pub bg_color: Text,
    /// Inset of the inner rectangle in pixels.
    pub border: u32,
    /// Font family: `profont` or `mono`.
    pub font: Text,
    pub font_size: u32,
    pub text: Text,
}

/// `logo_format` section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogoFormat {
    pub color: Text,
    pub bg_color: Text,
    pub text: Text,
    pub font: Text,
    pub font_size: u32,
    /// Time spent on the logo before waiting for the handshake (ms).
    pub duration: u32,
}

/// `error_format` section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorFormat {
    /// `text` may contain `{}`, replaced by the error code.
    pub banner: BannerFormat,
    /// Interval between border toggles (ms).
    pub flash_speed: u32,
}

/// The whole settings tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub states: States,
    pub display: DisplaySettings,
    pub motions: MotionSettings,
    pub skins: Skins,
    pub logo_format: LogoFormat,
    pub loading_format: BannerFormat,
    pub error_format: ErrorFormat,
}

// =============================================================================
// Defaults
// =============================================================================

/// Text for a built-in default; every literal below fits in [`TEXT_LEN`].
fn default_text(raw: &str) -> Text { text(raw).unwrap_or_default() }

fn default_options(entries: &[(&str, Value)]) -> SkinOptions {
    let mut options = SkinOptions::new();
    for (name, value) in entries {
        if let Ok(name) = key(name) {
            options.insert(name, value.clone()).ok();
        }
    }
    options
}

fn default_skins() -> Skins {
    let mut skins = Skins::new();
    let mut add = |name: &str, options: SkinOptions| {
        if let Ok(name) = key(name) {
            skins.insert(name, options).ok();
        }
    };

    add(
        "simple",
        default_options(&[
            ("bg_color", Value::Text(default_text("#000000"))),
            ("iris_color", Value::Text(default_text("#1e90ff"))),
            ("iris_size", Value::Int(110)),
            ("pupil_color", Value::Text(default_text("#000000"))),
            ("pupil_size", Value::Int(44)),
            ("pupil_offset", point_value(Point::zero())),
        ]),
    );
    add(
        "metal",
        default_options(&[
            ("bg_color", Value::Text(default_text("#000000"))),
            ("iris_size", Value::Int(120)),
            ("tint", Value::Int(0)),
        ]),
    );
    add(
        "neon",
        default_options(&[
            ("bg_color", Value::Text(default_text("#000000"))),
            ("iris_size", Value::Int(150)),
            ("style", Value::Text(default_text("ring"))),
            ("fg_color_start", Value::Text(default_text("#00ffff"))),
            ("fg_color_end", Value::Text(default_text("#ff00ff"))),
        ]),
    );

    skins
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            states: States {
                page: PageSelection::Visual(VisualPage::EyeSimple),
                motion: MotionMode::LeftRight,
                error: 0,
            },
            display: DisplaySettings {
                speed: 62_500_000,
                backlight: 100,
            },
            motions: MotionSettings {
                speed: 50,
                left_point: Point::new(60, 120),
                right_point: Point::new(180, 120),
                center_point: Point::new(120, 120),
                pos: Point::new(120, 120),
            },
            skins: default_skins(),
            logo_format: LogoFormat {
                color: default_text("#ffffff"),
                bg_color: default_text("#000000"),
                text: default_text("ROBOT EYES"),
                font: default_text("profont"),
                font_size: 18,
                duration: 3000,
            },
            loading_format: BannerFormat {
                color: default_text("#ffffff"),
                bg_color: default_text("#000000"),
                border: 6,
                font: default_text("profont"),
                font_size: 18,
                text: default_text("Waiting for host"),
            },
            error_format: ErrorFormat {
                banner: BannerFormat {
                    color: default_text("#ff0000"),
                    bg_color: default_text("#000000"),
                    border: 10,
                    font: default_text("profont"),
                    font_size: 24,
                    text: default_text("ERROR {}"),
                },
                flash_speed: 500,
            },
        }
    }
}

// =============================================================================
// Leaf access
// =============================================================================

/// Find an entry of a name-keyed map.
pub fn lookup<'m, V, const N: usize>(
    map: &'m LinearMap<Key, V, N>,
    name: &str,
) -> Option<&'m V> {
    map.iter().find(|(k, _)| k.as_str() == name).map(|(_, v)| v)
}

/// Find an entry of a name-keyed map for mutation.
pub fn lookup_mut<'m, V, const N: usize>(
    map: &'m mut LinearMap<Key, V, N>,
    name: &str,
) -> Option<&'m mut V> {
    map.iter_mut().find(|(k, _)| k.as_str() == name).map(|(_, v)| v)
}

fn uint(value: &Value) -> Result<u32, SettingsError> {
    match value {
        Value::Int(n) => u32::try_from(*n).map_err(|_| SettingsError::BadValue),
        _ => Err(SettingsError::TypeMismatch),
    }
}

// Every u32 leaf is written through `uint`, so it fits an `i32`.
fn int_value(n: u32) -> Value { Value::Int(n.min(i32::MAX as u32) as i32) }

fn point(value: &Value) -> Result<Point, SettingsError> {
    match value.as_list() {
        Some(&[x, y]) => Ok(Point::new(x, y)),
        Some(_) => Err(SettingsError::BadValue),
        None => Err(SettingsError::TypeMismatch),
    }
}

fn point_value(p: Point) -> Value { Value::List(heapless::Vec::from_slice(&[p.x, p.y]).unwrap_or_default()) }

fn owned_text(value: Value) -> Result<Text, SettingsError> {
    match value {
        Value::Text(t) => Ok(t),
        _ => Err(SettingsError::TypeMismatch),
    }
}

impl BannerFormat {
    fn get(
        &self,
        field: &str,
    ) -> Option<Value> {
        Some(match field {
            "color" => Value::Text(self.color.clone()),
            "bg_color" => Value::Text(self.bg_color.clone()),
            "border" => int_value(self.border),
            "font" => Value::Text(self.font.clone()),
            "font_size" => int_value(self.font_size),
            "text" => Value::Text(self.text.clone()),
            _ => return None,
        })
    }

    fn set(
        &mut self,
        field: &str,
        value: Value,
    ) -> Result<(), SettingsError> {
        match field {
            "color" => self.color = owned_text(value)?,
            "bg_color" => self.bg_color = owned_text(value)?,
            "border" => self.border = uint(&value)?,
            "font" => self.font = owned_text(value)?,
            "font_size" => self.font_size = uint(&value)?,
            "text" => self.text = owned_text(value)?,
            _ => return Err(SettingsError::UnknownPath),
        }
        Ok(())
    }
}

impl LogoFormat {
    fn get(
        &self,
        field: &str,
    ) -> Option<Value> {
        Some(match field {
            "color" => Value::Text(self.color.clone()),
            "bg_color" => Value::Text(self.bg_color.clone()),
            "text" => Value::Text(self.text.clone()),
            "font" => Value::Text(self.font.clone()),
            "font_size" => int_value(self.font_size),
            "duration" => int_value(self.duration),
            _ => return None,
        })
    }

    fn set(
        &mut self,
        field: &str,
        value: Value,
    ) -> Result<(), SettingsError> {
        match field {
            "color" => self.color = owned_text(value)?,
            "bg_color" => self.bg_color = owned_text(value)?,
            "text" => self.text = owned_text(value)?,
            "font" => self.font = owned_text(value)?,
            "font_size" => self.font_size = uint(&value)?,
            "duration" => self.duration = uint(&value)?,
            _ => return Err(SettingsError::UnknownPath),
        }
        Ok(())
    }
}

impl Settings {
    /// Value of the leaf at a dotted path.
    pub fn get(
        &self,
        path: &str,
    ) -> Option<Value> {
        let (section, rest) = path.split_once('.')?;
        match section {
            "states" => Some(match rest {
                "page" => int_value(self.states.page.index()),
                "motion" => int_value(self.states.motion.index()),
                "error" => int_value(self.states.error),
                _ => return None,
            }),
            "display" => Some(match rest {
                "speed" => int_value(self.display.speed),
                "backlight" => int_value(u32::from(self.display.backlight)),
                _ => return None,
            }),
            "motions" => Some(match rest {
                "speed" => int_value(self.motions.speed),
                "left_point" => point_value(self.motions.left_point),
                "right_point" => point_value(self.motions.right_point),
                "center_point" => point_value(self.motions.center_point),
                "pos" => point_value(self.motions.pos),
                _ => return None,
            }),
            "skins" => {
                let (skin, option) = rest.split_once('.')?;
                lookup(lookup(&self.skins, skin)?, option).cloned()
            }
            "logo_format" => self.logo_format.get(rest),
            "loading_format" => self.loading_format.get(rest),
            "error_format" => match rest {
                "flash_speed" => Some(int_value(self.error_format.flash_speed)),
                field => self.error_format.banner.get(field),
            },
            _ => None,
        }
    }

    /// Replace the leaf at a dotted path.
    ///
    /// This is the storage path: `skins.<skin>.<option>` may create a new
    /// skin or option. The command channel goes through
    /// [`crate::commands::dispatch`] instead, which never creates entries.
    pub fn set(
        &mut self,
        path: &str,
        value: Value,
    ) -> Result<(), SettingsError> {
        let (section, rest) = path.split_once('.').ok_or(SettingsError::UnknownPath)?;
        match section {
            "states" => match rest {
                "page" => self.states.page = PageSelection::from_index_clamped(uint(&value)?),
                "motion" => {
                    self.states.motion = MotionMode::from_index(uint(&value)?).ok_or(SettingsError::BadValue)?;
                }
                "error" => self.states.error = uint(&value)?,
                _ => return Err(SettingsError::UnknownPath),
            },
            "display" => match rest {
                "speed" => self.display.speed = uint(&value)?,
                "backlight" => self.display.backlight = uint(&value)?.min(u32::from(MAX_BACKLIGHT)) as u8,
                _ => return Err(SettingsError::UnknownPath),
            },
            "motions" => match rest {
                "speed" => self.motions.speed = uint(&value)?,
                "left_point" => self.motions.left_point = point(&value)?,
                "right_point" => self.motions.right_point = point(&value)?,
                "center_point" => self.motions.center_point = point(&value)?,
                "pos" => self.motions.pos = point(&value)?,
                _ => return Err(SettingsError::UnknownPath),
            },
            "skins" => {
                let (skin, option) = rest.split_once('.').ok_or(SettingsError::UnknownPath)?;
                if option.contains('.') {
                    return Err(SettingsError::UnknownPath);
                }
                self.store_skin_option(skin, option, value)?;
            }
            "logo_format" => self.logo_format.set(rest, value)?,
            "loading_format" => self.loading_format.set(rest, value)?,
            "error_format" => match rest {
                "flash_speed" => self.error_format.flash_speed = uint(&value)?,
                field => self.error_format.banner.set(field, value)?,
            },
            _ => return Err(SettingsError::UnknownPath),
        }
        Ok(())
    }

    fn store_skin_option(
        &mut self,
        skin: &str,
        option: &str,
        value: Value,
    ) -> Result<(), SettingsError> {
        if lookup(&self.skins, skin).is_none() {
            self.skins
                .insert(key(skin)?, SkinOptions::new())
                .map_err(|_| SettingsError::Capacity)?;
        }
        let options = lookup_mut(&mut self.skins, skin).ok_or(SettingsError::UnknownPath)?;
        match lookup_mut(options, option) {
            Some(slot) => *slot = value,
            None => {
                options.insert(key(option)?, value).map_err(|_| SettingsError::Capacity)?;
            }
        }
        Ok(())
    }

    /// Read-only view of one skin's options.
    pub fn skin(
        &self,
        name: &str,
    ) -> SkinView<'_> {
        SkinView {
            options: lookup(&self.skins, name),
        }
    }

    // =========================================================================
    // Flattened form
    // =========================================================================

    /// Iterate over every leaf in dump order.
    pub fn leaves(
        &self,
        scope: Scope,
    ) -> Leaves<'_> {
        Leaves::new(self, scope)
    }

    /// Apply one `path=json` line.
    pub fn apply_line(
        &mut self,
        line: &str,
    ) -> Result<(), SettingsError> {
        let (path, raw) = line.split_once('=').ok_or(SettingsError::MalformedLine)?;
        let value = Value::parse_json(raw)?;
        self.set(path.trim(), value)
    }

    /// Apply a whole document. Blank lines and `#` comments are skipped.
    pub fn apply_flat(
        &mut self,
        document: &str,
    ) -> Result<(), LoadError> {
        for (index, line) in document.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            self.apply_line(line).map_err(|error| LoadError { line: index + 1, error })?;
        }
        Ok(())
    }

    /// Defaults overlaid with a document.
    pub fn from_flat(document: &str) -> Result<Self, LoadError> {
        let mut settings = Self::default();
        settings.apply_flat(document)?;
        Ok(settings)
    }

    /// Write every leaf as one `path=json` line.
    pub fn write_flat<W: fmt::Write>(
        &self,
        out: &mut W,
    ) -> fmt::Result {
        for leaf in self.leaves(Scope::Full) {
            writeln!(out, "{leaf}")?;
        }
        Ok(())
    }
}

// =============================================================================
// Skin view
// =============================================================================

/// Typed accessors over one skin's options with renderer-friendly fallbacks.
#[derive(Clone, Copy, Debug)]
pub struct SkinView<'a> {
    options: Option<&'a SkinOptions>,
}

impl<'a> SkinView<'a> {
    /// `true` if the skin exists.
    pub const fn exists(&self) -> bool { self.options.is_some() }

    pub fn value(
        &self,
        option: &str,
    ) -> Option<&'a Value> {
        lookup(self.options?, option)
    }

    /// Integer option, `default` if missing or not an integer.
    pub fn int(
        &self,
        option: &str,
        default: i32,
    ) -> i32 {
        self.value(option).and_then(Value::as_int).unwrap_or(default)
    }

    pub fn text(
        &self,
        option: &str,
    ) -> Option<&'a str> {
        self.value(option).and_then(Value::as_text)
    }

    /// Color option; missing or unparseable colors are black.
    pub fn color(
        &self,
        option: &str,
    ) -> Rgb888 {
        self.text(option).map_or(crate::colors::BLACK, color_or_black)
    }

    /// Two-element list option as a point.
    pub fn point(
        &self,
        option: &str,
    ) -> Option<Point> {
        self.value(option).and_then(|v| point(v).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_have_expected_skins() {
        let settings = Settings::default();
        for name in ["simple", "metal", "neon"] {
            assert!(settings.skin(name).exists(), "{name}");
        }
        assert_eq!(settings.skin("simple").int("iris_size", 0), 110);
        assert!(settings.skin("simple").value("pupil_offset").unwrap().is_list());
    }

    #[test]
    fn test_get_set_fixed_paths() {
        let mut settings = Settings::default();
        settings.set("states.error", Value::Int(42)).unwrap();
        assert_eq!(settings.get("states.error"), Some(Value::Int(42)));

        settings.set("motions.pos", Value::parse_json("[10, 20]").unwrap()).unwrap();
        assert_eq!(settings.motions.pos, Point::new(10, 20));

        settings.set("error_format.flash_speed", Value::Int(250)).unwrap();
        assert_eq!(settings.error_format.flash_speed, 250);
        settings.set("error_format.text", Value::Text(text("E{}").unwrap())).unwrap();
        assert_eq!(settings.error_format.banner.text.as_str(), "E{}");
    }

    #[test]
    fn test_set_rejects_bad_paths_and_types() {
        let mut settings = Settings::default();
        assert_eq!(settings.set("states.nope", Value::Int(1)), Err(SettingsError::UnknownPath));
        assert_eq!(settings.set("nothing", Value::Int(1)), Err(SettingsError::UnknownPath));
        assert_eq!(
            settings.set("states.page", Value::Text(text("x").unwrap())),
            Err(SettingsError::TypeMismatch)
        );
        assert_eq!(settings.set("states.motion", Value::Int(9)), Err(SettingsError::BadValue));
        assert_eq!(
            settings.set("motions.pos", Value::parse_json("[1, 2, 3]").unwrap()),
            Err(SettingsError::BadValue)
        );
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_store_may_create_skin_options() {
        let mut settings = Settings::default();
        settings.set("skins.custom.glow", Value::Int(3)).unwrap();
        assert_eq!(settings.skin("custom").int("glow", 0), 3);
    }

    #[test]
    fn test_apply_flat_reports_line() {
        let document = "states.page=4\n\n# comment\nmotions.speed=nope\n";
        let err = Settings::from_flat(document).unwrap_err();
        assert_eq!(err, LoadError { line: 4, error: SettingsError::BadValue });

        let err = Settings::from_flat("states.page 4").unwrap_err();
        assert_eq!(err.error, SettingsError::MalformedLine);
    }

    #[test]
    fn test_skin_view_fallbacks() {
        let settings = Settings::default();
        let missing = settings.skin("missing");
        assert!(!missing.exists());
        assert_eq!(missing.int("iris_size", 7), 7);
        assert_eq!(missing.color("bg_color"), crate::colors::BLACK);
        // Lists are not integers
        assert_eq!(settings.skin("simple").int("pupil_offset", -1), -1);
        assert_eq!(settings.skin("simple").point("pupil_offset"), Some(Point::zero()));
    }
}
