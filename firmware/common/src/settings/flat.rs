//! Dotted-path flattening of the settings tree.

use core::fmt::{self, Write as _};

use heapless::String;

use super::{Settings, Value};

/// Longest dotted path (`skins.` + key + `.` + key fits with room to spare).
pub const PATH_LEN: usize = 48;

/// Dotted path of a leaf.
pub type Path = String<PATH_LEN>;

/// Which leaves to visit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Scope {
    /// Every leaf; used for storage.
    Full,
    /// Everything but `error_format`; used for the settings dumps sent to the host.
    Dump,
}

/// One flattened leaf. Displays as `path=json`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Leaf {
    pub path: Path,
    pub value: Value,
}

impl fmt::Display for Leaf {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}={}", self.path, self.value)
    }
}

const HEAD_PATHS: [&str; 10] = [
    "states.page",
    "states.motion",
    "states.error",
    "display.speed",
    "display.backlight",
    "motions.speed",
    "motions.left_point",
    "motions.right_point",
    "motions.center_point",
    "motions.pos",
];

const FORMAT_SECTIONS: [(&str, &[&str]); 3] = [
    ("logo_format", &["color", "bg_color", "text", "font", "font_size", "duration"]),
    ("loading_format", &["color", "bg_color", "border", "font", "font_size", "text"]),
    (
        "error_format",
        &["color", "bg_color", "border", "font", "font_size", "text", "flash_speed"],
    ),
];

/// Sections visited by [`Scope::Dump`] (all but `error_format`).
const DUMP_FORMAT_SECTIONS: usize = 2;

#[derive(Clone, Copy, Debug)]
enum Stage {
    Head(usize),
    Skins { skin: usize, option: usize },
    Formats { section: usize, field: usize },
    Done,
}

/// Iterator over the leaves of a [`Settings`] tree.
///
/// Order: `states`, `display`, `motions`, every skin in insertion order, then
/// the banner formats.
pub struct Leaves<'a> {
    settings: &'a Settings,
    scope: Scope,
    stage: Stage,
}

impl<'a> Leaves<'a> {
    pub(super) fn new(
        settings: &'a Settings,
        scope: Scope,
    ) -> Self {
        Self {
            settings,
            scope,
            stage: Stage::Head(0),
        }
    }

    fn section_limit(&self) -> usize {
        match self.scope {
            Scope::Full => FORMAT_SECTIONS.len(),
            Scope::Dump => DUMP_FORMAT_SECTIONS,
        }
    }

    fn leaf(
        &self,
        parts: &[&str],
    ) -> Option<Leaf> {
        let mut path = Path::new();
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                path.push('.').ok()?;
            }
            path.push_str(part).ok()?;
        }
        let value = self.settings.get(&path)?;
        Some(Leaf { path, value })
    }
}

impl Iterator for Leaves<'_> {
    type Item = Leaf;

    fn next(&mut self) -> Option<Leaf> {
        let settings = self.settings;
        loop {
            match self.stage {
                Stage::Head(i) => {
                    let Some(&path) = HEAD_PATHS.get(i) else {
                        self.stage = Stage::Skins { skin: 0, option: 0 };
                        continue;
                    };
                    self.stage = Stage::Head(i + 1);
                    if let Some(leaf) = self.leaf(&[path]) {
                        return Some(leaf);
                    }
                }
                Stage::Skins { skin, option } => {
                    let Some((name, options)) = settings.skins.iter().nth(skin) else {
                        self.stage = Stage::Formats { section: 0, field: 0 };
                        continue;
                    };
                    let Some((option_name, _)) = options.iter().nth(option) else {
                        self.stage = Stage::Skins {
                            skin: skin + 1,
                            option: 0,
                        };
                        continue;
                    };
                    self.stage = Stage::Skins {
                        skin,
                        option: option + 1,
                    };
                    if let Some(leaf) = self.leaf(&["skins", name.as_str(), option_name.as_str()]) {
                        return Some(leaf);
                    }
                }
                Stage::Formats { section, field } => {
                    if section >= self.section_limit() {
                        self.stage = Stage::Done;
                        continue;
                    }
                    let (name, fields) = FORMAT_SECTIONS[section];
                    let Some(&field_name) = fields.get(field) else {
                        self.stage = Stage::Formats {
                            section: section + 1,
                            field: 0,
                        };
                        continue;
                    };
                    self.stage = Stage::Formats {
                        section,
                        field: field + 1,
                    };
                    if let Some(leaf) = self.leaf(&[name, field_name]) {
                        return Some(leaf);
                    }
                }
                Stage::Done => return None,
            }
        }
    }
}

/// Write a leaf with a wire prefix, e.g. `eyeSettings.states.page=3`.
pub fn write_prefixed<W: fmt::Write>(
    out: &mut W,
    prefix: &str,
    leaf: &Leaf,
) -> fmt::Result {
    out.write_str(prefix)?;
    write!(out, "{leaf}")
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::settings::text;

    #[test]
    fn test_dump_omits_error_format() {
        let settings = Settings::default();
        let full: Vec<Leaf> = settings.leaves(Scope::Full).collect();
        let dump: Vec<Leaf> = settings.leaves(Scope::Dump).collect();

        assert!(full.iter().any(|l| l.path.starts_with("error_format.")));
        assert!(!dump.iter().any(|l| l.path.starts_with("error_format.")));
        assert_eq!(full.len() - dump.len(), 7);
    }

    #[test]
    fn test_leaf_order_and_form() {
        let settings = Settings::default();
        let mut leaves = settings.leaves(Scope::Dump);
        assert_eq!(leaves.next().unwrap().to_string(), "states.page=3");
        let left = settings.leaves(Scope::Dump).find(|l| l.path == "motions.left_point").unwrap();
        assert_eq!(left.to_string(), "motions.left_point=[60, 120]");
        let bg = settings.leaves(Scope::Dump).find(|l| l.path == "skins.simple.bg_color").unwrap();
        assert_eq!(bg.to_string(), "skins.simple.bg_color=\"#000000\"");
    }

    #[test]
    fn test_prefixed_line() {
        let settings = Settings::default();
        let leaf = settings.leaves(Scope::Dump).next().unwrap();
        let mut line = std::string::String::new();
        write_prefixed(&mut line, "eyeSettings.", &leaf).unwrap();
        assert_eq!(line, "eyeSettings.states.page=3");
    }

    #[test]
    fn test_flatten_round_trip_defaults() {
        let settings = Settings::default();
        let mut document = std::string::String::new();
        settings.write_flat(&mut document).unwrap();
        assert_eq!(Settings::from_flat(&document).unwrap(), settings);
    }

    proptest! {
        #[test]
        fn prop_flatten_round_trip(
            page in 1u32..=5,
            motion in 0u32..=3,
            error in 0u32..100_000,
            speed in 0u32..=100,
            x in -500i32..500,
            y in -500i32..500,
            tint in 0i32..256,
            banner in "[ -~]{0,30}",
        ) {
            let mut settings = Settings::default();
            settings.set("states.page", Value::Int(page as i32)).unwrap();
            settings.set("states.motion", Value::Int(motion as i32)).unwrap();
            settings.set("states.error", Value::Int(error as i32)).unwrap();
            settings.set("motions.speed", Value::Int(speed as i32)).unwrap();
            settings.motions.pos = embedded_graphics::prelude::Point::new(x, y);
            settings.set("skins.metal.tint", Value::Int(tint)).unwrap();
            settings.set("loading_format.text", Value::Text(text(&banner).unwrap())).unwrap();

            let mut document = std::string::String::new();
            settings.write_flat(&mut document).unwrap();
            prop_assert_eq!(Settings::from_flat(&document).unwrap(), settings);
        }
    }
}
