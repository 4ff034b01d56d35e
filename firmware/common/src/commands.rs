//! Serial command parsing and dispatch.
//!
//! Commands arrive one per line as `key=value`. [`Command::parse`] turns a
//! line into a typed command and [`dispatch`] validates it against the
//! settings tree and applies it in one step, so a caller holding the settings
//! lock gets check-then-set atomicity for free.
//!
//! | Line | Effect |
//! |------|--------|
//! | `setState=<n>` | page, clamped to 1..=5 |
//! | `setError=<n>` | error code |
//! | `setSkinOption=<skin>:<option>:<value>` | scalar skin option |
//! | `setMotion=<n>` | motion mode, 0..=3 |
//! | `getSettings` | dump settings |
//! | `setBacklight=<n>` | backlight percent |
//! | `setSpeed=<n>` | motion speed |
//! | `setPosition=<x>,<y>` | manual position |
//! | `handshake.complete` | leave the loading banner |
//!
//! Nothing here panics on input; every rejection is a [`CommandError`] for
//! the caller to log.

use core::fmt;

use embedded_graphics::prelude::Point;

use crate::config::{MAX_BACKLIGHT, MAX_LINE_LEN};
use crate::motion::MotionMode;
use crate::settings::{self, Settings, SettingsError, Value, parse_digits, parse_int};
use crate::state::PageSelection;

// =============================================================================
// Errors
// =============================================================================

/// Reason a command line was dropped. Borrows the offending text from the line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError<'a> {
    /// Line has no `=` separator.
    Malformed(&'a str),
    /// A digits-only argument contained something else.
    NotDigits(&'a str),
    /// Key is not a known command.
    UnknownCommand(&'a str),
    /// `setSkinOption` named a skin that does not exist.
    UnknownSkin(&'a str),
    /// `setSkinOption` named an option the skin does not have.
    UnknownOption { skin: &'a str, option: &'a str },
    /// `setSkinOption` targeted a list option.
    ReadOnlyOption { skin: &'a str, option: &'a str },
    /// `setMotion` index outside the motion modes.
    InvalidMotion(u32),
    /// Number too large for the settings tree (above `i32::MAX`).
    OutOfRange(u32),
    /// Wrong number of `:` or `,` separated fields.
    WrongArity { expected: usize, got: usize },
    /// Line longer than [`MAX_LINE_LEN`].
    TooLong(usize),
    /// The new value does not fit the settings tree.
    Value(SettingsError),
}

impl fmt::Display for CommandError<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Malformed(line) => write!(f, "expected key=value, got {line:?}"),
            Self::NotDigits(value) => write!(f, "expected digits, got {value:?}"),
            Self::UnknownCommand(key) => write!(f, "unknown command {key:?}"),
            Self::UnknownSkin(skin) => write!(f, "skin {skin} does not exist"),
            Self::UnknownOption { skin, option } => write!(f, "option {option} for {skin} does not exist"),
            Self::ReadOnlyOption { skin, option } => write!(f, "cannot change list option {skin}:{option}"),
            Self::InvalidMotion(index) => write!(f, "motion {index} out of range"),
            Self::OutOfRange(n) => write!(f, "{n} exceeds {}", i32::MAX),
            Self::WrongArity { expected, got } => write!(f, "expected {expected} values, got {got}"),
            Self::TooLong(len) => write!(f, "line of {len} bytes exceeds {MAX_LINE_LEN}"),
            Self::Value(err) => write!(f, "{err}"),
        }
    }
}

impl From<SettingsError> for CommandError<'_> {
    fn from(err: SettingsError) -> Self { Self::Value(err) }
}

// =============================================================================
// Commands
// =============================================================================

/// A parsed command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command<'a> {
    SetState(u32),
    SetError(u32),
    SetSkinOption { skin: &'a str, option: &'a str, value: &'a str },
    SetMotion(u32),
    GetSettings,
    SetBacklight(u32),
    SetSpeed(u32),
    SetPosition { x: i32, y: i32 },
    HandshakeComplete,
}

fn digits(value: &str) -> Result<u32, CommandError<'_>> { parse_digits(value).ok_or(CommandError::NotDigits(value)) }

impl<'a> Command<'a> {
    /// Parse one line. Trailing `\r`/`\n` are ignored.
    pub fn parse(line: &'a str) -> Result<Self, CommandError<'a>> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.len() > MAX_LINE_LEN {
            return Err(CommandError::TooLong(line.len()));
        }

        // Bare commands; a trailing `=` with any value is tolerated
        let (key, value) = match line.split_once('=') {
            Some((key, value)) => (key, Some(value)),
            None => (line, None),
        };
        match key {
            "getSettings" => return Ok(Self::GetSettings),
            "handshake.complete" => return Ok(Self::HandshakeComplete),
            _ => {}
        }

        let value = value.ok_or(CommandError::Malformed(line))?;
        match key {
            "setState" => Ok(Self::SetState(digits(value)?)),
            "setError" => Ok(Self::SetError(digits(value)?)),
            "setMotion" => Ok(Self::SetMotion(digits(value)?)),
            "setBacklight" => Ok(Self::SetBacklight(digits(value)?)),
            "setSpeed" => Ok(Self::SetSpeed(digits(value)?)),
            "setSkinOption" => {
                let mut fields = value.split(':');
                match (fields.next(), fields.next(), fields.next(), fields.next()) {
                    (Some(skin), Some(option), Some(value), None) => Ok(Self::SetSkinOption { skin, option, value }),
                    _ => Err(CommandError::WrongArity {
                        expected: 3,
                        got: value.split(':').count(),
                    }),
                }
            }
            "setPosition" => {
                let (x, y) = value.split_once(',').ok_or(CommandError::WrongArity { expected: 2, got: 1 })?;
                let x = parse_int(x.trim()).ok_or(CommandError::Malformed(value))?;
                let y = parse_int(y.trim()).ok_or(CommandError::Malformed(value))?;
                Ok(Self::SetPosition { x, y })
            }
            other => Err(CommandError::UnknownCommand(other)),
        }
    }
}

/// What the caller must do after a successful command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    /// Settings changed; persist them.
    Saved,
    /// Backlight changed to this percentage; apply it and persist settings.
    Backlight(u8),
    /// Send the settings dump with the `getSettings` prefix.
    DumpSettings,
    /// Signal the scheduler that the host completed the handshake.
    HandshakeComplete,
}

impl Effect {
    /// `true` if settings must be written to the store.
    pub const fn persists(self) -> bool { matches!(self, Self::Saved | Self::Backlight(_)) }
}

/// Validate and apply a command to the settings tree.
///
/// On error the tree is left untouched.
pub fn dispatch<'a>(
    settings: &mut Settings,
    command: Command<'a>,
) -> Result<Effect, CommandError<'a>> {
    match command {
        Command::SetState(index) => {
            settings.states.page = PageSelection::from_index_clamped(index);
            Ok(Effect::Saved)
        }
        Command::SetError(code) => {
            settings.states.error = storable(code)?;
            Ok(Effect::Saved)
        }
        Command::SetSkinOption { skin, option, value } => {
            let options = settings::lookup_mut(&mut settings.skins, skin).ok_or(CommandError::UnknownSkin(skin))?;
            let slot = settings::lookup_mut(options, option).ok_or(CommandError::UnknownOption { skin, option })?;
            if slot.is_list() {
                return Err(CommandError::ReadOnlyOption { skin, option });
            }
            *slot = Value::from_command(value)?;
            Ok(Effect::Saved)
        }
        Command::SetMotion(index) => {
            settings.states.motion = MotionMode::from_index(index).ok_or(CommandError::InvalidMotion(index))?;
            Ok(Effect::Saved)
        }
        Command::GetSettings => Ok(Effect::DumpSettings),
        Command::SetBacklight(percent) => {
            let percent = percent.min(u32::from(MAX_BACKLIGHT)) as u8;
            settings.display.backlight = percent;
            Ok(Effect::Backlight(percent))
        }
        Command::SetSpeed(speed) => {
            settings.motions.speed = storable(speed)?;
            Ok(Effect::Saved)
        }
        Command::SetPosition { x, y } => {
            settings.motions.pos = Point::new(x, y);
            Ok(Effect::Saved)
        }
        Command::HandshakeComplete => Ok(Effect::HandshakeComplete),
    }
}

/// Numbers are stored as JSON integers, which the tree keeps as `i32`.
fn storable<'a>(n: u32) -> Result<u32, CommandError<'a>> {
    if i32::try_from(n).is_ok() { Ok(n) } else { Err(CommandError::OutOfRange(n)) }
}

/// Parse and dispatch one line.
pub fn handle_line<'a>(
    settings: &mut Settings,
    line: &'a str,
) -> Result<Effect, CommandError<'a>> {
    dispatch(settings, Command::parse(line)?)
}
