//! Display mode state machine.
//!
//! ```text
//!  Logo ──(duration elapsed)──▶ WaitHandshake ──(handshake.complete)──▶ Home(page)
//!                                                                   ╲
//!                                                                    ▶ Error
//! ```
//!
//! Home and Error are siblings: once the handshake completes, the persisted
//! page selection decides which one is active, and every later `setState`
//! moves between them. There is no terminal state; a restart re-enters Logo.

/// Visual pages shown while the display is in [`DisplayMode::Home`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VisualPage {
    TvStatic,
    EyeSimple,
    EyeMetal,
    EyeNeon,
}

impl VisualPage {
    /// All pages in `states.page` order.
    pub const ALL: [Self; 4] = [Self::TvStatic, Self::EyeSimple, Self::EyeMetal, Self::EyeNeon];

    /// Key of the skin section this page reads its options from.
    pub const fn skin_key(self) -> Option<&'static str> {
        match self {
            Self::TvStatic => None,
            Self::EyeSimple => Some("simple"),
            Self::EyeMetal => Some("metal"),
            Self::EyeNeon => Some("neon"),
        }
    }
}

/// Persisted `states.page` value.
///
/// Index 1 selects the error banner, 2..=5 the visual pages in
/// [`VisualPage::ALL`] order. Out-of-range indices clamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PageSelection {
    Error,
    Visual(VisualPage),
}

impl PageSelection {
    /// Lowest valid page index.
    pub const MIN_INDEX: u32 = 1;
    /// Highest valid page index.
    pub const MAX_INDEX: u32 = 1 + VisualPage::ALL.len() as u32;

    /// Page for an index, clamped to `MIN_INDEX..=MAX_INDEX`.
    pub fn from_index_clamped(index: u32) -> Self {
        match index.clamp(Self::MIN_INDEX, Self::MAX_INDEX) {
            1 => Self::Error,
            n => Self::Visual(VisualPage::ALL[(n - 2) as usize]),
        }
    }

    /// Index as stored in settings.
    pub const fn index(self) -> u32 {
        match self {
            Self::Error => 1,
            Self::Visual(VisualPage::TvStatic) => 2,
            Self::Visual(VisualPage::EyeSimple) => 3,
            Self::Visual(VisualPage::EyeMetal) => 4,
            Self::Visual(VisualPage::EyeNeon) => 5,
        }
    }
}

/// Top-level display mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayMode {
    Logo,
    WaitHandshake,
    Error,
    Home(VisualPage),
}

/// Inputs that can move the state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// The logo has been shown for its configured duration.
    LogoElapsed,
    /// The host answered the handshake; carries the persisted page.
    HandshakeComplete(PageSelection),
    /// The persisted page was read (or changed by a command).
    PageSelected(PageSelection),
}

impl DisplayMode {
    /// Apply an event, returning the next mode.
    ///
    /// Events that do not apply to the current mode leave it unchanged.
    #[must_use]
    pub fn transition(
        self,
        event: Event,
    ) -> Self {
        match (self, event) {
            (Self::Logo, Event::LogoElapsed) => Self::WaitHandshake,
            (Self::WaitHandshake, Event::HandshakeComplete(page)) => Self::selected(page),
            (Self::Home(_) | Self::Error, Event::PageSelected(page)) => Self::selected(page),
            (mode, _) => mode,
        }
    }

    const fn selected(page: PageSelection) -> Self {
        match page {
            PageSelection::Error => Self::Error,
            PageSelection::Visual(visual) => Self::Home(visual),
        }
    }
}

/// Display mode plus the time it was entered.
#[derive(Clone, Copy, Debug)]
pub struct DisplayStateMachine {
    mode: DisplayMode,
    entered_at_ms: u64,
}

impl DisplayStateMachine {
    /// Start in [`DisplayMode::Logo`].
    pub const fn new(now_ms: u64) -> Self {
        Self {
            mode: DisplayMode::Logo,
            entered_at_ms: now_ms,
        }
    }

    /// Current mode.
    #[inline]
    pub const fn mode(&self) -> DisplayMode { self.mode }

    /// Milliseconds spent in the current mode.
    #[inline]
    pub const fn elapsed_ms(
        &self,
        now_ms: u64,
    ) -> u64 {
        now_ms.saturating_sub(self.entered_at_ms)
    }

    /// Apply an event; returns `true` if the mode changed.
    pub fn handle(
        &mut self,
        event: Event,
        now_ms: u64,
    ) -> bool {
        let next = self.mode.transition(event);
        if next == self.mode {
            return false;
        }
        self.mode = next;
        self.entered_at_ms = now_ms;
        true
    }

    /// Run one scheduler step of the machine.
    ///
    /// Checks the logo timeout, consumes a pending handshake and follows the
    /// persisted page. Returns `true` if the mode changed.
    pub fn update(
        &mut self,
        now_ms: u64,
        logo_duration_ms: u64,
        page: PageSelection,
        handshake_complete: bool,
    ) -> bool {
        let mut changed = false;
        if self.mode == DisplayMode::Logo && self.elapsed_ms(now_ms) >= logo_duration_ms {
            changed |= self.handle(Event::LogoElapsed, now_ms);
        }
        if handshake_complete {
            changed |= self.handle(Event::HandshakeComplete(page), now_ms);
        }
        changed |= self.handle(Event::PageSelected(page), now_ms);
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_index_round_trip() {
        for index in PageSelection::MIN_INDEX..=PageSelection::MAX_INDEX {
            assert_eq!(PageSelection::from_index_clamped(index).index(), index);
        }
    }

    #[test]
    fn test_page_index_clamps() {
        assert_eq!(PageSelection::from_index_clamped(0), PageSelection::Error);
        assert_eq!(
            PageSelection::from_index_clamped(999),
            PageSelection::Visual(VisualPage::EyeNeon)
        );
    }

    #[test]
    fn test_logo_waits_for_duration() {
        let mut machine = DisplayStateMachine::new(1000);
        let page = PageSelection::Visual(VisualPage::EyeSimple);

        assert!(!machine.update(1500, 2000, page, false));
        assert_eq!(machine.mode(), DisplayMode::Logo);

        assert!(machine.update(3000, 2000, page, false));
        assert_eq!(machine.mode(), DisplayMode::WaitHandshake);
    }

    #[test]
    fn test_handshake_enters_persisted_page() {
        let mut machine = DisplayStateMachine::new(0);
        let page = PageSelection::Visual(VisualPage::EyeMetal);
        machine.update(10, 0, page, false);
        assert_eq!(machine.mode(), DisplayMode::WaitHandshake);

        // Waiting ignores page changes
        machine.update(20, 0, PageSelection::Error, false);
        assert_eq!(machine.mode(), DisplayMode::WaitHandshake);

        machine.update(30, 0, page, true);
        assert_eq!(machine.mode(), DisplayMode::Home(VisualPage::EyeMetal));
    }

    #[test]
    fn test_handshake_ignored_during_logo() {
        let mode = DisplayMode::Logo.transition(Event::HandshakeComplete(PageSelection::Error));
        assert_eq!(mode, DisplayMode::Logo);
    }

    #[test]
    fn test_error_is_sibling_of_home() {
        let home = DisplayMode::Home(VisualPage::TvStatic);
        let error = home.transition(Event::PageSelected(PageSelection::Error));
        assert_eq!(error, DisplayMode::Error);

        let back = error.transition(Event::PageSelected(PageSelection::Visual(VisualPage::EyeNeon)));
        assert_eq!(back, DisplayMode::Home(VisualPage::EyeNeon));
    }

    #[test]
    fn test_elapsed_resets_on_change() {
        let mut machine = DisplayStateMachine::new(0);
        machine.update(500, 500, PageSelection::Error, false);
        assert_eq!(machine.elapsed_ms(700), 200);
    }
}
