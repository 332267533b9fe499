//! Translates raw key events into [`Placement`]s.
//!
//! # How a key chord becomes a `Placement`
//!
//! The recognizer sees every key event the platform hook intercepts, in
//! delivery order, and decides for each whether it should be swallowed or
//! passed on to the focused application:
//!
//! | Event                         | State                    | Effect                          | Event     |
//! |-------------------------------|--------------------------|---------------------------------|-----------|
//! | modifier down                 | any                      | modifier held                   | forwarded |
//! | modifier up                   | any                      | idle, pending cell dropped      | forwarded |
//! | cell key down                 | modifier held            | none                            | swallowed |
//! | cell key up                   | held, nothing pending    | cell becomes pending            | swallowed |
//! | cell key up                   | held, cell pending       | emit `Placement`, clear pending | swallowed |
//! | anything else                 | any                      | none                            | forwarded |
//!
//! Swallowing the cell key-downs keeps the digit from reaching the focused
//! application while the chord is in progress.

use crate::command::{Placement, Quadrant};
use log::{debug, error};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::panic::{self, UnwindSafe};

/// Platform virtual-key code, as reported by the low-level keyboard hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VirtualKey(pub u32);

impl VirtualKey {
    pub const LEFT_SHIFT: Self = Self(0xA0);
    pub const RIGHT_SHIFT: Self = Self(0xA1);
    pub const LEFT_CONTROL: Self = Self(0xA2);
    pub const RIGHT_CONTROL: Self = Self(0xA3);
    pub const LEFT_ALT: Self = Self(0xA4);
    pub const RIGHT_ALT: Self = Self(0xA5);
    pub const LEFT_WIN: Self = Self(0x5B);
    pub const RIGHT_WIN: Self = Self(0x5C);
    /// Numeric keypad `1`; `2`–`9` follow contiguously.
    pub const NUMPAD1: Self = Self(0x61);
    /// Top-row digit `1`; `2`–`9` follow contiguously.
    pub const DIGIT1: Self = Self(0x31);

    /// Numeric keypad key for `quadrant`.
    pub fn numpad(quadrant: Quadrant) -> Self {
        Self(Self::NUMPAD1.0 + quadrant.index() as u32 - 1)
    }

    /// Top-row digit key for `quadrant`.
    pub fn digit(quadrant: Quadrant) -> Self {
        Self(Self::DIGIT1.0 + quadrant.index() as u32 - 1)
    }
}

/// Whether a key went down or came up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Down,
    Up,
}

/// A single intercepted key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: VirtualKey,
    pub action: KeyAction,
}

impl KeyEvent {
    pub fn down(key: VirtualKey) -> Self {
        Self {
            key,
            action: KeyAction::Down,
        }
    }

    pub fn up(key: VirtualKey) -> Self {
        Self {
            key,
            action: KeyAction::Up,
        }
    }
}

/// What the hook should do with the event it just handed to the recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResponse {
    /// Pass the event on unchanged.
    Forward,
    /// Swallow the event.
    Suppress,
    /// Swallow the event; it completed a gesture.
    Complete(Placement),
}

impl KeyResponse {
    /// Whether the event must be kept from the rest of the system.
    pub fn consumes(&self) -> bool {
        !matches!(self, KeyResponse::Forward)
    }
}

/// Run a consume decision, treating a panic inside it as "forward".
///
/// Input callbacks must never unwind into the system, and an event whose
/// fate could not be decided is passed on unchanged.
pub fn guarded(decide: impl FnOnce() -> bool + UnwindSafe) -> bool {
    match panic::catch_unwind(decide) {
        Ok(consumed) => consumed,
        Err(_) => {
            error!("key handler panicked, forwarding key");
            false
        }
    }
}

//  Configuration

/// The key that must be held to arm the grid gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModifierKey {
    #[default]
    LeftControl,
    RightControl,
    LeftAlt,
    RightAlt,
    LeftShift,
    RightShift,
    LeftWin,
    RightWin,
}

impl ModifierKey {
    pub fn virtual_key(self) -> VirtualKey {
        match self {
            ModifierKey::LeftControl => VirtualKey::LEFT_CONTROL,
            ModifierKey::RightControl => VirtualKey::RIGHT_CONTROL,
            ModifierKey::LeftAlt => VirtualKey::LEFT_ALT,
            ModifierKey::RightAlt => VirtualKey::RIGHT_ALT,
            ModifierKey::LeftShift => VirtualKey::LEFT_SHIFT,
            ModifierKey::RightShift => VirtualKey::RIGHT_SHIFT,
            ModifierKey::LeftWin => VirtualKey::LEFT_WIN,
            ModifierKey::RightWin => VirtualKey::RIGHT_WIN,
        }
    }
}

impl fmt::Display for ModifierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModifierKey::LeftControl => write!(f, "left-control"),
            ModifierKey::RightControl => write!(f, "right-control"),
            ModifierKey::LeftAlt => write!(f, "left-alt"),
            ModifierKey::RightAlt => write!(f, "right-alt"),
            ModifierKey::LeftShift => write!(f, "left-shift"),
            ModifierKey::RightShift => write!(f, "right-shift"),
            ModifierKey::LeftWin => write!(f, "left-win"),
            ModifierKey::RightWin => write!(f, "right-win"),
        }
    }
}

/// Parse a modifier name (case-insensitive; accepts "left-control",
/// "LeftControl", "lctrl", etc.).
fn parse_modifier(s: &str) -> Option<ModifierKey> {
    let normalized: String = s
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(|c| c.to_lowercase())
        .collect();
    match normalized.as_str() {
        "leftcontrol" | "leftctrl" | "lcontrol" | "lctrl" => Some(ModifierKey::LeftControl),
        "rightcontrol" | "rightctrl" | "rcontrol" | "rctrl" => Some(ModifierKey::RightControl),
        "leftalt" | "lalt" | "leftmenu" | "lmenu" => Some(ModifierKey::LeftAlt),
        "rightalt" | "ralt" | "rightmenu" | "rmenu" | "altgr" => Some(ModifierKey::RightAlt),
        "leftshift" | "lshift" => Some(ModifierKey::LeftShift),
        "rightshift" | "rshift" => Some(ModifierKey::RightShift),
        "leftwin" | "lwin" | "leftsuper" | "lsuper" => Some(ModifierKey::LeftWin),
        "rightwin" | "rwin" | "rightsuper" | "rsuper" => Some(ModifierKey::RightWin),
        _ => None,
    }
}

impl Serialize for ModifierKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ModifierKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_modifier(&s).ok_or_else(|| DeError::custom(format!("invalid modifier: {:?}", s)))
    }
}

/// Which bank of nine keys selects the grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CellKeys {
    /// Numeric keypad `1`–`9`, laid out like the grid itself.
    #[default]
    Numpad,
    /// Top-row digits `1`–`9`, for keyboards without a keypad.
    DigitRow,
}

impl CellKeys {
    /// Quadrant selected by `key`, if `key` belongs to this bank.
    pub fn quadrant_for(self, key: VirtualKey) -> Option<Quadrant> {
        let first = match self {
            CellKeys::Numpad => VirtualKey::NUMPAD1,
            CellKeys::DigitRow => VirtualKey::DIGIT1,
        };
        let offset = key.0.checked_sub(first.0)?;
        if offset >= 9 {
            return None;
        }
        Quadrant::new(offset as u8 + 1)
    }
}

/// Which keys drive the gesture.
///
/// `modifier` is the key that must be held throughout; the
/// default choice is the **left** control key.  `cell_keys` selects the bank
/// of nine keys mapped to the grid cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Key that arms the gesture.  Default: `"left-control"`.
    pub modifier: ModifierKey,
    /// Keys that select cells.  Default: `"numpad"`.
    pub cell_keys: CellKeys,
}

//  Recognizer

/// Transient gesture progress.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct GestureState {
    modifier_held: bool,
    pending_first: Option<Quadrant>,
}

/// The gesture state machine.
///
/// Owns its state; feed it every key event in delivery order through
/// [`handle`](GestureRecognizer::handle).
#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    modifier: VirtualKey,
    cell_keys: CellKeys,
    state: GestureState,
}

impl GestureRecognizer {
    /// Create an idle recognizer for the given key configuration.
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            modifier: config.modifier.virtual_key(),
            cell_keys: config.cell_keys,
            state: GestureState::default(),
        }
    }

    /// Whether the modifier is currently held.
    pub fn is_armed(&self) -> bool {
        self.state.modifier_held
    }

    /// The first cell of an in-progress gesture, if any.
    pub fn pending(&self) -> Option<Quadrant> {
        self.state.pending_first
    }

    /// Process one key event and decide its fate.
    pub fn handle(&mut self, event: KeyEvent) -> KeyResponse {
        if event.key == self.modifier {
            match event.action {
                KeyAction::Down => {
                    if !self.state.modifier_held {
                        debug!("modifier down, gesture armed");
                    }
                    self.state.modifier_held = true;
                }
                KeyAction::Up => {
                    if let Some(pending) = self.state.pending_first {
                        debug!("modifier released, dropping pending cell {}", pending);
                    }
                    self.state = GestureState::default();
                }
            }
            return KeyResponse::Forward;
        }

        if !self.state.modifier_held {
            return KeyResponse::Forward;
        }

        let Some(quadrant) = self.cell_keys.quadrant_for(event.key) else {
            return KeyResponse::Forward;
        };

        match (event.action, self.state.pending_first) {
            (KeyAction::Down, _) => KeyResponse::Suppress,
            (KeyAction::Up, None) => {
                debug!("first cell {}", quadrant);
                self.state.pending_first = Some(quadrant);
                KeyResponse::Suppress
            }
            (KeyAction::Up, Some(first)) => {
                self.state.pending_first = None;
                let placement = Placement::new(first, quadrant);
                debug!("gesture complete: {}", placement);
                KeyResponse::Complete(placement)
            }
        }
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::AssertUnwindSafe;

    fn q(n: u8) -> Quadrant {
        Quadrant::new(n).unwrap()
    }

    fn num(n: u8) -> VirtualKey {
        VirtualKey::numpad(q(n))
    }

    const CTRL: VirtualKey = VirtualKey::LEFT_CONTROL;

    fn recognizer() -> GestureRecognizer {
        GestureRecognizer::new(&GestureConfig::default())
    }

    /// Feed a sequence of events and collect every completed placement.
    fn run(rec: &mut GestureRecognizer, events: &[KeyEvent]) -> Vec<Placement> {
        events
            .iter()
            .filter_map(|e| match rec.handle(*e) {
                KeyResponse::Complete(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    /// Press-and-release of a numpad digit.
    fn tap(n: u8) -> [KeyEvent; 2] {
        [KeyEvent::down(num(n)), KeyEvent::up(num(n))]
    }

    #[test]
    fn numpad_keys_map_to_quadrants() {
        assert_eq!(CellKeys::Numpad.quadrant_for(VirtualKey(0x61)), Some(q(1)));
        assert_eq!(CellKeys::Numpad.quadrant_for(VirtualKey(0x69)), Some(q(9)));
        assert_eq!(CellKeys::Numpad.quadrant_for(VirtualKey(0x60)), None);
        assert_eq!(CellKeys::Numpad.quadrant_for(VirtualKey(0x6A)), None);
        assert_eq!(CellKeys::Numpad.quadrant_for(VirtualKey(0x31)), None);
    }

    #[test]
    fn digit_row_keys_map_to_quadrants() {
        assert_eq!(CellKeys::DigitRow.quadrant_for(VirtualKey(0x31)), Some(q(1)));
        assert_eq!(CellKeys::DigitRow.quadrant_for(VirtualKey(0x39)), Some(q(9)));
        assert_eq!(CellKeys::DigitRow.quadrant_for(VirtualKey(0x30)), None);
        assert_eq!(CellKeys::DigitRow.quadrant_for(VirtualKey(0x61)), None);
    }

    #[test]
    fn opposite_corners_produce_single_placement() {
        let mut rec = recognizer();
        let mut events = vec![KeyEvent::down(CTRL)];
        events.extend(tap(3));
        events.extend(tap(7));
        events.push(KeyEvent::up(CTRL));

        let placements = run(&mut rec, &events);
        assert_eq!(placements, vec![Placement::new(q(3), q(7))]);
        assert!(crate::grid::should_maximize(q(3), q(7)));
        assert!(!rec.is_armed());
    }

    #[test]
    fn releasing_modifier_cancels_pending_cell() {
        let mut rec = recognizer();
        let mut events = vec![KeyEvent::down(CTRL)];
        events.extend(tap(1));
        events.push(KeyEvent::up(CTRL));
        assert!(run(&mut rec, &events).is_empty());
        assert!(!rec.is_armed());
        assert_eq!(rec.pending(), None);

        let mut events = vec![KeyEvent::down(CTRL)];
        events.extend(tap(5));
        events.extend(tap(2));
        assert_eq!(run(&mut rec, &events), vec![Placement::new(q(5), q(2))]);
    }

    #[test]
    fn cell_key_down_is_always_consumed_while_held() {
        let mut rec = recognizer();
        rec.handle(KeyEvent::down(CTRL));
        for n in 1..=9 {
            assert_eq!(rec.handle(KeyEvent::down(num(n))), KeyResponse::Suppress);
        }
        // Still nothing pending: downs never select.
        assert_eq!(rec.pending(), None);

        rec.handle(KeyEvent::up(num(4)));
        assert_eq!(rec.pending(), Some(q(4)));
        assert_eq!(rec.handle(KeyEvent::down(num(6))), KeyResponse::Suppress);
    }

    #[test]
    fn first_cell_up_is_consumed_and_pending() {
        let mut rec = recognizer();
        rec.handle(KeyEvent::down(CTRL));
        assert_eq!(rec.handle(KeyEvent::up(num(8))), KeyResponse::Suppress);
        assert_eq!(rec.pending(), Some(q(8)));
    }

    #[test]
    fn modifier_events_are_forwarded() {
        let mut rec = recognizer();
        assert_eq!(rec.handle(KeyEvent::down(CTRL)), KeyResponse::Forward);
        assert!(rec.is_armed());
        assert_eq!(rec.handle(KeyEvent::up(CTRL)), KeyResponse::Forward);
        assert!(!rec.is_armed());
    }

    #[test]
    fn digits_without_modifier_are_forwarded() {
        let mut rec = recognizer();
        for n in 1..=9 {
            assert_eq!(rec.handle(KeyEvent::down(num(n))), KeyResponse::Forward);
            assert_eq!(rec.handle(KeyEvent::up(num(n))), KeyResponse::Forward);
        }
        assert_eq!(rec.pending(), None);
    }

    #[test]
    fn other_keys_are_forwarded_while_held() {
        let mut rec = recognizer();
        rec.handle(KeyEvent::down(CTRL));
        rec.handle(KeyEvent::up(num(1)));
        // Ctrl+C must still reach the application.
        let c = VirtualKey(0x43);
        assert_eq!(rec.handle(KeyEvent::down(c)), KeyResponse::Forward);
        assert_eq!(rec.handle(KeyEvent::up(c)), KeyResponse::Forward);
        // And it does not disturb the pending cell.
        assert_eq!(rec.pending(), Some(q(1)));
    }

    #[test]
    fn right_control_does_not_arm_default_gesture() {
        let mut rec = recognizer();
        rec.handle(KeyEvent::down(VirtualKey::RIGHT_CONTROL));
        assert!(!rec.is_armed());
        assert_eq!(rec.handle(KeyEvent::up(num(1))), KeyResponse::Forward);
    }

    #[test]
    fn gesture_can_repeat_while_modifier_held() {
        let mut rec = recognizer();
        let mut events = vec![KeyEvent::down(CTRL)];
        events.extend(tap(1));
        events.extend(tap(3));
        // Auto-repeat of the held modifier must not reset anything.
        events.push(KeyEvent::down(CTRL));
        events.extend(tap(7));
        events.extend(tap(9));
        events.push(KeyEvent::up(CTRL));

        assert_eq!(
            run(&mut rec, &events),
            vec![Placement::new(q(1), q(3)), Placement::new(q(7), q(9))]
        );
    }

    #[test]
    fn complete_response_consumes() {
        assert!(!KeyResponse::Forward.consumes());
        assert!(KeyResponse::Suppress.consumes());
        assert!(KeyResponse::Complete(Placement::new(q(1), q(2))).consumes());
    }

    #[test]
    fn configured_modifier_and_digit_row() {
        let config = GestureConfig {
            modifier: ModifierKey::RightAlt,
            cell_keys: CellKeys::DigitRow,
        };
        let mut rec = GestureRecognizer::new(&config);
        let alt = VirtualKey::RIGHT_ALT;
        let d = |n| VirtualKey::digit(q(n));

        // Left control no longer arms anything.
        rec.handle(KeyEvent::down(CTRL));
        assert_eq!(rec.handle(KeyEvent::up(d(1))), KeyResponse::Forward);
        rec.handle(KeyEvent::up(CTRL));

        let events = [
            KeyEvent::down(alt),
            KeyEvent::down(d(4)),
            KeyEvent::up(d(4)),
            // Numpad is not part of the digit-row bank.
            KeyEvent::down(num(5)),
            KeyEvent::up(num(5)),
            KeyEvent::down(d(6)),
            KeyEvent::up(d(6)),
            KeyEvent::up(alt),
        ];
        assert_eq!(run(&mut rec, &events), vec![Placement::new(q(4), q(6))]);
    }

    #[test]
    fn parse_modifier_variants() {
        assert_eq!(parse_modifier("left-control"), Some(ModifierKey::LeftControl));
        assert_eq!(parse_modifier("LeftControl"), Some(ModifierKey::LeftControl));
        assert_eq!(parse_modifier(" lctrl "), Some(ModifierKey::LeftControl));
        assert_eq!(parse_modifier("right_alt"), Some(ModifierKey::RightAlt));
        assert_eq!(parse_modifier("AltGr"), Some(ModifierKey::RightAlt));
        assert_eq!(parse_modifier("lwin"), Some(ModifierKey::LeftWin));
        assert_eq!(parse_modifier("control"), None);
        assert_eq!(parse_modifier(""), None);
    }

    #[test]
    fn modifier_display_parses_back() {
        let all = [
            ModifierKey::LeftControl,
            ModifierKey::RightControl,
            ModifierKey::LeftAlt,
            ModifierKey::RightAlt,
            ModifierKey::LeftShift,
            ModifierKey::RightShift,
            ModifierKey::LeftWin,
            ModifierKey::RightWin,
        ];
        for m in all {
            assert_eq!(parse_modifier(&m.to_string()), Some(m));
        }
    }

    #[test]
    fn guarded_passes_decision_through() {
        assert!(guarded(|| true));
        assert!(!guarded(|| false));
    }

    #[test]
    fn panicking_handler_forwards_key() {
        assert!(!guarded(|| panic!("recognizer failure")));
    }

    #[test]
    fn recognizer_keeps_working_after_guarded_panic() {
        let mut rec = recognizer();
        rec.handle(KeyEvent::down(CTRL));
        assert!(guarded(AssertUnwindSafe(|| rec.handle(KeyEvent::up(num(2))).consumes())));
        assert!(!guarded(|| -> bool { panic!("hook failure") }));
        let mut events = Vec::new();
        events.extend(tap(8));
        assert_eq!(run(&mut rec, &events), vec![Placement::new(q(2), q(8))]);
    }

    #[test]
    fn default_config_values() {
        let cfg = GestureConfig::default();
        assert_eq!(cfg.modifier, ModifierKey::LeftControl);
        assert_eq!(cfg.cell_keys, CellKeys::Numpad);
    }
}
