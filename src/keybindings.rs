//! Keybinding registry: maps key events to actions per dispatch context.
//!
//! Lookups try the active context first and fall back to `Global`, so a
//! context only needs to list the keys it overrides.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    /// Open the reader from the list, confirm in the theme picker
    Select,
    MarkRead,
    OpenInBrowser,
    Refresh,
    OpenThemePicker,
    ScrollDown,
    ScrollUp,
    PageDown,
    PageUp,
    /// Close the active overlay
    Back,
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context, derived from the view the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    /// Loading and error screens; also the fallback for every other context
    Global,
    List,
    Reader,
    ThemePicker,
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    /// Character keys drop SHIFT: the character itself already says whether
    /// it is upper case, and terminals disagree on reporting the modifier.
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        let modifiers = match code {
            KeyCode::Char(_) => modifiers.difference(KeyModifiers::SHIFT),
            _ => modifiers,
        };
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub const fn ch(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
        }
    }
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings with context-aware dispatch.
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
        };
        registry.register_defaults();
        registry
    }

    fn bind(&mut self, context: Context, keys: &[KeySpec], action: Action) {
        for key in keys {
            self.lookup.insert((context, *key), action);
        }
    }

    fn register_defaults(&mut self) {
        use Context::*;
        use KeyCode::{Down, Enter, Esc, PageDown, PageUp, Up};

        // === Global ===
        self.bind(Global, &[KeySpec::ch('q'), KeySpec::ctrl('c')], Action::Quit);
        self.bind(Global, &[KeySpec::ctrl('r')], Action::Refresh);

        // === List ===
        self.bind(List, &[KeySpec::ch('j'), KeySpec::plain(Down)], Action::NavDown);
        self.bind(List, &[KeySpec::ch('k'), KeySpec::plain(Up)], Action::NavUp);
        self.bind(List, &[KeySpec::plain(Enter)], Action::Select);
        self.bind(List, &[KeySpec::ch('m')], Action::MarkRead);
        self.bind(List, &[KeySpec::ch('o')], Action::OpenInBrowser);
        self.bind(List, &[KeySpec::ch('T')], Action::OpenThemePicker);

        // === Reader ===
        self.bind(Reader, &[KeySpec::ch('j'), KeySpec::plain(Down)], Action::ScrollDown);
        self.bind(Reader, &[KeySpec::ch('k'), KeySpec::plain(Up)], Action::ScrollUp);
        self.bind(Reader, &[KeySpec::ch(' '), KeySpec::plain(PageDown)], Action::PageDown);
        self.bind(Reader, &[KeySpec::plain(PageUp)], Action::PageUp);
        self.bind(Reader, &[KeySpec::ch('o')], Action::OpenInBrowser);
        self.bind(Reader, &[KeySpec::ch('q'), KeySpec::plain(Esc)], Action::Back);

        // === Theme picker ===
        self.bind(ThemePicker, &[KeySpec::ch('j'), KeySpec::plain(Down)], Action::NavDown);
        self.bind(ThemePicker, &[KeySpec::ch('k'), KeySpec::plain(Up)], Action::NavUp);
        self.bind(ThemePicker, &[KeySpec::plain(Enter)], Action::Select);
        self.bind(ThemePicker, &[KeySpec::ch('q'), KeySpec::plain(Esc)], Action::Back);
    }

    /// Look up the action for a key, trying `context` then `Global`.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers);

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }
        if context != Context::Global {
            return self.lookup.get(&(Context::Global, key)).copied();
        }
        None
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(code: KeyCode, modifiers: KeyModifiers, ctx: Context) -> Option<Action> {
        KeybindingRegistry::new().action_for_key(code, modifiers, ctx)
    }

    #[test]
    fn test_list_navigation_keys() {
        let r = KeybindingRegistry::new();
        for (code, action) in [
            (KeyCode::Char('j'), Action::NavDown),
            (KeyCode::Down, Action::NavDown),
            (KeyCode::Char('k'), Action::NavUp),
            (KeyCode::Up, Action::NavUp),
            (KeyCode::Enter, Action::Select),
            (KeyCode::Char('m'), Action::MarkRead),
            (KeyCode::Char('o'), Action::OpenInBrowser),
        ] {
            assert_eq!(
                r.action_for_key(code, KeyModifiers::NONE, Context::List),
                Some(action)
            );
        }
    }

    #[test]
    fn test_q_quits_from_list_but_closes_overlays() {
        let q = KeyCode::Char('q');
        assert_eq!(lookup(q, KeyModifiers::NONE, Context::List), Some(Action::Quit));
        assert_eq!(lookup(q, KeyModifiers::NONE, Context::Global), Some(Action::Quit));
        assert_eq!(lookup(q, KeyModifiers::NONE, Context::Reader), Some(Action::Back));
        assert_eq!(
            lookup(q, KeyModifiers::NONE, Context::ThemePicker),
            Some(Action::Back)
        );
    }

    #[test]
    fn test_ctrl_c_quits_everywhere() {
        for ctx in [
            Context::Global,
            Context::List,
            Context::Reader,
            Context::ThemePicker,
        ] {
            assert_eq!(
                lookup(KeyCode::Char('c'), KeyModifiers::CONTROL, ctx),
                Some(Action::Quit)
            );
        }
    }

    #[test]
    fn test_ctrl_r_refreshes_but_plain_r_does_nothing() {
        assert_eq!(
            lookup(KeyCode::Char('r'), KeyModifiers::CONTROL, Context::List),
            Some(Action::Refresh)
        );
        assert_eq!(
            lookup(KeyCode::Char('r'), KeyModifiers::CONTROL, Context::Global),
            Some(Action::Refresh)
        );
        assert_eq!(lookup(KeyCode::Char('r'), KeyModifiers::NONE, Context::List), None);
    }

    #[test]
    fn test_shift_t_opens_theme_picker() {
        // Some terminals report SHIFT alongside the upper-case char, some do not
        assert_eq!(
            lookup(KeyCode::Char('T'), KeyModifiers::SHIFT, Context::List),
            Some(Action::OpenThemePicker)
        );
        assert_eq!(
            lookup(KeyCode::Char('T'), KeyModifiers::NONE, Context::List),
            Some(Action::OpenThemePicker)
        );
        assert_eq!(lookup(KeyCode::Char('t'), KeyModifiers::NONE, Context::List), None);
    }

    #[test]
    fn test_reader_scroll_keys() {
        let r = KeybindingRegistry::new();
        let none = KeyModifiers::NONE;
        assert_eq!(
            r.action_for_key(KeyCode::Char('j'), none, Context::Reader),
            Some(Action::ScrollDown)
        );
        assert_eq!(
            r.action_for_key(KeyCode::Char(' '), none, Context::Reader),
            Some(Action::PageDown)
        );
        assert_eq!(
            r.action_for_key(KeyCode::PageDown, none, Context::Reader),
            Some(Action::PageDown)
        );
        assert_eq!(
            r.action_for_key(KeyCode::PageUp, none, Context::Reader),
            Some(Action::PageUp)
        );
        assert_eq!(
            r.action_for_key(KeyCode::Esc, none, Context::Reader),
            Some(Action::Back)
        );
    }

    #[test]
    fn test_list_keys_inactive_on_loading_screen() {
        assert_eq!(lookup(KeyCode::Char('j'), KeyModifiers::NONE, Context::Global), None);
        assert_eq!(lookup(KeyCode::Enter, KeyModifiers::NONE, Context::Global), None);
    }

    #[test]
    fn test_unknown_key_returns_none() {
        assert_eq!(lookup(KeyCode::F(5), KeyModifiers::NONE, Context::Reader), None);
    }
}
