use crate::input::InputEvent;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::render;
use crate::schedule::Debouncer;
use crate::theme::Theme;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use std::time::Duration;
use std::time::Instant;
use unicode_width::UnicodeWidthChar;

pub const DEFAULT_SUGGESTION_LIMIT: usize = 5000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputKind {
    #[default]
    Text,
    /// Accepts only characters that can appear in a decimal number.
    Number,
}

#[derive(Clone, Debug)]
pub struct TextInputOptions {
    pub kind: InputKind,
    pub placeholder: String,
    pub style: Style,
    pub suggestion_limit: usize,
}

impl Default for TextInputOptions {
    fn default() -> Self {
        Self {
            kind: InputKind::Text,
            placeholder: String::new(),
            style: Style::default(),
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextInputAction {
    None,
    Changed(String),
    Submitted(String),
}

/// A single-line text field.
///
/// Supports a placeholder, a disabled state and a list of suggestions (the terminal equivalent of
/// a `<datalist>`): `Tab` completes the first suggestion that starts with the current text.
#[derive(Clone, Debug, Default)]
pub struct TextInput {
    text: String,
    /// Cursor position as a char index.
    cursor: usize,
    scroll_x: u32,
    focused: bool,
    disabled: bool,
    suggestions: Vec<String>,
    options: TextInputOptions,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TextInputOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &TextInputOptions {
        &self.options
    }

    /// Replaces the options; the text is kept and suggestions are cut to the new limit.
    pub fn set_options(&mut self, options: TextInputOptions) {
        self.options = options;
        self.suggestions.truncate(self.options.suggestion_limit);
    }

    pub fn set_placeholder(&mut self, placeholder: impl Into<String>) {
        self.options.placeholder = placeholder.into();
    }

    pub fn placeholder(&self) -> &str {
        &self.options.placeholder
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = self.sanitize(&text.into());
        self.cursor = self.text.chars().count();
        self.scroll_x = 0;
    }

    /// Parsed numeric value; `None` for empty or unparsable text.
    pub fn value_f64(&self) -> Option<f64> {
        self.text.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Sorted candidate values; truncated to the configured limit.
    pub fn set_suggestions(&mut self, suggestions: impl IntoIterator<Item = String>) {
        self.suggestions = suggestions
            .into_iter()
            .take(self.options.suggestion_limit)
            .collect();
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// First suggestion starting with the current text (case-insensitive) that would extend it.
    pub fn completion(&self) -> Option<&str> {
        if self.text.is_empty() {
            return None;
        }
        let needle = self.text.to_lowercase();
        self.suggestions
            .iter()
            .find(|s| s.len() > self.text.len() && s.to_lowercase().starts_with(&needle))
            .map(String::as_str)
    }

    pub fn input(&mut self, event: InputEvent) -> TextInputAction {
        if self.disabled {
            return TextInputAction::None;
        }
        match event {
            InputEvent::Paste(s) => {
                let s: String = s.chars().filter(|c| *c != '\n' && *c != '\r').collect();
                let s = self.sanitize(&s);
                if s.is_empty() {
                    return TextInputAction::None;
                }
                for ch in s.chars() {
                    self.insert_char(ch);
                }
                TextInputAction::Changed(self.text.clone())
            }
            InputEvent::Key(key) => self.handle_key(key),
            InputEvent::Mouse(_) => TextInputAction::None,
        }
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let mut style = if self.options.style == Style::default() {
            theme.text_primary
        } else {
            self.options.style
        };
        if self.focused {
            style = style.patch(theme.focused_input);
        }
        if self.disabled {
            style = style.patch(theme.stale);
        }
        buf.set_style(area, style);

        if self.text.is_empty() {
            let placeholder = render::truncate_with_ellipsis(&self.options.placeholder, area.width);
            render::render_str_clipped(
                area.x,
                area.y,
                0,
                area.width,
                buf,
                &placeholder,
                style.patch(theme.placeholder),
            );
            return;
        }

        self.ensure_cursor_visible(area.width);
        render::render_str_clipped(
            area.x,
            area.y,
            self.scroll_x,
            area.width,
            buf,
            &self.text,
            style,
        );
    }

    /// Screen position of the terminal cursor for this input, when focused and visible.
    pub fn cursor_pos(&self, area: Rect) -> Option<(u16, u16)> {
        if !self.focused || area.width == 0 || area.height == 0 {
            return None;
        }
        let x = self.cursor_display_x().saturating_sub(self.scroll_x);
        if x >= area.width as u32 {
            return None;
        }
        Some((area.x + x as u16, area.y))
    }

    fn handle_key(&mut self, key: KeyEvent) -> TextInputAction {
        if let Some(c) = key.typed_char() {
            if !self.accepts(c) {
                return TextInputAction::None;
            }
            self.insert_char(c);
            return TextInputAction::Changed(self.text.clone());
        }
        if key.modifiers.ctrl && key.code == KeyCode::Char('u') {
            if self.text.is_empty() {
                return TextInputAction::None;
            }
            self.set_text("");
            return TextInputAction::Changed(String::new());
        }
        match key.code {
            KeyCode::Backspace => {
                if self.cursor == 0 {
                    return TextInputAction::None;
                }
                self.cursor -= 1;
                self.remove_at_cursor();
                TextInputAction::Changed(self.text.clone())
            }
            KeyCode::Delete => {
                if self.cursor >= self.char_len() {
                    return TextInputAction::None;
                }
                self.remove_at_cursor();
                TextInputAction::Changed(self.text.clone())
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                TextInputAction::None
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.char_len());
                TextInputAction::None
            }
            KeyCode::Home => {
                self.cursor = 0;
                TextInputAction::None
            }
            KeyCode::End => {
                self.cursor = self.char_len();
                TextInputAction::None
            }
            KeyCode::Tab => match self.completion().map(str::to_string) {
                Some(s) => {
                    self.set_text(s);
                    TextInputAction::Changed(self.text.clone())
                }
                None => TextInputAction::None,
            },
            KeyCode::Enter => TextInputAction::Submitted(self.text.clone()),
            _ => TextInputAction::None,
        }
    }

    fn accepts(&self, c: char) -> bool {
        match self.options.kind {
            InputKind::Text => !c.is_control(),
            InputKind::Number => c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'),
        }
    }

    fn sanitize(&self, s: &str) -> String {
        s.chars().filter(|c| self.accepts(*c)).collect()
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(b, _)| b)
            .unwrap_or(self.text.len())
    }

    fn insert_char(&mut self, ch: char) {
        let b = self.byte_index(self.cursor);
        self.text.insert(b, ch);
        self.cursor += 1;
    }

    fn remove_at_cursor(&mut self) {
        let b = self.byte_index(self.cursor);
        if b < self.text.len() {
            self.text.remove(b);
        }
    }

    fn cursor_display_x(&self) -> u32 {
        self.text
            .chars()
            .take(self.cursor)
            .map(|c| UnicodeWidthChar::width(c).unwrap_or(0) as u32)
            .sum()
    }

    fn ensure_cursor_visible(&mut self, width: u16) {
        let cx = self.cursor_display_x();
        let w = width as u32;
        if cx < self.scroll_x {
            self.scroll_x = cx;
        } else if cx >= self.scroll_x + w {
            self.scroll_x = cx + 1 - w;
        }
    }
}

/// A [`TextInput`] whose change notifications are debounced.
///
/// Keystrokes are echoed immediately; [`DebouncedInput::poll`] yields the value only once typing
/// paused for the configured delay.
#[derive(Clone, Debug, Default)]
pub struct DebouncedInput {
    pub input: TextInput,
    debouncer: Debouncer<String>,
    external: String,
}

impl DebouncedInput {
    pub fn new(delay: Duration) -> Self {
        Self {
            input: TextInput::new(),
            debouncer: Debouncer::new(delay),
            external: String::new(),
        }
    }

    pub fn with_options(options: TextInputOptions, delay: Duration) -> Self {
        Self {
            input: TextInput::with_options(options),
            ..Self::new(delay)
        }
    }

    pub fn text(&self) -> &str {
        self.input.text()
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.debouncer.set_delay(delay);
    }

    /// Mirrors an externally owned value into the field when that value changes.
    pub fn sync_value(&mut self, value: &str) {
        if value == self.external {
            return;
        }
        self.external = value.to_string();
        if self.input.text() != value && !self.debouncer.is_pending() {
            self.input.set_text(value);
        }
    }

    pub fn handle_event(&mut self, event: InputEvent, now: Instant) -> TextInputAction {
        let action = self.input.input(event);
        match &action {
            TextInputAction::Changed(value) => self.debouncer.push(value.clone(), now),
            // Enter skips the remaining wait; callers pick the value up with `flush`.
            TextInputAction::Submitted(value) => self.debouncer.push(value.clone(), now),
            TextInputAction::None => {}
        }
        action
    }

    /// Returns the settled value once the debounce delay elapsed, if it differs from the last
    /// value reported.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let value = self.debouncer.poll(now)?;
        self.settle(value)
    }

    /// Returns the pending value immediately.
    pub fn flush(&mut self) -> Option<String> {
        let value = self.debouncer.flush()?;
        self.settle(value)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    fn settle(&mut self, value: String) -> Option<String> {
        if value == self.external {
            return None;
        }
        self.external = value.clone();
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyModifiers;

    fn key(code: KeyCode) -> InputEvent {
        InputEvent::Key(KeyEvent::new(code))
    }

    fn typed(input: &mut TextInput, s: &str) {
        for c in s.chars() {
            input.input(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn edits_at_cursor() {
        let mut t = TextInput::new();
        typed(&mut t, "helo");
        t.input(key(KeyCode::Left));
        typed(&mut t, "l");
        assert_eq!(t.text(), "hello");
        t.input(key(KeyCode::Home));
        t.input(key(KeyCode::Delete));
        assert_eq!(t.text(), "ello");
        t.input(key(KeyCode::End));
        t.input(key(KeyCode::Backspace));
        assert_eq!(t.text(), "ell");
    }

    #[test]
    fn ctrl_u_clears_and_ctrl_chars_are_ignored() {
        let mut t = TextInput::new();
        typed(&mut t, "abc");
        let ev = InputEvent::Key(
            KeyEvent::new(KeyCode::Char('a')).with_modifiers(KeyModifiers::ctrl()),
        );
        assert_eq!(t.input(ev), TextInputAction::None);
        let ev = InputEvent::Key(
            KeyEvent::new(KeyCode::Char('u')).with_modifiers(KeyModifiers::ctrl()),
        );
        assert_eq!(t.input(ev), TextInputAction::Changed(String::new()));
        assert!(t.is_empty());
    }

    #[test]
    fn number_inputs_reject_letters() {
        let mut t = TextInput::with_options(TextInputOptions {
            kind: InputKind::Number,
            ..Default::default()
        });
        typed(&mut t, "4x2.5");
        assert_eq!(t.text(), "42.5");
        assert_eq!(t.value_f64(), Some(42.5));
        t.input(InputEvent::Paste("1\n0".to_string()));
        assert_eq!(t.text(), "42.510");
    }

    #[test]
    fn disabled_input_ignores_keys() {
        let mut t = TextInput::new();
        t.set_disabled(true);
        assert_eq!(t.input(key(KeyCode::Char('a'))), TextInputAction::None);
        assert!(t.is_empty());
    }

    #[test]
    fn tab_completes_from_suggestions() {
        let mut t = TextInput::new();
        t.set_suggestions(vec![
            "complicated".to_string(),
            "relationship".to_string(),
            "single".to_string(),
        ]);
        typed(&mut t, "Re");
        assert_eq!(t.completion(), Some("relationship"));
        assert_eq!(
            t.input(key(KeyCode::Tab)),
            TextInputAction::Changed("relationship".to_string())
        );
        assert_eq!(t.completion(), None);
    }

    #[test]
    fn suggestions_are_limited() {
        let mut t = TextInput::with_options(TextInputOptions {
            suggestion_limit: 2,
            ..Default::default()
        });
        t.set_suggestions((0..10).map(|i| i.to_string()));
        assert_eq!(t.suggestions().len(), 2);
    }

    #[test]
    fn renders_placeholder_when_empty() {
        let mut t = TextInput::new();
        t.set_placeholder("Search data...");
        let area = Rect::new(0, 0, 10, 1);
        let mut buf = Buffer::empty(area);
        t.render(area, &mut buf, &Theme::default());
        let line: String = (0..10)
            .map(|x| buf.cell((x, 0)).map(|c| c.symbol()).unwrap_or(" "))
            .collect();
        assert_eq!(line, "Search da…");
    }

    #[test]
    fn long_text_scrolls_to_keep_cursor_visible() {
        let mut t = TextInput::new();
        t.set_focused(true);
        typed(&mut t, "abcdefghij");
        let area = Rect::new(0, 0, 4, 1);
        let mut buf = Buffer::empty(area);
        t.render(area, &mut buf, &Theme::default());
        let line: String = (0..4)
            .map(|x| buf.cell((x, 0)).map(|c| c.symbol()).unwrap_or(" "))
            .collect();
        assert_eq!(line, "hij ");
        assert_eq!(t.cursor_pos(area), Some((3, 0)));
    }

    #[test]
    fn debounced_input_reports_after_delay() {
        let t0 = Instant::now();
        let mut d = DebouncedInput::new(Duration::from_millis(500));
        for (i, c) in "joe".chars().enumerate() {
            d.handle_event(key(KeyCode::Char(c)), t0 + Duration::from_millis(i as u64 * 100));
        }
        assert_eq!(d.text(), "joe");
        assert_eq!(d.poll(t0 + Duration::from_millis(500)), None);
        assert_eq!(
            d.poll(t0 + Duration::from_millis(700)),
            Some("joe".to_string())
        );
        assert_eq!(d.poll(t0 + Duration::from_secs(10)), None);
    }

    #[test]
    fn debounced_input_skips_unchanged_values() {
        let t0 = Instant::now();
        let mut d = DebouncedInput::new(Duration::from_millis(10));
        d.handle_event(key(KeyCode::Char('a')), t0);
        d.handle_event(key(KeyCode::Backspace), t0);
        assert_eq!(d.flush(), None);
    }

    #[test]
    fn options_and_delay_change_at_runtime() {
        let t0 = Instant::now();
        let mut d = DebouncedInput::new(Duration::from_millis(500));
        d.input.set_suggestions(["a", "b", "c"].map(String::from));
        d.handle_event(key(KeyCode::Char('x')), t0);

        d.set_delay(Duration::from_millis(50));
        d.handle_event(key(KeyCode::Char('y')), t0);
        assert_eq!(d.deadline(), Some(t0 + Duration::from_millis(50)));

        d.input.set_options(TextInputOptions {
            suggestion_limit: 2,
            ..Default::default()
        });
        assert_eq!(d.input.suggestions(), ["a", "b"]);
        assert_eq!(d.text(), "xy");
    }

    #[test]
    fn sync_value_mirrors_external_changes() {
        let mut d = DebouncedInput::new(Duration::from_millis(10));
        d.sync_value("single");
        assert_eq!(d.text(), "single");
        d.sync_value("");
        assert_eq!(d.text(), "");
    }
}
