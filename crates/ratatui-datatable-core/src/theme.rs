use ratatui::style::Modifier;
use ratatui::style::Style;

#[derive(Clone, Debug)]
pub struct Theme {
    pub text_primary: Style,
    pub text_muted: Style,
    pub accent: Style,
    pub danger: Style,
    /// Rows the user selected.
    pub selected_row: Style,
    /// Applied on top of everything while a deferred update is pending.
    pub stale: Style,
    pub placeholder: Style,
    pub focused_input: Style,
}

impl Default for Theme {
    fn default() -> Self {
        use ratatui::style::Stylize;

        Self {
            text_primary: Style::default(),
            text_muted: Style::default().dark_gray(),
            accent: Style::default().cyan(),
            danger: Style::default().red(),
            selected_row: Style::default().white().on_blue(),
            stale: Style::default().add_modifier(Modifier::DIM),
            placeholder: Style::default().dark_gray(),
            focused_input: Style::default().add_modifier(Modifier::UNDERLINED),
        }
    }
}
