//! Catches rendering failures of a child component and shows a fallback instead.

use crate::render;
use crate::table::TableError;
use crate::theme::Theme;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use std::any::Any;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::sync::Mutex;
use std::sync::PoisonError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error("{0}")]
    Panic(String),

    #[error("{0}")]
    Message(String),
}

impl RenderError {
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

type ResetHook = Box<dyn FnMut() + Send>;

/// Serializes swaps of the process-wide panic hook.
static HOOK_LOCK: Mutex<()> = Mutex::new(());

/// Renders a child and, once it fails, keeps rendering a fallback until [`ErrorBoundary::reset`].
///
/// Both `Err` returns and panics raised by the child are captured.
#[derive(Default)]
pub struct ErrorBoundary {
    error: Option<RenderError>,
    on_reset: Option<ResetHook>,
}

impl std::fmt::Debug for ErrorBoundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorBoundary")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl ErrorBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_reset(mut self, hook: impl FnMut() + Send + 'static) -> Self {
        self.on_reset = Some(Box::new(hook));
        self
    }

    pub fn error(&self) -> Option<&RenderError> {
        self.error.as_ref()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Clears the captured error so the child is rendered again.
    pub fn reset(&mut self) {
        if self.error.take().is_none() {
            return;
        }
        tracing::info!("error boundary reset");
        if let Some(hook) = self.on_reset.as_mut() {
            hook();
        }
    }

    pub fn render<F>(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme, child: F)
    where
        F: FnOnce(Rect, &mut Buffer) -> Result<(), RenderError>,
    {
        if self.error.is_none() {
            let result = catch_quietly(|| child(area, buf))
                .unwrap_or_else(|panic| Err(RenderError::Panic(panic_message(&panic))));
            if let Err(err) = result {
                tracing::warn!(error = %err, "render failed; showing fallback");
                self.error = Some(err);
            }
        }
        if let Some(err) = &self.error {
            render_fallback(area, buf, theme, err);
        }
    }
}

fn render_fallback(area: Rect, buf: &mut Buffer, theme: &Theme, err: &RenderError) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    buf.set_style(area, theme.text_primary);
    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_symbol(" ");
            }
        }
    }
    let lines = [
        "Something went wrong:".to_string(),
        err.to_string(),
    ];
    for (dy, line) in lines.iter().enumerate().take(area.height as usize) {
        let text = render::truncate_with_ellipsis(line, area.width);
        let style = if dy == 0 { theme.text_primary } else { theme.danger };
        render::render_str_clipped(
            area.x,
            area.y + dy as u16,
            0,
            area.width,
            buf,
            &text,
            style,
        );
    }
}

/// Runs `f`, catching a panic without the default hook printing it over the terminal UI.
fn catch_quietly<R>(f: impl FnOnce() -> R) -> std::thread::Result<R> {
    let _guard = HOOK_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let previous = panic::take_hook();
    panic::set_hook(Box::new(|info| {
        tracing::debug!(%info, "panic caught by error boundary");
    }));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    panic::set_hook(previous);
    result
}

fn panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf.cell((x, y)).map(|c| c.symbol()).unwrap_or(" "))
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn renders_child_when_healthy() {
        let area = Rect::new(0, 0, 20, 2);
        let mut buf = Buffer::empty(area);
        let mut b = ErrorBoundary::new();
        b.render(area, &mut buf, &Theme::default(), |area, buf| {
            buf.set_string(area.x, area.y, "ok", ratatui::style::Style::default());
            Ok(())
        });
        assert!(!b.has_error());
        assert_eq!(row_text(&buf, 0), "ok");
    }

    #[test]
    fn shows_error_message_until_reset() {
        let area = Rect::new(0, 0, 30, 2);
        let mut buf = Buffer::empty(area);
        let resets = Arc::new(AtomicUsize::new(0));
        let counter = resets.clone();
        let mut b = ErrorBoundary::new().on_reset(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let theme = Theme::default();

        b.render(area, &mut buf, &theme, |_, _| Err(RenderError::msg("bad cell")));
        assert_eq!(row_text(&buf, 0), "Something went wrong:");
        assert_eq!(row_text(&buf, 1), "bad cell");
        assert_eq!(buf.cell((0, 1)).map(|c| c.fg), theme.danger.fg);

        // The child is not retried while the error is latched.
        let mut buf = Buffer::empty(area);
        b.render(area, &mut buf, &theme, |_, _| Ok(()));
        assert_eq!(row_text(&buf, 1), "bad cell");

        b.reset();
        assert_eq!(resets.load(Ordering::SeqCst), 1);
        let mut buf = Buffer::empty(area);
        b.render(area, &mut buf, &theme, |_, _| Ok(()));
        assert_eq!(row_text(&buf, 0), "");
    }

    #[test]
    fn catches_panics() {
        let area = Rect::new(0, 0, 30, 2);
        let mut buf = Buffer::empty(area);
        let mut b = ErrorBoundary::new();
        b.render(area, &mut buf, &Theme::default(), |_, _| panic!("kaboom"));
        assert_eq!(b.error(), Some(&RenderError::Panic("kaboom".to_string())));
        assert_eq!(row_text(&buf, 1), "kaboom");
    }

    #[test]
    fn caught_panics_skip_the_installed_hook_and_restore_it() {
        let calls = Arc::new(AtomicUsize::new(0));
        let previous = {
            let _guard = HOOK_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
            let previous = panic::take_hook();
            let counter = calls.clone();
            panic::set_hook(Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
            previous
        };

        let area = Rect::new(0, 0, 30, 2);
        let mut buf = Buffer::empty(area);
        let mut b = ErrorBoundary::new();
        b.render(area, &mut buf, &Theme::default(), |_, _| panic!("quiet"));
        assert!(b.has_error());

        let _guard = HOOK_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let outside = panic::catch_unwind(|| -> u8 { panic!("loud") });
        panic::set_hook(previous);
        assert!(outside.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn table_errors_convert() {
        let err: RenderError = TableError::UnknownColumn("foo".into()).into();
        assert_eq!(err.to_string(), "unknown column `foo`");
    }
}
