use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui_datatable::DataTable;
use ratatui_datatable::DataTableAction;
use ratatui_datatable::Focus;
use ratatui_datatable::crossterm_input::input_event_from_crossterm;
use ratatui_datatable::input::InputEvent;
use ratatui_datatable::input::KeyCode;
use ratatui_datatable::person::Person;
use ratatui_datatable::person::make_data;
use ratatui_datatable::person::person_columns;
use std::fs::File;
use std::io;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const DEFAULT_ROWS: usize = 50_000;
const IDLE_POLL: Duration = Duration::from_millis(250);

fn main() -> io::Result<()> {
    init_logging()?;

    let rows = std::env::var("DATATABLE_ROWS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_ROWS);
    let started = Instant::now();
    let data = make_data(rows);
    tracing::info!(
        rows,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "generated demo data"
    );
    let mut table = DataTable::new(person_columns(), data)
        .on_reset(|| tracing::info!("table reset after an error"));

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    crossterm::execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal, &mut table);

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    res
}

/// Logs go to a file; the terminal is owned by the table.
fn init_logging() -> io::Result<()> {
    let path = std::env::temp_dir().join("ratatui-datatable-people.log");
    let file = File::create(&path)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ratatui_datatable=info,ratatui_datatable_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    tracing::info!(path = %path.display(), "logging initialized");
    Ok(())
}

fn run<B: ratatui::backend::Backend<Error = io::Error>>(
    terminal: &mut Terminal<B>,
    table: &mut DataTable<Person>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| {
            table.render(f.area(), f.buffer_mut());
            if let Some((x, y)) = table.cursor_position() {
                f.set_cursor_position((x, y));
            }
        })?;

        let timeout = table
            .next_deadline()
            .map(|d| d.saturating_duration_since(Instant::now()))
            .unwrap_or(IDLE_POLL);

        // Drain everything that is queued so typing is echoed before expensive updates run.
        let mut ready = crossterm::event::poll(timeout)?;
        while ready {
            let Some(ev) = input_event_from_crossterm(crossterm::event::read()?) else {
                ready = crossterm::event::poll(Duration::ZERO)?;
                continue;
            };
            if is_quit(&ev, table.focus()) {
                return Ok(());
            }
            if let DataTableAction::Activated { row, column } =
                table.handle_event(ev, Instant::now())
            {
                tracing::info!(row, column, "cell activated");
            }
            ready = crossterm::event::poll(Duration::ZERO)?;
        }

        table.tick(Instant::now());
    }
}

fn is_quit(ev: &InputEvent, focus: Focus) -> bool {
    let InputEvent::Key(key) = ev else {
        return false;
    };
    match key.code {
        KeyCode::Char('c') => key.modifiers.ctrl,
        KeyCode::Char('q') => focus == Focus::Grid && !key.modifiers.ctrl && !key.modifiers.alt,
        _ => false,
    }
}
