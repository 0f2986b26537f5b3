use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui_datatable::DataTable;
use ratatui_datatable::Focus;
use ratatui_datatable::input::InputEvent;
use ratatui_datatable::input::KeyCode;
use ratatui_datatable::input::KeyEvent;
use ratatui_datatable::input::MouseButton;
use ratatui_datatable::input::MouseEvent;
use ratatui_datatable::input::MouseEventKind;
use ratatui_datatable::person::make_data_with_rng;
use ratatui_datatable::person::person_columns;
use ratatui_datatable::table::CellError;
use ratatui_datatable::table::CellValue;
use ratatui_datatable::table::ColumnDef;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Instant;

const W: u16 = 100;
const H: u16 = 20;
const FOOTER_Y: u16 = H - 2;
const FIRST_BODY_Y: u16 = 4;

struct Item {
    name: String,
    qty: i64,
}

fn items(range: std::ops::Range<i64>) -> Vec<Item> {
    range
        .map(|i| Item {
            name: format!("item {i}"),
            qty: i,
        })
        .collect()
}

fn columns() -> Vec<ColumnDef<Item>> {
    vec![
        ColumnDef::accessor("name", |i: &Item| CellValue::from(i.name.as_str())),
        ColumnDef::accessor("qty", |i: &Item| CellValue::from(i.qty)),
    ]
}

fn render(dt: &mut DataTable<Item>) -> Buffer {
    let mut buf = Buffer::empty(Rect::new(0, 0, W, H));
    dt.render(buf.area, &mut buf);
    buf
}

fn row_text(buf: &Buffer, y: u16) -> String {
    (0..buf.area.width)
        .map(|x| buf.cell((x, y)).map(|c| c.symbol()).unwrap_or(" "))
        .collect()
}

fn key(c: char) -> InputEvent {
    InputEvent::Key(KeyEvent::new(KeyCode::Char(c)))
}

fn mouse(x: u16, y: u16, kind: MouseEventKind) -> InputEvent {
    InputEvent::Mouse(MouseEvent::new(x, y, kind))
}

fn click(x: u16, y: u16) -> InputEvent {
    mouse(x, y, MouseEventKind::Down(MouseButton::Left))
}

#[test]
fn renders_toolbar_header_filters_and_footer() {
    let mut dt = DataTable::new(columns(), items(0..350));
    let buf = render(&mut dt);

    let toolbar = row_text(&buf, 0);
    assert!(toolbar.starts_with("Search data..."), "{toolbar}");
    assert!(toolbar.contains("[Select all]"), "{toolbar}");
    assert!(!toolbar.contains("rows selected"), "{toolbar}");

    assert!(row_text(&buf, 1).starts_with("name"));
    assert!(row_text(&buf, 1).contains("qty"));
    let min_row = row_text(&buf, 2);
    assert!(min_row.starts_with("Search... (350)"), "{min_row}");
    assert!(min_row.contains("Min "), "{min_row}");
    assert!(row_text(&buf, 3).contains("Max (349)"));
    assert!(row_text(&buf, FIRST_BODY_Y).starts_with("item 0"));
    // Only the rows on screen (plus overscan) are materialised, not the whole page.
    let visible = dt.grid().visible_rows();
    assert_eq!(visible.start, 0);
    assert!(visible.len() < 30, "{visible:?}");

    let footer = row_text(&buf, FOOTER_Y);
    assert!(footer.starts_with("[<<] [<] [>] [>>] 350 record(s)"), "{footer}");
    assert!(footer.contains("Page 1"), "{footer}");
    assert!(footer.contains("of 4"), "{footer}");
    assert!(footer.contains("[Show 100]"), "{footer}");
}

#[test]
fn header_click_sorts_after_tick() {
    let t0 = Instant::now();
    let mut dt = DataTable::new(columns(), items(0..350));
    render(&mut dt);

    dt.handle_event(click(23, 1), t0);
    let buf = render(&mut dt);
    assert!(row_text(&buf, FIRST_BODY_Y).starts_with("item 0"));

    assert!(dt.tick(t0));
    let buf = render(&mut dt);
    assert!(row_text(&buf, 1).contains("qty ▼"), "{}", row_text(&buf, 1));
    assert!(row_text(&buf, FIRST_BODY_Y).starts_with("item 349"));
}

#[test]
fn shift_click_adds_a_sort_key_with_its_index() {
    let t0 = Instant::now();
    let mut dt = DataTable::new(columns(), items(0..10));
    render(&mut dt);

    dt.handle_event(click(1, 1), t0);
    let mut shifted = MouseEvent::new(23, 1, MouseEventKind::Down(MouseButton::Left));
    shifted.modifiers.shift = true;
    dt.handle_event(InputEvent::Mouse(shifted), t0);
    dt.tick(t0);

    let header = row_text(&render(&mut dt), 1);
    assert!(header.contains("name ▲1"), "{header}");
    assert!(header.contains("qty ▼2"), "{header}");
}

#[test]
fn search_settles_then_applies_on_the_following_tick() {
    let t0 = Instant::now();
    let mut dt = DataTable::new(columns(), items(0..350));
    render(&mut dt);
    dt.handle_event(click(2, 0), t0);
    assert_eq!(dt.focus(), Focus::Search);
    dt.handle_event(key('2'), t0);
    dt.handle_event(key('9'), t0);
    dt.handle_event(key('9'), t0);

    let settled = t0 + dt.options().debounce;
    assert!(dt.tick(settled));
    assert!(dt.is_stale());
    let buf = render(&mut dt);
    assert!(row_text(&buf, 0).starts_with("299"));
    assert!(row_text(&buf, FOOTER_Y).contains("350 record(s)"));

    // Select all is disabled while the results are stale.
    dt.handle_event(click(30, 0), settled);
    dt.tick(settled);
    assert!(dt.table().state().row_selection.is_empty());

    let buf = render(&mut dt);
    assert!(!dt.is_stale());
    assert!(row_text(&buf, FOOTER_Y).contains(" 1 record(s)"));
    assert!(row_text(&buf, FIRST_BODY_Y).starts_with("item 299"));
}

#[test]
fn filter_hints_follow_the_global_filter() {
    let t0 = Instant::now();
    let mut dt = DataTable::new(columns(), items(0..350));
    render(&mut dt);
    dt.handle_event(click(2, 0), t0);
    for c in "299".chars() {
        dt.handle_event(key(c), t0);
    }
    dt.flush(t0);
    assert_eq!(dt.table().global_filter(), "299");

    let buf = render(&mut dt);
    let min_row = row_text(&buf, 2);
    assert!(min_row.starts_with("Search... (1)"), "{min_row}");
    assert!(min_row.contains("Min (299)"), "{min_row}");
    assert!(row_text(&buf, 3).contains("Max (299)"));
}

#[test]
fn empty_data_renders_without_pages() {
    let t0 = Instant::now();
    let mut dt = DataTable::new(columns(), items(0..0));
    let buf = render(&mut dt);
    assert_eq!(dt.table().page_count(), 0);
    let footer = row_text(&buf, FOOTER_Y);
    assert!(footer.starts_with("[<<] [<] [>] [>>] 0 record(s)"), "{footer}");
    assert!(footer.contains("of 0"), "{footer}");
    assert!(row_text(&buf, 2).starts_with("Search... (0)"));

    for c in ['}', ']', ' ', 's', 'a'] {
        dt.handle_event(key(c), t0);
    }
    dt.tick(t0);
    let buf = render(&mut dt);
    assert!(dt.error().is_none());
    assert_eq!(dt.table().pagination().page_index, 0);
    assert!(row_text(&buf, FOOTER_Y).contains("0 record(s)"));
}

#[test]
fn select_all_and_clear() {
    let t0 = Instant::now();
    let mut dt = DataTable::new(columns(), items(0..350));
    render(&mut dt);

    dt.handle_event(click(30, 0), t0);
    dt.tick(t0);
    let buf = render(&mut dt);
    let toolbar = row_text(&buf, 0);
    assert!(toolbar.contains("350 rows selected"), "{toolbar}");

    let x = toolbar
        .find("[✕]")
        .map(|byte| toolbar[..byte].chars().count() as u16)
        .unwrap_or_default();
    dt.handle_event(click(x + 1, 0), t0);
    dt.tick(t0);
    assert!(dt.table().state().row_selection.is_empty());
    assert!(!row_text(&render(&mut dt), 0).contains("rows selected"));
}

#[test]
fn footer_buttons_and_page_size() {
    let t0 = Instant::now();
    let mut dt = DataTable::new(columns(), items(0..350));
    render(&mut dt);

    // `[<]` is disabled on the first page.
    dt.handle_event(click(6, FOOTER_Y), t0);
    assert_eq!(dt.table().pagination().page_index, 0);

    dt.handle_event(click(10, FOOTER_Y), t0);
    let buf = render(&mut dt);
    assert!(row_text(&buf, FOOTER_Y).contains("Page 2"));
    assert!(row_text(&buf, FIRST_BODY_Y).starts_with("item 100"));

    dt.handle_event(click(14, FOOTER_Y), t0);
    let buf = render(&mut dt);
    assert!(row_text(&buf, FOOTER_Y).contains("Page 4"));

    let footer = row_text(&buf, FOOTER_Y);
    let x = footer
        .find("[Show")
        .map(|byte| footer[..byte].chars().count() as u16)
        .unwrap_or_default();
    dt.handle_event(click(x + 1, FOOTER_Y), t0);
    let footer = row_text(&render(&mut dt), FOOTER_Y);
    assert!(footer.contains("[Show 200]"), "{footer}");
    assert!(footer.contains("of 2"), "{footer}");
}

#[test]
fn typed_range_filter_narrows_rows() {
    let t0 = Instant::now();
    let mut dt = DataTable::new(columns(), items(0..350));
    render(&mut dt);

    dt.handle_event(click(23, 3), t0);
    assert_eq!(dt.focus(), Focus::Filter { column: 1, slot: 1 });
    dt.handle_event(key('4'), t0);
    dt.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Enter)), t0);
    dt.tick(t0);

    let buf = render(&mut dt);
    assert!(row_text(&buf, FOOTER_Y).contains(" 5 record(s)"));
    assert!(row_text(&buf, 3).contains('4'));
    assert_eq!(dt.cursor_position(), Some((22, 3)));
}

#[test]
fn drag_resize_moves_a_marker_then_commits() {
    let t0 = Instant::now();
    let mut dt = DataTable::new(columns(), items(0..10));
    render(&mut dt);

    dt.handle_event(click(20, 1), t0);
    dt.handle_event(mouse(26, 1, MouseEventKind::Drag(MouseButton::Left)), t0);
    let buf = render(&mut dt);
    assert_eq!(buf.cell((26, FIRST_BODY_Y)).map(|c| c.symbol()), Some("┃"));
    assert_eq!(dt.table().column_size(0), 20);

    dt.handle_event(mouse(26, 1, MouseEventKind::Up(MouseButton::Left)), t0);
    assert_eq!(dt.table().column_size(0), 26);
    let buf = render(&mut dt);
    assert_eq!(buf.cell((27, 1)).map(|c| c.symbol()), Some("q"));
}

#[test]
fn cursor_follows_the_focused_input() {
    let t0 = Instant::now();
    let mut dt = DataTable::new(columns(), items(0..10));
    dt.handle_event(key('/'), t0);
    dt.handle_event(key('a'), t0);
    dt.handle_event(key('b'), t0);
    render(&mut dt);
    assert_eq!(dt.cursor_position(), Some((2, 0)));

    dt.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Esc)), t0);
    render(&mut dt);
    assert_eq!(dt.cursor_position(), None);
}

#[test]
fn formatter_errors_show_the_fallback_until_reset() {
    let resets = Arc::new(AtomicUsize::new(0));
    let counter = resets.clone();
    let cols = vec![
        ColumnDef::accessor("name", |i: &Item| CellValue::from(i.name.as_str())),
        ColumnDef::accessor("qty", |i: &Item| CellValue::from(i.qty)).cell(|v| match v {
            CellValue::Int(7) => Err(CellError::new("seven is not allowed")),
            other => Ok(other.to_string()),
        }),
    ];
    let mut dt = DataTable::new(cols, items(0..10)).on_reset(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let t0 = Instant::now();

    let buf = render(&mut dt);
    assert!(row_text(&buf, 0).starts_with("Something went wrong:"));
    assert!(row_text(&buf, 1).contains("seven is not allowed"));
    assert!(dt.error().is_some());
    assert_eq!(dt.handle_event(key(']'), t0), ratatui_datatable::DataTableAction::None);

    dt.set_data(items(10..20));
    dt.handle_event(key('R'), t0);
    assert_eq!(resets.load(Ordering::SeqCst), 1);
    let buf = render(&mut dt);
    assert!(dt.error().is_none());
    assert!(row_text(&buf, FIRST_BODY_Y).starts_with("item 10"));
}

#[test]
fn formatter_panics_are_caught() {
    let cols = vec![
        ColumnDef::accessor("qty", |i: &Item| CellValue::from(i.qty))
            .cell(|_| -> Result<String, CellError> { panic!("formatter exploded") }),
    ];
    let mut dt = DataTable::new(cols, items(0..3));
    let buf = render(&mut dt);
    assert!(row_text(&buf, 0).starts_with("Something went wrong:"));
    assert!(row_text(&buf, 1).contains("formatter exploded"));
}

#[test]
fn renders_the_people_demo() {
    let data = make_data_with_rng(500, &mut StdRng::seed_from_u64(42));
    let mut dt = DataTable::new(person_columns(), data);
    let mut buf = Buffer::empty(Rect::new(0, 0, 160, 24));
    dt.render(buf.area, &mut buf);

    let header = row_text(&buf, 1);
    for title in ["ID", "firstName", "Last Name", "Age", "Visits", "Status", "Created At"] {
        assert!(header.contains(title), "{title} missing from {header}");
    }
    assert!(row_text(&buf, 2).contains("Search... (3)"));
    assert!(row_text(&buf, 22).contains("500 record(s)"));
    assert!(dt.error().is_none());
}
