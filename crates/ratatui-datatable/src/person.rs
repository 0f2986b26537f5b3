//! Demo dataset: randomly generated people.

use chrono::DateTime;
use chrono::Local;
use chrono::NaiveDateTime;
use chrono::TimeZone;
use rand::Rng;
use rand::seq::IndexedRandom;
use ratatui_datatable_core::table::CellError;
use ratatui_datatable_core::table::CellValue;
use ratatui_datatable_core::table::ColumnDef;

const FIRST_NAMES: &[&str] = &[
    "Tanner", "Kevin", "Joe", "Tandy", "Derek", "Alice", "Bryce", "Camila", "Dana", "Elliot",
    "Farah", "Gus", "Hana", "Ivan", "Jada", "Kofi", "Lena", "Mateo", "Nia", "Omar", "Priya",
    "Quinn", "Rosa", "Sven", "Tomas", "Uma", "Vera", "Wes", "Xena", "Yusuf", "Zoe",
];

const LAST_NAMES: &[&str] = &[
    "Linsley", "Vandy", "Dirte", "Miller", "Perry", "Anderson", "Brooks", "Castillo", "Dubois",
    "Eriksen", "Fischer", "Garcia", "Haddad", "Ito", "Jensen", "Kowalski", "Larsen", "Moreau",
    "Nakamura", "Okafor", "Petrov", "Quispe", "Rossi", "Schmidt", "Tanaka", "Ueda", "Varga",
    "Weber", "Xu", "Yilmaz", "Zhang",
];

/// 2015-01-01T00:00:00Z
const CREATED_FROM: i64 = 1_420_070_400;
/// 2025-01-01T00:00:00Z
const CREATED_TO: i64 = 1_735_689_600;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    Relationship,
    Complicated,
    Single,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Relationship, Status::Complicated, Status::Single];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Relationship => "relationship",
            Status::Complicated => "complicated",
            Status::Single => "single",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Person {
    pub id: u32,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub visits: u32,
    pub progress: u32,
    pub status: Status,
    /// UTC.
    pub created_at: NaiveDateTime,
}

/// Generates `len` people using the thread-local RNG.
pub fn make_data(len: usize) -> Vec<Person> {
    make_data_with_rng(len, &mut rand::rng())
}

/// Generates `len` people from `rng`; a seeded RNG yields the same dataset every time.
pub fn make_data_with_rng<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<Person> {
    (0..len).map(|i| new_person(i as u32, rng)).collect()
}

fn new_person<R: Rng + ?Sized>(id: u32, rng: &mut R) -> Person {
    let created = rng.random_range(CREATED_FROM..CREATED_TO);
    Person {
        id,
        first_name: pick(FIRST_NAMES, rng).to_string(),
        last_name: pick(LAST_NAMES, rng).to_string(),
        age: rng.random_range(0..40),
        visits: rng.random_range(0..1000),
        progress: rng.random_range(0..100),
        status: *Status::ALL.choose(rng).unwrap_or(&Status::Single),
        created_at: DateTime::from_timestamp(created, 0)
            .map(|d| d.naive_utc())
            .unwrap_or_default(),
    }
}

fn pick<'a, R: Rng + ?Sized>(items: &'a [&'a str], rng: &mut R) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

/// Column set of the people demo: id, names, age, visits, status, profile progress and the
/// creation time rendered in the local time zone.
pub fn person_columns() -> Vec<ColumnDef<Person>> {
    vec![
        ColumnDef::accessor("id", |p: &Person| p.id.into())
            .header("ID")
            .size(6),
        ColumnDef::accessor("firstName", |p: &Person| p.first_name.as_str().into()),
        ColumnDef::accessor("lastName", |p: &Person| p.last_name.as_str().into())
            .header("Last Name"),
        ColumnDef::accessor("age", |p: &Person| p.age.into())
            .header("Age")
            .size(5),
        ColumnDef::accessor("visits", |p: &Person| p.visits.into())
            .header("Visits")
            .size(6),
        ColumnDef::accessor("status", |p: &Person| p.status.as_str().into()).header("Status"),
        ColumnDef::accessor("progress", |p: &Person| p.progress.into())
            .header("Profile Progress")
            .size(8),
        ColumnDef::accessor("createdAt", |p: &Person| p.created_at.into())
            .header("Created At")
            .size(22)
            .cell(format_local_datetime),
    ]
}

fn format_local_datetime(value: &CellValue) -> Result<String, CellError> {
    match value {
        CellValue::DateTime(utc) => Ok(Local
            .from_utc_datetime(utc)
            .format("%-m/%-d/%Y, %-I:%M:%S %p")
            .to_string()),
        CellValue::Empty => Ok(String::new()),
        other => Err(CellError::new(format!("expected a date, got `{other}`"))),
    }
}
