// CSV roster import and plan export.
//
// The input is the organizers' spreadsheet export: `;`-separated, one row
// per person, columns Persoon / aantal / MC / Ronde 1 / Ronde 2 / Ronde 3.
// MC and the solved-round columns are optional; Ronde 3 must be present and
// filled for every row. Files are often saved from Excel, so non-UTF-8
// bytes are decoded as Windows-1252.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::model::entity::{Person, PersonId, Round, Roster, TableId};
use crate::model::plan::Plan;
use crate::model::table;

const DELIMITER: u8 = b';';

const PERSON_COLUMN: &str = "Persoon";
const HOUSEHOLD_COLUMN: &str = "aantal";
const MC_COLUMN: &str = "MC";
const ROUND_COLUMNS: [&str; 3] = ["Ronde 1", "Ronde 2", "Ronde 3"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("row {row}: no value in column '{column}'")]
    MissingValue { row: usize, column: &'static str },
    #[error("row {row}: '{value}' is not a valid {column}")]
    BadValue {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("row {row}: duplicate person id {person}")]
    DuplicatePerson { row: usize, person: PersonId },
    #[error("row {row}: table {table} is not part of the venue")]
    UnknownTable { row: usize, table: TableId },
    #[error("row {row}: person {person} has no 'Ronde 3' table")]
    MissingFixedRound { row: usize, person: PersonId },
}

pub fn load_roster(path: &Path) -> Result<Roster, LoadError> {
    let content = read_file_as_utf8(path)?;
    parse_roster(&content)
}

/// Read file and convert to UTF-8 if needed (Excel exports are commonly
/// Windows-1252).
fn read_file_as_utf8(path: &Path) -> Result<String, LoadError> {
    let io_err = |source| LoadError::Io {
        path: path.display().to_string(),
        source,
    };

    let mut bytes = Vec::new();
    let mut file = std::fs::File::open(path).map_err(io_err)?;
    file.read_to_end(&mut bytes).map_err(io_err)?;

    // Try UTF-8 first; on failure, recover the buffer from the error.
    match String::from_utf8(bytes) {
        Ok(content) => Ok(content),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

pub fn parse_roster(content: &str) -> Result<Roster, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|header| header.trim() == name);

    let person_col = column(PERSON_COLUMN).ok_or(LoadError::MissingColumn(PERSON_COLUMN))?;
    let household_col =
        column(HOUSEHOLD_COLUMN).ok_or(LoadError::MissingColumn(HOUSEHOLD_COLUMN))?;
    let mc_col = column(MC_COLUMN);
    let round_cols = ROUND_COLUMNS.map(column);
    if round_cols[Round::FIXED.index()].is_none() {
        return Err(LoadError::MissingColumn(ROUND_COLUMNS[Round::FIXED.index()]));
    }

    let mut people = Vec::new();
    let mut seen = HashSet::new();

    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let row = index + 2; // 1-based, after the header line

        let id: PersonId = parse_required(&record, person_col, PERSON_COLUMN, row)?;
        if !seen.insert(id) {
            return Err(LoadError::DuplicatePerson { row, person: id });
        }

        let household: u32 = parse_required(&record, household_col, HOUSEHOLD_COLUMN, row)?;
        if household == 0 {
            return Err(LoadError::BadValue {
                row,
                column: HOUSEHOLD_COLUMN,
                value: "0".to_string(),
            });
        }

        let mut person = Person::new(id, household);
        if let Some(col) = mc_col {
            person.mc = parse_optional(&record, col, MC_COLUMN, row)?;
        }

        for (round, (col, name)) in Round::ALL.into_iter().zip(round_cols.iter().zip(ROUND_COLUMNS))
        {
            let Some(col) = col else { continue };
            if let Some(table) = parse_optional::<TableId>(&record, *col, name, row)? {
                if table::capacity(table) == 0 {
                    return Err(LoadError::UnknownTable { row, table });
                }
                person.fix_table(round, table);
            }
        }
        if person.fixed_table(Round::FIXED).is_none() {
            return Err(LoadError::MissingFixedRound { row, person: id });
        }

        people.push(person);
    }

    Ok(Roster::new(people))
}

/// Writes the roster back in its input shape, with every round column filled
/// from the plan. Row order follows the input.
pub fn save_plan(roster: &Roster, plan: &Plan, path: &Path) -> Result<(), LoadError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_path(path)?;

    writer.write_record([
        PERSON_COLUMN,
        HOUSEHOLD_COLUMN,
        MC_COLUMN,
        ROUND_COLUMNS[0],
        ROUND_COLUMNS[1],
        ROUND_COLUMNS[2],
    ])?;

    for person in roster.people() {
        let mut fields = vec![
            person.id.to_string(),
            person.household.to_string(),
            person.mc.map(|mc| mc.to_string()).unwrap_or_default(),
        ];
        for round in Round::ALL {
            let table = plan.round(round).table_of(person.id);
            fields.push(table.map(|t| t.to_string()).unwrap_or_default());
        }
        writer.write_record(&fields)?;
    }

    writer.flush().map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn field<'r>(record: &'r csv::StringRecord, col: usize) -> &'r str {
    record.get(col).unwrap_or("").trim()
}

fn parse_required<T: FromStr>(
    record: &csv::StringRecord,
    col: usize,
    column: &'static str,
    row: usize,
) -> Result<T, LoadError> {
    let raw = field(record, col);
    if raw.is_empty() {
        return Err(LoadError::MissingValue { row, column });
    }
    raw.parse().map_err(|_| LoadError::BadValue {
        row,
        column,
        value: raw.to_string(),
    })
}

fn parse_optional<T: FromStr>(
    record: &csv::StringRecord,
    col: usize,
    column: &'static str,
    row: usize,
) -> Result<Option<T>, LoadError> {
    let raw = field(record, col);
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(|_| LoadError::BadValue {
        row,
        column,
        value: raw.to_string(),
    })
}
