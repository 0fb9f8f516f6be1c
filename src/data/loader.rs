use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::analysis::round_to;
use crate::error::DataIntegrityError;

use super::countries::iso_code;
use super::model::{Column, HumanDevelopment, Record, Table};

/// Cell contents treated as missing, besides the empty string.
const NA_MARKERS: [&str; 5] = ["NA", "N/A", "NaN", "nan", "null"];

/// Columns the raw file must provide. `ISO` is derived, never read.
const SOURCE_COLUMNS: [Column; 11] = [
    Column::Country,
    Column::HumanDevelopment,
    Column::Gii,
    Column::Rank,
    Column::MaternalMortality,
    Column::AdolescentBirthRate,
    Column::SeatsParliament,
    Column::FSecondaryEduc,
    Column::MSecondaryEduc,
    Column::FLabourForce,
    Column::MLabourForce,
];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Open the dataset at `path` and prepare it.
pub fn prepare_dataset(path: &Path) -> Result<Table, DataIntegrityError> {
    let file = File::open(path)?;
    let table = prepare(file)?;
    log::info!("Loaded {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Build the prepared [`Table`] from a delimited text source.
///
/// Steps, in order:
/// 1. locate every expected column in the header (extra columns are ignored);
/// 2. resolve `Country` to an ISO code;
/// 3. drop rows with any missing cell, unresolved ISO included;
/// 4. coerce `Human_development` to its closed domain;
/// 5. coerce the numeric columns to `f64`, quantized to two decimals.
///
/// Missing cells drop their row silently. A non-empty cell that does not
/// coerce fails the whole load, so no partial table is ever returned.
pub fn prepare<R: Read>(source: R) -> Result<Table, DataIntegrityError> {
    let mut reader = csv::Reader::from_reader(source);
    let headers = reader.headers()?.clone();

    let mut indices = [0usize; SOURCE_COLUMNS.len()];
    for (slot, column) in indices.iter_mut().zip(SOURCE_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == column.name())
            .ok_or_else(|| DataIntegrityError::MissingColumn(column.name().to_string()))?;
    }
    for extra in headers
        .iter()
        .filter(|h| SOURCE_COLUMNS.iter().all(|c| c.name() != *h))
    {
        log::debug!("Ignoring extra column '{extra}'");
    }

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for result in reader.records() {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        let cells: Vec<&str> = indices
            .iter()
            .map(|&i| row.get(i).unwrap_or(""))
            .collect();

        let country = cells[0];
        let iso = if is_missing(country) {
            None
        } else {
            iso_code(country)
        };
        let Some(iso) = iso else {
            dropped += 1;
            continue;
        };
        if cells.iter().any(|c| is_missing(c)) {
            dropped += 1;
            continue;
        }

        let human_development =
            HumanDevelopment::from_label(cells[1]).ok_or_else(|| {
                DataIntegrityError::InvalidValue {
                    line,
                    column: Column::HumanDevelopment.name().to_string(),
                    value: cells[1].to_string(),
                }
            })?;

        let mut numbers = [0.0; 9];
        for ((slot, column), raw) in numbers.iter_mut().zip(Column::NUMERIC).zip(&cells[2..]) {
            *slot = parse_number(raw).ok_or_else(|| DataIntegrityError::InvalidValue {
                line,
                column: column.name().to_string(),
                value: raw.to_string(),
            })?;
        }

        records.push(Record {
            country: country.to_string(),
            iso: iso.to_string(),
            human_development,
            numbers,
        });
    }

    log::info!("Prepared {} rows ({dropped} dropped)", records.len());
    Ok(Table::from_records(records))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn is_missing(cell: &str) -> bool {
    let cell = cell.trim();
    cell.is_empty() || NA_MARKERS.contains(&cell)
}

fn parse_number(cell: &str) -> Option<f64> {
    let value = cell.trim().parse::<f64>().ok()?;
    value.is_finite().then(|| round_to(value, 2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const HEADER: &str = "Country,Human_development,GII,Rank,Maternal_mortality,\
Adolescent_birth_rate,Seats_parliament,F_secondary_educ,M_secondary_educ,\
F_Labour_force,M_Labour_force";

    fn csv_with(rows: &[&str]) -> String {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text.push('\n');
        text
    }

    #[test]
    fn keeps_complete_rows_and_derives_iso() {
        let text = csv_with(&[
            "Iceland,Very high,0.043,8,4,5.4,47.6,99.8,99.7,61.7,70.5",
            "Sweden,Very high,0.023,4,5,3.3,47,91.8,92.2,61.7,68",
        ]);
        let table = prepare(text.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        let first = &table.records()[0];
        assert_eq!(first.iso, "ISL");
        assert_eq!(first.human_development, HumanDevelopment::VeryHigh);
        assert_eq!(first.number(Column::Gii), Some(0.04));
        assert_eq!(first.number(Column::Rank), Some(8.0));
    }

    #[test]
    fn drops_unresolved_and_incomplete_rows() {
        let text = csv_with(&[
            "Iceland,Very high,0.043,8,4,5.4,47.6,99.8,99.7,61.7,70.5",
            "Bolivia (Plurinational State of),Medium,0.418,117,161,64.9,48.2,53.1,62.7,69.7,83.6",
            "Sweden,Very high,,4,5,3.3,47,91.8,92.2,61.7,68",
            "Norway,Very high,0.016,2,2,2.3,45,99.1,99.3,60.3,72,",
            "Chad,Low,0.652,165,1140,NA,32.3,1.6,4.8,46.9,69.9",
        ]);
        // The Norway row has a trailing empty field, which is a ragged record.
        assert!(matches!(
            prepare(text.as_bytes()),
            Err(DataIntegrityError::Csv(_))
        ));

        let text = csv_with(&[
            "Iceland,Very high,0.043,8,4,5.4,47.6,99.8,99.7,61.7,70.5",
            "Bolivia (Plurinational State of),Medium,0.418,117,161,64.9,48.2,53.1,62.7,69.7,83.6",
            "Sweden,Very high,,4,5,3.3,47,91.8,92.2,61.7,68",
            "Chad,Low,0.652,165,1140,NA,32.3,1.6,4.8,46.9,69.9",
        ]);
        let table = prepare(text.as_bytes()).unwrap();
        let isos: Vec<&str> = table.records().iter().map(|r| r.iso.as_str()).collect();
        assert_eq!(isos, vec!["ISL"]);
    }

    #[test]
    fn numbers_are_quantized_from_their_stored_value() {
        let text = csv_with(&[
            "Iceland,Very high,0.045,8,0.015,0.125,47.6,99.8,99.7,61.7,70.5",
        ]);
        let table = prepare(text.as_bytes()).unwrap();
        let record = &table.records()[0];
        assert_eq!(record.number(Column::Gii), Some(0.04));
        assert_eq!(record.number(Column::MaternalMortality), Some(0.01));
        assert_eq!(record.number(Column::AdolescentBirthRate), Some(0.13));
    }

    #[test]
    fn dropped_rows_are_not_coerced() {
        let text = csv_with(&[
            "Atlantis,Legendary,abc,1,1,1,1,1,1,1,1",
            "Iceland,Very high,0.043,8,4,5.4,47.6,99.8,99.7,61.7,70.5",
        ]);
        assert_eq!(prepare(text.as_bytes()).unwrap().len(), 1);
    }

    #[test]
    fn unknown_development_level_fails_the_load() {
        let text = csv_with(&["Iceland,Extreme,0.043,8,4,5.4,47.6,99.8,99.7,61.7,70.5"]);
        match prepare(text.as_bytes()) {
            Err(DataIntegrityError::InvalidValue { column, value, .. }) => {
                assert_eq!(column, "Human_development");
                assert_eq!(value, "Extreme");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn non_numeric_cell_fails_the_load() {
        let text = csv_with(&["Iceland,Very high,low,8,4,5.4,47.6,99.8,99.7,61.7,70.5"]);
        assert!(matches!(
            prepare(text.as_bytes()),
            Err(DataIntegrityError::InvalidValue { ref column, .. }) if column == "GII"
        ));

        let text = csv_with(&["Iceland,Very high,inf,8,4,5.4,47.6,99.8,99.7,61.7,70.5"]);
        assert!(prepare(text.as_bytes()).is_err());
    }

    #[test]
    fn missing_header_column_is_reported() {
        let text = "Country,Human_development,GII\nIceland,Very high,0.043\n";
        match prepare(text.as_bytes()) {
            Err(DataIntegrityError::MissingColumn(name)) => assert_eq!(name, "Rank"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn extra_columns_are_ignored() {
        let text = format!(
            "Extra,{HEADER},ISO\nfoo,Iceland,Very high,0.043,8,4,5.4,47.6,99.8,99.7,61.7,70.5,XXX\n"
        );
        let table = prepare(text.as_bytes()).unwrap();
        assert_eq!(table.records()[0].iso, "ISL");
    }

    const NAMES: [&str; 6] = ["Iceland", "Sweden", "Chad", "Atlantis", "Japan", "Peru"];
    const LEVELS: [&str; 4] = ["Low", "Medium", "High", "Very high"];

    fn arb_row() -> impl Strategy<Value = String> {
        (
            0..NAMES.len(),
            0..LEVELS.len(),
            prop::collection::vec(prop::option::of(0.0f64..1000.0), 9),
        )
            .prop_map(|(name, level, values)| {
                let cells: Vec<String> = values
                    .into_iter()
                    .map(|v| v.map(|v| format!("{v:.3}")).unwrap_or_default())
                    .collect();
                format!("{},{},{}", NAMES[name], LEVELS[level], cells.join(","))
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn preparation_is_idempotent(rows in prop::collection::vec(arb_row(), 0..20)) {
            let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
            let text = csv_with(&refs);
            let a = prepare(text.as_bytes()).unwrap();
            let b = prepare(text.as_bytes()).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prepared_rows_are_complete(rows in prop::collection::vec(arb_row(), 0..20)) {
            let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
            let text = csv_with(&refs);
            let table = prepare(text.as_bytes()).unwrap();
            for record in table.records() {
                prop_assert_eq!(iso_code(&record.country), Some(record.iso.as_str()));
                prop_assert!(HumanDevelopment::ALL.contains(&record.human_development));
                prop_assert!(record.numbers.iter().all(|v| v.is_finite()));
            }
        }
    }
}
