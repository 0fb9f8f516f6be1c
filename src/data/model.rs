use std::fmt;

// ---------------------------------------------------------------------------
// HumanDevelopment – the closed categorical column
// ---------------------------------------------------------------------------

/// Human development tier of a country. Ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HumanDevelopment {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl HumanDevelopment {
    pub const ALL: [HumanDevelopment; 4] = [
        HumanDevelopment::Low,
        HumanDevelopment::Medium,
        HumanDevelopment::High,
        HumanDevelopment::VeryHigh,
    ];

    /// Canonical label.
    pub fn label(self) -> &'static str {
        match self {
            HumanDevelopment::Low => "Low",
            HumanDevelopment::Medium => "Medium",
            HumanDevelopment::High => "High",
            HumanDevelopment::VeryHigh => "Very High",
        }
    }

    /// Parse a label. The source dataset spells the top tier `Very high`,
    /// so both spellings are accepted.
    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "Low" => Some(HumanDevelopment::Low),
            "Medium" => Some(HumanDevelopment::Medium),
            "High" => Some(HumanDevelopment::High),
            "Very High" | "Very high" => Some(HumanDevelopment::VeryHigh),
            _ => None,
        }
    }
}

impl fmt::Display for HumanDevelopment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Column – the fixed schema of the prepared table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Category,
    Numeric,
}

/// Every column of the prepared table, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Country,
    HumanDevelopment,
    Gii,
    Rank,
    MaternalMortality,
    AdolescentBirthRate,
    SeatsParliament,
    FSecondaryEduc,
    MSecondaryEduc,
    FLabourForce,
    MLabourForce,
    Iso,
}

impl Column {
    pub const ALL: [Column; 12] = [
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
        Column::Iso,
    ];

    /// The numeric columns, in the order they are stored in [`Record::numbers`].
    pub const NUMERIC: [Column; 9] = [
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

    pub fn name(self) -> &'static str {
        match self {
            Column::Country => "Country",
            Column::HumanDevelopment => "Human_development",
            Column::Gii => "GII",
            Column::Rank => "Rank",
            Column::MaternalMortality => "Maternal_mortality",
            Column::AdolescentBirthRate => "Adolescent_birth_rate",
            Column::SeatsParliament => "Seats_parliament",
            Column::FSecondaryEduc => "F_secondary_educ",
            Column::MSecondaryEduc => "M_secondary_educ",
            Column::FLabourForce => "F_Labour_force",
            Column::MLabourForce => "M_Labour_force",
            Column::Iso => "ISO",
        }
    }

    /// Exact, case-sensitive lookup by column name.
    pub fn from_name(name: &str) -> Option<Self> {
        Column::ALL.into_iter().find(|c| c.name() == name)
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            Column::Country | Column::Iso => ColumnKind::Text,
            Column::HumanDevelopment => ColumnKind::Category,
            _ => ColumnKind::Numeric,
        }
    }

    /// Position inside [`Record::numbers`] for numeric columns.
    pub fn numeric_index(self) -> Option<usize> {
        Column::NUMERIC.iter().position(|&c| c == self)
    }

    /// Human readable name for axis titles.
    pub fn title(self) -> String {
        self.name().replace('_', " ")
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// CellValue – a borrowed view of one cell
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    Text(&'a str),
    Category(HumanDevelopment),
    Number(f64),
}

impl fmt::Display for CellValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Category(level) => write!(f, "{level}"),
            CellValue::Number(v) => write!(f, "{v:.2}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one prepared row
// ---------------------------------------------------------------------------

/// One country after preparation. Every field is present by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub country: String,
    pub iso: String,
    pub human_development: HumanDevelopment,
    /// Values of [`Column::NUMERIC`], same order.
    pub numbers: [f64; 9],
}

impl Record {
    pub fn value(&self, column: Column) -> CellValue<'_> {
        match column {
            Column::Country => CellValue::Text(&self.country),
            Column::Iso => CellValue::Text(&self.iso),
            Column::HumanDevelopment => CellValue::Category(self.human_development),
            numeric => CellValue::Number(self.number(numeric).unwrap_or(f64::NAN)),
        }
    }

    /// Value of a numeric column, `None` for text/category columns.
    pub fn number(&self, column: Column) -> Option<f64> {
        column.numeric_index().map(|i| self.numbers[i])
    }
}

// ---------------------------------------------------------------------------
// Table – the prepared dataset
// ---------------------------------------------------------------------------

/// The prepared dataset. Built once by the loader and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    records: Vec<Record>,
}

impl Table {
    pub(crate) fn from_records(records: Vec<Record>) -> Self {
        Table { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Ordered column names, used to populate selection controls.
    pub fn column_names(&self) -> Vec<&'static str> {
        Column::ALL.iter().map(|c| c.name()).collect()
    }

    /// All values of a numeric column, in row order.
    pub fn numeric_column(&self, column: Column) -> Option<Vec<f64>> {
        let idx = column.numeric_index()?;
        Some(self.records.iter().map(|r| r.numbers[idx]).collect())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names_round_trip_through_lookup() {
        for column in Column::ALL {
            assert_eq!(Column::from_name(column.name()), Some(column));
        }
        assert_eq!(Column::from_name("gii"), None);
    }

    #[test]
    fn numeric_columns_have_distinct_slots() {
        let slots: Vec<usize> = Column::NUMERIC
            .iter()
            .filter_map(|c| c.numeric_index())
            .collect();
        assert_eq!(slots, (0..9).collect::<Vec<_>>());
        assert_eq!(Column::Iso.numeric_index(), None);
    }

    #[test]
    fn development_accepts_dataset_spelling() {
        assert_eq!(
            HumanDevelopment::from_label("Very high"),
            Some(HumanDevelopment::VeryHigh)
        );
        assert_eq!(HumanDevelopment::VeryHigh.label(), "Very High");
        assert_eq!(HumanDevelopment::from_label("very high"), None);
    }

    #[test]
    fn numbers_display_with_two_decimals() {
        assert_eq!(CellValue::Number(0.5).to_string(), "0.50");
        assert_eq!(
            CellValue::Category(HumanDevelopment::Medium).to_string(),
            "Medium"
        );
    }
}
