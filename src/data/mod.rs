/// Data layer: core types, preparation, and filtering.
///
/// Architecture:
/// ```text
///  Gender_Inequality_Index.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse CSV, derive ISO (countries), drop incomplete rows
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  Vec<Record>, fixed column schema (model)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  compile a query expression → matching row indices
///   └──────────┘
/// ```

pub mod countries;
pub mod filter;
pub mod loader;
pub mod model;
