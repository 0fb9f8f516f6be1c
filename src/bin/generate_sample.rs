//! Write a synthetic Gender Inequality Index CSV for manual runs.
//!
//! Usage: `generate_sample [OUTPUT] [SEED]`
//! (default `data/Gender_Inequality_Index.csv`, seed 2021).

use std::path::PathBuf;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Country names as the dataset spells them. Some do not match the ISO
/// reference table on purpose, so the loader drops them.
const COUNTRIES: &[&str] = &[
    "Switzerland", "Norway", "Iceland", "Australia", "Denmark", "Sweden", "Ireland",
    "Germany", "Netherlands", "Finland", "Singapore", "Belgium", "New Zealand", "Canada",
    "Austria", "Japan", "Israel", "Slovenia", "Luxembourg", "Spain", "France", "Italy",
    "Portugal", "Poland", "Chile", "Argentina", "Mexico", "Brazil", "Peru", "Colombia",
    "Thailand", "China", "Sri Lanka", "Indonesia", "Egypt", "South Africa", "India",
    "Ghana", "Kenya", "Bangladesh", "Pakistan", "Nigeria", "Rwanda", "Uganda",
    "Ethiopia", "Mali", "Chad", "Niger", "Yemen", "Afghanistan",
    // Dataset spellings that the reference table does not know.
    "Bolivia (Plurinational State of)", "Korea (Republic of)", "Turkey",
];

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/Gender_Inequality_Index.csv"));
    let seed: u64 = match args.next() {
        Some(s) => s.parse().with_context(|| format!("invalid seed '{s}'"))?,
        None => 2021,
    };
    let mut rng = StdRng::seed_from_u64(seed);

    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let mut writer = csv::Writer::from_path(&output)
        .with_context(|| format!("creating {}", output.display()))?;
    writer.write_record([
        "Country",
        "Human_development",
        "GII",
        "Rank",
        "Maternal_mortality",
        "Adolescent_birth_rate",
        "Seats_parliament",
        "F_secondary_educ",
        "M_secondary_educ",
        "F_Labour_force",
        "M_Labour_force",
    ])?;

    let n = COUNTRIES.len();
    for (i, country) in COUNTRIES.iter().enumerate() {
        // Position along the index, 0 = most equal.
        let t = i as f64 / (n - 1) as f64;
        let level = match t {
            t if t < 0.35 => "Very high",
            t if t < 0.6 => "High",
            t if t < 0.8 => "Medium",
            _ => "Low",
        };
        let gii = (0.02 + 0.65 * t + rng.gen_range(-0.03..0.03)).clamp(0.005, 0.85);
        let maternal = (2.0 + 900.0 * t.powi(3) + rng.gen_range(0.0..40.0)).round();
        let adolescent = 2.0 + 150.0 * t.powi(2) + rng.gen_range(0.0..10.0);
        let seats = (45.0 - 30.0 * t + rng.gen_range(-8.0..8.0)).clamp(0.0, 60.0);
        let f_educ = (99.0 - 85.0 * t.powf(1.5) + rng.gen_range(-4.0..4.0)).clamp(0.0, 100.0);
        let m_educ = (f_educ + 5.0 + 15.0 * t + rng.gen_range(-2.0..2.0)).clamp(0.0, 100.0);
        let f_labour = 55.0 + rng.gen_range(-20.0..20.0);
        let m_labour = 70.0 + rng.gen_range(-8.0..12.0);

        let mut cells = vec![
            country.to_string(),
            level.to_string(),
            format!("{gii:.3}"),
            format!("{}", i + 1),
            format!("{maternal}"),
            format!("{adolescent:.1}"),
            format!("{seats:.1}"),
            format!("{f_educ:.1}"),
            format!("{m_educ:.1}"),
            format!("{f_labour:.1}"),
            format!("{m_labour:.1}"),
        ];
        // A few incomplete rows, as in the real dataset.
        if rng.gen_bool(0.08) {
            let slot = rng.gen_range(2..cells.len());
            cells[slot].clear();
        }
        writer.write_record(&cells)?;
    }
    writer.flush()?;

    println!("Wrote {n} rows to {}", output.display());
    Ok(())
}
