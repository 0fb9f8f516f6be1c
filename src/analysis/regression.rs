use std::fmt;

use nalgebra::{DMatrix, DVector};

use crate::data::model::{Column, ColumnKind, Table};
use crate::error::RegressionError;

use super::round_to;

/// Singular values below this fraction of the largest one count as zero.
const RANK_TOLERANCE: f64 = 1e-10;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegressionMode {
    /// One input column.
    #[default]
    Simple,
    /// Exactly three input columns.
    Multiple,
}

impl RegressionMode {
    pub const ALL: [RegressionMode; 2] = [RegressionMode::Simple, RegressionMode::Multiple];

    pub fn arity(self) -> usize {
        match self {
            RegressionMode::Simple => 1,
            RegressionMode::Multiple => 3,
        }
    }
}

impl fmt::Display for RegressionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegressionMode::Simple => f.write_str("Simple Linear Regression"),
            RegressionMode::Multiple => f.write_str("Multiple Linear Regression"),
        }
    }
}

/// One prediction request. Column names are resolved against the table.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionRequest {
    pub mode: RegressionMode,
    pub target_column: String,
    pub input_columns: Vec<String>,
    pub input_values: Vec<f64>,
}

impl RegressionRequest {
    /// Check the request shape and resolve its columns.
    fn validate(&self) -> Result<(Column, Vec<Column>), RegressionError> {
        let target = numeric_column(&self.target_column)?;

        let arity = self.mode.arity();
        if self.input_columns.len() != arity {
            return Err(RegressionError::InvalidRequest(format!(
                "{} needs {arity} input column(s), got {}",
                self.mode,
                self.input_columns.len()
            )));
        }
        if self.input_values.len() != arity {
            return Err(RegressionError::InvalidRequest(format!(
                "{} needs {arity} input value(s), got {}",
                self.mode,
                self.input_values.len()
            )));
        }
        if let Some(bad) = self.input_values.iter().find(|v| !v.is_finite()) {
            return Err(RegressionError::InvalidRequest(format!(
                "input value {bad} is not a finite number"
            )));
        }

        let inputs = self
            .input_columns
            .iter()
            .map(|name| numeric_column(name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((target, inputs))
    }
}

fn numeric_column(name: &str) -> Result<Column, RegressionError> {
    match Column::from_name(name) {
        Some(column) if column.kind() == ColumnKind::Numeric => Ok(column),
        Some(_) => Err(RegressionError::InvalidRequest(format!(
            "column '{name}' is not numeric"
        ))),
        None => Err(RegressionError::InvalidRequest(format!(
            "unknown column '{name}'"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Fitted model
// ---------------------------------------------------------------------------

/// Ordinary least-squares fit with an intercept.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    pub target: Column,
    pub intercept: f64,
    /// One coefficient per distinct input column, in request order.
    pub coefficients: Vec<(Column, f64)>,
    /// Coefficient of determination on the training rows.
    pub r_squared: f64,
}

impl LinearModel {
    /// Fit `target ~ inputs` over every row of `table`.
    ///
    /// Inputs are centred before the solve so a constant input shows up as a
    /// zero singular value instead of being absorbed by the intercept.
    pub fn fit(table: &Table, target: Column, inputs: &[Column]) -> Result<Self, RegressionError> {
        let n = table.len();
        let k = inputs.len();
        if n < k + 1 {
            return Err(RegressionError::NumericalInstability(format!(
                "{n} row(s) cannot determine {} parameters",
                k + 1
            )));
        }

        let y = DVector::from_iterator(n, table.records().iter().map(|r| r.numbers[slot(target)]));
        let mut x = DMatrix::<f64>::zeros(n, k);
        for (j, column) in inputs.iter().enumerate() {
            for (i, record) in table.records().iter().enumerate() {
                x[(i, j)] = record.numbers[slot(*column)];
            }
        }

        let x_means: Vec<f64> = (0..k).map(|j| x.column(j).mean()).collect();
        let y_mean = y.mean();
        let mut xc = x.clone();
        for (j, mean) in x_means.iter().enumerate() {
            xc.column_mut(j).add_scalar_mut(-mean);
        }
        let yc = y.add_scalar(-y_mean);

        let svd = xc.clone().svd(true, true);
        let largest = svd.singular_values.max();
        let smallest = svd.singular_values.min();
        if !(largest > 0.0) || smallest <= largest * RANK_TOLERANCE {
            return Err(RegressionError::NumericalInstability(format!(
                "inputs {} are constant or collinear",
                names(inputs)
            )));
        }
        let beta = svd
            .solve(&yc, largest * RANK_TOLERANCE)
            .map_err(|e| RegressionError::NumericalInstability(e.to_string()))?;
        if beta.iter().any(|b| !b.is_finite()) {
            return Err(RegressionError::NumericalInstability(
                "least-squares solution is not finite".into(),
            ));
        }

        let intercept = y_mean - x_means.iter().zip(beta.iter()).map(|(m, b)| m * b).sum::<f64>();

        let residual = &yc - &xc * &beta;
        let ss_res = residual.norm_squared();
        let ss_tot = yc.norm_squared();
        let r_squared = if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else {
            1.0
        };

        Ok(LinearModel {
            target,
            intercept,
            coefficients: inputs.iter().copied().zip(beta.iter().copied()).collect(),
            r_squared,
        })
    }

    /// Evaluate at one point, values in coefficient order.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(values)
                .map(|((_, b), v)| b * v)
                .sum::<f64>()
    }
}

fn slot(column: Column) -> usize {
    column.numeric_index().unwrap_or_default()
}

fn names(columns: &[Column]) -> String {
    columns
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Prediction
// ---------------------------------------------------------------------------

/// A rounded prediction together with the model that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub value: f64,
    pub model: LinearModel,
}

/// Fit a fresh model for `request` and evaluate it at the request's inputs.
// The UI also shows the model, through `predict_detailed`.
#[cfg_attr(not(test), allow(dead_code))]
pub fn predict(request: &RegressionRequest, table: &Table) -> Result<f64, RegressionError> {
    predict_detailed(request, table).map(|p| p.value)
}

/// Like [`predict`], also returning the fitted model for display.
///
/// A column repeated among the inputs is one regressor; its query value is
/// the mean of the values given for it. That is the prediction of the
/// minimum-norm least-squares solution over the duplicated design.
pub fn predict_detailed(
    request: &RegressionRequest,
    table: &Table,
) -> Result<Prediction, RegressionError> {
    let (target, inputs) = request.validate()?;

    let mut distinct: Vec<(Column, f64, usize)> = Vec::with_capacity(inputs.len());
    for (column, value) in inputs.iter().zip(&request.input_values) {
        match distinct.iter_mut().find(|(c, _, _)| c == column) {
            Some((_, sum, count)) => {
                *sum += value;
                *count += 1;
            }
            None => distinct.push((*column, *value, 1)),
        }
    }
    let columns: Vec<Column> = distinct.iter().map(|(c, _, _)| *c).collect();
    let point: Vec<f64> = distinct
        .iter()
        .map(|(_, sum, count)| sum / *count as f64)
        .collect();

    let model = LinearModel::fit(table, target, &columns)?;
    let value = round_to(model.evaluate(&point), 4);
    log::info!(
        "Predicted {} = {value} from {} (R² {:.3})",
        target,
        names(&columns),
        model.r_squared
    );
    Ok(Prediction { value, model })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{HumanDevelopment, Record};

    /// Rows with GII = x, Rank = 2x + 1, Maternal_mortality = x², Seats = 5.
    fn table(xs: &[f64]) -> Table {
        let records = xs
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                let mut numbers = [0.0; 9];
                numbers[0] = x;
                numbers[1] = 2.0 * x + 1.0;
                numbers[2] = x * x;
                numbers[4] = 5.0;
                numbers[5] = (i as f64 * 1.7).sin() * 10.0;
                numbers[6] = 3.0 * x - 0.5 * x * x + 4.0;
                Record {
                    country: format!("C{i}"),
                    iso: format!("C{i:02}"),
                    human_development: HumanDevelopment::Medium,
                    numbers,
                }
            })
            .collect();
        Table::from_records(records)
    }

    fn request(mode: RegressionMode, target: &str, inputs: &[&str], values: &[f64]) -> RegressionRequest {
        RegressionRequest {
            mode,
            target_column: target.into(),
            input_columns: inputs.iter().map(|s| s.to_string()).collect(),
            input_values: values.to_vec(),
        }
    }

    #[test]
    fn simple_regression_recovers_a_line() {
        let t = table(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        let req = request(RegressionMode::Simple, "Rank", &["GII"], &[10.0]);
        assert_eq!(predict(&req, &t).unwrap(), 21.0);

        let detailed = predict_detailed(&req, &t).unwrap();
        assert!((detailed.model.intercept - 1.0).abs() < 1e-9);
        assert!((detailed.model.coefficients[0].1 - 2.0).abs() < 1e-9);
        assert!((detailed.model.r_squared - 1.0).abs() < 1e-9);
    }

    #[test]
    fn simple_regression_is_deterministic() {
        let t = table(&[0.1, 0.4, 0.35, 0.8, 0.9, 0.2]);
        let req = request(RegressionMode::Simple, "Maternal_mortality", &["GII"], &[0.5]);
        let a = predict(&req, &t).unwrap();
        let b = predict(&req, &t).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn multiple_regression_recovers_a_plane() {
        let t = table(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let req = request(
            RegressionMode::Multiple,
            "M_secondary_educ",
            &["GII", "Maternal_mortality", "Seats_parliament"],
            &[2.0, 4.0, 5.0],
        );
        // Seats is constant, so the fit is rank deficient.
        assert!(matches!(
            predict(&req, &t),
            Err(RegressionError::NumericalInstability(_))
        ));

        let req = request(
            RegressionMode::Multiple,
            "M_secondary_educ",
            &["GII", "Maternal_mortality", "F_secondary_educ"],
            &[10.0, 100.0, 0.0],
        );
        // 3*10 - 0.5*100 + 4
        assert_eq!(predict(&req, &t).unwrap(), -16.0);
    }

    #[test]
    fn multiple_requires_three_inputs() {
        let t = table(&[0.0, 1.0, 2.0, 3.0]);
        let req = request(RegressionMode::Multiple, "Rank", &["GII", "Maternal_mortality"], &[1.0, 1.0]);
        assert!(matches!(
            predict(&req, &t),
            Err(RegressionError::InvalidRequest(_))
        ));
        let req = request(RegressionMode::Simple, "Rank", &["GII"], &[1.0, 2.0]);
        assert!(matches!(
            predict(&req, &t),
            Err(RegressionError::InvalidRequest(_))
        ));
    }

    #[test]
    fn rejects_non_numeric_and_unknown_columns() {
        let t = table(&[0.0, 1.0, 2.0]);
        for (target, input) in [("Country", "GII"), ("Rank", "ISO"), ("Rank", "Human_development"), ("rank", "GII")] {
            let req = request(RegressionMode::Simple, target, &[input], &[1.0]);
            assert!(matches!(
                predict(&req, &t),
                Err(RegressionError::InvalidRequest(_))
            ));
        }
    }

    #[test]
    fn rejects_non_finite_inputs() {
        let t = table(&[0.0, 1.0, 2.0]);
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let req = request(RegressionMode::Simple, "Rank", &["GII"], &[bad]);
            assert!(matches!(
                predict(&req, &t),
                Err(RegressionError::InvalidRequest(_))
            ));
        }
    }

    #[test]
    fn duplicated_inputs_collapse_to_their_mean() {
        let t = table(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        let req = request(
            RegressionMode::Multiple,
            "Rank",
            &["GII", "GII", "GII"],
            &[1.0, 2.0, 6.0],
        );
        // mean input 3 → 2*3 + 1
        assert_eq!(predict(&req, &t).unwrap(), 7.0);
    }

    #[test]
    fn constant_input_is_numerically_unstable() {
        let t = table(&[0.0, 1.0, 2.0, 3.0]);
        let req = request(RegressionMode::Simple, "Rank", &["Seats_parliament"], &[5.0]);
        assert!(matches!(
            predict(&req, &t),
            Err(RegressionError::NumericalInstability(_))
        ));
    }

    #[test]
    fn too_few_rows_is_numerically_unstable() {
        let empty = Table::from_records(Vec::new());
        let req = request(RegressionMode::Simple, "Rank", &["GII"], &[1.0]);
        assert!(matches!(
            predict(&req, &empty),
            Err(RegressionError::NumericalInstability(_))
        ));
    }

    #[test]
    fn result_is_rounded_to_four_places() {
        // Rank = 2x + 1 evaluated at x = 0.0617281 → 1.1234562
        let t = table(&[0.0, 1.0, 2.0]);
        let req = request(RegressionMode::Simple, "Rank", &["GII"], &[0.0617281]);
        assert_eq!(predict(&req, &t).unwrap(), 1.1235);
    }
}
