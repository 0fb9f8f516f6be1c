use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::analysis::network::{self, Layout, NetworkGraph};
use crate::analysis::regression::{self, Prediction, RegressionMode, RegressionRequest};
use crate::analysis::stats::{self, ColumnSummary};
use crate::color::LevelColors;
use crate::config::AppConfig;
use crate::data::filter::filtered_indices;
use crate::data::loader;
use crate::data::model::{Column, Table};
use crate::error::{DataIntegrityError, RegressionError};
use crate::task::BackgroundTask;

// ---------------------------------------------------------------------------
// Screens and plot choices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Home,
    Data,
    Plots,
    Regression,
}

impl Screen {
    pub const ALL: [Screen; 4] = [Screen::Home, Screen::Data, Screen::Plots, Screen::Regression];

    pub fn title(self) -> &'static str {
        match self {
            Screen::Home => "Home",
            Screen::Data => "Data",
            Screen::Plots => "Visualize",
            Screen::Regression => "Regression",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlotCategory {
    #[default]
    Distribution,
    Proportion,
    Correlation,
    Network,
}

impl PlotCategory {
    pub const ALL: [PlotCategory; 4] = [
        PlotCategory::Distribution,
        PlotCategory::Proportion,
        PlotCategory::Correlation,
        PlotCategory::Network,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistributionPlot {
    #[default]
    Histogram,
    Kde,
    Ecdf,
    Rug,
    Box,
}

impl DistributionPlot {
    pub const ALL: [DistributionPlot; 5] = [
        DistributionPlot::Histogram,
        DistributionPlot::Kde,
        DistributionPlot::Ecdf,
        DistributionPlot::Rug,
        DistributionPlot::Box,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProportionPlot {
    #[default]
    Pie,
    StackedBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorrelationPlot {
    #[default]
    Scatter,
    Line,
}

macro_rules! display_names {
    ($ty:ty { $($variant:path => $name:literal),+ $(,)? }) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(match self {
                    $($variant => $name),+
                })
            }
        }
    };
}

display_names!(PlotCategory {
    PlotCategory::Distribution => "Distribution",
    PlotCategory::Proportion => "Proportion",
    PlotCategory::Correlation => "Correlation",
    PlotCategory::Network => "Network",
});
display_names!(DistributionPlot {
    DistributionPlot::Histogram => "histplot",
    DistributionPlot::Kde => "kdeplot",
    DistributionPlot::Ecdf => "ecdfplot",
    DistributionPlot::Rug => "rugplot",
    DistributionPlot::Box => "boxplot",
});
display_names!(ProportionPlot {
    ProportionPlot::Pie => "pie",
    ProportionPlot::StackedBar => "stackbar",
});
display_names!(CorrelationPlot {
    CorrelationPlot::Scatter => "scatterplot",
    CorrelationPlot::Line => "lineplot",
});

/// Options of the visualisation screen.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSettings {
    pub category: PlotCategory,
    pub distribution: DistributionPlot,
    pub proportion: ProportionPlot,
    pub correlation: CorrelationPlot,
    pub layout: Layout,
    /// Column for distribution, proportion and network plots.
    pub column: Column,
    pub x: Column,
    pub y: Column,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            category: PlotCategory::default(),
            distribution: DistributionPlot::default(),
            proportion: ProportionPlot::default(),
            correlation: CorrelationPlot::default(),
            layout: Layout::default(),
            column: Column::Gii,
            x: Column::Gii,
            y: Column::Rank,
        }
    }
}

/// Inputs of the regression screen.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionForm {
    pub mode: RegressionMode,
    pub target: Column,
    pub inputs: [Column; 3],
    pub values: [f64; 3],
}

impl Default for RegressionForm {
    fn default() -> Self {
        Self {
            mode: RegressionMode::Simple,
            target: Column::Gii,
            inputs: [Column::MaternalMortality, Column::AdolescentBirthRate, Column::SeatsParliament],
            values: [0.0; 3],
        }
    }
}

impl RegressionForm {
    pub fn request(&self) -> RegressionRequest {
        let arity = self.mode.arity();
        RegressionRequest {
            mode: self.mode,
            target_column: self.target.name().to_string(),
            input_columns: self.inputs[..arity].iter().map(|c| c.name().to_string()).collect(),
            input_values: self.values[..arity].to_vec(),
        }
    }
}

/// A sampled network graph with the positions of its nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkView {
    pub graph: NetworkGraph,
    pub positions: Vec<[f64; 2]>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,
    pub screen: Screen,

    /// Prepared dataset (None until the loading task delivers it).
    pub table: Option<Arc<Table>>,
    pub summaries: Vec<ColumnSummary>,
    pub statistics_text: String,

    /// Filter expression typed in the data table.
    pub query: String,
    /// Indices of rows passing `query` (cached).
    pub visible_rows: Vec<usize>,
    pub query_error: Option<String>,

    pub plot: PlotSettings,
    pub network: Option<NetworkView>,
    pub colors: LevelColors,

    pub regression: RegressionForm,
    /// Last prediction, or the message of its failure.
    pub prediction: Option<Result<Prediction, String>>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    loading: Option<BackgroundTask<Result<Table, DataIntegrityError>>>,
    predicting: Option<BackgroundTask<Result<Prediction, RegressionError>>>,
    rng: StdRng,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            screen: Screen::default(),
            table: None,
            summaries: Vec::new(),
            statistics_text: String::new(),
            query: config.default_query.clone(),
            visible_rows: Vec::new(),
            query_error: None,
            plot: PlotSettings::default(),
            network: None,
            colors: LevelColors::from_config(&config),
            regression: RegressionForm::default(),
            prediction: None,
            status_message: None,
            loading: None,
            predicting: None,
            rng: StdRng::from_entropy(),
            config,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.as_ref().is_some_and(BackgroundTask::is_pending)
    }

    pub fn is_predicting(&self) -> bool {
        self.predicting.as_ref().is_some_and(BackgroundTask::is_pending)
    }

    /// Prepare the dataset at `path` on a background thread.
    /// Ignored while an earlier load has not been collected yet.
    pub fn start_loading(&mut self, path: PathBuf) {
        if self.loading.is_some() {
            log::debug!("Ignoring load of {}, one is in progress", path.display());
            return;
        }
        log::info!("Loading dataset {}", path.display());
        match BackgroundTask::spawn("load-dataset", move || loader::prepare_dataset(&path)) {
            Ok(task) => {
                self.loading = Some(task);
                self.status_message = None;
            }
            Err(e) => self.fail(format!("Error: {e:#}")),
        }
    }

    /// Fit and evaluate the current regression form on a background thread.
    pub fn start_prediction(&mut self) {
        let Some(table) = self.table.clone() else {
            self.prediction = Some(Err("No dataset loaded".into()));
            return;
        };
        let request = self.regression.request();
        match BackgroundTask::spawn("predict", move || regression::predict_detailed(&request, &table)) {
            Ok(task) => self.predicting = Some(task),
            Err(e) => self.prediction = Some(Err(format!("{e:#}"))),
        }
    }

    /// Collect finished background work. Returns true while any is pending.
    pub fn poll_tasks(&mut self) -> bool {
        if let Some(result) = self.loading.as_mut().and_then(BackgroundTask::poll) {
            self.loading = None;
            match result {
                Ok(Ok(table)) => self.set_table(table),
                Ok(Err(e)) => {
                    log::error!("Failed to load dataset: {e}");
                    self.fail(format!("Error: {e}"));
                }
                Err(e) => self.fail(format!("Error: {e:#}")),
            }
        }
        if let Some(result) = self.predicting.as_mut().and_then(BackgroundTask::poll) {
            self.predicting = None;
            self.prediction = Some(match result {
                Ok(Ok(prediction)) => Ok(prediction),
                Ok(Err(e)) => {
                    log::warn!("Prediction rejected: {e}");
                    Err(e.to_string())
                }
                Err(e) => Err(format!("{e:#}")),
            });
        }
        self.is_loading() || self.is_predicting()
    }

    fn fail(&mut self, message: String) {
        self.status_message = Some(message);
    }

    /// Ingest a newly prepared table: statistics, filter, network.
    pub fn set_table(&mut self, table: Table) {
        self.summaries = stats::describe(&table);
        self.statistics_text = stats::format_summaries(&self.summaries);
        self.table = Some(Arc::new(table));
        self.status_message = None;
        self.prediction = None;
        self.predicting = None;
        self.apply_query();
        self.regenerate_network();
    }

    /// Re-run `query`. An invalid query keeps the previous rows.
    pub fn apply_query(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        match filtered_indices(table, Some(&self.query)) {
            Ok(rows) => {
                self.visible_rows = rows;
                self.query_error = None;
            }
            Err(e) => {
                log::warn!("Rejected filter {:?}: {e}", self.query);
                self.query_error = Some(e.to_string());
            }
        }
    }

    /// Sample a fresh network graph and lay it out.
    pub fn regenerate_network(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        let graph = network::build_network(
            table,
            self.plot.column,
            self.config.network_sample_size,
            &mut self.rng,
        );
        let positions = network::layout(&graph, self.plot.layout, &mut self.rng);
        self.network = Some(NetworkView { graph, positions });
    }

    /// Resample the network when it was built on another column than the one
    /// selected. Returns true when it did.
    pub fn sync_network(&mut self) -> bool {
        let current = self.network.as_ref().and_then(|view| view.graph.column);
        if self.table.is_none() || current == Some(self.plot.column) {
            return false;
        }
        self.regenerate_network();
        true
    }

    /// Recompute positions for the current graph after a layout change.
    pub fn relayout_network(&mut self) {
        if let Some(view) = &mut self.network {
            view.positions = network::layout(&view.graph, self.plot.layout, &mut self.rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{HumanDevelopment, Record};
    use std::time::{Duration, Instant};

    fn table() -> Table {
        let rows = [
            ("Iceland", "ISL", 0.04),
            ("Sweden", "SWE", 0.02),
            ("Norway", "NOR", 0.01),
            ("Chad", "TCD", 0.65),
        ];
        Table::from_records(
            rows.iter()
                .enumerate()
                .map(|(i, (country, iso, gii))| {
                    let mut numbers = [0.0; 9];
                    numbers[0] = *gii;
                    numbers[1] = i as f64 * 3.0 + 1.0;
                    Record {
                        country: country.to_string(),
                        iso: iso.to_string(),
                        human_development: HumanDevelopment::ALL[i],
                        numbers,
                    }
                })
                .collect(),
        )
    }

    fn settle(state: &mut AppState) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while state.poll_tasks() {
            assert!(Instant::now() < deadline, "background work did not finish");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn default_query_applies_on_load() {
        let mut state = AppState::new(AppConfig::default());
        state.set_table(table());
        assert_eq!(state.visible_rows, vec![0, 1]);
        assert_eq!(state.summaries.len(), 9);
        assert!(state.statistics_text.starts_with("GII:\n"));
        assert!(state.network.is_some());
    }

    #[test]
    fn invalid_query_keeps_previous_rows() {
        let mut state = AppState::new(AppConfig::default());
        state.set_table(table());
        state.query = "GII >".into();
        state.apply_query();
        assert!(state.query_error.is_some());
        assert_eq!(state.visible_rows, vec![0, 1]);

        state.query.clear();
        state.apply_query();
        assert!(state.query_error.is_none());
        assert_eq!(state.visible_rows.len(), 4);
    }

    #[test]
    fn form_builds_request_of_mode_arity() {
        let mut form = RegressionForm::default();
        assert_eq!(form.request().input_columns, vec!["Maternal_mortality"]);
        form.mode = RegressionMode::Multiple;
        let request = form.request();
        assert_eq!(request.input_columns.len(), 3);
        assert_eq!(request.input_values, vec![0.0; 3]);
    }

    #[test]
    fn prediction_runs_in_background() {
        let mut state = AppState::new(AppConfig::default());
        state.set_table(table());
        state.regression.target = Column::Rank;
        state.regression.inputs[0] = Column::Rank;
        state.regression.values[0] = 2.5;
        state.start_prediction();
        settle(&mut state);
        let prediction = state.prediction.clone().unwrap().unwrap();
        assert_eq!(prediction.value, 2.5);
    }

    #[test]
    fn loading_a_missing_file_reports_error() {
        let mut state = AppState::new(AppConfig::default());
        state.start_loading(PathBuf::from("/nonexistent/equalize.csv"));
        settle(&mut state);
        assert!(state.table.is_none());
        assert!(state.status_message.unwrap().starts_with("Error"));
    }

    #[test]
    fn prediction_without_table_is_an_error() {
        let mut state = AppState::new(AppConfig::default());
        state.start_prediction();
        assert!(matches!(state.prediction, Some(Err(_))));
    }

    #[test]
    fn network_follows_the_selected_column() {
        let mut state = AppState::new(AppConfig::default());
        state.set_table(table());
        assert_eq!(state.network.as_ref().unwrap().graph.column, Some(Column::Gii));

        state.plot.column = Column::Rank;
        assert!(state.sync_network());
        let graph = &state.network.as_ref().unwrap().graph;
        assert_eq!(graph.column, Some(Column::Rank));
        assert!(graph.edges.iter().all(|e| e.weight >= 1.0));
        assert!(!state.sync_network());
    }

    #[test]
    fn reload_discards_pending_prediction() {
        let mut state = AppState::new(AppConfig::default());
        state.set_table(table());
        state.regression.target = Column::Rank;
        state.regression.inputs[0] = Column::Rank;
        state.start_prediction();
        state.set_table(table());
        assert!(!state.is_predicting());
        settle(&mut state);
        assert!(state.prediction.is_none());
    }

    #[test]
    fn second_load_waits_for_the_first() {
        let path = std::env::temp_dir().join(format!("equalize-{}.csv", std::process::id()));
        std::fs::write(
            &path,
            "Country,Human_development,GII,Rank,Maternal_mortality,Adolescent_birth_rate,\
Seats_parliament,F_secondary_educ,M_secondary_educ,F_Labour_force,M_Labour_force\n\
Iceland,Very high,0.043,8,4,5.4,47.6,99.8,99.7,61.7,70.5\n",
        )
        .unwrap();

        let mut state = AppState::new(AppConfig::default());
        state.start_loading(PathBuf::from("/nonexistent/equalize.csv"));
        state.start_loading(path.clone());
        settle(&mut state);
        assert!(state.table.is_none());

        state.start_loading(path.clone());
        settle(&mut state);
        assert_eq!(state.table.as_ref().map(|t| t.len()), Some(1));
        std::fs::remove_file(path).unwrap();
    }
}
