//! Pipeline configuration and the batch build manifest.
//!
//! Configuration is an explicit value handed to every entry point; nothing is
//! read from process-wide state. The manifest is a TOML file:
//!
//! ```toml
//! [pipeline]
//! min_points = 100
//! aggregation = "mean"
//!
//! [[dataset]]
//! name = "usdcad"
//! output = "usdcad_monthly.json"
//! kind = "boc"
//! series = "FXUSDCAD"
//! ```

use crate::data::aggregate::AggregationMode;
use crate::data::error::PipelineError;
use crate::data::validate::{DEFAULT_MIN_POINTS, LONG_HISTORY_MIN_POINTS};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const DEFAULT_VALET_BASE_URL: &str = "https://www.bankofcanada.ca/valet";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings shared by every dataset build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum points for generic monthly series.
    pub min_points: usize,
    /// Minimum points for the long-history workbook series.
    pub min_points_long_history: usize,
    /// Aggregation used when a dataset does not name one.
    pub aggregation: AggregationMode,
    pub http: HttpConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_points: DEFAULT_MIN_POINTS,
            min_points_long_history: LONG_HISTORY_MIN_POINTS,
            aggregation: AggregationMode::default(),
            http: HttpConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub valet_base_url: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!("longmath/", env!("CARGO_PKG_VERSION")).to_string(),
            valet_base_url: DEFAULT_VALET_BASE_URL.to_string(),
        }
    }
}

/// What to build and where to write it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSpec {
    pub name: String,
    /// Output file, relative to the batch output directory.
    pub output: PathBuf,
    #[serde(flatten)]
    pub kind: DatasetKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatasetKind {
    /// Bank of Canada Valet series.
    Boc {
        series: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start: Option<NaiveDate>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end: Option<NaiveDate>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        agg: Option<AggregationMode>,
        /// Compound the monthly yields into a total-return index.
        #[serde(default)]
        total_return: bool,
    },
    /// Equity total-return index from the long-history workbook.
    ShillerTotalReturn { path: PathBuf },
    /// CPI level from the long-history workbook.
    ShillerCpi { path: PathBuf },
    /// Two-column date/value CSV.
    RateCsv {
        path: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        agg: Option<AggregationMode>,
        #[serde(default)]
        total_return: bool,
    },
    /// Statistics agency table filtered on its SYMBOL column.
    Statcan {
        path: PathBuf,
        #[serde(default)]
        symbol: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        agg: Option<AggregationMode>,
    },
}

impl DatasetKind {
    /// Whether building this dataset fetches over the network.
    pub fn needs_network(&self) -> bool {
        matches!(self, DatasetKind::Boc { .. })
    }
}

/// The batch: shared pipeline settings and an ordered dataset list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildManifest {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(rename = "dataset", default)]
    pub datasets: Vec<DatasetSpec>,
}

impl BuildManifest {
    /// Load a manifest from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path).map_err(|e| PipelineError::Read {
            what: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse and check a manifest from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, PipelineError> {
        let manifest: Self = toml::from_str(content)
            .map_err(|e| PipelineError::Config(format!("parse manifest TOML: {e}")))?;
        manifest.check()?;
        Ok(manifest)
    }

    pub fn to_toml(&self) -> Result<String, PipelineError> {
        toml::to_string_pretty(self)
            .map_err(|e| PipelineError::Config(format!("serialize manifest: {e}")))
    }

    pub fn needs_network(&self) -> bool {
        self.datasets.iter().any(|ds| ds.kind.needs_network())
    }

    /// Reject manifests that would make two datasets collide.
    pub fn check(&self) -> Result<(), PipelineError> {
        if self.datasets.is_empty() {
            return Err(PipelineError::Config("manifest lists no datasets".into()));
        }
        let mut names = HashSet::new();
        let mut outputs = HashSet::new();
        for ds in &self.datasets {
            if ds.name.trim().is_empty() {
                return Err(PipelineError::Config("dataset with empty name".into()));
            }
            if !names.insert(ds.name.as_str()) {
                return Err(PipelineError::Config(format!("duplicate dataset name '{}'", ds.name)));
            }
            if !outputs.insert(ds.output.as_path()) {
                return Err(PipelineError::Config(format!(
                    "duplicate output '{}'",
                    ds.output.display()
                )));
            }
        }
        Ok(())
    }

    /// The standard six-dataset batch.
    pub fn standard(
        workbook: impl Into<PathBuf>,
        rate_csv: impl Into<PathBuf>,
        statcan_csv: impl Into<PathBuf>,
    ) -> Self {
        let workbook = workbook.into();
        let datasets = vec![
            DatasetSpec {
                name: "usdcad".into(),
                output: "usdcad_monthly.json".into(),
                kind: DatasetKind::Boc {
                    series: "FXUSDCAD".into(),
                    start: None,
                    end: None,
                    agg: Some(AggregationMode::Mean),
                    total_return: false,
                },
            },
            DatasetSpec {
                name: "cad_bond_10y_tr".into(),
                output: "cad_bond_10y_tr.json".into(),
                kind: DatasetKind::Boc {
                    series: "BD.CDN.10YR.DQ.YLD".into(),
                    start: None,
                    end: None,
                    agg: Some(AggregationMode::Last),
                    total_return: true,
                },
            },
            DatasetSpec {
                name: "us_equity_tr".into(),
                output: "us_equity_tr.json".into(),
                kind: DatasetKind::ShillerTotalReturn {
                    path: workbook.clone(),
                },
            },
            DatasetSpec {
                name: "us_cpi".into(),
                output: "us_cpi.json".into(),
                kind: DatasetKind::ShillerCpi { path: workbook },
            },
            DatasetSpec {
                name: "us_tbill_tr".into(),
                output: "us_tbill_tr.json".into(),
                kind: DatasetKind::RateCsv {
                    path: rate_csv.into(),
                    agg: Some(AggregationMode::Mean),
                    total_return: true,
                },
            },
            DatasetSpec {
                name: "cad_cpi".into(),
                output: "cad_cpi.json".into(),
                kind: DatasetKind::Statcan {
                    path: statcan_csv.into(),
                    symbol: String::new(),
                    agg: Some(AggregationMode::Last),
                },
            },
        ];
        Self {
            pipeline: PipelineConfig::default(),
            datasets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_floors() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.min_points, 100);
        assert_eq!(cfg.min_points_long_history, 1000);
        assert_eq!(cfg.aggregation, AggregationMode::Mean);
        assert_eq!(cfg.http.timeout_secs, 30);
    }

    #[test]
    fn parses_every_dataset_kind() {
        let toml_str = r#"
[pipeline]
min_points = 24
aggregation = "last"

[pipeline.http]
timeout_secs = 10

[[dataset]]
name = "fx"
output = "fx.json"
kind = "boc"
series = "FXUSDCAD"
start = "2017-01-01"

[[dataset]]
name = "eq"
output = "eq.json"
kind = "shiller_total_return"
path = "ie_data.xls"

[[dataset]]
name = "cpi"
output = "cpi.json"
kind = "shiller_cpi"
path = "ie_data.xls"

[[dataset]]
name = "tb"
output = "tb.json"
kind = "rate_csv"
path = "TB3MS.csv"
total_return = true

[[dataset]]
name = "ca"
output = "ca.json"
kind = "statcan"
path = "18100004.csv"
agg = "mean"
"#;
        let m = BuildManifest::from_toml(toml_str).unwrap();
        assert_eq!(m.pipeline.min_points, 24);
        assert_eq!(m.pipeline.min_points_long_history, 1000);
        assert_eq!(m.pipeline.aggregation, AggregationMode::Last);
        assert_eq!(m.pipeline.http.timeout_secs, 10);
        assert_eq!(m.pipeline.http.valet_base_url, DEFAULT_VALET_BASE_URL);
        assert_eq!(m.datasets.len(), 5);
        assert_eq!(
            m.datasets[0].kind,
            DatasetKind::Boc {
                series: "FXUSDCAD".into(),
                start: NaiveDate::from_ymd_opt(2017, 1, 1),
                end: None,
                agg: None,
                total_return: false,
            }
        );
        assert!(matches!(
            m.datasets[3].kind,
            DatasetKind::RateCsv { total_return: true, agg: None, .. }
        ));
        assert!(matches!(
            &m.datasets[4].kind,
            DatasetKind::Statcan { symbol, agg: Some(AggregationMode::Mean), .. } if symbol.is_empty()
        ));
    }

    #[test]
    fn rejects_duplicate_outputs() {
        let toml_str = r#"
[[dataset]]
name = "a"
output = "same.json"
kind = "shiller_cpi"
path = "x.xls"

[[dataset]]
name = "b"
output = "same.json"
kind = "shiller_total_return"
path = "x.xls"
"#;
        assert!(matches!(
            BuildManifest::from_toml(toml_str),
            Err(PipelineError::Config(msg)) if msg.contains("duplicate output")
        ));
    }

    #[test]
    fn rejects_unknown_kind_and_empty_list() {
        assert!(BuildManifest::from_toml("[[dataset]]\nname='a'\noutput='a.json'\nkind='fred'\n").is_err());
        assert!(BuildManifest::from_toml("").is_err());
    }

    #[test]
    fn standard_batch_has_six_distinct_datasets() {
        let m = BuildManifest::standard("ie_data.xls", "TB3MS.csv", "18100004.csv");
        assert_eq!(m.datasets.len(), 6);
        m.check().unwrap();
    }

    #[test]
    fn only_valet_datasets_need_the_network() {
        let mut m = BuildManifest::standard("ie_data.xls", "TB3MS.csv", "18100004.csv");
        let kinds: Vec<bool> = m.datasets.iter().map(|ds| ds.kind.needs_network()).collect();
        assert_eq!(kinds, vec![true, true, false, false, false, false]);
        assert!(m.needs_network());
        m.datasets.retain(|ds| !ds.kind.needs_network());
        assert!(!m.needs_network());
    }

    #[test]
    fn toml_roundtrip() {
        let m = BuildManifest::standard("ie_data.xls", "TB3MS.csv", "18100004.csv");
        let text = m.to_toml().unwrap();
        let parsed = BuildManifest::from_toml(&text).unwrap();
        assert_eq!(parsed, m);
    }
}
