mod mapping;
mod normalizer;
mod parser;

pub use mapping::RuleField;

use crate::workflows::eligibility::domain::{LenderId, LoanCategory};
use chrono::{DateTime, Utc};
use normalizer::{parse_cell, CellValue};
use parser::{RuleMatrix, RuleRow};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Configuration errors raised while loading lender policies. Any of these aborts the load.
#[derive(Debug, thiserror::Error)]
pub enum RuleTableError {
    #[error("failed to read lender rule table: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid lender rule CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid lender rule workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("lender rule table does not list any lenders")]
    NoLenders,
    #[error("lender rule table column {column} has a blank lender name")]
    BlankLender { column: usize },
    #[error("lender `{lender}` appears more than once in the rule table")]
    DuplicateLender { lender: LenderId },
    #[error("rule `{}` appears more than once in the rule table", .rule.source_label())]
    DuplicateRule { rule: RuleField },
    #[error(
        "lender `{lender}` is missing rule `{}` ({})",
        .rule.source_label(),
        .rule.field_name()
    )]
    MissingField { lender: LenderId, rule: RuleField },
    #[error(
        "lender `{lender}` has malformed value `{value}` for rule `{}`",
        .rule.source_label()
    )]
    MalformedCell {
        lender: LenderId,
        rule: RuleField,
        value: String,
    },
}

/// Margin contribution rate per term-loan purpose, as fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarginRates {
    pub land: f64,
    pub construction: f64,
    pub machinery: f64,
    pub utilities: f64,
    pub other: f64,
}

impl MarginRates {
    pub fn rate_for(&self, category: LoanCategory) -> f64 {
        match category {
            LoanCategory::Land => self.land,
            LoanCategory::Construction => self.construction,
            LoanCategory::Machinery => self.machinery,
            LoanCategory::Utilities => self.utilities,
            LoanCategory::Other => self.other,
        }
    }
}

/// Underwriting policy for a single lender.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LenderPolicy {
    pub lender: LenderId,
    pub min_security_ratio: f64,
    pub roi_low: f64,
    pub roi_high: f64,
    pub pf_min: f64,
    pub pf_max: f64,
    pub ideal_dscr: f64,
    pub margin_rates: MarginRates,
}

impl LenderPolicy {
    pub fn value(&self, field: RuleField) -> f64 {
        match field {
            RuleField::MinSecurityRatio => self.min_security_ratio,
            RuleField::RoiLow => self.roi_low,
            RuleField::RoiHigh => self.roi_high,
            RuleField::PfMin => self.pf_min,
            RuleField::PfMax => self.pf_max,
            RuleField::IdealDscr => self.ideal_dscr,
            RuleField::MarginRate(category) => self.margin_rates.rate_for(category),
        }
    }

    /// Data-quality findings that do not block loading but usually point at a typo in the sheet.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.roi_low > self.roi_high {
            warnings.push(format!(
                "ROI band is inverted ({:.4} > {:.4}); every proposal will fail the ROI check",
                self.roi_low, self.roi_high
            ));
        }
        if self.pf_min > self.pf_max {
            warnings.push(format!(
                "PF band is inverted ({:.4} > {:.4}); every proposal will fail the PF check",
                self.pf_min, self.pf_max
            ));
        }
        if self.ideal_dscr <= 0.0 {
            warnings.push(format!("ideal DSCR {:.2} is not positive", self.ideal_dscr));
        }
        for field in RuleField::ordered() {
            let value = self.value(field);
            if !field.is_fraction() {
                continue;
            }
            // Collateral cover above 100% is ordinary; only rates and fees are capped at one.
            if field == RuleField::MinSecurityRatio {
                if value < 0.0 {
                    warnings.push(format!("{} = {value} is negative", field.source_label()));
                }
            } else if !(0.0..=1.0).contains(&value) {
                warnings.push(format!(
                    "{} = {value} lies outside [0, 1]",
                    field.source_label()
                ));
            }
        }

        warnings
    }
}

/// Immutable set of lender policies in the column order of the source sheet.
#[derive(Debug, Clone)]
pub struct RuleTable {
    policies: Vec<LenderPolicy>,
    loaded_at: DateTime<Utc>,
}

impl RuleTable {
    pub fn new(policies: Vec<LenderPolicy>) -> Result<Self, RuleTableError> {
        if policies.is_empty() {
            return Err(RuleTableError::NoLenders);
        }

        let mut seen = HashSet::new();
        for policy in &policies {
            if !seen.insert(&policy.lender) {
                return Err(RuleTableError::DuplicateLender {
                    lender: policy.lender.clone(),
                });
            }
        }

        for policy in &policies {
            for warning in policy.warnings() {
                warn!(lender = %policy.lender, "{warning}");
            }
        }

        Ok(Self {
            policies,
            loaded_at: Utc::now(),
        })
    }

    /// Loads a rule sheet, picking the reader from the file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RuleTableError> {
        let path = path.as_ref();
        match RuleFormat::from_path(path) {
            RuleFormat::Csv => Self::from_csv_path(path),
            RuleFormat::Workbook => Self::from_workbook_path(path),
        }
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, RuleTableError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Loads the first worksheet of an Excel (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`) or `.ods` rule book.
    pub fn from_workbook_path<P: AsRef<Path>>(path: P) -> Result<Self, RuleTableError> {
        let matrix = parser::parse_workbook(path.as_ref())?;
        Self::new(build_policies(matrix)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RuleTableError> {
        let matrix = parser::parse_matrix(reader)?;
        Self::new(build_policies(matrix)?)
    }

    pub fn policies(&self) -> &[LenderPolicy] {
        &self.policies
    }

    pub fn policy(&self, lender: &LenderId) -> Option<&LenderPolicy> {
        self.policies.iter().find(|policy| &policy.lender == lender)
    }

    pub fn lenders(&self) -> impl Iterator<Item = &LenderId> {
        self.policies.iter().map(|policy| &policy.lender)
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

fn build_policies(matrix: RuleMatrix) -> Result<Vec<LenderPolicy>, RuleTableError> {
    if matrix.lenders.is_empty() {
        return Err(RuleTableError::NoLenders);
    }
    if let Some(index) = matrix.lenders.iter().position(|name| name.is_empty()) {
        // Column 1 holds the rule names.
        return Err(RuleTableError::BlankLender { column: index + 2 });
    }

    let mut rows: HashMap<RuleField, &RuleRow> = HashMap::new();
    for row in &matrix.rows {
        match mapping::field_for_label(&row.label) {
            Some(field) => {
                if rows.insert(field, row).is_some() {
                    return Err(RuleTableError::DuplicateRule { rule: field });
                }
            }
            None => debug!(rule = %row.label, "ignoring unrecognized rule row"),
        }
    }

    let mut policies = Vec::with_capacity(matrix.lenders.len());
    for (column, name) in matrix.lenders.iter().enumerate() {
        let lender = LenderId::new(name.clone());
        let value = |rule: RuleField| -> Result<f64, RuleTableError> {
            let row = rows.get(&rule).ok_or_else(|| RuleTableError::MissingField {
                lender: lender.clone(),
                rule,
            })?;
            match parse_cell(&row.cells[column]) {
                CellValue::Number(value) => Ok(value),
                CellValue::Empty => Err(RuleTableError::MissingField {
                    lender: lender.clone(),
                    rule,
                }),
                CellValue::Malformed(value) => Err(RuleTableError::MalformedCell {
                    lender: lender.clone(),
                    rule,
                    value,
                }),
            }
        };

        let margin_rate = |category| value(RuleField::MarginRate(category));

        policies.push(LenderPolicy {
            min_security_ratio: value(RuleField::MinSecurityRatio)?,
            roi_low: value(RuleField::RoiLow)?,
            roi_high: value(RuleField::RoiHigh)?,
            pf_min: value(RuleField::PfMin)?,
            pf_max: value(RuleField::PfMax)?,
            ideal_dscr: value(RuleField::IdealDscr)?,
            margin_rates: MarginRates {
                land: margin_rate(LoanCategory::Land)?,
                construction: margin_rate(LoanCategory::Construction)?,
                machinery: margin_rate(LoanCategory::Machinery)?,
                utilities: margin_rate(LoanCategory::Utilities)?,
                other: margin_rate(LoanCategory::Other)?,
            },
            lender: lender.clone(),
        });
    }

    Ok(policies)
}

/// Reference-data boundary supplying lender policies.
pub trait RuleSource: Send + Sync {
    /// Human-readable origin used in logs.
    fn describe(&self) -> String;
    fn load(&self) -> Result<RuleTable, RuleTableError>;
}

impl<T: RuleSource + ?Sized> RuleSource for Box<T> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn load(&self) -> Result<RuleTable, RuleTableError> {
        (**self).load()
    }
}

/// On-disk rule sheet formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFormat {
    Csv,
    Workbook,
}

impl RuleFormat {
    /// Spreadsheet extensions select the workbook reader; anything else is read as CSV.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => Self::Workbook,
            _ => Self::Csv,
        }
    }
}

/// File-backed source matching the sheet's format.
pub fn rule_source_for(path: impl Into<PathBuf>) -> Box<dyn RuleSource> {
    let path = path.into();
    match RuleFormat::from_path(&path) {
        RuleFormat::Csv => Box::new(CsvRuleSource::new(path)),
        RuleFormat::Workbook => Box::new(XlsxRuleSource::new(path)),
    }
}

/// Rule sheet stored as CSV on disk.
#[derive(Debug, Clone)]
pub struct CsvRuleSource {
    path: PathBuf,
}

impl CsvRuleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RuleSource for CsvRuleSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<RuleTable, RuleTableError> {
        RuleTable::from_csv_path(&self.path)
    }
}

/// Rule book kept as a spreadsheet, criteria in the first column of the first worksheet.
#[derive(Debug, Clone)]
pub struct XlsxRuleSource {
    path: PathBuf,
}

impl XlsxRuleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RuleSource for XlsxRuleSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<RuleTable, RuleTableError> {
        RuleTable::from_workbook_path(&self.path)
    }
}

/// Holds the active rule table. Evaluations take a snapshot via [`RuleCatalog::current`], so a
/// reload never changes the table underneath a running evaluation.
pub struct RuleCatalog<S> {
    source: S,
    current: RwLock<Arc<RuleTable>>,
}

impl<S: RuleSource> RuleCatalog<S> {
    pub fn load(source: S) -> Result<Self, RuleTableError> {
        let table = source.load()?;
        info!(
            lenders = table.len(),
            source = %source.describe(),
            "lender rule table loaded"
        );

        Ok(Self {
            source,
            current: RwLock::new(Arc::new(table)),
        })
    }

    pub fn current(&self) -> Arc<RuleTable> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Re-reads the source. On failure the previously loaded table stays active.
    pub fn reload(&self) -> Result<Arc<RuleTable>, RuleTableError> {
        let table = Arc::new(self.source.load().map_err(|err| {
            warn!(source = %self.source.describe(), error = %err, "rule table reload rejected");
            err
        })?);

        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = table.clone();

        info!(
            lenders = table.len(),
            source = %self.source.describe(),
            "lender rule table reloaded"
        );
        Ok(table)
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
