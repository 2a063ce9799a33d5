use std::sync::Arc;

use super::domain::{Proposal, ProposalError, ProposalInput};
use super::report::{workbook_bytes, EligibilityReport, ExportError};
use super::rules::{RuleCatalog, RuleSource, RuleTable, RuleTableError};

/// Service composing proposal validation, the rule catalog and report aggregation.
pub struct EligibilityService<S> {
    catalog: RuleCatalog<S>,
}

impl<S> EligibilityService<S>
where
    S: RuleSource + 'static,
{
    pub fn new(catalog: RuleCatalog<S>) -> Self {
        Self { catalog }
    }

    /// Loads the rule table from `source`, failing before any evaluation can run.
    pub fn from_source(source: S) -> Result<Self, RuleTableError> {
        Ok(Self::new(RuleCatalog::load(source)?))
    }

    /// Validate the proposal and evaluate it against every lender.
    pub fn evaluate(
        &self,
        input: ProposalInput,
    ) -> Result<EligibilityReport, EligibilityServiceError> {
        let proposal = Proposal::validate(input)?;
        Ok(EligibilityReport::run(&proposal, self.catalog.current()))
    }

    /// Evaluate and serialize the result tables as an `.xlsx` workbook.
    pub fn export(&self, input: ProposalInput) -> Result<Vec<u8>, EligibilityServiceError> {
        let report = self.evaluate(input)?;
        Ok(workbook_bytes(&report.tables())?)
    }

    pub fn rules(&self) -> Arc<RuleTable> {
        self.catalog.current()
    }

    pub fn reload_rules(&self) -> Result<Arc<RuleTable>, EligibilityServiceError> {
        Ok(self.catalog.reload()?)
    }

    pub fn catalog(&self) -> &RuleCatalog<S> {
        &self.catalog
    }
}

/// Error raised by the eligibility service.
#[derive(Debug, thiserror::Error)]
pub enum EligibilityServiceError {
    #[error(transparent)]
    Proposal(#[from] ProposalError),
    #[error(transparent)]
    Rules(#[from] RuleTableError),
    #[error(transparent)]
    Export(#[from] ExportError),
}
