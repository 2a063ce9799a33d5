use bank_finder::config::AppConfig;
use bank_finder::error::AppError;
use bank_finder::telemetry::{self, LogSink};
use bank_finder::workflows::eligibility::report::save_workbook;
use bank_finder::workflows::eligibility::report::views::{Cell, ScoreRankingEntry, Table};
use bank_finder::workflows::eligibility::{EligibilityReport, Proposal, ProposalInput, RuleTable};
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

const BAR_WIDTH: usize = 40;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Lender rule sheet, .csv or .xlsx (defaults to APP_RULES_PATH)
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
    /// Proposal JSON file
    #[arg(long)]
    pub(crate) proposal: PathBuf,
    /// Also write the report workbook to this path
    #[arg(long)]
    pub(crate) xlsx: Option<PathBuf>,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, LogSink::Stderr)?;

    let rules_path = args.rules.unwrap_or(config.rules.path);
    let rules = Arc::new(RuleTable::from_path(&rules_path)?);
    let proposal = load_proposal(&args.proposal)?;

    let report = EligibilityReport::run(&proposal, rules);
    print!("{}", render_report(&report));

    if let Some(path) = args.xlsx {
        save_workbook(&report.tables(), &path)?;
        info!(path = %path.display(), "eligibility workbook written");
        println!("\nWorkbook written to {}", path.display());
    }

    Ok(())
}

fn load_proposal(path: &Path) -> Result<Proposal, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let input: ProposalInput = serde_json::from_str(&raw)?;
    Ok(Proposal::validate(input)?)
}

pub(crate) fn render_report(report: &EligibilityReport) -> String {
    let mut out = String::new();
    let tables = report.tables();

    out.push_str("Calculated values\n");
    out.push_str(&format!(
        "- Primary security offered: {}\n",
        report.proposal.primary_security.label()
    ));
    out.push_str(&format!(
        "- Project cost: {:.2}\n",
        report.proposal.project_cost
    ));
    out.push_str(&format!(
        "- Required total loan: {:.2}\n",
        report.proposal.required_total_loan
    ));
    out.push_str(&format!(
        "- Security value: {:.2}\n",
        report.proposal.security_value
    ));

    out.push_str("\nParameter checks\n");
    out.push_str(&render_table(&tables.parameter_checks));

    if tables.eligible.is_empty() {
        out.push_str("\nEligible banks: none\n");
    } else {
        out.push_str("\nEligible banks (ranked)\n");
        out.push_str(&render_table(&tables.eligible));
    }

    if tables.rejected.is_empty() {
        out.push_str("\nRejected banks: none\n");
    } else {
        out.push_str("\nRejected banks\n");
        out.push_str(&render_table(&tables.rejected));
    }

    out.push_str("\nRecommendations\n");
    for row in &report.recommendations {
        out.push_str(&format!("- {}: {}\n", row.bank, row.recommendations));
    }

    let ranking = report.score_ranking();
    if !ranking.is_empty() {
        out.push_str("\nApproval score ranking\n");
        out.push_str(&render_ranking(&ranking));
    }

    out
}

fn render_table(table: &Table) -> String {
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(terminal_cell).collect())
        .collect();

    let widths: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .map(|(column, header)| {
            rows.iter()
                .filter_map(|row| row.get(column))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = format_line(&table.headers, &widths);
    for row in &rows {
        out.push_str(&format_line(row, &widths));
    }
    out
}

fn terminal_cell(cell: &Cell) -> String {
    match cell {
        Cell::Check(indicator) => indicator.light().to_string(),
        other => other.display(),
    }
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let fill = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(fill))
        })
        .collect();
    format!("{}\n", padded.join(" | ").trim_end())
}

fn render_ranking(ranking: &[ScoreRankingEntry]) -> String {
    let label_width = ranking
        .iter()
        .map(|entry| entry.bank.as_str().chars().count())
        .max()
        .unwrap_or(0);

    ranking
        .iter()
        .map(|entry| {
            let filled = ((entry.score / 100.0) * BAR_WIDTH as f64).round() as usize;
            let bar = "#".repeat(filled.min(BAR_WIDTH));
            let label = entry.bank.as_str();
            let fill = label_width - label.chars().count();
            format!(
                "{label}{} | {bar:<width$} {:.2}\n",
                " ".repeat(fill),
                entry.score,
                width = BAR_WIDTH
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bank_finder::workflows::eligibility::LenderId;

    const SAMPLE_RULES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/lender_rules.csv");
    const SAMPLE_PROPOSAL: &str = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../config/sample_proposal.json"
    );

    fn sample_report() -> EligibilityReport {
        let rules = RuleTable::from_path(SAMPLE_RULES).expect("sample rules load");
        let proposal = load_proposal(Path::new(SAMPLE_PROPOSAL)).expect("sample proposal loads");
        EligibilityReport::run(&proposal, Arc::new(rules))
    }

    #[test]
    fn report_lists_every_section() {
        let output = render_report(&sample_report());

        for section in [
            "Calculated values",
            "Parameter checks",
            "Eligible banks (ranked)",
            "Rejected banks",
            "Recommendations",
            "Approval score ranking",
        ] {
            assert!(output.contains(section), "missing section {section}");
        }
        assert!(output.contains("- Project cost: 19500000.00"));
        assert!(output.contains("- Required total loan: 16000000.00"));
    }

    #[test]
    fn parameter_matrix_uses_traffic_lights() {
        let output = render_report(&sample_report());

        let hdfc = output
            .lines()
            .find(|line| line.starts_with("HDFC Bank") && line.contains('🔴'))
            .expect("HDFC parameter row");
        assert_eq!(hdfc.matches('🔴').count(), 2);
        assert_eq!(hdfc.matches('🟢').count(), 3);
    }

    #[test]
    fn ranking_bars_scale_with_score() {
        let ranking = vec![
            ScoreRankingEntry {
                bank: LenderId::new("Alpha Bank"),
                score: 100.0,
            },
            ScoreRankingEntry {
                bank: LenderId::new("Beta"),
                score: 50.0,
            },
        ];

        let output = render_ranking(&ranking);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0].matches('#').count(), BAR_WIDTH);
        assert_eq!(lines[1].matches('#').count(), BAR_WIDTH / 2);
        assert!(lines[1].starts_with("Beta       | "));
        assert!(lines[0].ends_with("100.00"));
    }

    #[test]
    fn unreadable_proposal_is_reported() {
        let error = load_proposal(Path::new("does-not-exist.json")).expect_err("missing file");
        assert!(matches!(error, AppError::Io(_)));
    }
}
