use crate::render::{run_evaluate, EvaluateArgs};
use crate::server;
use bank_finder::error::AppError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Bank Finder",
    about = "Match loan proposals against lender eligibility rules",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Evaluate a proposal file against a rule sheet and print the report
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured lender rule sheet (.csv or .xlsx)
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Evaluate(args) => run_evaluate(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["bank-finder-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn evaluate_requires_a_proposal_file() {
        assert!(Cli::try_parse_from(["bank-finder-api", "evaluate"]).is_err());

        let cli = Cli::try_parse_from([
            "bank-finder-api",
            "evaluate",
            "--proposal",
            "proposal.json",
            "--xlsx",
            "out.xlsx",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Evaluate(args)) => {
                assert_eq!(args.proposal, PathBuf::from("proposal.json"));
                assert_eq!(args.xlsx, Some(PathBuf::from("out.xlsx")));
                assert!(args.rules.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn serve_accepts_rule_override() {
        let cli = Cli::try_parse_from(["bank-finder-api", "serve", "--rules", "banks.csv"])
            .expect("parses");
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.rules, Some(PathBuf::from("banks.csv")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
