use super::server;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::review::report::views::RowHighlight;
use crate::review::report::write_review_sheet;
use crate::review::{
    review_export, CeilingComparison, CellCoercion, CtrUnit, EvaluationEngine, ImportOptions,
    RecommendationCatalog, ReviewReport, Stage, ThresholdOverrides,
};
use crate::telemetry;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "ad-review",
    about = "Flag underperforming ads in a performance export using kill criteria",
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
    /// Review an ad performance export and print the weekly review sheet
    Review(ReviewArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct ReviewArgs {
    /// Ad performance export (CSV)
    #[arg(long, short)]
    input: PathBuf,
    /// Campaign stage: mockup, cycle1, or cycle2 (defaults to REVIEW_STAGE)
    #[arg(long)]
    stage: Option<Stage>,
    /// CPC ceiling in USD, e.g. 1.00, 1.25, or 1.50
    #[arg(long)]
    cpc_ceiling: Option<f64>,
    /// Minimum CTR as a fraction (0.0075 = 0.75%)
    #[arg(long)]
    ctr_floor: Option<f64>,
    /// Minimum spend before mockup and cycle 1 ads are judged
    #[arg(long)]
    min_spend_stage_a: Option<f64>,
    /// Minimum spend before cycle 2 ads are judged
    #[arg(long)]
    min_spend_stage_b: Option<f64>,
    /// Link clicks required to count as engagement
    #[arg(long)]
    min_clicks: Option<u64>,
    /// Flag CPC only when strictly above the ceiling
    #[arg(long)]
    strict_cpc: bool,
    /// Unit of the CTR column: fraction or percent
    #[arg(long)]
    ctr_unit: Option<CtrUnit>,
    /// JSON file rewording or extending the recommendation catalog
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Date printed on the review sheet (defaults to today)
    #[arg(long, value_parser = parse_date)]
    report_date: Option<NaiveDate>,
    /// Write the review sheet to this CSV file
    #[arg(long, short)]
    output: Option<PathBuf>,
}

impl ReviewArgs {
    fn overrides(&self) -> ThresholdOverrides {
        ThresholdOverrides {
            cpc_ceiling: self.cpc_ceiling,
            ctr_floor: self.ctr_floor,
            min_spend_stage_a: self.min_spend_stage_a,
            min_spend_stage_b: self.min_spend_stage_b,
            min_clicks_for_engagement: self.min_clicks,
            cpc_comparison: self.strict_cpc.then_some(CeilingComparison::Above),
        }
    }
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Review(args) => run_review(args),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn run_review(args: ReviewArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let defaults = config.review;
    let thresholds = args.overrides().apply(&defaults.thresholds)?;
    let stage = args.stage.unwrap_or(defaults.stage);
    let catalog = match &args.catalog {
        Some(path) => RecommendationCatalog::from_path(path)?,
        None => RecommendationCatalog::standard(),
    };
    let engine = EvaluationEngine::new(thresholds, stage).with_catalog(catalog);
    let options = ImportOptions {
        ctr_unit: args.ctr_unit.unwrap_or(defaults.ctr_unit),
    };
    let report_date = args
        .report_date
        .unwrap_or_else(|| Local::now().date_naive());

    let file = File::open(&args.input)?;
    let outcome = review_export(file, &options, &engine, report_date)?;

    render_review(&engine, &outcome.report, &outcome.coercions);

    if let Some(path) = &args.output {
        let writer = BufWriter::new(File::create(path)?);
        write_review_sheet(writer, &outcome.report)?;
        info!(path = %path.display(), "review sheet written");
        println!("\nReview sheet written to {}", path.display());
    }

    Ok(())
}

fn render_review(engine: &EvaluationEngine, report: &ReviewReport, coercions: &[CellCoercion]) {
    let thresholds = engine.config();
    let comparison = match thresholds.cpc_comparison {
        CeilingComparison::AtOrAbove => ">=",
        CeilingComparison::Above => ">",
    };

    println!("Weekly ad performance review");
    println!(
        "Stage: {} | report date {}",
        engine.stage().label(),
        report.report_date
    );
    println!(
        "Kill criteria: CPC {} ${:.2}, CTR < {:.2}%, min spend ${:.2}, min clicks {}",
        comparison,
        thresholds.cpc_ceiling,
        thresholds.ctr_floor * 100.0,
        thresholds.min_spend_for(engine.stage()),
        thresholds.min_clicks_for_engagement
    );

    let summary = &report.summary;
    println!("\nSummary");
    println!("- Ads reviewed: {}", summary.total);
    println!("- Flagged: {}", summary.flagged);
    println!(
        "- Passed: {} ({} keep, {} insufficient data)",
        summary.passed, summary.kept, summary.insufficient_data
    );
    println!("- Spend on flagged ads: {}", summary.flagged_spend_label());
    println!(
        "- Average CTR of flagged ads: {}",
        summary.flagged_average_ctr_label()
    );

    if report.rows.is_empty() {
        println!("\nNo ads found in the export");
    } else {
        println!("\nAds");
        for row in &report.rows {
            let marker = match row.highlight {
                RowHighlight::Red => "!!",
                RowHighlight::Yellow => "~ ",
                RowHighlight::Blue => "..",
                RowHighlight::Green => "ok",
            };
            println!(
                "[{}] {} | spend {} | CTR {} | clicks {} | CPC {} | ROAS {} | {} | {} | {}",
                marker,
                row.ad_name,
                row.spend,
                row.ctr,
                row.link_clicks,
                row.cpc,
                row.roas,
                row.reason_label,
                row.action,
                row.recommendation
            );
        }
    }

    if !coercions.is_empty() {
        println!("\nUnreadable cells shown as N/A");
        for coercion in coercions {
            println!(
                "- line {}, {}: '{}'",
                coercion.line, coercion.column, coercion.raw
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_args_parse_into_overrides() {
        let cli = Cli::try_parse_from([
            "ad-review",
            "review",
            "--input",
            "ads.csv",
            "--stage",
            "cycle2",
            "--cpc-ceiling",
            "1.5",
            "--min-clicks",
            "3",
            "--strict-cpc",
            "--ctr-unit",
            "percent",
            "--report-date",
            "2025-06-02",
        ])
        .expect("arguments parse");

        let Some(Command::Review(args)) = cli.command else {
            panic!("expected review command");
        };
        assert_eq!(args.stage, Some(Stage::ScaleStage));
        assert_eq!(args.ctr_unit, Some(CtrUnit::Percent));
        assert_eq!(args.report_date, NaiveDate::from_ymd_opt(2025, 6, 2));

        let overrides = args.overrides();
        assert_eq!(overrides.cpc_ceiling, Some(1.5));
        assert_eq!(overrides.min_clicks_for_engagement, Some(3));
        assert_eq!(overrides.cpc_comparison, Some(CeilingComparison::Above));
        assert_eq!(overrides.ctr_floor, None);
    }

    #[test]
    fn unknown_stage_is_rejected_by_the_parser() {
        let result = Cli::try_parse_from(["ad-review", "review", "-i", "ads.csv", "--stage", "cycle9"]);
        assert!(result.is_err());
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["ad-review"]).expect("arguments parse");
        assert!(cli.command.is_none());
    }
}
