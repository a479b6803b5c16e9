use audit_committee::{
    committee::Committee,
    generator::gemini::{GeminiClient, DEFAULT_MODEL},
    report::render_markdown,
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_INPUT: &str = "data/flagged_expenses.csv";
const OUTPUT_MD: &str = "data/committee_report.md";
const OUTPUT_JSON: &str = "data/committee_report.json";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("Audit Committee Orchestrator starting");

    let api_key = env::var("GEMINI_API_KEY").unwrap_or_default();
    if api_key.is_empty() {
        eprintln!("GEMINI_API_KEY not set.");
        std::process::exit(1);
    }
    let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

    let input_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT));

    if !input_path.exists() {
        eprintln!("Input file not found: {}", input_path.display());
        std::process::exit(1);
    }
    let expense_data = fs::read_to_string(&input_path)?;

    info!(
        input = %input_path.display(),
        model = %model,
        "Launching 3-agent deliberation sequence"
    );

    let committee = Committee::new(GeminiClient::with_model(api_key, &model));

    match committee.deliberate(&expense_data).await {
        Ok(report) => {
            println!("\n=== COMMITTEE DELIBERATION COMPLETE ===");
            println!("Report ID:   {}", report.report_id);
            println!(
                "Violations:  {}",
                report.forensic_report.violations.len()
            );
            println!("Risk Rating: {:?}", report.strategy_draft.risk_rating);
            println!(
                "Exposure:    ${:.2}",
                report.strategy_draft.total_exposure_usd
            );
            println!(
                "Weaknesses:  {}",
                report.critic_feedback.weaknesses.len()
            );

            if let Some(parent) = Path::new(OUTPUT_MD).parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(OUTPUT_MD, render_markdown(&report, &expense_data))?;
            fs::write(OUTPUT_JSON, serde_json::to_string_pretty(&report)?)?;

            println!("\nReport saved to {} and {}", OUTPUT_MD, OUTPUT_JSON);
            Ok(())
        }
        Err(e) => {
            eprintln!("Committee deliberation failed: {}", e);
            Err(Box::new(e) as Box<dyn std::error::Error>)
        }
    }
}
