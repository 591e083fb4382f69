use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use bot_traffic_analyzer::analyzer::{collect_log_files, BotTrafficAnalyzer};
use bot_traffic_analyzer::config::Config;
use bot_traffic_analyzer::report::JsonReportRenderer;
use bot_traffic_analyzer::traits::ReportRenderer;

fn main() -> Result<()> {
    // Load .env file if present (fails silently if not found)
    dotenvy::dotenv().ok();

    // Logs go to stderr so the rendered report owns stdout
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("❌ Configuration error: {:#}", e);
            tracing::error!("💡 Optional environment variables:");
            tracing::error!("   - BOT_PATTERNS_FILE: JSON file with bot_patterns and categories");
            tracing::error!("   - ANALYZER_THREADS: worker threads for file processing");
            tracing::error!("   - ANALYZER_SAMPLE_SIZE: lines sampled for format detection");
            tracing::error!("   - ANALYZER_TOP_BOTS: top user-agents listed per file and overall");
            std::process::exit(1);
        }
    };
    config.log_config();

    let inputs: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    let files = collect_log_files(&inputs);
    info!("🚀 Analyzing {} log files", files.len());

    let analyzer = BotTrafficAnalyzer::with_config(&config.pattern_config()?, config.analyzer_config())?;
    let report = analyzer.analyze(&files)?;

    let renderer = JsonReportRenderer {
        pretty: config.pretty_output,
    };
    renderer.render_to(&report, std::io::stdout().lock())?;
    println!();

    Ok(())
}
