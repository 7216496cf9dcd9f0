use chrono::Datelike;
use chrono::Utc;
use topicrank_vis::color::ColorRegistry;
use topicrank_vis::plot::HistoricalPlot;
use tracing::info;

use crate::cli::AnalyzeArgs;
use crate::config::Config;
use crate::error::CliError;
use crate::fetch::client::BrowserClient;
use crate::mode::Analyzer;
use crate::mode::Settings;

pub(crate) fn run(args: AnalyzeArgs) -> Result<(), CliError> {
    let config = Config::load(args.settings.config.as_deref())?.with_overrides(&args.settings);

    let settings = Settings {
        extract: config.extract_options()?,
        required_elements: config.browser.required_elements.clone(),
        timeout: config.timeout(),
        current_year: Utc::now().year(),
        capture_page_charts: config.extraction.capture_page_charts,
        message: args.message,
    };

    let fetcher = BrowserClient::new(&config.browser)?;
    let mut colors = ColorRegistry::new();
    let plot = HistoricalPlot::new(&config.images_dir);

    let mut analyzer = Analyzer::new(&fetcher, &mut colors, plot, settings)?;
    let run = analyzer.run(args.mode, &args.pages, &args.ranking_fields)?;

    for snapshot in &run.snapshots {
        if let Some(description) = &snapshot.description {
            info!(title = %snapshot.title, "\n{description}");
        }
    }
    if let Some(report) = &run.ranking_report {
        info!("\n{report}");
    }

    for sink in &args.publish {
        let publisher = sink.publisher(&config.output_dir)?;
        publisher.publish(&run)?;
    }

    Ok(())
}
