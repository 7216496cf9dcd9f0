use chrono::Datelike;
use chrono::Utc;
use topicrank_vis::color::ColorRegistry;
use topicrank_vis::plot::HistoricalPlot;

use crate::cli::ParseArgs;
use crate::config::Config;
use crate::error::CliError;
use crate::fetch::FileFetcher;
use crate::mode::Analyzer;
use crate::mode::Mode;
use crate::mode::Settings;

/// Stands in for the page URL when the saved page is analyzed without one.
const LOCAL_URL: &str = "file:///saved-page";

pub(crate) fn run(args: ParseArgs) -> Result<(), CliError> {
    let config = Config::load(args.settings.config.as_deref())?.with_overrides(&args.settings);

    // A saved page is already rendered; there is nothing to wait for.
    let settings = Settings {
        extract: config.extract_options()?,
        required_elements: Vec::new(),
        timeout: config.timeout(),
        current_year: Utc::now().year(),
        capture_page_charts: config.extraction.capture_page_charts,
        message: None,
    };

    let fetcher = FileFetcher::new(args.file);
    let mut colors = ColorRegistry::new();
    let plot = HistoricalPlot::new(&config.images_dir);

    let url = args.title_url.unwrap_or_else(|| String::from(LOCAL_URL));
    let mut analyzer = Analyzer::new(&fetcher, &mut colors, plot, settings)?;
    let run = analyzer.run(Mode::Summary, &[url], &[])?;

    println!("{}", serde_json::to_string_pretty(&run.snapshots)?);

    Ok(())
}
