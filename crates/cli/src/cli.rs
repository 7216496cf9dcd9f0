use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use url::Url;

use crate::mode::Mode;
use crate::mode::RankingField;
use crate::publish::Sink;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,

    /// Log the progress of every page in detail.
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Fetch topic pages, analyze them in the selected mode and publish the result.
    Analyze(AnalyzeArgs),
    /// Analyze a previously saved topic page without fetching anything.
    Parse(ParseArgs),
}

#[derive(Args)]
pub(crate) struct AnalyzeArgs {
    /// Specify how the topics are analyzed.
    #[arg(short, long, value_enum)]
    pub(crate) mode: Mode,

    /// The URLs of the topic pages to analyze.
    ///
    /// The summary mode analyzes the first page only, the comparison mode
    /// requires exactly two pages and the ranking mode at least two.
    #[arg(short, long, num_args = 1.., required = true, value_parser(parse_url))]
    pub(crate) pages: Vec<String>,

    /// Specify the fields the topics are ranked by.
    /// If no field is specified then the topics are ranked by every field.
    #[arg(short, long, num_args = 1.., value_enum)]
    pub(crate) ranking_fields: Vec<RankingField>,

    /// Specify where the result is published.
    /// If no sink is specified then the result is only logged.
    #[arg(long, num_args = 1.., value_enum)]
    pub(crate) publish: Vec<Sink>,

    /// A custom message attached to the published topics.
    #[arg(long)]
    pub(crate) message: Option<String>,

    #[command(flatten)]
    pub(crate) settings: SettingsArgs,
}

#[derive(Args)]
pub(crate) struct ParseArgs {
    /// Specify the path of the saved topic page.
    /// The path must exist and it must point to a file.
    #[arg(short, long, value_parser(parse_file))]
    pub(crate) file: PathBuf,

    /// The URL the page was saved from. It is used as the title of the
    /// topic when the page has none.
    #[arg(short, long, value_parser(parse_url))]
    pub(crate) title_url: Option<String>,

    #[command(flatten)]
    pub(crate) settings: SettingsArgs,
}

#[derive(Args)]
pub(crate) struct SettingsArgs {
    /// Specify the path of the JSON configuration file.
    /// If the path is not specified then `topicrank.json` is read from the
    /// current working directory when it exists.
    #[arg(short, long, value_parser(parse_file))]
    pub(crate) config: Option<PathBuf>,

    /// Specify the directory where the plots are created.
    #[arg(long)]
    pub(crate) images_dir: Option<PathBuf>,

    /// Specify the directory where the published results are created.
    #[arg(long)]
    pub(crate) output_dir: Option<PathBuf>,

    /// The number of important words to extract.
    #[arg(long)]
    pub(crate) words: Option<usize>,

    /// The number of awards to keep per category.
    #[arg(long)]
    pub(crate) awards: Option<usize>,

    /// The number of outbound links to extract.
    #[arg(long)]
    pub(crate) links: Option<usize>,

    /// Save the history charts the pages render themselves instead of plotting
    /// the inline data, and read the latest levels from the page gauges.
    #[arg(long)]
    pub(crate) capture_page_charts: bool,
}

fn parse_file(path: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path);

    if !path.exists() {
        return Err(format!("The `{}` path does not exist.", path.display()));
    }

    if !path.is_file() {
        return Err(format!(
            "The `{}` path must point to a file.",
            path.display()
        ));
    }

    Ok(path)
}

fn parse_url(url: &str) -> Result<String, String> {
    Url::parse(url)
        .map(|_| url.to_owned())
        .map_err(|error| format!("The `{url}` URL is not valid: {error}."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn analyze_accepts_field_aliases() -> Result<(), clap::Error> {
        let cli = Cli::try_parse_from([
            "topicrank",
            "analyze",
            "--mode",
            "ranking",
            "--pages",
            "http://x/A",
            "http://x/B",
            "--ranking-fields",
            "recent_conflict",
            "mean_polemic_level",
            "--publish",
            "json",
            "-v",
        ])?;

        let Commands::Analyze(args) = cli.command else {
            panic!("expected the analyze command");
        };

        assert!(cli.verbose);
        assert_eq!(args.mode, Mode::Ranking);
        assert_eq!(args.pages, vec!["http://x/A", "http://x/B"]);
        assert_eq!(
            args.ranking_fields,
            vec![RankingField::RecentConflict, RankingField::MeanPolemic]
        );
        assert_eq!(args.publish, vec![Sink::Json]);

        Ok(())
    }

    #[test]
    fn analyze_rejects_invalid_urls() {
        let result = Cli::try_parse_from([
            "topicrank",
            "analyze",
            "--mode",
            "summary",
            "--pages",
            "not a url",
        ]);

        assert!(result.is_err());
    }
}
