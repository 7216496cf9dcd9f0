use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use topicrank_analytics::ExtractOptions;
use topicrank_analytics::extract;
use topicrank_analytics::extract::ChartLocator;
use topicrank_analytics::extract::LinkLocator;
use tracing::debug;

use crate::cli::SettingsArgs;

/// Looked up in the working directory when no configuration file is given.
const DEFAULT_CONFIG_FILE: &str = "topicrank.json";

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("config error: reading `{}` failed: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config error: `{}` is not a valid configuration: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config error: invalid website base URL \"{url}\": {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub images_dir: PathBuf,
    pub output_dir: PathBuf,
    pub website_base_url: String,
    pub browser: BrowserConfig,
    pub extraction: ExtractionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from("images_to_post"),
            output_dir: PathBuf::from("pages_to_post"),
            website_base_url: String::from("http://en.negapedia.org"),
            browser: BrowserConfig::default(),
            extraction: ExtractionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct BrowserConfig {
    pub endpoint: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub settle_millis: u64,
    pub required_elements: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            endpoint: String::from("http://localhost:3000"),
            token: None,
            timeout_secs: 10,
            settle_millis: 5000,
            required_elements: vec![
                String::from("chart_time_conflict"),
                String::from("chart_time_polemic"),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct ExtractionConfig {
    pub words: usize,
    pub awards: usize,
    pub links: usize,
    pub ranks_variable: String,
    pub words_variable: String,
    pub links_container: String,
    pub links_attribute: String,
    /// Capture the charts the page renders instead of plotting the inline data.
    pub capture_page_charts: bool,
    pub page_charts: ChartLocator,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        let locator = LinkLocator::default();

        Self {
            words: 100,
            awards: 100,
            links: 100,
            ranks_variable: String::from("NEGARANKS"),
            words_variable: String::from("WORDS"),
            links_container: locator.container,
            links_attribute: locator.attribute,
            capture_page_charts: false,
            page_charts: ChartLocator::default(),
        }
    }
}

impl Config {
    /// Reads the configuration file. An explicit path must exist; otherwise the default
    /// file is read when present and the built-in defaults are used when it is not.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !path.is_file() {
                    debug!("no configuration file found, using defaults");
                    return Ok(Config::default());
                }
                path
            }
        };

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), "loading configuration");
        serde_json::from_str(&content).map_err(|source| ConfigError::Json { path, source })
    }

    /// Command-line values take precedence over the file.
    pub fn with_overrides(mut self, args: &SettingsArgs) -> Self {
        if let Some(dir) = &args.images_dir {
            self.images_dir = dir.clone();
        }
        if let Some(dir) = &args.output_dir {
            self.output_dir = dir.clone();
        }
        if let Some(words) = args.words {
            self.extraction.words = words;
        }
        if let Some(awards) = args.awards {
            self.extraction.awards = awards;
        }
        if let Some(links) = args.links {
            self.extraction.links = links;
        }
        if args.capture_page_charts {
            self.extraction.capture_page_charts = true;
        }
        self
    }

    pub fn extract_options(&self) -> Result<ExtractOptions, ConfigError> {
        let base_url =
            extract::base_url(&self.website_base_url).map_err(|source| ConfigError::BaseUrl {
                url: self.website_base_url.clone(),
                source,
            })?;

        let extraction = &self.extraction;
        Ok(ExtractOptions {
            ranks_variable: extraction.ranks_variable.clone(),
            words_variable: extraction.words_variable.clone(),
            words: extraction.words,
            awards: extraction.awards,
            links: extraction.links,
            link_locator: LinkLocator {
                container: extraction.links_container.clone(),
                attribute: extraction.links_attribute.clone(),
            },
            charts: extraction.page_charts.clone(),
            base_url,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.browser.timeout_secs)
    }
}
