pub(crate) mod client;
pub(crate) mod error;

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use topicrank_analytics::Page;
use topicrank_analytics::extract;

use crate::fetch::error::FetchError;
use crate::fetch::error::Result;

/// Loads the source of a page once the elements its scripts render are present.
pub(crate) trait PageFetcher {
    fn fetch(&self, url: &str, required_elements: &[String], timeout: Duration) -> Result<String>;
}

/// Serves a previously saved page, whatever URL it is asked for.
pub(crate) struct FileFetcher {
    path: PathBuf,
}

impl FileFetcher {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl PageFetcher for FileFetcher {
    fn fetch(&self, url: &str, required_elements: &[String], timeout: Duration) -> Result<String> {
        let html = fs::read_to_string(&self.path).map_err(|source| FetchError::Io {
            path: self.path.clone(),
            source,
        })?;

        ensure_rendered(url, &html, required_elements, timeout)?;
        Ok(html)
    }
}

/// Fails when the page source lacks any of the required elements.
pub(crate) fn ensure_rendered(
    url: &str,
    html: &str,
    required_elements: &[String],
    timeout: Duration,
) -> Result<()> {
    if required_elements.is_empty() {
        return Ok(());
    }

    let page = Page::parse(url, html);
    let missing = extract::missing_elements(page.document(), required_elements);

    if missing.is_empty() {
        Ok(())
    } else {
        Err(FetchError::Timeout {
            url: url.to_owned(),
            missing,
            timeout_secs: timeout.as_secs(),
        })
    }
}
