use anyhow::{Context, Result, bail};

use crate::config::{LATEST, RepoConfig};
use crate::status::StatusReporter;

pub const USER_AGENT: &str = concat!("neoget/", env!("CARGO_PKG_VERSION"));

/// The HTML release listing for one repository, together with the version it
/// describes (resolved from the final redirect URL when "latest" was asked).
pub struct ReleasePage {
    pub html: String,
    pub version: String,
}

/// Retrieve the release page for the requested version token.
pub fn fetch_release_page(
    repo: &RepoConfig,
    version: &str,
    reporter: &mut dyn StatusReporter,
) -> Result<ReleasePage> {
    if version == LATEST {
        reporter.begin(&format!("Getting latest {} release details...", repo.name));
    } else {
        reporter.begin(&format!(
            "Getting details for {} release {version}...",
            repo.name
        ));
    }

    let url = repo.release_page_url(version);
    log::debug!("GET {url}");

    let response = match ureq::get(&url).set("User-Agent", USER_AGENT).call() {
        Ok(response) => response,
        Err(ureq::Error::Status(404, _)) => {
            reporter.fail();
            reporter.info("Release not found.");
            bail!("release not found: {url}");
        }
        Err(ureq::Error::Status(code, _)) => {
            reporter.fail();
            reporter.info(&format!("Status code: {code}"));
            bail!("unexpected status {code} for {url}");
        }
        Err(err) => {
            reporter.fail();
            reporter.info(&format!("Encountered {}", short_reason(&err)));
            return Err(err).with_context(|| format!("failed to fetch {url}"));
        }
    };

    // The "latest" endpoint redirects to the tag page; the final URL names
    // the actual version.
    let resolved = version_from_release_url(response.get_url()).unwrap_or_else(|| version.to_string());

    let html = match response.into_string() {
        Ok(html) => html,
        Err(err) => {
            reporter.fail();
            reporter.info(&format!("Encountered {err}"));
            return Err(err).with_context(|| format!("failed to read release page {url}"));
        }
    };

    reporter.ok();
    if version == LATEST {
        reporter.info(&format!("Latest release: {resolved}"));
    }

    Ok(ReleasePage {
        html,
        version: resolved,
    })
}

/// Short human-readable reason extracted from a ureq error chain.
pub(crate) fn short_reason(err: &ureq::Error) -> String {
    match err {
        ureq::Error::Status(code, _) => format!("status code {code}"),
        ureq::Error::Transport(transport) => match transport.message() {
            Some(message) => format!("{}: {message}", transport.kind()),
            None => transport.kind().to_string(),
        },
    }
}

/// Version named by a release page URL, if it names one.
pub fn version_from_release_url(url: &str) -> Option<String> {
    let segment = url.trim_end_matches('/').rsplit('/').next()?;
    if segment.is_empty() || segment == LATEST {
        None
    } else {
        Some(segment.to_string())
    }
}
