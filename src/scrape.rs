use anyhow::{Result, anyhow};
use scraper::{Html, Selector};

use crate::config::RepoConfig;
use crate::release::ReleasePage;
use crate::status::StatusReporter;

/// Locate the downloadable assets on a release page, reporting the outcome.
pub fn locate_assets(
    page: &ReleasePage,
    repo: &RepoConfig,
    selector: &str,
    reporter: &mut dyn StatusReporter,
) -> Result<Vec<String>> {
    reporter.begin(&format!("Locating {} {} assets...", repo.name, page.version));

    let urls = match extract_asset_urls(&page.html, selector, &repo.base_url) {
        Ok(urls) => urls,
        Err(err) => {
            reporter.fail();
            reporter.info("Invalid asset selector (configuration error).");
            return Err(err);
        }
    };

    reporter.ok();
    if urls.is_empty() {
        reporter.warn("No downloadable assets found on the release page.");
    } else {
        reporter.info(&format!("{} assets to download.", urls.len()));
    }
    for url in &urls {
        reporter.debug(url);
    }

    Ok(urls)
}

/// Apply the asset selector to the page HTML and resolve each matching anchor
/// to an absolute URL, in document order. Anchors labelled as source-code
/// archives are excluded.
pub fn extract_asset_urls(html: &str, selector: &str, base_url: &str) -> Result<Vec<String>> {
    let selector =
        Selector::parse(selector).map_err(|err| anyhow!("invalid selector {selector:?}: {err:?}"))?;

    let document = Html::parse_document(html);
    let mut urls = Vec::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if is_source_archive(&element_text(element)) {
            continue;
        }
        urls.push(absolute_url(base_url, href));
    }

    Ok(urls)
}

fn element_text(element: scraper::element_ref::ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Release pages list the auto-generated source archives alongside the real
/// assets; those are never installable.
fn is_source_archive(label: &str) -> bool {
    label.to_lowercase().starts_with("source code")
}

fn absolute_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{}{href}", base_url.trim_end_matches('/'))
    } else {
        format!("{}/{href}", base_url.trim_end_matches('/'))
    }
}
