//! Canned site pages shared by the service tests.

use crate::models::{Config, Topic};

pub(crate) fn news_config(topics: &[&str]) -> Config {
    let mut config = Config::default();
    config.crawler.request_delay_ms = 0;
    config.source.topics = topics.iter().map(|t| Topic::from(*t)).collect();
    config
}

pub(crate) fn publications_config(topics: &[&str]) -> Config {
    let mut config = news_config(topics);
    config.source.start_url = "https://www.nist.gov/publications".to_string();
    config
}

pub(crate) fn listing_url(config: &Config, topic: &str, page: usize) -> String {
    config
        .source
        .listing_url(&Topic::from(topic), page)
        .unwrap()
}

pub(crate) fn listing_html(links: &[&str], last_page: Option<usize>) -> String {
    let teasers: String = links
        .iter()
        .map(|link| {
            format!(
                r#"<div class="nist-teaser"><h3><a href="{link}">Teaser</a></h3><time datetime="2024-03-12T10:00:00-04:00">March 12, 2024</time></div>"#
            )
        })
        .collect();
    let pager = last_page
        .map(|last| {
            format!(
                r#"<ul class="pager"><li class="pager__item"><a href="?page=1">Next</a></li><li class="pager__item pager__item--last"><a href="?k=x&amp;page={last}">Last</a></li></ul>"#
            )
        })
        .unwrap_or_default();
    format!("<html><body><main>{teasers}</main>{pager}</body></html>")
}

pub(crate) fn news_html(title: &str, date: &str) -> String {
    format!(
        r#"<html><body>
        <h1 class="nist-page__title">{title}</h1>
        <time datetime="{date}">Published</time>
        <div class="nist-block nist-block--intro"><h3>Intro for {title}</h3></div>
        <div class="text-with-summary"><p>First paragraph.</p>
        <p>Second paragraph.</p></div>
        <div class="nist-tags"><a href="/topics/quantum">Quantum</a> <a href="/topics/time">Time and frequency</a></div>
        </body></html>"#
    )
}

pub(crate) fn publication_html(title: &str, date: &str, doi: Option<&str>) -> String {
    let doi_link = doi
        .map(|href| format!(r#"<p>DOI: <a href="{href}">{href}</a></p>"#))
        .unwrap_or_default();
    format!(
        r#"<html><body>
        <a href="/publications">Publications</a>
        <h1 class="nist-page__title">{title}</h1>
        <time datetime="{date}">Published</time>
        <div class="nist-author">Ada Lovelace</div>
        <div class="nist-author">Alan Turing</div>
        <div class="text-with-summary"><p>Summary of {title}.</p></div>
        {doi_link}
        <div class="nist-tags">Metrology</div>
        </body></html>"#
    )
}
