/*
 * race-map, race calendar map generator.
 * Copyright (c) 2024 race-map contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or any later version.
 */

//! Listing page parsing

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::NaiveDate;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::error::{MapError, MapResult};
use crate::models::Event;

static EVENT_ITEM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul#adv-filter-gallery > li").unwrap());
static EVENT_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h4.stories__headline a").unwrap());
static EVENT_TIME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("time[datetime]").unwrap());

/// Extract events from one calendar listing page
///
/// Relative links are resolved against `page_url`. Items without a link
/// or a date are ignored; items whose link or date cannot be read are
/// logged and skipped. A link listed twice yields one event.
pub fn extract_events(html: &str, page_url: &str) -> MapResult<Vec<Event>> {
    let base = Url::parse(page_url)
        .map_err(|e| MapError::InvalidInput(format!("bad page URL {}: {}", page_url, e)))?;
    let document = Html::parse_document(html);

    let mut seen = HashSet::new();
    let mut events = Vec::new();

    for item in document.select(&EVENT_ITEM) {
        match parse_item(item, &base) {
            Ok(Some(event)) => {
                if seen.insert(event.link.clone()) {
                    events.push(event);
                }
            }
            Ok(None) => {}
            Err(reason) => tracing::warn!("Issue parsing one event: {}", reason),
        }
    }

    tracing::info!("{} events found with URLs and dates on {}", events.len(), page_url);
    Ok(events)
}

fn parse_item(item: ElementRef<'_>, base: &Url) -> Result<Option<Event>, String> {
    let link = item.select(&EVENT_LINK).next();
    let time = item.select(&EVENT_TIME).next();
    let (Some(link), Some(time)) = (link, time) else {
        return Ok(None);
    };

    let href = link
        .value()
        .attr("href")
        .ok_or_else(|| "event link has no href".to_string())?;
    let url = base
        .join(href)
        .map_err(|e| format!("cannot resolve '{}': {}", href, e))?;

    let raw_date = time.value().attr("datetime").unwrap_or_default();
    let date = NaiveDate::parse_from_str(raw_date.trim(), "%Y-%m-%d")
        .map_err(|e| format!("bad date '{}' for {}: {}", raw_date, url, e))?;

    Ok(Some(Event::new(url.to_string(), date)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://fftri.t2area.com/calendrier.html?limitstart=0";

    fn item(href: &str, date: &str) -> String {
        format!(
            r#"<li><h4 class="stories__headline"><a href="{}">x</a></h4>
               <time datetime="{}">whenever</time></li>"#,
            href, date
        )
    }

    fn listing(items: &[String]) -> String {
        format!(
            r#"<html><body><ul id="adv-filter-gallery">{}</ul>
               <ul><li><h4 class="stories__headline"><a href="/elsewhere.html">y</a></h4>
               <time datetime="2025-01-01"></time></li></ul></body></html>"#,
            items.concat()
        )
    }

    #[test]
    fn resolves_links_and_parses_dates() {
        let html = listing(&[
            item("/calendrier/triathlon-de-nice.html", "2025-06-08"),
            item("https://other.example/race.html", "2025-07-01"),
        ]);

        let events = extract_events(&html, PAGE).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0].link,
            "https://fftri.t2area.com/calendrier/triathlon-de-nice.html"
        );
        assert_eq!(events[0].date, NaiveDate::from_ymd_opt(2025, 6, 8).unwrap());
        assert_eq!(events[1].link, "https://other.example/race.html");
    }

    #[test]
    fn ignores_items_outside_the_gallery() {
        let events = extract_events(&listing(&[]), PAGE).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn skips_bad_dates_and_incomplete_items() {
        let html = listing(&[
            item("/calendrier/a.html", "08/06/2025"),
            "<li><h4 class=\"stories__headline\"><a href=\"/calendrier/b.html\">b</a></h4></li>"
                .to_string(),
            item("/calendrier/c.html", "2025-06-08"),
        ]);

        let events = extract_events(&html, PAGE).unwrap();

        assert_eq!(events.len(), 1);
        assert!(events[0].link.ends_with("/calendrier/c.html"));
    }

    #[test]
    fn duplicate_links_collapse() {
        let html = listing(&[
            item("/calendrier/a.html", "2025-06-08"),
            item("/calendrier/a.html", "2025-06-09"),
        ]);

        let events = extract_events(&html, PAGE).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date, NaiveDate::from_ymd_opt(2025, 6, 8).unwrap());
    }

    #[test]
    fn rejects_unparsable_page_url() {
        assert!(matches!(
            extract_events("<html></html>", "not a url"),
            Err(MapError::InvalidInput(_))
        ));
    }
}
