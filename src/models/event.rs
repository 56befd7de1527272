/*
 * race-map, race calendar map generator.
 * Copyright (c) 2024 race-map contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or any later version.
 */

//! Calendar event models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A calendar event found on a listing page
///
/// The link identifies the event: the same link seen on two listing
/// pages is one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Absolute URL of the event page
    pub link: String,

    /// Day the event takes place
    pub date: NaiveDate,
}

impl Event {
    pub fn new(link: impl Into<String>, date: NaiveDate) -> Self {
        Event {
            link: link.into(),
            date,
        }
    }

    /// Human-readable title derived from the event link
    ///
    /// `https://host/calendrier/triathlon-de-paris.html` with prefix
    /// `https://host/calendrier/` becomes `Triathlon De Paris`.
    pub fn title(&self, prefix: &str) -> String {
        let slug = self.link.strip_prefix(prefix).unwrap_or(&self.link);
        let slug = slug.strip_suffix(".html").unwrap_or(slug);
        title_case(&slug.replace('-', " "))
    }

    /// Attach the coordinates read from the event page
    pub fn at(self, lat: f64, lon: f64) -> MarkerPosition {
        MarkerPosition {
            event: self,
            lat,
            lon,
        }
    }
}

/// An event whose map position is known
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerPosition {
    #[serde(flatten)]
    pub event: Event,
    pub lat: f64,
    pub lon: f64,
}

impl MarkerPosition {
    /// Date as shown in marker popups, e.g. "March 09, 2025"
    pub fn display_date(&self) -> String {
        self.event.date.format("%B %d, %Y").to_string()
    }
}

/// Uppercase the first letter of every word, lowercase the rest
///
/// A word starts at any letter that follows a non-letter, so digits and
/// apostrophes also start a new word.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}
