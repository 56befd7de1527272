/*
 * race-map, race calendar map generator.
 * Copyright (c) 2024 race-map contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or any later version.
 */

//! Marker extraction from event pages

use std::sync::LazyLock;

use regex::Regex;

// Event pages embed their position as `var marker = L.marker([lat, lon] ...`
static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"var\s+marker\s*=\s*L\.marker\(\s*\[\s*([-\d.]+)\s*,\s*([-\d.]+)\s*\]").unwrap()
});

/// Find the first Leaflet marker in an event page
///
/// Returns `(lat, lon)`, or `None` when there is no marker or its
/// coordinates are not numbers.
pub fn extract_marker(html: &str) -> Option<(f64, f64)> {
    let captures = MARKER.captures(html)?;
    let lat = captures[1].parse().ok()?;
    let lon = captures[2].parse().ok()?;
    Some((lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_marker_in_script() {
        let page = r#"<script>
            var map = L.map('map');
            var marker = L.marker([ 43.7101728 , 7.2619532 ]).addTo(map);
        </script>"#;
        assert_eq!(extract_marker(page), Some((43.7101728, 7.2619532)));
    }

    #[test]
    fn negative_and_compact_coordinates() {
        let page = "var marker=L.marker([-21.1151,55.5364]);";
        assert_eq!(extract_marker(page), Some((-21.1151, 55.5364)));
    }

    #[test]
    fn first_marker_wins() {
        let page = "var marker = L.marker([1.5, 2.5]); var marker = L.marker([3, 4]);";
        assert_eq!(extract_marker(page), Some((1.5, 2.5)));
    }

    #[test]
    fn missing_or_malformed_marker() {
        assert_eq!(extract_marker("<p>no map here</p>"), None);
        assert_eq!(extract_marker("var marker = L.marker([1.2.3, 4]);"), None);
        assert_eq!(extract_marker("let marker = L.marker([1, 4]);"), None);
    }
}
