/*
 * race-map, race calendar map generator.
 * Copyright (c) 2024 race-map contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or any later version.
 */

//! Leaflet map page
//!
//! The page is a single self-contained HTML file. Leaflet, the
//! easy-button plugin and Font Awesome are loaded from CDNs; marker data
//! is embedded as JSON.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;
use tokio::fs;

use crate::error::MapResult;
use crate::models::MarkerPosition;

const LEAFLET_CSS: &str = "https://cdn.jsdelivr.net/npm/leaflet@1.9.3/dist/leaflet.css";
const LEAFLET_JS: &str = "https://cdn.jsdelivr.net/npm/leaflet@1.9.3/dist/leaflet.js";
const EASY_BUTTON_CSS: &str = "https://cdn.jsdelivr.net/npm/leaflet-easybutton@2/src/easy-button.css";
const EASY_BUTTON_JS: &str = "https://cdn.jsdelivr.net/npm/leaflet-easybutton@2/src/easy-button.js";
const FONT_AWESOME_CSS: &str = "https://use.fontawesome.com/releases/v5.3.1/css/all.css";

/// Popup frame size in pixels
const POPUP_WIDTH: u32 = 200;
const POPUP_HEIGHT: u32 = 100;

/// Marker data handed to the page script
#[derive(Serialize)]
struct MarkerJs {
    lat: f64,
    lon: f64,
    /// `data:` URI of the popup document
    popup: String,
}

/// Settings of the rendered map
#[derive(Debug, Clone)]
pub struct MapPage {
    /// Initial centre, also the target of the reset button
    pub center: (f64, f64),
    pub zoom: u8,
    /// Prefix stripped from event links to build titles
    pub title_prefix: String,
}

impl MapPage {
    pub fn new(center: (f64, f64), zoom: u8, title_prefix: impl Into<String>) -> Self {
        MapPage {
            center,
            zoom,
            title_prefix: title_prefix.into(),
        }
    }

    /// Render the full HTML document
    pub fn render(&self, markers: &[MarkerPosition]) -> MapResult<String> {
        let data: Vec<MarkerJs> = markers
            .iter()
            .map(|marker| MarkerJs {
                lat: marker.lat,
                lon: marker.lon,
                popup: format!(
                    "data:text/html;charset=utf-8;base64,{}",
                    BASE64.encode(popup_html(marker, &self.title_prefix))
                ),
            })
            .collect();
        let markers_json = serde_json::to_string(&data)?;
        let (lat, lon) = self.center;

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>Race map</title>
    <link rel="stylesheet" href="{leaflet_css}" />
    <link rel="stylesheet" href="{easy_button_css}" />
    <link rel="stylesheet" href="{font_awesome_css}" />
    <script src="{leaflet_js}"></script>
    <script src="{easy_button_js}"></script>
    <style>
        html, body {{ width: 100%; height: 100%; margin: 0; padding: 0; }}
        #map {{ position: absolute; top: 0; bottom: 0; left: 0; right: 0; }}
    </style>
</head>
<body>
    <div id="map"></div>
    <script>
        var center = [{lat}, {lon}];
        var zoom = {zoom};
        var map = L.map("map").setView(center, zoom);
        L.tileLayer("https://tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png", {{
            maxZoom: 19,
            attribution: '&copy; <a href="https://www.openstreetmap.org/copyright">OpenStreetMap</a> contributors'
        }}).addTo(map);
        L.easyButton('<span><i class="fas fa-crosshairs"></i></span>', function (btn, map) {{
            map.setView(center, zoom);
        }}).addTo(map);
        var markers = {markers_json};
        markers.forEach(function (m) {{
            var frame = '<iframe src="' + m.popup + '" width="{popup_width}" height="{popup_height}" style="border:none"></iframe>';
            L.marker([m.lat, m.lon]).bindPopup(frame, {{ maxWidth: {popup_width} }}).addTo(map);
        }});
    </script>
</body>
</html>
"#,
            leaflet_css = LEAFLET_CSS,
            leaflet_js = LEAFLET_JS,
            easy_button_css = EASY_BUTTON_CSS,
            easy_button_js = EASY_BUTTON_JS,
            font_awesome_css = FONT_AWESOME_CSS,
            lat = lat,
            lon = lon,
            zoom = self.zoom,
            markers_json = markers_json,
            popup_width = POPUP_WIDTH,
            popup_height = POPUP_HEIGHT,
        ))
    }

    /// Render and write the page to `path`
    ///
    /// Writes nothing and returns `None` when there are no markers.
    pub async fn write(
        &self,
        markers: &[MarkerPosition],
        path: &Path,
    ) -> MapResult<Option<PathBuf>> {
        if markers.is_empty() {
            tracing::warn!("No markers to plot");
            return Ok(None);
        }

        let html = self.render(markers)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, html).await?;

        tracing::info!("Map saved to: {}", path.display());
        Ok(Some(path.to_path_buf()))
    }
}

/// Popup document of one marker: linked title and date
pub fn popup_html(marker: &MarkerPosition, title_prefix: &str) -> String {
    format!(
        r#"<a href="{}" target="_blank"><b>{}</b></a><br>Date: {}"#,
        htmlescape::encode_minimal(&marker.event.link),
        htmlescape::encode_minimal(&marker.event.title(title_prefix)),
        marker.display_date()
    )
}
