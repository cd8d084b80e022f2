// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Response content negotiation
//!
//! JSON is selected when the request declares a JSON body or asks for JSON in
//! its `Accept` header; everything else gets the HTML view. Negotiation only
//! inspects headers, so it can run before the multipart body is touched.

use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::HeaderMap;

/// Shape of the response a client expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    Html,
}

impl ResponseFormat {
    /// Decide the response format from request headers.
    pub fn negotiate(headers: &HeaderMap) -> Self {
        let accept = header_value(headers, ACCEPT.as_str());
        let content_type = header_value(headers, CONTENT_TYPE.as_str());

        let wants_json = content_type == Some("application/json")
            || accept.map_or(false, |a| a.contains("application/json"));

        if wants_json {
            ResponseFormat::Json
        } else {
            ResponseFormat::Html
        }
    }

    pub fn is_json(self) -> bool {
        self == ResponseFormat::Json
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
