// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTML view for the upload form and detection results
//!
//! The `alt` attributes on the two result images are part of the interface:
//! clients falling back to HTML parse the image URLs out of them.

/// Render the index page, optionally binding the uploaded and result image
/// URLs into the results section.
///
/// URLs are built from sanitized filenames, so they are safe to interpolate.
pub fn render_index(images: Option<(&str, &str)>) -> String {
    let results = match images {
        Some((uploaded, result)) => format!(
            r#"    <section class="results">
      <figure>
        <img src="{uploaded}" alt="Uploaded Image">
        <figcaption>Uploaded</figcaption>
      </figure>
      <figure>
        <img src="{result}" alt="Detected Result">
        <figcaption>Detections</figcaption>
      </figure>
    </section>
"#
        ),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Fabstir Vision Node</title>
</head>
<body>
  <main>
    <h1>Object Detection</h1>
    <form action="/predict" method="post" enctype="multipart/form-data">
      <input type="file" name="file" accept="image/*" required>
      <button type="submit">Detect</button>
    </form>
{results}  </main>
</body>
</html>
"#
    )
}
