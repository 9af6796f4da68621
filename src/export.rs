//! Shareable snippets and documents built from the current image list.

use std::fmt::Write as _;

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::color::BackgroundColor;
use crate::error::{Error, Result};

const GRID_STYLE: &str =
    "display:grid;grid-template-columns:repeat(auto-fill,minmax(120px,1fr));gap:24px;padding:32px;";
const BOX_STYLE: &str = "background:#fff;border-radius:8px;box-shadow:0 2px 8px rgba(0,0,0,0.05);overflow:hidden;position:relative;aspect-ratio:1/1;display:flex;align-items:center;justify-content:center;cursor:pointer;";
const IMG_STYLE: &str = "width:100%;height:100%;object-fit:cover;display:block;";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Bare `#infinity-wall` grid markup with inline styles.
    Markup,
    /// `<iframe src=...>` pointing at the hosted grid page.
    IframeUrl,
    /// `<iframe srcdoc=...>` embedding the markup directly.
    IframeSrcdoc,
    /// Standalone downloadable HTML document.
    Html,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ExportOptions {
    /// Origin the hosted grid page is served from.
    pub origin: String,
    /// Path of the hosted grid page below `origin`.
    pub page: String,
    pub iframe_height: u32,
    pub document_title: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8080".into(),
            page: "grid.html".into(),
            iframe_height: 600,
            document_title: "Infinity Wall Export".into(),
        }
    }
}

pub fn render(
    format: ExportFormat,
    images: &[String],
    background: BackgroundColor,
    options: &ExportOptions,
) -> Result<String> {
    if images.is_empty() {
        return Err(Error::NothingToExport);
    }
    debug!(?format, images = images.len(), "export");
    match format {
        ExportFormat::Markup => Ok(grid_markup(images)),
        ExportFormat::IframeUrl => iframe_url(images, background, options),
        ExportFormat::IframeSrcdoc => Ok(iframe_srcdoc(images, options)),
        ExportFormat::Html => Ok(standalone_html(images, options)),
    }
}

/// Minimal escaping for double-quoted attribute values.
fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

/// The grid as a single `div` with every style inlined.
pub fn grid_markup(images: &[String]) -> String {
    let mut html = format!(r#"<div id="infinity-wall" style="{GRID_STYLE}">"#);
    for src in images {
        let _ = write!(
            html,
            r#"<div class="rect-box" style="{BOX_STYLE}"><img src="{}" alt="Image" style="{IMG_STYLE}"></div>"#,
            escape_attr(src)
        );
    }
    html.push_str("</div>");
    html
}

/// Hosted page URL carrying the images and background as query parameters.
pub fn share_url(
    images: &[String],
    background: BackgroundColor,
    options: &ExportOptions,
) -> Result<Url> {
    let base = format!(
        "{}/{}",
        options.origin.trim_end_matches('/'),
        options.page.trim_start_matches('/')
    );
    let joined = images.join(",");
    let bg = background.to_string();
    Url::parse_with_params(&base, [("images", joined.as_str()), ("bg", bg.as_str())])
        .map_err(|err| Error::MalformedImageRef(format!("{base}: {err}")))
}

fn iframe_url(
    images: &[String],
    background: BackgroundColor,
    options: &ExportOptions,
) -> Result<String> {
    let url = share_url(images, background, options)?;
    Ok(format!(
        r#"<iframe src="{}" width="100%" height="{}" frameborder="0"></iframe>"#,
        escape_attr(url.as_str()),
        options.iframe_height
    ))
}

fn iframe_srcdoc(images: &[String], options: &ExportOptions) -> String {
    let markup = grid_markup(images).replace('\'', "&apos;");
    format!(
        r#"<iframe srcdoc='{markup}' width="100%" height="{}" frameborder="0"></iframe>"#,
        options.iframe_height
    )
}

fn standalone_html(images: &[String], options: &ExportOptions) -> String {
    let grid = grid_markup(images);
    let title = escape_attr(&options.document_title);
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n<title>{title}</title>\n\
<style>body{{margin:0;padding:0;background:#EEECE5;font-family:'Inter','Segoe UI',Arial,sans-serif;}}\
#infinity-wall-container{{width:100vw;height:100vh;overflow:auto;}}#infinity-wall{{{GRID_STYLE}}}\
.rect-box{{{BOX_STYLE}}}.rect-box img{{{IMG_STYLE}}}</style>\n</head>\n<body>\n\
<div id=\"infinity-wall-container\">{grid}</div>\n</body>\n</html>\n"
    )
}
