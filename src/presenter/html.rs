use crate::config::ZoomConfig;
use crate::document::DocumentHandle;
use crate::error::AppResult;
use crate::pages::PageArtifact;

use super::resource_url::ResourceUrlMapper;

fn escape_attr(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Distance from 1.0 within which a zoom level counts as neutral.
const NEUTRAL_TOLERANCE: f32 = 0.0005;

/// Vertical stack of page images with ctrl+wheel zoom on the stack width.
///
/// Steps are asymmetric: `magnify_step` applies above 1.0, `minimize_step`
/// below it, and at 1.0 the wheel direction picks the step.
pub fn render_page_view(page_urls: &[String], zoom: &ZoomConfig) -> String {
    let pages = page_urls
        .iter()
        .map(|url| format!(r#"<img src="{}">"#, escape_attr(url)))
        .collect::<Vec<_>>()
        .join("<br/>");

    format!(
        r#"<!DOCTYPE html><html lang="en"><head>
<meta charset="UTF-8">
<style>
img {{
    max-width: none;
    max-height: none;
    width: 100%;
}}
</style>
<script>
const maxZoom = {max};
const minZoom = {min};
const magnify = {magnify};
const minimize = {minimize};
const tolerance = {tolerance};

function isNeutral(level) {{
    return Math.abs(level - 1.0) <= tolerance;
}}

function clampZoom(level) {{
    return Math.max(minZoom, Math.min(maxZoom, level));
}}

function nextZoom(level, deltaY) {{
    const step = isNeutral(level)
        ? (deltaY < 0 ? magnify : minimize)
        : (level > 1.0 ? magnify : minimize);
    const next = clampZoom(level - Math.sign(deltaY) * step);
    return isNeutral(next) ? 1.0 : next;
}}

var zoomLevel = clampZoom(1.0);

document.addEventListener("wheel", evnt => {{
    if (!evnt.ctrlKey) {{
        return;
    }}
    evnt.preventDefault();
    if (evnt.deltaY === 0) {{
        return;
    }}
    zoomLevel = nextZoom(zoomLevel, evnt.deltaY);
    document.getElementById("pages").style.width = `${{zoomLevel * 100}}%`;
}}, {{ passive: false }});
</script>
</head><body><div id="pages" style="width: {initial_width}%">{pages}</div></body></html>"#,
        max = zoom.max,
        min = zoom.min,
        magnify = zoom.magnify_step,
        minimize = zoom.minimize_step,
        tolerance = NEUTRAL_TOLERANCE,
        initial_width = initial_zoom(zoom) * 100.0,
    )
}

fn initial_zoom(zoom: &ZoomConfig) -> f32 {
    1.0_f32.max(zoom.min).min(zoom.max)
}

pub fn render_document_view(
    handle: &DocumentHandle,
    pages: &[PageArtifact],
    mapper: &dyn ResourceUrlMapper,
    zoom: &ZoomConfig,
) -> AppResult<String> {
    let urls = pages
        .iter()
        .map(|page| mapper.page_url(handle, page))
        .collect::<AppResult<Vec<_>>>()?;
    Ok(render_page_view(&urls, zoom))
}
