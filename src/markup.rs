//! Embed markup appended to record bodies, plus series tagging.

/// Fixed player width in pixels.
const EMBED_WIDTH: u32 = 600;

/// Fixed aspect ratio (width, height).
const EMBED_RATIO: (u32, u32) = (16, 9);

/// Player height for [`EMBED_WIDTH`] at [`EMBED_RATIO`], rounded to the
/// nearest integer.
pub fn embed_height() -> u32 {
    let (rw, rh) = EMBED_RATIO;
    ((rh as f64 * EMBED_WIDTH as f64) / rw as f64).round() as u32
}

/// Video embed directive understood by the CMS rendering layer.
pub fn video_embed(url: &str) -> String {
    format!(
        "[video width=\"{}\" height=\"{}\" src=\"{}\"]",
        EMBED_WIDTH,
        embed_height(),
        url
    )
}

/// Plain hyperlink to the direct video URL.
pub fn direct_link(url: &str) -> String {
    format!("Direct URL: <a href=\"{url}\">{url}</a>")
}

/// Body text with the embed directive and direct link appended.
pub fn append_embed(body: &str, url: &str) -> String {
    format!("{}\n\n{}\n\n{}", body, video_embed(url), direct_link(url))
}

/// Series name for multi-part sessions.
///
/// A title containing `" - Part "` belongs to a series named by the segment
/// before the first `" - "` separator; any other title has no series.
pub fn series_tag(title: &str) -> Option<String> {
    if title.contains(" - Part ") {
        title.split(" - ").next().map(str::to_string)
    } else {
        None
    }
}
