//! Slug and storage-key derivation.
//!
//! Slugs are the natural keys of the whole importer: record lookups, tag
//! terms, and storage keys are all derived from titles and filenames through
//! [`slugify`], so re-running the same manifest updates records in place
//! instead of duplicating them.

/// Reduce text to a lowercase, dash-separated, URL-safe identifier.
///
/// Alphanumerics are kept (lowercased); every other run of characters
/// collapses to a single `-`; leading and trailing dashes are trimmed.
/// Deterministic: the same input always yields the same slug.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_dash = false;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
        } else {
            pending_dash = true;
        }
    }
    out
}

/// Derive the storage key for a video.
///
/// The desired filename is the explicit override when given, otherwise the
/// basename of the source path (query and fragment stripped for URLs). The
/// extension comes from the desired filename, falling back to the source
/// path's extension when the override has none. Stem and extension are
/// sanitized independently:
///
/// `key = prefix + slugify(stem) [+ "." + slugify(ext)]`
pub fn derive_storage_key(prefix: &str, source_path: &str, desired_filename: Option<&str>) -> String {
    let desired = desired_filename
        .map(str::to_string)
        .unwrap_or_else(|| basename(source_path));

    let source_base = basename(source_path);
    let (stem, mut ext) = split_extension(&desired);
    if ext.is_none() {
        let (_, source_ext) = split_extension(&source_base);
        ext = source_ext;
    }

    let mut key = format!("{}{}", prefix, slugify(stem));
    if let Some(e) = ext {
        key.push('.');
        key.push_str(&slugify(e));
    }
    key
}

/// Stem of the desired filename: the override when given, otherwise the
/// source path's basename, with any extension removed. Unsanitized — this
/// names the temp download file, not a storage key.
pub fn desired_stem(source_path: &str, desired_filename: Option<&str>) -> String {
    let desired = desired_filename
        .map(str::to_string)
        .unwrap_or_else(|| basename(source_path));
    split_extension(&desired).0.to_string()
}

/// Final path component of a local path or URL, without query or fragment.
fn basename(source_path: &str) -> String {
    let path = match url::Url::parse(source_path) {
        Ok(u) if !u.cannot_be_a_base() => u.path().to_string(),
        _ => source_path.to_string(),
    };
    path.rsplit(&['/', '\\'][..])
        .next()
        .unwrap_or(path.as_str())
        .to_string()
}

/// Split a filename into stem and extension on the last dot.
///
/// Dotfiles and names without a dot have no extension.
fn split_extension(filename: &str) -> (&str, Option<&str>) {
    match filename.rfind('.') {
        Some(pos) if pos > 0 && pos + 1 < filename.len() => {
            (&filename[..pos], Some(&filename[pos + 1..]))
        }
        _ => (filename, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_dashes() {
        assert_eq!(slugify("Opening Talk"), "opening-talk");
        assert_eq!(slugify("Intro to X - Part 1"), "intro-to-x-part-1");
    }

    #[test]
    fn slugify_trims_and_collapses() {
        assert_eq!(slugify("  -- Hello,   World! --  "), "hello-world");
        assert_eq!(slugify("a//b..c"), "a-b-c");
    }

    #[test]
    fn slugify_is_deterministic() {
        let title = "Async Rust: Beyond the Basics";
        assert_eq!(slugify(title), slugify(title));
        assert_eq!(slugify(title), "async-rust-beyond-the-basics");
    }

    #[test]
    fn key_uses_override_extension() {
        let key = derive_storage_key(
            "conf/",
            "http://cdn.example.com/raw/video.mp4",
            Some("opening-talk.webm"),
        );
        assert_eq!(key, "conf/opening-talk.webm");
    }

    #[test]
    fn key_inherits_source_extension() {
        let key = derive_storage_key(
            "conf/",
            "http://cdn.example.com/raw/opening.mp4",
            Some("opening-talk"),
        );
        assert_eq!(key, "conf/opening-talk.mp4");
    }

    #[test]
    fn key_from_source_basename() {
        let key = derive_storage_key("conf/", "http://cdn.example.com/a/b/Opening Talk.MP4", None);
        assert_eq!(key, "conf/opening-talk.mp4");
    }

    #[test]
    fn key_strips_url_query() {
        let key = derive_storage_key(
            "conf/",
            "https://cdn.example.com/opening.mp4?token=abc#t=10",
            None,
        );
        assert_eq!(key, "conf/opening.mp4");
    }

    #[test]
    fn key_without_any_extension() {
        let key = derive_storage_key("conf/", "/videos/keynote", None);
        assert_eq!(key, "conf/keynote");
    }

    #[test]
    fn local_path_basename() {
        let key = derive_storage_key("conf/", "/tmp/session one.mov", None);
        assert_eq!(key, "conf/session-one.mov");
    }
}
