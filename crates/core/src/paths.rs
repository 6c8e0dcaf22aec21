//! Path normalization for values sent to the backend.
//!
//! The backend reports file locations under its own upload directory
//! (`uploads/{sessionId}/...`), but expects requests to name files relative
//! to the session's upload root.

/// Directory names under which the backend stores per-path artifacts.
pub const PATH_ARTIFACT_DIRS: [&str; 3] = ["paths_img", "paths_json", "paths_dot"];

/// Zip name used when a package URL has no usable final segment.
pub const DEFAULT_ZIP_NAME: &str = "analysis.zip";

const UPLOADS_DIR: &str = "uploads";

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Strip the `uploads/{sessionId}/` prefix (either separator style) from a path.
///
/// A leading prefix is removed directly. Otherwise everything up to and
/// including the last `uploads[/\]{sessionId}[/\]` occurrence is removed.
/// Paths without the marker are returned unchanged.
pub fn strip_session_prefix<'a>(path: &'a str, session_id: &str) -> &'a str {
    if session_id.is_empty() {
        return path;
    }

    for sep in ['/', '\\'] {
        let prefix = format!("{UPLOADS_DIR}{sep}{session_id}{sep}");
        if let Some(rest) = path.strip_prefix(prefix.as_str()) {
            return rest;
        }
    }

    let mut cut = None;
    for (idx, _) in path.match_indices(UPLOADS_DIR) {
        let after = &path[idx + UPLOADS_DIR.len()..];
        let Some(after_sep) = after.strip_prefix(is_separator) else {
            continue;
        };
        let Some(after_session) = after_sep.strip_prefix(session_id) else {
            continue;
        };
        if let Some(rest) = after_session.strip_prefix(is_separator) {
            cut = Some(path.len() - rest.len());
        }
    }

    match cut {
        Some(start) => &path[start..],
        None => path,
    }
}

/// Reduce an artifact path reported by the analysis step to the form the
/// packaging endpoint expects.
///
/// - If the path contains the session id followed later by `/`, the part
///   after that slash is returned.
/// - Else, if it contains one of [`PATH_ARTIFACT_DIRS`], the suffix starting
///   at that directory is returned.
/// - Else the path is returned unchanged.
pub fn package_relative_path<'a>(full: &'a str, session_id: &str) -> &'a str {
    if full.is_empty() {
        return full;
    }

    if !session_id.is_empty() {
        if let Some(idx) = full.find(session_id) {
            let after = idx + session_id.len();
            if let Some(slash) = full[after..].find('/') {
                return &full[after + slash + 1..];
            }
        }
    }

    for dir in PATH_ARTIFACT_DIRS {
        if let Some(idx) = full.find(dir) {
            return &full[idx..];
        }
    }

    full
}

/// File name of a package, taken from the last URL segment.
pub fn zip_name_from_url(url: &str) -> &str {
    url.rsplit('/').next().filter(|s| !s.is_empty()).unwrap_or(DEFAULT_ZIP_NAME)
}

/// True when the string has the 8-4-4-4-12 hex shape of a UUID.
///
/// Session ids are UUIDs, so a "file name" of this shape is really a
/// session directory and not something to show the user.
pub fn looks_like_uuid(value: &str) -> bool {
    let groups: Vec<&str> = value.split('-').collect();
    let expected = [8, 4, 4, 4, 12];
    groups.len() == expected.len()
        && groups
            .iter()
            .zip(expected)
            .all(|(g, len)| g.len() == len && g.chars().all(|c| c.is_ascii_hexdigit()))
}
