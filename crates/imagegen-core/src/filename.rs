//! Output filename resolution.
//!
//! Everything here is pure string work. Unknown or malformed content types
//! never fail; they just leave the name alone.

use crate::constants::GENERATED_NAME_PREFIX;
use crate::models::BatchStamp;

/// Known image MIME types and the extension written for them.
const MIME_TO_EXT: &[(&str, &str)] = &[
    ("image/png", ".png"),
    ("image/jpeg", ".jpg"),
    ("image/jpg", ".jpg"),
    ("image/webp", ".webp"),
    ("image/gif", ".gif"),
];

/// Extension (with leading dot) for a content type, if it is a known image type.
///
/// Matching ignores case, surrounding whitespace and MIME parameters.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    MIME_TO_EXT
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
}

/// Ensure `base_name` carries the extension matching `content_type`.
///
/// Returns `base_name` unchanged when the type is absent or unknown, or when
/// the name already ends with the extension in any letter case. Applying it
/// twice gives the same result as applying it once.
pub fn resolve(base_name: &str, content_type: Option<&str>) -> String {
    let Some(ext) = content_type.and_then(extension_for) else {
        return base_name.to_string();
    };

    if base_name.to_ascii_lowercase().ends_with(ext) {
        return base_name.to_string();
    }

    format!("{}{}", base_name, ext)
}

/// Name used for attachments without a usable title: `generated_<timestamp>`.
pub fn generated_name(stamp: &BatchStamp) -> String {
    format!("{}_{}", GENERATED_NAME_PREFIX, stamp)
}

/// Turn a declared title into a safe base name.
///
/// Path separators and control characters become `_`. Returns `None` for
/// titles that are empty after trimming or consist only of `.`/`..`, so the
/// caller falls back to a generated name.
pub fn sanitize_base_name(title: &str) -> Option<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return None;
    }

    let cleaned: String = trimmed
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    if cleaned == "." || cleaned == ".." {
        return None;
    }

    Some(cleaned)
}

/// Insert `_<index>` before the extension. Index 0 returns the name unchanged.
///
/// `disambiguate("bali.png", 1)` gives `bali_1.png`; names without an
/// extension get the suffix appended.
pub fn disambiguate(name: &str, index: usize) -> String {
    if index == 0 {
        return name.to_string();
    }

    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}_{}{}", &name[..dot], index, &name[dot..]),
        _ => format!("{}_{}", name, index),
    }
}
