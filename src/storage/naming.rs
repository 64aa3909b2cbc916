//! Object key naming for uploaded icons.

use chrono::Utc;
use rand::Rng;

/// MIME types accepted by the upload endpoint.
pub const ALLOWED_ICON_MIME: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/webp",
    "image/svg+xml",
    "image/x-icon",
    "image/vnd.microsoft.icon",
];

pub const MAX_ICON_BYTES: usize = 5 * 1024 * 1024;

pub fn is_allowed_mime(mime: &str) -> bool {
    ALLOWED_ICON_MIME.contains(&mime)
}

pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" | "image/jpg" => ".jpg",
        "image/webp" => ".webp",
        "image/svg+xml" => ".svg",
        "image/x-icon" | "image/vnd.microsoft.icon" => ".ico",
        _ => ".png",
    }
}

/// `icon_{unix_millis}_{random}{ext}`; renamed once the owning software is saved.
pub fn temporary_icon_name(mime: &str) -> String {
    let random: u32 = rand::rng().random_range(0..1_000_000_000);
    format!(
        "icon_{}_{random}{}",
        Utc::now().timestamp_millis(),
        extension_for_mime(mime)
    )
}

/// Whether `key` contains an `icon_<digits>_<digits>.` name.
pub fn is_temporary_icon_key(key: &str) -> bool {
    key.match_indices("icon_").any(|(at, _)| {
        let rest = &key[at + "icon_".len()..];
        let Some(rest) = strip_digits(rest).and_then(|r| r.strip_prefix('_')) else {
            return false;
        };
        strip_digits(rest).is_some_and(|r| r.starts_with('.'))
    })
}

/// Remainder after at least one leading ASCII digit.
fn strip_digits(s: &str) -> Option<&str> {
    let rest = s.trim_start_matches(|c: char| c.is_ascii_digit());
    (rest.len() < s.len()).then_some(rest)
}

/// Extension of the last path segment, dot included; `""` when there is none.
pub fn extension_of(key: &str) -> &str {
    let name = key.rsplit('/').next().unwrap_or(key);
    name.rfind('.').map_or("", |at| &name[at..])
}

/// File-safe base name derived from a software name.
pub fn sanitize_base_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_space = false;
    for ch in name.trim().chars() {
        if matches!(ch, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
            continue;
        }
        if ch.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if ch.is_ascii_alphanumeric()
            || matches!(ch, '_' | '.' | '-')
            || ('\u{4e00}'..='\u{9fa5}').contains(&ch)
        {
            out.push(ch);
        }
    }

    if out.is_empty() {
        "icon".to_string()
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temporary_names_are_recognised() {
        let name = temporary_icon_name("image/webp");
        assert!(name.starts_with("icon_"));
        assert!(name.ends_with(".webp"));
        assert!(is_temporary_icon_key(&name));
        assert!(is_temporary_icon_key(&format!("AppArchive/{name}")));
    }

    #[test]
    fn named_icons_are_not_temporary() {
        assert!(!is_temporary_icon_key("AppArchive/微信.png"));
        assert!(!is_temporary_icon_key("AppArchive/icon_.png"));
        assert!(!is_temporary_icon_key("AppArchive/icon_12_.png"));
        assert!(!is_temporary_icon_key("AppArchive/icon_12_34"));
        assert!(is_temporary_icon_key("AppArchive/my_icon_12_34.png"));
    }

    #[test]
    fn unknown_mime_defaults_to_png() {
        assert_eq!(extension_for_mime("image/gif"), ".png");
        assert_eq!(extension_for_mime("image/vnd.microsoft.icon"), ".ico");
        assert!(is_allowed_mime("image/svg+xml"));
        assert!(!is_allowed_mime("image/gif"));
    }

    #[test]
    fn sanitize_keeps_cjk_and_safe_ascii() {
        assert_eq!(sanitize_base_name("  Visual Studio   Code "), "Visual_Studio_Code");
        assert_eq!(sanitize_base_name("微信 for Mac"), "微信_for_Mac");
        assert_eq!(sanitize_base_name("a/b:c*d?e\"f<g>h|i"), "abcdefghi");
        assert_eq!(sanitize_base_name("C++ & Rust!"), "C__Rust");
        assert_eq!(sanitize_base_name("a | b"), "a_b");
        assert_eq!(sanitize_base_name("v1.2-beta"), "v1.2-beta");
        assert_eq!(sanitize_base_name("???"), "icon");
        assert_eq!(sanitize_base_name(""), "icon");
    }

    #[test]
    fn extension_comes_from_the_last_segment() {
        assert_eq!(extension_of("AppArchive/icon_1_2.png"), ".png");
        assert_eq!(extension_of("v1.0/readme"), "");
        assert_eq!(extension_of("a.tar.gz"), ".gz");
    }
}
