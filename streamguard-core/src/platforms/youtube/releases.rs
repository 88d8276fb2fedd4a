// File: streamguard-core/src/platforms/youtube/releases.rs
//
// Extracts release entries from a channel's `/releases` page. The page embeds
// its content as `ytInitialData` JSON; we pick out video / playlist ids and the
// first title that follows each of them.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use streamguard_common::models::observation::ReleaseItem;

/// How far past an id we look for its title.
const TITLE_WINDOW: usize = 4000;

static VIDEO_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""videoId":"([A-Za-z0-9_-]{11})""#).expect("valid regex"));

static PLAYLIST_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""playlistId":"((?:PL|OLAK5uy_)[A-Za-z0-9_-]+)""#).expect("valid regex"));

static TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""title":\{"(?:runs":\[\{"text|simpleText|content)":"((?:[^"\\]|\\.)*)""#)
        .expect("valid regex")
});

pub fn releases_url(channel_name: &str) -> String {
    format!(
        "https://www.youtube.com/@{}/releases",
        urlencoding::encode(channel_name)
    )
}

fn unescape_json(raw: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{}\"", raw)).unwrap_or_else(|_| raw.to_string())
}

fn title_after(html: &str, from: usize) -> Option<String> {
    let mut end = (from + TITLE_WINDOW).min(html.len());
    while !html.is_char_boundary(end) {
        end -= 1;
    }
    let caps = TITLE_RE.captures(&html[from..end])?;
    let title = unescape_json(caps.get(1)?.as_str());
    let title = title.trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// Parses release entries in page order, deduplicated by id.
pub fn parse_releases(html: &str) -> Vec<ReleaseItem> {
    let mut seen = HashSet::new();
    let mut found: Vec<(usize, ReleaseItem)> = Vec::new();

    for caps in PLAYLIST_ID_RE.captures_iter(html) {
        let (Some(whole), Some(id)) = (caps.get(0), caps.get(1)) else { continue };
        if !seen.insert(id.as_str().to_string()) {
            continue;
        }
        if let Some(title) = title_after(html, whole.end()) {
            found.push((
                whole.start(),
                ReleaseItem {
                    title,
                    url: format!("https://www.youtube.com/playlist?list={}", id.as_str()),
                },
            ));
        }
    }

    for caps in VIDEO_ID_RE.captures_iter(html) {
        let (Some(whole), Some(id)) = (caps.get(0), caps.get(1)) else { continue };
        if !seen.insert(id.as_str().to_string()) {
            continue;
        }
        if let Some(title) = title_after(html, whole.end()) {
            found.push((
                whole.start(),
                ReleaseItem {
                    title,
                    url: format!("https://www.youtube.com/watch?v={}", id.as_str()),
                },
            ));
        }
    }

    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_videos_and_playlists_in_page_order() {
        let html = r#"<script>var ytInitialData = {"items":[
            {"gridPlaylistRenderer":{"playlistId":"OLAK5uy_abcDEF123","title":{"runs":[{"text":"Debut Album"}]}}},
            {"gridVideoRenderer":{"videoId":"dQw4w9WgXcQ","thumbnail":{},"title":{"simpleText":"New Single & More"}}},
            {"gridVideoRenderer":{"videoId":"dQw4w9WgXcQ","title":{"simpleText":"duplicate"}}}
        ]};</script>"#;

        let releases = parse_releases(html);
        assert_eq!(releases.len(), 2);
        assert_eq!(releases[0].title, "Debut Album");
        assert_eq!(releases[0].url, "https://www.youtube.com/playlist?list=OLAK5uy_abcDEF123");
        assert_eq!(releases[1].title, "New Single & More");
        assert_eq!(releases[1].url, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }

    #[test]
    fn untitled_item_does_not_take_a_distant_title() {
        // Pad with two-byte chars, once per parity, so the window edge also
        // lands inside a char.
        for lead in ["", "x"] {
            let pad = format!("{lead}{}", "é".repeat(2500));
            let html = format!(
                r#"{{"videoId":"aaaaaaaaaaa","pad":"{pad}"}},{{"videoId":"bbbbbbbbbbb","title":{{"simpleText":"Second"}}}}"#
            );

            let releases = parse_releases(&html);
            assert_eq!(releases.len(), 1);
            assert_eq!(releases[0].title, "Second");
            assert_eq!(releases[0].url, "https://www.youtube.com/watch?v=bbbbbbbbbbb");
        }
    }

    #[test]
    fn page_without_items_has_no_releases() {
        assert!(parse_releases("<html><body>nothing here</body></html>").is_empty());
    }

    #[test]
    fn url_is_built_from_handle() {
        assert_eq!(releases_url("someartist"), "https://www.youtube.com/@someartist/releases");
    }
}
