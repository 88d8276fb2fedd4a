// streamguard-core/src/services/notification.rs
//
// Text of the messages posted when an entity goes live / publishes releases.

use std::fmt::Write;

use streamguard_common::models::observation::LiveStatus;
use streamguard_common::models::platform::Platform;

/// Builds the notification body for `entity_name` on `platform`.
///
/// Always contains the entity's name and a direct URL.
pub fn format_notification(platform: Platform, entity_name: &str, live: &LiveStatus) -> String {
    let name = if live.display_name.trim().is_empty() {
        entity_name
    } else {
        live.display_name.as_str()
    };

    match platform {
        Platform::Twitch => {
            let mut msg = format!("🔴 {} is now live on Twitch!\n", name);
            if live.title.is_some() || live.category.is_some() {
                msg.push('\n');
            }
            if let Some(title) = &live.title {
                let _ = writeln!(msg, "Title: {}", title);
            }
            if let Some(category) = &live.category {
                let _ = writeln!(msg, "Playing: {}", category);
            }
            msg.push_str(&live.url);
            msg
        }
        Platform::YouTube => {
            let mut msg = format!("🎵 New releases from @{} on YouTube:\n\n", name);
            if live.items.is_empty() {
                if let Some(title) = &live.title {
                    let _ = writeln!(msg, "• {}", title);
                }
                msg.push_str(&live.url);
            } else {
                for item in &live.items {
                    let _ = write!(msg, "• {}\n{}\n\n", item.title, item.url);
                }
                let _ = write!(msg, "{}", live.url);
            }
            msg
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamguard_common::models::observation::ReleaseItem;

    #[test]
    fn twitch_message_has_title_category_and_url() {
        let live = LiveStatus {
            display_name: "alice".into(),
            title: Some("T1".into()),
            category: Some("C1".into()),
            url: "https://www.twitch.tv/alice".into(),
            items: vec![],
        };
        let msg = format_notification(Platform::Twitch, "alice", &live);
        assert_eq!(
            msg,
            "🔴 alice is now live on Twitch!\n\nTitle: T1\nPlaying: C1\nhttps://www.twitch.tv/alice"
        );
    }

    #[test]
    fn falls_back_to_entity_name() {
        let live = LiveStatus {
            url: "https://www.twitch.tv/bob".into(),
            ..Default::default()
        };
        let msg = format_notification(Platform::Twitch, "bob", &live);
        assert_eq!(msg, "🔴 bob is now live on Twitch!\nhttps://www.twitch.tv/bob");
    }

    #[test]
    fn youtube_message_lists_releases() {
        let live = LiveStatus {
            display_name: "artist".into(),
            title: Some("One".into()),
            category: Some("Releases".into()),
            url: "https://www.youtube.com/@artist".into(),
            items: vec![
                ReleaseItem { title: "One".into(), url: "https://www.youtube.com/watch?v=a".into() },
                ReleaseItem { title: "Two".into(), url: "https://www.youtube.com/watch?v=b".into() },
            ],
        };
        let msg = format_notification(Platform::YouTube, "artist", &live);
        assert!(msg.starts_with("🎵 New releases from @artist on YouTube:\n\n"));
        assert!(msg.contains("• One\nhttps://www.youtube.com/watch?v=a\n\n"));
        assert!(msg.contains("• Two\nhttps://www.youtube.com/watch?v=b\n\n"));
        assert!(msg.ends_with("https://www.youtube.com/@artist"));
    }
}
