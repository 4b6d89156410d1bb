use chrono::{DateTime, Utc};

use crate::cms::models::ShowRecord;
use crate::services::radiocult::RadioEvent;

/// Decorations stations append to schedule titles that never appear on the
/// CMS record ("Drive Time (R)" should still match "Drive Time").
const STRIPPED_MARKERS: &[&str] = &["(r)", "(repeat)", "(replay)", "(rerun)", "(live)", "(new)"];

/// Containment matching is skipped for very short normalized titles; one-word
/// idents like "mix" would otherwise match half the catalog.
const MIN_CONTAINMENT_LEN: usize = 4;

/// Normalize a title for matching: case-fold, strip decoration markers and
/// trailing separators, collapse whitespace.
pub fn normalize_title(raw: &str) -> String {
    let mut title = raw.to_lowercase();

    loop {
        let before = title.clone();
        title = title.trim().to_string();
        for marker in STRIPPED_MARKERS {
            if title.ends_with(marker) {
                title.truncate(title.len() - marker.len());
            }
        }
        title = title
            .trim()
            .trim_end_matches(['-', ':', '|', ','])
            .to_string();
        if title == before {
            break;
        }
    }

    title.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The event currently on air, if any. With overlapping entries (a regional
/// opt-out over a long-running block) the one that started last wins.
pub fn current_event(schedule: &[RadioEvent], now: DateTime<Utc>) -> Option<&RadioEvent> {
    schedule
        .iter()
        .filter(|ev| ev.is_live_at(now))
        .max_by_key(|ev| ev.start_date_time_utc)
}

/// Match ranking: smaller broadcast-start delta to the live event wins, then
/// the more recently modified record. Records without a parseable broadcast
/// start sort behind every dated candidate.
fn match_rank(show: &ShowRecord, live_start: DateTime<Utc>) -> (i64, i64) {
    let delta = show
        .broadcast_start()
        .map(|start| (start - live_start).num_seconds().abs())
        .unwrap_or(i64::MAX);
    let recency = show
        .modified_at
        .map(|m| -m.timestamp())
        .unwrap_or(i64::MAX);
    (delta, recency)
}

/// Find the catalog record for a live broadcast event.
///
/// Exact normalized-title matches are tried first; when none exist, a
/// containment fallback accepts a candidate whose normalized title contains
/// (or is contained in) the live title. Either way, ties are broken by date
/// proximity and then record recency. Returns None when nothing matches;
/// that is a normal outcome for one-off live segments with no catalog record.
pub fn find_matching_show<'a>(
    live: &RadioEvent,
    candidates: &'a [ShowRecord],
) -> Option<&'a ShowRecord> {
    let live_title = normalize_title(&live.title);
    if live_title.is_empty() {
        return None;
    }
    let live_start = live.start_date_time_utc;

    let exact = candidates
        .iter()
        .filter(|show| normalize_title(&show.title) == live_title)
        .min_by_key(|show| match_rank(show, live_start));
    if exact.is_some() {
        return exact;
    }

    candidates
        .iter()
        .filter(|show| {
            let title = normalize_title(&show.title);
            title.len() >= MIN_CONTAINMENT_LEN
                && live_title.len() >= MIN_CONTAINMENT_LEN
                && (live_title.contains(&title) || title.contains(&live_title))
        })
        .min_by_key(|show| match_rank(show, live_start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::models::{ShowKind, ShowMetadata};

    fn live_event(title: &str, start: &str) -> RadioEvent {
        let start: DateTime<Utc> = start.parse().unwrap();
        RadioEvent {
            id: "ev_live".to_string(),
            title: title.to_string(),
            start_date_time_utc: start,
            end_date_time_utc: start + chrono::Duration::hours(2),
            description: None,
        }
    }

    fn show(slug: &str, title: &str, date: Option<&str>, modified: Option<&str>) -> ShowRecord {
        ShowRecord {
            id: format!("id-{}", slug),
            slug: slug.to_string(),
            title: title.to_string(),
            kind: ShowKind::Episode,
            modified_at: modified.map(|m| m.parse().unwrap()),
            metadata: ShowMetadata {
                approved: true,
                broadcast_date: date.map(|d| d.to_string()),
                broadcast_time: Some("20:00".to_string()),
                ..Default::default()
            },
        }
    }

    #[test]
    fn normalization_strips_case_markers_and_whitespace() {
        assert_eq!(normalize_title("  Drive  Time (R)"), "drive time");
        assert_eq!(normalize_title("Drive Time (Repeat)"), "drive time");
        assert_eq!(normalize_title("Drive Time -"), "drive time");
        assert_eq!(normalize_title("DRIVE TIME"), "drive time");
        assert_eq!(normalize_title("Drive Time (Live) (R)"), "drive time");
    }

    #[test]
    fn no_title_match_returns_none() {
        let candidates = vec![show("jazz-hour", "Jazz Hour", Some("2024-06-01"), None)];
        let live = live_event("Completely Different", "2024-06-01T20:00:00Z");
        assert!(find_matching_show(&live, &candidates).is_none());
    }

    #[test]
    fn empty_candidate_list_returns_none() {
        let live = live_event("Jazz Hour", "2024-06-01T20:00:00Z");
        assert!(find_matching_show(&live, &[]).is_none());
    }

    #[test]
    fn exact_match_found_through_decorated_live_title() {
        let candidates = vec![show("jazz-hour", "Jazz Hour", Some("2024-06-01"), None)];
        let live = live_event("JAZZ HOUR (R)", "2024-06-01T20:00:00Z");
        let matched = find_matching_show(&live, &candidates).unwrap();
        assert_eq!(matched.slug, "jazz-hour");
    }

    #[test]
    fn closest_broadcast_date_wins_among_identical_titles() {
        let candidates = vec![
            show("jazz-hour-old", "Jazz Hour", Some("2024-05-01"), None),
            show("jazz-hour-new", "Jazz Hour", Some("2024-06-01"), None),
        ];
        let live = live_event("Jazz Hour", "2024-06-01T21:00:00Z");
        let matched = find_matching_show(&live, &candidates).unwrap();
        assert_eq!(matched.slug, "jazz-hour-new");
    }

    #[test]
    fn recency_breaks_remaining_ties() {
        let candidates = vec![
            show(
                "jazz-hour-a",
                "Jazz Hour",
                Some("2024-06-01"),
                Some("2024-05-01T00:00:00Z"),
            ),
            show(
                "jazz-hour-b",
                "Jazz Hour",
                Some("2024-06-01"),
                Some("2024-05-20T00:00:00Z"),
            ),
        ];
        let live = live_event("Jazz Hour", "2024-06-01T21:00:00Z");
        let matched = find_matching_show(&live, &candidates).unwrap();
        assert_eq!(matched.slug, "jazz-hour-b");
    }

    #[test]
    fn dated_candidate_beats_undated_one() {
        let candidates = vec![
            show("jazz-hour-undated", "Jazz Hour", None, None),
            show("jazz-hour-dated", "Jazz Hour", Some("2024-06-01"), None),
        ];
        let live = live_event("Jazz Hour", "2024-06-01T21:00:00Z");
        let matched = find_matching_show(&live, &candidates).unwrap();
        assert_eq!(matched.slug, "jazz-hour-dated");
    }

    #[test]
    fn containment_fallback_matches_either_direction() {
        let candidates = vec![show(
            "morning-drive",
            "Morning Drive",
            Some("2024-06-01"),
            None,
        )];

        let longer_live = live_event("Morning Drive with Ana", "2024-06-01T07:00:00Z");
        assert_eq!(
            find_matching_show(&longer_live, &candidates).unwrap().slug,
            "morning-drive"
        );

        let shorter_live = live_event("Morning", "2024-06-01T07:00:00Z");
        assert_eq!(
            find_matching_show(&shorter_live, &candidates).unwrap().slug,
            "morning-drive"
        );
    }

    #[test]
    fn short_titles_do_not_containment_match() {
        let candidates = vec![show("mixtape", "Mixtape", Some("2024-06-01"), None)];
        let live = live_event("Mix", "2024-06-01T20:00:00Z");
        assert!(find_matching_show(&live, &candidates).is_none());
    }

    #[test]
    fn exact_match_preferred_over_containment() {
        let candidates = vec![
            show(
                "jazz-hour-extended",
                "Jazz Hour Extended",
                Some("2024-06-01"),
                None,
            ),
            show("jazz-hour", "Jazz Hour", Some("2024-05-01"), None),
        ];
        // The containment candidate has the closer date, but exact wins.
        let live = live_event("Jazz Hour", "2024-06-01T21:00:00Z");
        let matched = find_matching_show(&live, &candidates).unwrap();
        assert_eq!(matched.slug, "jazz-hour");
    }

    #[test]
    fn current_event_picks_latest_started_overlap() {
        let base: DateTime<Utc> = "2024-06-01T10:00:00Z".parse().unwrap();
        let block = RadioEvent {
            id: "block".to_string(),
            title: "All Day Block".to_string(),
            start_date_time_utc: base,
            end_date_time_utc: base + chrono::Duration::hours(8),
            description: None,
        };
        let insert = RadioEvent {
            id: "insert".to_string(),
            title: "Lunch Special".to_string(),
            start_date_time_utc: base + chrono::Duration::hours(2),
            end_date_time_utc: base + chrono::Duration::hours(3),
            description: None,
        };
        let schedule = vec![block, insert];

        let now = base + chrono::Duration::hours(2) + chrono::Duration::minutes(30);
        assert_eq!(current_event(&schedule, now).unwrap().id, "insert");

        let later = base + chrono::Duration::hours(5);
        assert_eq!(current_event(&schedule, later).unwrap().id, "block");

        let off_air = base + chrono::Duration::hours(9);
        assert!(current_event(&schedule, off_air).is_none());
    }
}
