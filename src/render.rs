//! Pure snapshot renderings.
//!
//! Both renderers transform a snapshot they are given; neither triggers a
//! rebuild or touches any probe. The HTML page never goes blank on partial
//! failure: degraded fields arrive as explicit false/zero values and render
//! as such.

use stackwatch_types::Snapshot;

/// Render a snapshot as the JSON document served at `/api/snapshot`.
pub fn render_json(snapshot: &Snapshot) -> String {
    serde_json::to_string_pretty(snapshot).unwrap_or_default()
}

/// Render a snapshot as a human-readable HTML page.
///
/// `None` renders a pending page for the window between process start and
/// the first completed build.
pub fn render_html(snapshot: Option<&Snapshot>) -> String {
    let mut page = String::new();
    page.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    page.push_str("<meta charset=\"utf-8\">\n<title>stackwatch</title>\n");
    page.push_str("<style>\n");
    page.push_str("body { font-family: monospace; margin: 2em; }\n");
    page.push_str("table { border-collapse: collapse; margin: 1em 0; }\n");
    page.push_str("td, th { border: 1px solid #999; padding: 0.3em 0.8em; text-align: left; }\n");
    page.push_str(".up { color: #2a7e2a; }\n.down { color: #b03030; }\n");
    page.push_str("</style>\n</head>\n<body>\n<h1>stackwatch</h1>\n");

    match snapshot {
        Some(snapshot) => render_body(&mut page, snapshot),
        None => {
            page.push_str("<p>snapshot pending, no build has completed yet</p>\n");
        }
    }

    page.push_str("</body>\n</html>\n");
    page
}

fn render_body(page: &mut String, snapshot: &Snapshot) {
    page.push_str(&format!(
        "<p>generated at {}</p>\n",
        escape_html(&snapshot.generated_at.to_rfc3339())
    ));
    page.push_str(&format!(
        "<p>derived progress: {}%</p>\n",
        snapshot.derived_progress
    ));

    page.push_str("<h2>Services</h2>\n");
    if snapshot.services.is_empty() {
        page.push_str("<p>no services configured</p>\n");
    } else {
        page.push_str("<table>\n<tr><th>service</th><th>reachable</th><th>checked at</th></tr>\n");
        for service in &snapshot.services {
            let (class, text) = if service.reachable {
                ("up", "up")
            } else {
                ("down", "down")
            };
            page.push_str(&format!(
                "<tr><td>{}</td><td class=\"{}\">{}</td><td>{}</td></tr>\n",
                escape_html(&service.name),
                class,
                text,
                escape_html(&service.checked_at.to_rfc3339()),
            ));
        }
        page.push_str("</table>\n");
    }

    page.push_str("<h2>Sizes</h2>\n");
    if snapshot.sizes.is_empty() {
        page.push_str("<p>no size metrics configured</p>\n");
    } else {
        page.push_str("<table>\n<tr><th>tree</th><th>files</th></tr>\n");
        for size in &snapshot.sizes {
            page.push_str(&format!(
                "<tr><td>{}</td><td>{}</td></tr>\n",
                escape_html(&size.label),
                size.count,
            ));
        }
        page.push_str("</table>\n");
    }

    page.push_str("<h2>Database</h2>\n");
    if snapshot.database.connected {
        page.push_str(&format!(
            "<p class=\"up\">connected, {} tables</p>\n",
            snapshot.database.table_count
        ));
    } else {
        page.push_str("<p class=\"down\">unavailable</p>\n");
    }
}

/// Escape text interpolated into HTML.
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use stackwatch_types::{DatabaseMetric, ServiceStatus, SizeMetric};

    fn sample_snapshot() -> Snapshot {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap();
        Snapshot::builder()
            .generated_at(now)
            .service(ServiceStatus::new("api", true, now))
            .service(ServiceStatus::new("frontend", false, now))
            .size(SizeMetric::new("backend-sources", 412))
            .database(DatabaseMetric::connected(9))
            .derived_progress(58)
            .build()
    }

    #[test]
    fn json_contains_wire_fields() {
        let json = render_json(&sample_snapshot());

        assert!(json.contains("\"generatedAt\""));
        assert!(json.contains("\"derivedProgress\": 58"));
        assert!(json.contains("\"tableCount\": 9"));
        assert!(json.contains("\"reachable\": true"));
    }

    #[test]
    fn json_parses_back_to_the_same_snapshot() {
        let snapshot = sample_snapshot();
        let parsed: Snapshot = serde_json::from_str(&render_json(&snapshot)).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn html_renders_all_sections() {
        let html = render_html(Some(&sample_snapshot()));

        assert!(html.contains("<h2>Services</h2>"));
        assert!(html.contains("api"));
        assert!(html.contains("frontend"));
        assert!(html.contains("backend-sources"));
        assert!(html.contains("412"));
        assert!(html.contains("connected, 9 tables"));
        assert!(html.contains("derived progress: 58%"));
    }

    #[test]
    fn html_marks_unreachable_services_and_dead_database() {
        let now = Utc::now();
        let snapshot = Snapshot::builder()
            .service(ServiceStatus::new("api", false, now))
            .database(DatabaseMetric::unavailable())
            .build();

        let html = render_html(Some(&snapshot));
        assert!(html.contains("class=\"down\""));
        assert!(html.contains("unavailable"));
    }

    #[test]
    fn pending_page_for_missing_snapshot() {
        let html = render_html(None);
        assert!(html.contains("pending"));
        assert!(html.contains("</html>"));
    }

    #[test]
    fn empty_sections_render_explicitly() {
        let snapshot = Snapshot::builder().build();
        let html = render_html(Some(&snapshot));

        assert!(html.contains("no services configured"));
        assert!(html.contains("no size metrics configured"));
    }

    #[test]
    fn escapes_html_in_labels() {
        let now = Utc::now();
        let snapshot = Snapshot::builder()
            .service(ServiceStatus::new("<script>alert(1)</script>", true, now))
            .build();

        let html = render_html(Some(&snapshot));
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn escape_html_covers_specials() {
        assert_eq!(escape_html("a&b"), "a&amp;b");
        assert_eq!(escape_html("<td>"), "&lt;td&gt;");
        assert_eq!(escape_html("say \"hi\""), "say &quot;hi&quot;");
        assert_eq!(escape_html("plain"), "plain");
    }
}
