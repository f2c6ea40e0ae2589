//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS inlined: cohort header,
//! summary stats, an SVG bar chart of the per-question rates with a dashed
//! reference line at the mean, and the full series table.

use std::path::Path;

use anyhow::Result;

use gabarito_core::report::ScoreReport;
use gabarito_core::scoring::ScoreSeries;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML page from a score report.
pub fn generate_html(report: &ScoreReport) -> String {
    let mut html = String::new();

    let cohort_label = report
        .cohort
        .class
        .as_deref()
        .unwrap_or("all classes")
        .to_string();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>gabarito — {} / {} / {}</title>\n",
        html_escape(&report.cohort.grade),
        html_escape(&report.cohort.subject),
        html_escape(&cohort_label)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>Correctness by question</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Grade: <strong>{}</strong> | Subject: <strong>{}</strong> | Class: <strong>{}</strong>{} | {} students | {}</p>\n",
        html_escape(&report.cohort.grade),
        html_escape(&report.cohort.subject),
        html_escape(&cohort_label),
        report
            .cohort
            .school
            .as_deref()
            .map(|s| format!(" | School: <strong>{}</strong>", html_escape(s)))
            .unwrap_or_default(),
        report.cohort_size,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Chart
    html.push_str("<section class=\"chart\">\n");
    if !report.key_found {
        html.push_str(
            "<p class=\"notice\">Answer key not found for this assessment context. \
             Nothing was scored.</p>\n",
        );
    } else if report.series.is_empty() {
        html.push_str("<p class=\"notice\">The answer key has no questions.</p>\n");
    } else {
        html.push_str(&format!(
            "<h2>Correctness rate (mean {:.1}%)</h2>\n",
            report.mean_rate
        ));
        html.push_str(&generate_bar_chart(&report.series, report.mean_rate));
    }
    html.push_str("</section>\n");

    // Series table
    if !report.series.is_empty() {
        html.push_str("<section class=\"results\">\n");
        html.push_str("<h2>Series</h2>\n");
        html.push_str("<table class=\"series\">\n");
        html.push_str(
            "<thead><tr><th>Question</th><th>Correct</th><th>Students</th><th>Rate</th></tr></thead>\n",
        );
        html.push_str("<tbody>\n");
        for entry in report.series.iter() {
            let class = if entry.rate >= report.mean_rate {
                "above"
            } else {
                "below"
            };
            html.push_str(&format!(
                "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{:.1}%</td></tr>\n",
                class,
                html_escape(&entry.label),
                entry.correct,
                entry.total,
                entry.rate
            ));
        }
        html.push_str("</tbody></table>\n");
        html.push_str("</section>\n");
    }

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &ScoreReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

fn generate_bar_chart(series: &ScoreSeries, mean_rate: f64) -> String {
    let bar_width = 34;
    let gap = 14;
    let chart_height = 280;
    let left = 44;
    let top = 34;
    let bottom = 28;

    let n = series.len();
    let width = left + n * (bar_width + gap) + gap;
    let height = top + chart_height + bottom;

    let mut svg = format!(
        "<svg width=\"{width}\" height=\"{height}\" xmlns=\"http://www.w3.org/2000/svg\">\n"
    );

    // y axis gridlines at 0/25/50/75/100
    for tick in [0u32, 25, 50, 75, 100] {
        let y = top + chart_height - (tick as usize * chart_height / 100);
        svg.push_str(&format!(
            "  <line x1=\"{left}\" y1=\"{y}\" x2=\"{}\" y2=\"{y}\" stroke=\"var(--grid)\" stroke-width=\"1\"/>\n",
            width - gap
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"11\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{tick}</text>\n",
            left - 8,
            y
        ));
    }

    for (i, entry) in series.iter().enumerate() {
        let x = left + gap / 2 + i * (bar_width + gap);
        let bar_h = (entry.rate / 100.0 * chart_height as f64).round() as usize;
        let y = top + chart_height - bar_h;

        svg.push_str(&format!(
            "  <rect x=\"{x}\" y=\"{y}\" width=\"{bar_width}\" height=\"{bar_h}\" fill=\"#118ab2\" rx=\"3\"/>\n"
        ));

        // percentage annotation in a dark pill above the bar
        let text = format!("{:.1}%", entry.rate);
        let pill_w = 6 * text.len() + 8;
        let pill_x = x + bar_width / 2 - pill_w / 2;
        let pill_y = y.saturating_sub(20);
        svg.push_str(&format!(
            "  <rect x=\"{pill_x}\" y=\"{pill_y}\" width=\"{pill_w}\" height=\"16\" fill=\"#111\" rx=\"4\"/>\n"
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"11\" fill=\"#fff\" text-anchor=\"middle\" dominant-baseline=\"middle\">{text}</text>\n",
            x + bar_width / 2,
            pill_y + 8
        ));

        // question label under the bar
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" text-anchor=\"middle\">{}</text>\n",
            x + bar_width / 2,
            top + chart_height + 18,
            html_escape(&entry.label)
        ));
    }

    // dashed reference line at the mean
    let mean_y = top + chart_height - (mean_rate / 100.0 * chart_height as f64).round() as usize;
    svg.push_str(&format!(
        "  <line x1=\"{left}\" y1=\"{mean_y}\" x2=\"{}\" y2=\"{mean_y}\" stroke=\"#6b7280\" stroke-width=\"2\" stroke-dasharray=\"6 4\"/>\n",
        width - gap
    ));
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" font-size=\"11\" fill=\"currentColor\" text-anchor=\"end\">mean {mean_rate:.1}%</text>\n",
        width - gap,
        mean_y.saturating_sub(6)
    ));

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --grid: #e5e7eb; --above: #dcfce7; --below: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --grid: #374151; --above: #064e3b; --below: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.notice { padding: 1rem; border: 1px solid var(--border); border-radius: 8px; font-weight: bold; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.above { background: var(--above); }
.below { background: var(--below); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; max-width: 100%; }
"#;
