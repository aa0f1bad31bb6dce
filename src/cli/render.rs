//! Line-based terminal output for the `brain` command.

use crate::diagram::{self, Segment};
use crate::error::BrainError;
use crate::models::{
    AiHealth, CategoryList, DataVisualization, HealthStatus, InsightSummary, PoolStatus,
};
use crate::sse::{ChatEvent, DecodeStats};

/// Line width for separators.
const LINE_WIDTH: usize = 60;

/// Widest distribution bar, reached at 100%.
const BAR_WIDTH: usize = 30;

/// Status icons
pub mod icons {
    pub const SUCCESS: &str = "✓";
    pub const FAILURE: &str = "✗";
    pub const WARNING: &str = "⚠";
}

/// Print a title underlined with a double rule.
///
/// ```text
/// BRAIN HEALTH
/// ════════════════════════════════════════════════════════════
/// ```
pub fn print_header(title: &str) {
    println!();
    println!("{}", title);
    println!("{}", "═".repeat(LINE_WIDTH));
}

/// Print a section title underlined with a single rule.
pub fn print_section(title: &str) {
    println!();
    println!("{}", title);
    println!("{}", "─".repeat(LINE_WIDTH));
}

/// Print an indented line.
///
/// ```text
///   ✓ Database connected
/// ```
pub fn print_step_line(icon: &str, message: &str) {
    println!("  {} {}", icon, message);
}

fn status_icon(ok: bool) -> &'static str {
    if ok {
        icons::SUCCESS
    } else {
        icons::FAILURE
    }
}

pub fn event_icon(event: &ChatEvent) -> &'static str {
    match event {
        ChatEvent::Thinking { .. } => "💭",
        ChatEvent::Routing { .. } => "🔀",
        ChatEvent::SpecialistStart { .. } => "🔍",
        ChatEvent::SpecialistComplete { .. } => "✅",
        ChatEvent::Synthesizing { .. } => "🔗",
        ChatEvent::Complete { .. } => "🎯",
        ChatEvent::Error { .. } => "❌",
        ChatEvent::Unknown => "📌",
    }
}

/// One progress line per event, e.g. `💭 [THINKING] Analizando`.
pub fn format_event(event: &ChatEvent) -> String {
    let mut line = format!(
        "{} [{}] {}",
        event_icon(event),
        event.event_type_name().to_uppercase(),
        event.message()
    );
    if let ChatEvent::Routing { specialists, .. } = event {
        if !specialists.is_empty() {
            line.push_str(&format!(" ({})", specialists.join(", ")));
        }
    }
    line
}

pub fn print_event(event: &ChatEvent) {
    println!("{}", format_event(event));
}

/// Horizontal bar proportional to `percentage` (clamped to 0..=100).
pub fn format_bar(percentage: f64) -> String {
    let clamped = if percentage.is_finite() {
        percentage.clamp(0.0, 100.0)
    } else {
        0.0
    };
    let filled = (clamped / 100.0 * BAR_WIDTH as f64).round() as usize;
    "█".repeat(filled)
}

/// `label   count  pct%  bar`, with the label padded to a fixed width.
pub fn format_distribution_row(label: &str, count: u64, percentage: f64) -> String {
    format!(
        "{:<28} {:>7} {:>6.2}% {}",
        truncate(label, 28),
        count,
        percentage,
        format_bar(percentage)
    )
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

pub fn print_health(health: &HealthStatus) {
    print_header("BRAIN HEALTH");
    print_step_line(status_icon(health.is_healthy()), &format!("Status: {}", health.status));
    print_step_line(
        status_icon(health.database.connected),
        if health.database.connected {
            "Database connected"
        } else {
            "Database unreachable"
        },
    );
    if let Some(dsn) = &health.database.dsn {
        print_step_line(" ", &format!("DSN: {}", dsn));
    }
    if let Some(pool) = &health.database.pool {
        print_step_line(
            " ",
            &format!(
                "Pool: {} open, {} busy, {} idle (min {}, max {})",
                pool.opened,
                pool.busy,
                pool.idle(),
                pool.min,
                pool.max
            ),
        );
    }
}

pub fn print_pool(status: &PoolStatus) {
    print_section("CONNECTION POOL");
    let pool = &status.pool;
    print_step_line(
        status_icon(status.status == "success"),
        &format!("{} busy of {} max", pool.busy, pool.max),
    );
    print_step_line(
        " ",
        &format!(
            "Utilization {:.1}% {}",
            status.utilization_percent,
            format_bar(status.utilization_percent)
        ),
    );
}

pub fn print_ai_health(health: &AiHealth) {
    print_section("AI ASSISTANT");
    print_step_line(status_icon(health.is_healthy()), &format!("Status: {}", health.status));
    for (component, up) in &health.components {
        print_step_line(status_icon(*up), component);
    }
    if let Some(error) = &health.error {
        print_step_line(icons::WARNING, error);
    }
}

pub fn print_insights(summary: &InsightSummary) {
    print_header("BRAIN INSIGHTS");
    println!(
        "  Period: {}  (generated {})",
        summary.sample_period,
        summary.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    if !summary.database_connected {
        print_step_line(icons::WARNING, "Database offline, showing fallback figures");
    }
    for phrase in &summary.highlight_phrases {
        print_step_line("•", phrase);
    }
    for section in &summary.metric_sections {
        print_section(&section.title);
        for metric in &section.metrics {
            println!("  {:<30} {}", metric.title, metric.value);
            if !metric.description.is_empty() {
                println!("    {}", metric.description);
            }
        }
    }
}

pub fn print_categories(list: &CategoryList) {
    print_header(&format!("DIAGNOSTIC CATEGORIES ({})", list.total));
    for category in &list.categories {
        print_step_line("•", category);
    }
}

pub fn print_visualization(viz: &DataVisualization) {
    print_header(&format!("ADMISSIONS ({} records)", viz.total_records));
    if viz.is_empty() {
        print_step_line(icons::WARNING, "No records match the filters");
        return;
    }

    print_section("Categories");
    for row in &viz.categories {
        println!("  {}", format_distribution_row(&row.category, row.count, row.percentage));
    }
    print_section("Age groups");
    for row in &viz.age_groups {
        println!("  {}", format_distribution_row(&row.age_group, row.count, row.percentage));
    }
    print_section("Gender");
    for row in &viz.gender_distribution {
        println!("  {}", format_distribution_row(&row.gender, row.count, row.percentage));
    }
    print_section("Length of stay");
    for row in &viz.stay_distribution {
        println!("  {}", format_distribution_row(&row.stay_range, row.count, row.percentage));
    }
    if !viz.time_series.is_empty() {
        print_section("Monthly admissions");
        for point in &viz.time_series {
            println!("  {:<10} {:>7}", point.period, point.count);
        }
    }
}

/// Print an answer, framing embedded diagrams with their init directive.
pub fn print_answer(text: &str) {
    println!();
    for segment in diagram::split_segments(text) {
        match segment {
            Segment::Text(prose) => println!("{}", prose.trim()),
            Segment::Diagram(source) => print_diagram(source),
        }
    }
}

pub fn print_diagram(source: &str) {
    println!("{}", "─".repeat(LINE_WIDTH));
    println!("{}", diagram::with_init_directive(source));
    println!("{}", "─".repeat(LINE_WIDTH));
}

pub fn print_tools(tools: &[String]) {
    if !tools.is_empty() {
        println!();
        print_step_line("🛠", &format!("Tools: {}", tools.join(", ")));
    }
}

/// Mention frames the decoder had to drop, if any.
pub fn print_stream_diagnostics(stats: &DecodeStats) {
    if stats.malformed > 0 {
        print_step_line(
            icons::WARNING,
            &format!("{} malformed progress update(s) skipped", stats.malformed),
        );
    }
    if stats.discarded_bytes > 0 {
        print_step_line(
            icons::WARNING,
            &format!("stream ended mid-update ({} bytes dropped)", stats.discarded_bytes),
        );
    }
}

pub fn print_error(err: &BrainError) {
    eprintln!("{} {}", icons::FAILURE, err.user_message());
    eprintln!("    {}", err.recovery_hint());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_event() {
        let event = ChatEvent::Thinking {
            message: "Analizando".to_string(),
        };
        assert_eq!(format_event(&event), "💭 [THINKING] Analizando");
    }

    #[test]
    fn test_format_routing_lists_specialists() {
        let event = ChatEvent::Routing {
            message: "Consultando".to_string(),
            specialists: vec!["sql_specialist".to_string(), "python_specialist".to_string()],
        };
        assert_eq!(
            format_event(&event),
            "🔀 [ROUTING] Consultando (sql_specialist, python_specialist)"
        );
    }

    #[test]
    fn test_event_icons() {
        assert_eq!(
            event_icon(&ChatEvent::SpecialistComplete {
                message: String::new(),
                specialist: "sql".to_string()
            }),
            "✅"
        );
        assert_eq!(event_icon(&ChatEvent::Unknown), "📌");
    }

    #[test]
    fn test_format_bar_clamps() {
        assert_eq!(format_bar(0.0), "");
        assert_eq!(format_bar(50.0).chars().count(), 15);
        assert_eq!(format_bar(250.0).chars().count(), 30);
        assert_eq!(format_bar(-3.0), "");
        assert_eq!(format_bar(f64::NAN), "");
    }

    #[test]
    fn test_distribution_row_truncates_long_labels() {
        let row = format_distribution_row(
            "Trastornos mentales y del comportamiento debidos al consumo",
            12,
            3.5,
        );
        assert!(row.starts_with("Trastornos mentales y del c…"));
        assert!(row.contains("3.50%"));
    }
}
