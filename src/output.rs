// Colored terminal output for report feeds, site search, and taxonomies.
//
// All terminal-specific formatting lives here; main.rs delegates.

use colored::Colorize;

use crate::api::dto::{Impact, Site, Tag};
use crate::report::model::{ReportStatus, ResolvedReport, SeverityBucket, VoteState};
use crate::report::resolve::GENERAL_CATEGORY;

/// Truncate a string to at most `max_chars` characters, appending "..."
/// when truncated. Counts characters rather than bytes so multi-byte
/// input never panics.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{truncated}...")
}

/// Color a severity bucket for terminal display.
pub fn colorize_severity(bucket: SeverityBucket) -> String {
    match bucket {
        SeverityBucket::Critical => bucket.as_str().red().bold().to_string(),
        SeverityBucket::High => bucket.as_str().bright_red().to_string(),
        SeverityBucket::Medium => bucket.as_str().yellow().to_string(),
        SeverityBucket::Low => bucket.as_str().green().to_string(),
    }
}

/// Color a moderation status for terminal display.
pub fn colorize_status(status: ReportStatus) -> String {
    match status {
        ReportStatus::Approved => status.as_str().green().to_string(),
        ReportStatus::Rejected => status.as_str().red().to_string(),
        ReportStatus::Pending => status.as_str().yellow().to_string(),
        ReportStatus::Unknown => status.as_str().dimmed().to_string(),
    }
}

/// Display a report list as a compact table.
pub fn display_report_list(reports: &[ResolvedReport]) {
    if reports.is_empty() {
        println!("No reports to show.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Reports ({}) ===", reports.len()).bold()
    );
    println!();

    println!(
        "  {:>5}  {:<40} {:<9} {:<9} {:>6}  {}",
        "Id".dimmed(),
        "Title".dimmed(),
        "Severity".dimmed(),
        "Status".dimmed(),
        "Votes".dimmed(),
        "Categories".dimmed(),
    );
    println!("  {}", "-".repeat(92).dimmed());

    for report in reports {
        println!(
            "  {:>5}  {:<40} {:<9} {:<9} {:>6}  {}",
            report.id,
            truncate_chars(&report.title, 37),
            colorize_severity(report.severity_bucket),
            colorize_status(report.status),
            report.vote_score,
            truncate_chars(&report.category_label, 30),
        );
    }
    println!();
}

/// Display a single report in full.
pub fn display_report_detail(report: &ResolvedReport) {
    println!("\n{}", format!("=== Report #{} ===", report.id).bold());
    println!("  Title:      {}", report.title);
    println!("  Url:        {}", report.url);
    println!("  Status:     {}", colorize_status(report.status));
    println!(
        "  Severity:   {} ({}/100)",
        colorize_severity(report.severity_bucket),
        report.severity_raw
    );
    println!("  Votes:      {}", report.vote_score);
    if report.caller_vote != VoteState::None {
        println!("  Your vote:  {}", report.caller_vote);
    }
    println!("  Author:     {}", report.author);
    println!(
        "  Created:    {}",
        report.created_at.format("%Y-%m-%d %H:%M")
    );
    println!("  Categories: {}", report.category_label);
    if !report.impact_names.is_empty() {
        println!("  Impacts:    {}", report.impact_names.join(", "));
    }
    if let Some(feedback) = &report.admin_feedback {
        println!("  Feedback:   {}", feedback.dimmed());
    }
    if !report.description.is_empty() {
        println!("\n  {}", report.description);
    }
    if !report.evidences.is_empty() {
        println!("\n  Evidence:");
        for evidence in &report.evidences {
            let location = evidence
                .evidence_file_url
                .as_deref()
                .or(evidence.evidence_key.as_deref())
                .unwrap_or("(no file)");
            println!(
                "    [{}] {} {}",
                evidence.id,
                evidence.evidence_type,
                location.dimmed()
            );
        }
    }
    println!();
}

/// Display one site search result with its embedded reports.
pub fn display_site(site: &Site) {
    println!("\n{}", format!("=== {} ===", site.site_domain).bold());
    println!("  Reputation: {}", site.site_reputation);
    println!("  Reports:    {}", site.reports.len());

    if site.reports.is_empty() {
        println!();
        return;
    }

    println!();
    println!(
        "  {:>5}  {:<40} {:<9} {:<9} {:>6}  {}",
        "Id".dimmed(),
        "Title".dimmed(),
        "Severity".dimmed(),
        "Status".dimmed(),
        "Votes".dimmed(),
        "Categories".dimmed(),
    );
    println!("  {}", "-".repeat(92).dimmed());

    for report in &site.reports {
        // Search payloads carry tag names directly, no lookup pass
        let tag_names = report.tag_names();
        let categories = if tag_names.is_empty() {
            GENERAL_CATEGORY.to_string()
        } else {
            tag_names.join(", ")
        };
        println!(
            "  {:>5}  {:<40} {:<9} {:<9} {:>6}  {}",
            report.id,
            truncate_chars(&report.report_title, 37),
            colorize_severity(SeverityBucket::from_raw(report.severity)),
            colorize_status(ReportStatus::from_wire(&report.report_status)),
            report.vote_score(),
            truncate_chars(&categories, 30),
        );
    }
    println!();
}

/// Display the tag and impact taxonomies.
pub fn display_lookups(tags: &[Tag], impacts: &[Impact]) {
    println!("\n{}", format!("=== Tags ({}) ===", tags.len()).bold());
    for tag in tags {
        match &tag.tag_description {
            Some(description) => println!(
                "  {:>4}  {:<24} {}",
                tag.id,
                tag.tag_name,
                truncate_chars(description, 60).dimmed()
            ),
            None => println!("  {:>4}  {}", tag.id, tag.tag_name),
        }
    }

    println!("\n{}", format!("=== Impacts ({}) ===", impacts.len()).bold());
    for impact in impacts {
        match &impact.impact_description {
            Some(description) => println!(
                "  {:>4}  {:<24} {}",
                impact.id,
                impact.impact_name,
                truncate_chars(description, 60).dimmed()
            ),
            None => println!("  {:>4}  {}", impact.id, impact.impact_name),
        }
    }
    println!();
}
