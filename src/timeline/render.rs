//! Timeline markup and terminal summary.

use std::fmt::Write as _;

use crate::markdown::escape_html;

use super::view::{Branch, ComparisonItem, CurrentNode, DecisionNode, HeaderStats, TimelineView};

fn render_header_html(header: &HeaderStats) -> String {
    format!(
        r#"<div class="timeline-stats">
    <div class="stat"><span class="stat-label">Current Net Worth</span><span id="currentNetWorth" class="stat-value">{current}</span></div>
    <div class="stat"><span class="stat-label">Best Alternative</span><span id="bestAlternative" class="stat-value">{best}</span></div>
    <div class="stat"><span class="stat-label">Optimization Score</span><span id="optimizationScore" class="stat-value">{score}</span></div>
</div>
"#,
        current = escape_html(&header.current_net_worth),
        best = escape_html(&header.best_alternative),
        score = escape_html(header.optimization_score.as_deref().unwrap_or("-")),
    )
}

fn render_branch_html(branch: &Branch) -> String {
    let impact_class = if branch.negative {
        "branch-impact negative"
    } else {
        "branch-impact"
    };
    format!(
        r#"<div class="branch"><div class="branch-label"><div class="branch-universe">{}</div><div class="{}">{}</div></div></div>"#,
        escape_html(&branch.universe),
        impact_class,
        escape_html(&branch.impact),
    )
}

fn render_node_html(node: &DecisionNode) -> String {
    let mut html = format!(
        r#"<div class="timeline-node animate-in" style="left: {left}px; animation-delay: {delay};">
    <div class="node-marker"></div>
    <div class="node-content">
        <div class="node-date">{date}</div>
        <div class="node-title">{title}</div>
        <div class="node-amount">{amount}</div>
        <div class="node-category">{category}</div>
    </div>
"#,
        left = node.left,
        delay = node.delay,
        date = escape_html(&node.date),
        title = escape_html(&node.title),
        amount = escape_html(&node.amount),
        category = escape_html(&node.category),
    );

    if !node.branches.is_empty() {
        html.push_str("    <div class=\"branches\">");
        for branch in &node.branches {
            html.push_str(&render_branch_html(branch));
        }
        html.push_str("</div>\n");
    }
    html.push_str("</div>\n");
    html
}

fn render_current_html(current: &CurrentNode) -> String {
    format!(
        r#"<div class="timeline-node animate-in" style="left: {left}px; animation-delay: {delay};">
    <div class="node-marker current"></div>
    <div class="node-content">
        <div class="node-date">Today</div>
        <div class="node-title">Current Position</div>
        <div class="node-amount">{amount}</div>
    </div>
</div>
"#,
        left = current.left,
        delay = current.delay,
        amount = escape_html(&current.amount),
    )
}

fn render_comparison_html(item: &ComparisonItem) -> String {
    let difference = match (item.difference.as_deref(), item.difference_class()) {
        (Some(text), Some(class)) => format!(
            "\n    <div class=\"comparison-difference {}\">{}</div>",
            class,
            escape_html(text)
        ),
        _ => String::new(),
    };
    format!(
        r#"<div class="comparison-item">
    <div class="comparison-title">{title}</div>
    <div class="comparison-value">{value}</div>{difference}
    <div class="progress-bar">
        <div class="progress-fill {fill}" style="width: {progress};"></div>
    </div>
</div>
"#,
        title = escape_html(&item.title),
        value = escape_html(&item.value),
        difference = difference,
        fill = item.progress_class(),
        progress = escape_html(&item.progress),
    )
}

/// Full timeline fragment: stats, the scrolling wrapper and the comparison grid.
pub fn render_html(view: &TimelineView) -> String {
    let mut html = render_header_html(&view.header);

    let _ = writeln!(
        html,
        r#"<div id="timelineWrapper" class="timeline-wrapper" style="width: {}px;">"#,
        view.wrapper_width
    );
    let _ = writeln!(
        html,
        r#"<div class="main-timeline" style="width: {}px;"></div>"#,
        view.line_width
    );
    for node in &view.nodes {
        html.push_str(&render_node_html(node));
    }
    html.push_str(&render_current_html(&view.current));
    html.push_str("</div>\n");

    html.push_str("<div id=\"comparisonGrid\" class=\"comparison-grid\">\n");
    for item in &view.comparisons {
        html.push_str(&render_comparison_html(item));
    }
    html.push_str("</div>\n");
    html
}

/// Plain-text summary for terminals.
pub fn render_text(view: &TimelineView) -> String {
    let mut out = String::new();
    let header = &view.header;
    let _ = writeln!(out, "Current net worth:  {}", header.current_net_worth);
    let _ = writeln!(out, "Best alternative:   {}", header.best_alternative);
    let _ = writeln!(
        out,
        "Optimization score: {}",
        header.optimization_score.as_deref().unwrap_or("-")
    );

    out.push_str("\nDecisions\n");
    for node in &view.nodes {
        let _ = writeln!(
            out,
            "  {:<9} {} [{}] {}",
            node.date, node.title, node.category, node.amount
        );
        for branch in &node.branches {
            let _ = writeln!(out, "      ↳ {}: {}", branch.universe, branch.impact);
        }
    }
    let _ = writeln!(out, "  {:<9} Current Position {}", "Today", view.current.amount);

    out.push_str("\nComparison\n");
    for item in &view.comparisons {
        match &item.difference {
            Some(difference) => {
                let _ = writeln!(
                    out,
                    "  {}: {} ({}) {}",
                    item.title, item.value, difference, item.progress
                );
            }
            None => {
                let _ = writeln!(out, "  {}: {} {}", item.title, item.value, item.progress);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::models::{AlternativeUniverse, KeyDecision, TimelineData};
    use crate::timeline::view::build_view;

    fn sample() -> TimelineData {
        let mut data = TimelineData::default();
        data.financial_timeline.actual_journey.current_net_worth = "₹12,97,285".to_string();
        data.financial_timeline.key_decisions = vec![KeyDecision {
            date: "2022-03-09".to_string(),
            description: "<script>alert(1)</script>".to_string(),
            category: "Investment".to_string(),
            amount: "₹0".to_string(),
            ..Default::default()
        }];
        data.alternative_universes = vec![AlternativeUniverse {
            universe_id: "conservative".to_string(),
            name: "Conservative".to_string(),
            final_net_worth: "₹11,31,764".to_string(),
            wealth_difference: "-₹1,65,521 (-12.76%)".to_string(),
            key_characteristics: vec!["Fixed deposits instead of investment".to_string()],
            ..Default::default()
        }];
        data
    }

    #[test]
    fn test_html_structure() {
        let html = render_html(&build_view(&sample()));
        assert!(html.contains(r#"<span id="currentNetWorth" class="stat-value">₹13.0L</span>"#));
        assert!(html.contains(r#"id="timelineWrapper" class="timeline-wrapper" style="width: 1000px;""#));
        assert!(html.contains(r#"<div class="main-timeline" style="width: 800px;"></div>"#));
        assert!(html.contains(r#"style="left: 400px; animation-delay: 0.0s;""#));
        assert!(html.contains(r#"<div class="node-amount">-</div>"#));
        assert!(html.contains(r#"<div class="node-marker current"></div>"#));
        assert!(html.contains(r#"<div class="branch-impact negative">-₹1,65,521 (-12.76%)</div>"#));
        assert!(html.contains(r#"<div class="comparison-difference negative">"#));
        assert!(html.contains(r#"<div class="progress-fill negative""#));
    }

    #[test]
    fn test_payload_is_escaped() {
        let html = render_html(&build_view(&sample()));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn test_your_path_has_no_difference() {
        let html = render_html(&build_view(&sample()));
        let your_path = html
            .split("<div class=\"comparison-item\">")
            .nth(1)
            .unwrap();
        assert!(your_path.contains("Your Path"));
        assert!(!your_path.contains("comparison-difference"));
        assert!(your_path.contains("width: 100%;"));
    }

    #[test]
    fn test_text_summary() {
        let text = render_text(&build_view(&sample()));
        assert!(text.contains("Current net worth:  ₹13.0L"));
        assert!(text.contains("Optimization score: -"));
        assert!(text.contains("↳ Conservative: -₹1,65,521 (-12.76%)"));
        assert!(text.contains("Your Path: ₹12,97,285 100%"));
        assert!(text.contains("Current Position ₹13.0L"));
    }
}
