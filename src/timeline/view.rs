//! Layout derived from an analysis: header stats, decision nodes with their
//! branches, and the comparison panel.

use once_cell::sync::Lazy;
use regex::Regex;

use super::currency::{format_amount, format_currency, format_date, parse_currency};
use super::models::{AlternativeUniverse, KeyDecision, TimelineData};

/// Horizontal distance between nodes, in pixels.
pub const NODE_SPACING: u32 = 400;
/// Extra wrapper width past the last node.
pub const WRAPPER_PADDING: u32 = 200;
pub const MAX_BRANCHES: usize = 3;
pub const MAX_COMPARISONS: usize = 3;
/// Universe id the analysis uses for the real path.
pub const ACTUAL_UNIVERSE_ID: &str = "actual_timeline";

static SCORE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+\.?\d*)/10").expect("Invalid score regex pattern"));

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderStats {
    pub current_net_worth: String,
    pub best_alternative: String,
    /// `None` when the performance text carries no `X/10` score.
    pub optimization_score: Option<String>,
}

/// An alternative universe shown beside a decision.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub universe: String,
    pub impact: String,
    pub negative: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionNode {
    pub left: u32,
    pub delay: String,
    pub date: String,
    pub title: String,
    pub amount: String,
    pub category: String,
    pub branches: Vec<Branch>,
}

/// The trailing "Today" node.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentNode {
    pub left: u32,
    pub delay: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonItem {
    pub title: String,
    pub value: String,
    pub progress: String,
    pub difference: Option<String>,
}

impl ComparisonItem {
    pub fn difference_class(&self) -> Option<&'static str> {
        self.difference
            .as_deref()
            .map(|d| if d.starts_with('-') { "negative" } else { "positive" })
    }

    /// Extra class on the progress fill: only shortfalls are marked.
    pub fn progress_class(&self) -> &'static str {
        if self.progress == "100%" {
            return "";
        }
        match self.difference.as_deref() {
            Some(d) if d.starts_with('-') => "negative",
            _ => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineView {
    pub header: HeaderStats,
    pub wrapper_width: u32,
    pub line_width: u32,
    pub nodes: Vec<DecisionNode>,
    pub current: CurrentNode,
    pub comparisons: Vec<ComparisonItem>,
}

fn animation_delay(index: usize) -> String {
    format!("{:.1}s", index as f64 * 0.1)
}

/// `7.5/10` → `75%`, rounding half up.
pub fn optimization_score(performance: &str) -> Option<String> {
    let captures = SCORE_REGEX.captures(performance)?;
    let value: f64 = captures.get(1)?.as_str().parse().ok()?;
    Some(format!("{}%", (value * 10.0 + 0.5).floor()))
}

/// Universes whose characteristics mention the decision, at most three.
pub fn find_branches(decision: &KeyDecision, universes: &[AlternativeUniverse]) -> Vec<Branch> {
    let description = decision.description.to_lowercase();
    let category = decision.category.to_lowercase();
    // An empty description or category is contained in every characteristic
    let mentions = |text: &str| {
        let text = text.to_lowercase();
        text.contains(&description) || text.contains(&category)
    };

    universes
        .iter()
        .filter(|universe| universe.key_characteristics.iter().any(|c| mentions(c)))
        .take(MAX_BRANCHES)
        .map(|universe| Branch {
            universe: universe.name.clone(),
            impact: universe.wealth_difference.clone(),
            negative: universe.wealth_difference.starts_with('-'),
        })
        .collect()
}

/// `target` as a share of `current`, clamped to 0..=100.
pub fn progress_percent(current: f64, target: f64) -> String {
    if current == 0.0 {
        return "0%".to_string();
    }
    let percent = (target / current * 100.0).clamp(0.0, 100.0);
    format!("{}%", percent)
}

/// "Your Path" first, then the richest alternatives.
pub fn comparison_items(data: &TimelineData) -> Vec<ComparisonItem> {
    let current_worth = &data.financial_timeline.actual_journey.current_net_worth;
    let current = parse_currency(current_worth);

    let mut alternatives: Vec<&AlternativeUniverse> = data
        .alternative_universes
        .iter()
        .filter(|u| u.universe_id != ACTUAL_UNIVERSE_ID)
        .collect();
    alternatives.sort_by(|a, b| {
        parse_currency(&b.final_net_worth).total_cmp(&parse_currency(&a.final_net_worth))
    });

    let mut items = vec![ComparisonItem {
        title: "Your Path".to_string(),
        value: current_worth.clone(),
        progress: "100%".to_string(),
        difference: None,
    }];
    items.extend(alternatives.into_iter().take(MAX_COMPARISONS).map(|u| ComparisonItem {
        title: u.name.clone(),
        value: u.final_net_worth.clone(),
        progress: progress_percent(current, parse_currency(&u.final_net_worth)),
        difference: Some(u.wealth_difference.clone()).filter(|d| !d.is_empty()),
    }));
    items
}

fn header_stats(data: &TimelineData) -> HeaderStats {
    let insights = &data.summary_insights;
    HeaderStats {
        current_net_worth: format_currency(&data.financial_timeline.actual_journey.current_net_worth),
        best_alternative: insights
            .transformation_potential
            .as_ref()
            .map(|potential| format_currency(&potential.to_optimal))
            .unwrap_or_else(|| "-".to_string()),
        optimization_score: insights
            .overall_performance
            .as_deref()
            .and_then(optimization_score),
    }
}

/// Derive everything the timeline page shows.
pub fn build_view(data: &TimelineData) -> TimelineView {
    let decisions = &data.financial_timeline.key_decisions;
    let count = decisions.len();
    let last_left = (count as u32 + 1) * NODE_SPACING;

    let nodes = decisions
        .iter()
        .enumerate()
        .map(|(index, decision)| DecisionNode {
            left: (index as u32 + 1) * NODE_SPACING,
            delay: animation_delay(index),
            date: format_date(&decision.date),
            title: decision.description.clone(),
            amount: format_amount(&decision.amount),
            category: decision.category.clone(),
            branches: find_branches(decision, &data.alternative_universes),
        })
        .collect();

    TimelineView {
        header: header_stats(data),
        wrapper_width: last_left + WRAPPER_PADDING,
        line_width: last_left,
        nodes,
        current: CurrentNode {
            left: last_left,
            delay: animation_delay(count),
            amount: format_currency(&data.financial_timeline.actual_journey.current_net_worth),
        },
        comparisons: comparison_items(data),
    }
}
