//! Rendering of tip listings and summaries as chat markdown.

use holocron_core::{SortPolicy, Tip};
use tip_storage::{SquadStore, StoreStats};

/// Heading word for a sort policy, e.g. "Recent tips 3".
fn sort_heading(policy: SortPolicy) -> &'static str {
    match policy {
        SortPolicy::Recent => "Recent",
        SortPolicy::Rating => "Top",
        SortPolicy::Oldest => "Oldest",
    }
}

/// Render tips at a location.
///
/// `shown` is already sorted and truncated; `total` counts every tip that
/// passed the filters.
pub fn tip_listing(
    name: &str,
    detail: Option<&str>,
    shown: &[&Tip],
    total: usize,
    policy: SortPolicy,
) -> String {
    if total == 0 {
        let mut text = String::new();
        if let Some(detail) = detail {
            text.push_str(&format!("__**{}**__\n{}\n\n", name, detail));
        }
        text.push_str(&format!("There are no tips for {}.", name));
        return text;
    }

    let mut lines = vec![format!(
        "__**{} tips {}** (of {}) for **{}**__",
        sort_heading(policy),
        shown.len(),
        total,
        name
    )];
    if let Some(detail) = detail {
        lines.push(detail.to_string());
    }
    lines.push(String::new());

    let show_rating = policy == SortPolicy::Rating;
    for (i, tip) in shown.iter().enumerate() {
        lines.push(format!("{} - {}", i + 1, tip.tip_message(show_rating)));
    }
    lines.join("\n")
}

pub fn stats_report(title: &str, stats: &StoreStats) -> String {
    match stats {
        StoreStats::Squads {
            squads,
            tips,
            aliases,
            orphans,
        } => {
            let mut text = format!(
                "**{} Stats**\nSquads: {}\nTips: {}\nAliases: {}",
                title, squads, tips, aliases
            );
            if *orphans > 0 {
                text.push_str(&format!("\nOrphaned tips: {}", orphans));
            }
            text
        }
        StoreStats::Tree { total, sections } => {
            let mut lines = vec![format!("**{} Total Tips**: {}", title, total)];
            for section in sections {
                lines.push(format!("Tips for {}: {}", section.name, section.total));
                for (part, count) in section.parts.iter().filter(|(_, count)| *count > 0) {
                    lines.push(format!("- {}: {}", part, count));
                }
            }
            lines.join("\n")
        }
    }
}

/// All squads with tip counts, plus aliases.
pub fn squad_list(squads: &SquadStore) -> String {
    let sorted = squads.sorted_squads();
    if sorted.is_empty() {
        return "There are no squads yet. Add one with `addsquad <id>`.".to_string();
    }

    let mut lines = vec!["__**Squads**__".to_string()];
    for squad in sorted {
        lines.push(format!("{} - {} tips", squad.header(), squad.tips.len()));
    }
    if !squads.aliases.is_empty() {
        let aliases: Vec<String> = squads
            .aliases
            .values()
            .map(|a| format!("`{}` → `{}`", a.alias, a.squad_lead_id))
            .collect();
        lines.push(String::new());
        lines.push(format!("Aliases: {}", aliases.join(", ")));
    }
    lines.join("\n")
}

/// War keys with tip counts.
pub fn key_list(keys: &[(String, usize)]) -> String {
    if keys.is_empty() {
        return "There are no tips yet.".to_string();
    }
    let mut lines = vec!["__**Locations with tips**__".to_string()];
    for (key, count) in keys {
        lines.push(format!("`{}` - {} tips", key, count));
    }
    lines.join("\n")
}
