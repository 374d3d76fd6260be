//! Help text per mode.

use locations::Mode;

use crate::command::{HelpTopic, Operation};

fn location_help(mode: Mode) -> &'static str {
    match mode {
        Mode::Conquest => {
            "**Locations**\n\
             `g` global feats, `g3` one global feat.\n\
             `s` sectors, `s2` one sector.\n\
             `s2b` / `s2m` the boss or miniboss of sector 2, `s2b1` one of its feats.\n\
             `s2f` sector feats, `s2f3` one sector feat.\n\
             `s2n` nodes with tips, `s2n14` one node."
        }
        Mode::Rise => {
            "**Locations**\n\
             `ds`, `mx`, `ls`, `lsb` a track.\n\
             `ds1` a planet on the track.\n\
             `ds1cm` its combat missions, `ds1cm2` one combat mission.\n\
             `ds1sm` its special mission, `ds1f` its fleet mission."
        }
        Mode::Counter => {
            "**Locations**\n\
             A squad lead id or alias, e.g. `jmk`. Use `list` to see every squad."
        }
        Mode::War => "**Locations**\nAny single word names a location, e.g. `jmk` or `backzone`.",
    }
}

fn operation_help(mode: Mode, prefix: &str, operation: Operation) -> Option<String> {
    let cmd = format!("{}{}", prefix, mode.as_str());
    let text = match operation {
        Operation::Read => match mode {
            Mode::Counter => format!(
                "**Read** `{cmd} <squad> [depth] [activity]`\n\
                 Show counters for a squad, optionally only for one activity \
                 (`GAC`, `GAC3`, `TW`, `GG`, `GG3`)."
            ),
            _ => format!(
                "**Read** `{cmd} <location> [depth]`\n\
                 Show tips for a location, or pick from a list when the location is a group. \
                 Depth is the number of tips to show, 3 to 10."
            ),
        },
        Operation::List => match mode {
            Mode::Counter => format!("**List** `{cmd} list`\nList every squad."),
            Mode::War => format!("**List** `{cmd} list`\nList every location with tips."),
            _ => format!("**List** `{cmd} list <location>`\nList the entries of a group."),
        },
        Operation::Add => match mode {
            Mode::Counter => format!(
                "**Add** `{cmd} <squad> add [\"title\"]`\n\
                 Add a counter. You will be asked for the title and then the description; \
                 include `tag=GAC` (or another activity) in the description to tag it."
            ),
            _ => format!(
                "**Add** `{cmd} <location> add [\"tip\"]`\n\
                 Add a tip. Without quoted text, your next message in the channel becomes the tip."
            ),
        },
        Operation::Edit => format!(
            "**Edit** `{cmd} <location> edit`\n\
             Pick one of your tips; it is sent to you and your next message replaces it."
        ),
        Operation::Delete => format!(
            "**Delete** `{cmd} <location> delete`\n\
             Pick one of your tips and confirm with `confirm`."
        ),
        Operation::ChangeAuthor => format!(
            "**Reassign** `{cmd} <location> reassign <name>` *(admin)*\n\
             Change the author of a tip."
        ),
        Operation::AddGroup | Operation::EditGroup | Operation::DeleteGroup => match mode {
            Mode::Counter => format!(
                "**Squads**\n\
                 `{cmd} addsquad <id> [\"Lead Name\"]` add a squad.\n\
                 `{cmd} editsquad <id> [\"Lead Name\"]` rename a squad, keeping its counters.\n\
                 `{cmd} deletesquad <id> [other]` *(admin)* delete a squad; \
                 its counters move to `other` when given."
            ),
            _ => return None,
        },
        Operation::Map => match mode {
            Mode::Rise => format!("**Map** `{cmd} map <planet>`\nShow the planet's map, e.g. `{cmd} map ds1`."),
            _ => return None,
        },
        Operation::Stats => format!("**Stats** `{cmd} stats`\nShow how many tips are stored."),
        Operation::Help => format!("**Help** `{cmd} help [command]`\nShow this help, or help for one command."),
        Operation::Clear => format!("**Clear** `{cmd} clear` *(admin)*\nDelete every tip in this mode."),
        Operation::Populate => format!("**Populate** `{cmd} populate` *(admin)*\nAdd sample tips."),
    };
    Some(text)
}

/// Render help for `topic`, or for a section named in `trailing` (e.g. `location`).
pub fn help_text(mode: Mode, prefix: &str, topic: Option<HelpTopic>, trailing: &[String]) -> String {
    match topic {
        Some(HelpTopic::Operation(operation)) => operation_help(mode, prefix, operation)
            .unwrap_or_else(|| format!("`{}` is not available in {} mode.", operation, mode)),
        Some(HelpTopic::All) => all_help(mode, prefix),
        None => match trailing.first().map(|s| s.to_lowercase()) {
            Some(section) if section.starts_with("loc") => location_help(mode).to_string(),
            _ => all_help(mode, prefix),
        },
    }
}

fn all_help(mode: Mode, prefix: &str) -> String {
    let aliases: Vec<String> = std::iter::once(mode.as_str())
        .chain(mode.aliases().iter().copied())
        .map(|a| format!("`{}{}`", prefix, a))
        .collect();
    let mut sections = vec![format!(
        "__**Holocron: {}**__\nInvoke with {}.",
        mode,
        aliases.join(", ")
    )];
    sections.push(location_help(mode).to_string());
    let mut seen_squads = false;
    for operation in Operation::ALL {
        if matches!(
            operation,
            Operation::AddGroup | Operation::EditGroup | Operation::DeleteGroup
        ) {
            if seen_squads {
                continue;
            }
            seen_squads = true;
        }
        if let Some(text) = operation_help(mode, prefix, operation) {
            sections.push(text);
        }
    }
    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_help_lists_mode_specific_commands() {
        let rise = help_text(Mode::Rise, "!", Some(HelpTopic::All), &[]);
        assert!(rise.contains("**Map**"));
        assert!(!rise.contains("addsquad"));

        let counter = help_text(Mode::Counter, "!", Some(HelpTopic::All), &[]);
        assert!(counter.contains("addsquad"));
        assert_eq!(counter.matches("**Squads**").count(), 1);
        assert!(!counter.contains("**Map**"));
    }

    #[test]
    fn test_topic_help() {
        let text = help_text(Mode::Conquest, "?", Some(HelpTopic::Operation(Operation::Edit)), &[]);
        assert!(text.starts_with("**Edit** `?conquest <location> edit`"));

        let text = help_text(Mode::Conquest, "!", Some(HelpTopic::Operation(Operation::Map)), &[]);
        assert_eq!(text, "`map` is not available in conquest mode.");
    }

    #[test]
    fn test_location_section() {
        let text = help_text(Mode::Rise, "!", None, &["location".to_string()]);
        assert!(text.starts_with("**Locations**"));
    }
}
