//! Counter grammar: a squad lead id or one of its aliases.

use crate::error::{Expected, InvalidLocation};

/// Lookup of registered squads, implemented by the counter store.
pub trait SquadDirectory {
    /// Resolve a lead id or alias to `(lead_id, display title)`.
    fn resolve_lead(&self, id: &str) -> Option<(String, String)>;

    /// All registered lead ids.
    fn known_leads(&self) -> Vec<String>;
}

/// A directory without squads, for modes that don't have any.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSquads;

impl SquadDirectory for NoSquads {
    fn resolve_lead(&self, _id: &str) -> Option<(String, String)> {
        None
    }

    fn known_leads(&self) -> Vec<String> {
        Vec::new()
    }
}

/// A counter location: one squad.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CounterLocation {
    /// Normalized lead id, after following aliases.
    pub lead_id: String,
    /// Display title of the squad lead.
    pub lead: String,
}

impl CounterLocation {
    pub(crate) fn parse(address: &str, squads: &dyn SquadDirectory) -> Result<Self, InvalidLocation> {
        let id = normalize(address)?;
        match squads.resolve_lead(&id) {
            Some((lead_id, lead)) => Ok(Self { lead_id, lead }),
            None => {
                let mut known = squads.known_leads();
                known.sort();
                let expected = if known.is_empty() {
                    Expected::Description("a squad added with `addsquad`".to_string())
                } else {
                    Expected::Tokens(known)
                };
                Err(InvalidLocation::new(
                    address,
                    format!("Squad lead not found: `{}`.", id),
                    expected,
                ))
            }
        }
    }

    /// A location for a lead id that is not registered yet.
    pub(crate) fn unregistered(address: &str) -> Result<Self, InvalidLocation> {
        let lead_id = normalize(address)?;
        Ok(Self {
            lead: lead_id.clone(),
            lead_id,
        })
    }
}

fn normalize(address: &str) -> Result<String, InvalidLocation> {
    let id = address.trim().to_lowercase();
    if id.is_empty() || !id.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err(InvalidLocation::new(
            address,
            "Squad lead ids are a single word.",
            Expected::Description("letters, digits, `_` or `-`".to_string()),
        ));
    }
    Ok(id)
}
