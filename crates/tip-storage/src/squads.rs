//! Counter squad store.

use std::collections::BTreeMap;
use std::str::FromStr;

use holocron_core::{Alias, Squad, Tip};
use locations::SquadDirectory;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StorageError};

/// What happens to a squad's tips when the squad is removed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanPolicy {
    /// Drop the tips with the squad.
    #[default]
    Delete,
    /// Keep the tips in the orphan list.
    Retain,
    /// Move the tips to another squad.
    Reassign(String),
}

impl FromStr for OrphanPolicy {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "delete" => Ok(Self::Delete),
            "retain" => Ok(Self::Retain),
            other => Err(format!("unknown orphan policy: {}", other)),
        }
    }
}

/// Squads, their aliases, and tips left behind by removed squads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquadStore {
    #[serde(default)]
    pub squads: BTreeMap<String, Squad>,
    #[serde(default)]
    pub aliases: BTreeMap<String, Alias>,
    #[serde(default)]
    pub orphans: Vec<Tip>,
}

impl SquadStore {
    /// Find a squad by lead id or alias.
    pub fn resolve(&self, id: &str) -> Option<&Squad> {
        let id = id.trim().to_lowercase();
        self.squads.get(&id).or_else(|| {
            self.aliases
                .get(&id)
                .and_then(|alias| self.squads.get(&alias.squad_lead_id))
        })
    }

    /// Check whether a lead id or alias is taken.
    pub fn is_registered(&self, id: &str) -> bool {
        let id = id.trim().to_lowercase();
        self.squads.contains_key(&id) || self.aliases.contains_key(&id)
    }

    /// Register a new squad.
    pub fn add_squad(&mut self, squad: Squad) -> Result<()> {
        if self.is_registered(&squad.lead_id) {
            return Err(StorageError::AlreadyExists {
                entity: "squad",
                id: squad.lead_id,
            });
        }
        self.squads.insert(squad.lead_id.clone(), squad);
        Ok(())
    }

    /// Replace a squad's details, keeping its tips.
    pub fn replace_squad(&mut self, mut squad: Squad) -> Result<()> {
        let existing = self
            .squads
            .get_mut(&squad.lead_id)
            .ok_or_else(|| StorageError::SquadNotFound(squad.lead_id.clone()))?;
        squad.tips = std::mem::take(&mut existing.tips);
        squad.created_at = existing.created_at;
        squad.edited = true;
        *existing = squad;
        Ok(())
    }

    /// Remove a squad and its aliases, handling its tips per `policy`.
    pub fn remove_squad(&mut self, lead_id: &str, policy: &OrphanPolicy) -> Result<Squad> {
        if let OrphanPolicy::Reassign(target) = policy {
            if target == lead_id || !self.squads.contains_key(target) {
                return Err(StorageError::SquadNotFound(target.clone()));
            }
        }

        let mut squad = self
            .squads
            .remove(lead_id)
            .ok_or_else(|| StorageError::SquadNotFound(lead_id.to_string()))?;
        self.aliases.retain(|_, alias| alias.squad_lead_id != lead_id);

        let tips = std::mem::take(&mut squad.tips);
        match policy {
            OrphanPolicy::Delete => {}
            OrphanPolicy::Retain => self.orphans.extend(tips),
            OrphanPolicy::Reassign(target) => {
                if let Some(target) = self.squads.get_mut(target) {
                    target.tips.extend(tips);
                }
            }
        }
        Ok(squad)
    }

    /// Register an alias for an existing squad.
    pub fn add_alias(&mut self, alias: Alias) -> Result<()> {
        if self.is_registered(&alias.alias) {
            return Err(StorageError::AlreadyExists {
                entity: "alias",
                id: alias.alias,
            });
        }
        if !self.squads.contains_key(&alias.squad_lead_id) {
            return Err(StorageError::SquadNotFound(alias.squad_lead_id));
        }
        self.aliases.insert(alias.alias.clone(), alias);
        Ok(())
    }

    pub fn tips(&self, lead_id: &str) -> Result<&[Tip]> {
        self.squads
            .get(lead_id)
            .map(|s| s.tips.as_slice())
            .ok_or_else(|| StorageError::SquadNotFound(lead_id.to_string()))
    }

    pub fn tips_mut(&mut self, lead_id: &str) -> Result<&mut Vec<Tip>> {
        self.squads
            .get_mut(lead_id)
            .map(|s| &mut s.tips)
            .ok_or_else(|| StorageError::SquadNotFound(lead_id.to_string()))
    }

    /// Squads ordered by display title.
    pub fn sorted_squads(&self) -> Vec<&Squad> {
        let mut squads: Vec<&Squad> = self.squads.values().collect();
        squads.sort_by(|a, b| a.lead.cmp(&b.lead));
        squads
    }

    pub fn tip_count(&self) -> usize {
        self.squads.values().map(|s| s.tips.len()).sum()
    }
}

impl SquadDirectory for SquadStore {
    fn resolve_lead(&self, id: &str) -> Option<(String, String)> {
        self.resolve(id)
            .map(|squad| (squad.lead_id.clone(), squad.lead.clone()))
    }

    fn known_leads(&self) -> Vec<String> {
        self.squads.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SquadStore {
        let mut store = SquadStore::default();
        let mut jmk = Squad::new("jmk", "Jedi Master Kenobi", "trich", None);
        jmk.tips.push(Tip::counter("mirror", "Han shoots first", None, "uaq", None));
        store.add_squad(jmk).unwrap();
        store
            .add_squad(Squad::new("see", "Sith Eternal Emperor", "trich", None))
            .unwrap();
        store.add_alias(Alias::new("glk", "jmk", "uaq")).unwrap();
        store
    }

    #[test]
    fn test_resolve_through_alias() {
        let store = store();
        assert_eq!(store.resolve("GLK").map(|s| s.lead_id.as_str()), Some("jmk"));
        assert_eq!(
            store.resolve_lead("jmk"),
            Some(("jmk".to_string(), "Jedi Master Kenobi".to_string()))
        );
        assert!(store.resolve("gas").is_none());
    }

    #[test]
    fn test_duplicate_squad_or_alias_rejected() {
        let mut store = store();
        let err = store
            .add_squad(Squad::new("glk", "Galactic Legend Kenobi", "uaq", None))
            .unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists { entity: "squad", .. }));
        assert!(store.add_alias(Alias::new("x", "nobody", "uaq")).is_err());
    }

    #[test]
    fn test_replace_keeps_tips() {
        let mut store = store();
        store
            .replace_squad(Squad::new("jmk", "General Kenobi", "uaq", None))
            .unwrap();
        let squad = store.resolve("jmk").unwrap();
        assert_eq!(squad.lead, "General Kenobi");
        assert_eq!(squad.tips.len(), 1);
        assert!(squad.edited);
    }

    #[test]
    fn test_remove_with_orphan_policies() {
        let mut deleted = store();
        deleted.remove_squad("jmk", &OrphanPolicy::Delete).unwrap();
        assert!(deleted.orphans.is_empty());
        assert!(deleted.aliases.is_empty());

        let mut retained = store();
        retained.remove_squad("jmk", &OrphanPolicy::Retain).unwrap();
        assert_eq!(retained.orphans.len(), 1);

        let mut reassigned = store();
        reassigned
            .remove_squad("jmk", &OrphanPolicy::Reassign("see".to_string()))
            .unwrap();
        assert_eq!(reassigned.tips("see").unwrap().len(), 1);
        assert_eq!(reassigned.tip_count(), 1);
    }

    #[test]
    fn test_reassign_to_missing_squad_keeps_everything() {
        let mut store = store();
        let err = store
            .remove_squad("jmk", &OrphanPolicy::Reassign("gas".to_string()))
            .unwrap_err();
        assert!(matches!(err, StorageError::SquadNotFound(_)));
        assert!(store.resolve("jmk").is_some());
    }
}
