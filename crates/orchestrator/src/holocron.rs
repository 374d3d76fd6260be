//! One mode's resolver, store shape and tips.

use std::path::Path;

use holocron_core::{normalize_activity, Alias, Squad, Tip};
use locations::{LocationDescriptor, LocationResolver, Mode};
use tip_storage::{Persistence, StorageError, StoreShape, TipStore};
use tracing::{info, warn};

use crate::error::{HolocronError, OrchestratorError};

/// Smallest and largest number of tips a read may show.
pub const MIN_READ_DEPTH: usize = 3;
pub const MAX_READ_DEPTH: usize = 10;

/// Sample tips: address, author, content, rating.
const CONQUEST_SAMPLES: &[(&str, &str, &str, i32)] = &[
    ("g1", "Trich", "Ability Block lands reliably with Bo-Katan's leader ability.", 0),
    ("g1", "Trich", "Farm it on node 1 of any sector with auto on.", 2),
    ("s1f1", "Trich", "Clear this on the first pass through the sector.", 0),
    ("s1f1", "Sauron", "Save your best squad for the last two nodes.", 7),
    ("s1f1", "Trich", "The data disk with bonus turn meter makes this trivial.", 2),
    ("s1f1", "Sauron", "Retreat if the first wave goes badly; energy is refunded.", 4),
    ("s1b", "Trich", "The boss cleanses debuffs every third turn.", 3),
    ("s1b1", "Sauron", "Bring a dispeller for the boss's protection up.", 1),
    ("s1m", "Trich", "Kill the healer first.", 0),
    ("s1n1", "Trich", "Easy node, auto is fine.", 0),
    ("s1n13", "Trich", "Tanky enemies; bring daze.", 0),
    ("s1n13", "Sauron", "Use the Jedi squad here.", 7),
    ("s1n13", "Trich", "Avoid this node if you are short on energy.", -3),
];

const RISE_SAMPLES: &[(&str, &str, &str, i32)] = &[
    ("ds1cm1", "Trich", "Lord Vader with full Empire clears this on auto.", 2),
    ("ds1cm1", "Sauron", "Watch out for the Jedi wave buffs.", 0),
    ("ds2sm", "Trich", "Geonosians with a zeta on the lead get 1 star.", 5),
    ("ds1f", "Sauron", "Executor makes short work of this fleet.", 1),
    ("ls1cm2", "Trich", "Jedi Master Kenobi's Galactic Republic lead works well.", 0),
];

/// Sample squads: lead id, lead title.
const COUNTER_SQUADS: &[(&str, &str)] = &[("jmk", "Jedi Master Kenobi"), ("see", "Sith Eternal Emperor")];

/// Sample aliases: alias, lead id.
const COUNTER_ALIASES: &[(&str, &str)] = &[("glk", "jmk")];

/// Sample counters: lead id, title, content, activity, author.
const COUNTER_SAMPLES: &[(&str, &str, &str, Option<&str>, &str)] = &[
    ("jmk", "Lord Vader", "Vader's AoE ignores the protection shield.", Some("GAC"), "Trich"),
    ("jmk", "Sith Eternal Emperor", "Go first and use the lightning ultimate.", Some("TW"), "Sauron"),
    ("jmk", "Bad Batch", "Only with Omega at high relic.", None, "Trich"),
    ("see", "Jedi Master Luke", "Luke's ultimate cleanses the drain.", Some("GAC3"), "Sauron"),
];

const WAR_SAMPLES: &[(&str, &str, &str, i32)] = &[
    ("jmk", "Trich", "Set Lord Vader in the back zone against Kenobi.", 0),
    ("jmk", "Sauron", "Double-check omicrons before attacking.", 1),
];

/// How a read should be presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// How many tips to show.
    pub depth: usize,
    /// Activity filter, counter mode only.
    pub activity: Option<String>,
}

/// A mode's label resolver together with its tips.
#[derive(Debug)]
pub struct Holocron {
    pub(crate) resolver: LocationResolver,
    pub(crate) shape: StoreShape,
    pub(crate) store: TipStore,
}

impl Holocron {
    pub fn new(resolver: LocationResolver, shape: StoreShape, store: TipStore) -> Self {
        Self {
            resolver,
            shape,
            store,
        }
    }

    /// Load the catalog and shape from `data_dir` and the tips from `persistence`.
    ///
    /// A mode with no saved snapshot starts with an empty store built from
    /// its shape, which is saved right away.
    pub async fn load(
        data_dir: &Path,
        mode: Mode,
        persistence: &dyn Persistence,
    ) -> Result<Self, OrchestratorError> {
        let resolver = LocationResolver::load(data_dir, mode)?;
        let shape = StoreShape::load(data_dir, mode)?;

        let store = match persistence.load(mode).await? {
            Some(store) => {
                info!(mode = %mode, tips = store.all_tips().len(), "Loaded tip store");
                store
            }
            None => {
                let store = shape.build();
                persistence.save(mode, &store).await?;
                info!(mode = %mode, "Created empty tip store");
                store
            }
        };

        Ok(Self::new(resolver, shape, store))
    }

    pub fn mode(&self) -> Mode {
        self.resolver.mode()
    }

    pub fn resolver(&self) -> &LocationResolver {
        &self.resolver
    }

    pub fn store(&self) -> &TipStore {
        &self.store
    }

    /// Resolve an address against this mode's catalog and squads.
    pub fn resolve(&self, address: &str) -> Result<LocationDescriptor, HolocronError> {
        Ok(self.resolver.resolve(address, &self.store)?)
    }

    /// Replace every tip with an empty store of the configured shape.
    pub fn clear(&mut self) {
        self.store = self.shape.build();
    }

    /// Interpret read filters: a number is a depth, an activity tag filters counters.
    pub fn read_options(&self, filters: &[String]) -> Result<ReadOptions, HolocronError> {
        let mode = self.mode();
        let mut options = ReadOptions {
            depth: mode.default_read_depth(),
            activity: None,
        };

        for filter in filters {
            if let Ok(depth) = filter.parse::<usize>() {
                options.depth = depth.clamp(MIN_READ_DEPTH, MAX_READ_DEPTH);
            } else if let Some(activity) = normalize_activity(filter).filter(|_| mode.uses_squads()) {
                options.activity = Some(activity);
            } else if mode.is_structured() {
                return Err(HolocronError::InvalidReadFilter {
                    value: filter.clone(),
                    min: MIN_READ_DEPTH,
                    max: MAX_READ_DEPTH,
                });
            }
        }
        Ok(options)
    }

    /// Insert the sample tips for this mode. Returns how many tips were added.
    pub fn populate(&mut self) -> Result<usize, OrchestratorError> {
        match self.mode() {
            Mode::Conquest => self.populate_tips(CONQUEST_SAMPLES),
            Mode::Rise => self.populate_tips(RISE_SAMPLES),
            Mode::War => self.populate_tips(WAR_SAMPLES),
            Mode::Counter => self.populate_squads(),
        }
    }

    fn populate_tips(&mut self, samples: &[(&str, &str, &str, i32)]) -> Result<usize, OrchestratorError> {
        let mut added = 0;
        for (address, author, content, rating) in samples {
            let location = match self.resolve(address) {
                Ok(location) => location,
                Err(e) => {
                    warn!(mode = %self.mode(), address, error = %e, "Skipping sample tip");
                    continue;
                }
            };
            let tip = Tip::new(*content, *author, None).with_rating(*rating);
            self.store.append(&location, tip)?;
            added += 1;
        }
        Ok(added)
    }

    fn populate_squads(&mut self) -> Result<usize, OrchestratorError> {
        let squads = self.store.squads_mut()?;
        for (lead_id, lead) in COUNTER_SQUADS {
            match squads.add_squad(Squad::new(lead_id, lead, "Holocron", None)) {
                Ok(()) | Err(StorageError::AlreadyExists { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }
        for (alias, lead_id) in COUNTER_ALIASES {
            match squads.add_alias(Alias::new(alias, lead_id, "Holocron")) {
                Ok(()) | Err(StorageError::AlreadyExists { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }

        let mut added = 0;
        for (lead_id, title, content, activity, author) in COUNTER_SAMPLES {
            let location = self.resolve(lead_id)?;
            let tip = Tip::counter(*title, *content, *activity, *author, None);
            self.store.append(&location, tip)?;
            added += 1;
        }
        Ok(added)
    }
}

/// Split a `tag=ACT` marker out of counter content.
pub(crate) fn extract_activity(content: &str) -> (String, Option<String>) {
    let mut activity = None;
    let words: Vec<&str> = content
        .split_whitespace()
        .filter(|word| {
            let tag = word
                .strip_prefix("tag=")
                .or_else(|| word.strip_prefix("TAG="));
            match tag.and_then(normalize_activity) {
                Some(found) => {
                    activity = Some(found);
                    false
                }
                None => true,
            }
        })
        .collect();
    (words.join(" "), activity)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tip_storage::MemoryPersistence;

    use super::*;

    fn data_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data")
    }

    async fn load(mode: Mode) -> Holocron {
        let persistence = MemoryPersistence::new();
        Holocron::load(&data_dir(), mode, &persistence).await.unwrap()
    }

    #[tokio::test]
    async fn test_load_creates_and_saves_empty_store() {
        let persistence = MemoryPersistence::new();
        let holocron = Holocron::load(&data_dir(), Mode::Conquest, &persistence)
            .await
            .unwrap();
        assert!(holocron.store().all_tips().is_empty());
        assert_eq!(persistence.save_count(), 1);
        assert!(persistence.load(Mode::Conquest).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_populate_every_mode() {
        for mode in Mode::ALL {
            let mut holocron = load(mode).await;
            let added = holocron.populate().unwrap();
            assert!(added > 0, "{} added no samples", mode);
            assert_eq!(holocron.store().all_tips().len(), added);
        }
    }

    #[tokio::test]
    async fn test_populate_counter_registers_alias() {
        let mut holocron = load(Mode::Counter).await;
        holocron.populate().unwrap();
        let location = holocron.resolve("GLK").unwrap();
        assert_eq!(location.canonical(), "jmk");
        assert_eq!(holocron.store().tips(&location).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_clear_rebuilds_shape() {
        let mut holocron = load(Mode::Rise).await;
        holocron.populate().unwrap();
        holocron.clear();
        assert!(holocron.store().all_tips().is_empty());
        assert!(holocron.resolve("ds1cm1").is_ok());
    }

    #[tokio::test]
    async fn test_read_options() {
        let holocron = load(Mode::Conquest).await;
        assert_eq!(holocron.read_options(&[]).unwrap().depth, 3);
        assert_eq!(holocron.read_options(&["20".to_string()]).unwrap().depth, 10);
        assert_eq!(holocron.read_options(&["1".to_string()]).unwrap().depth, 3);
        assert!(matches!(
            holocron.read_options(&["gac".to_string()]),
            Err(HolocronError::InvalidReadFilter { .. })
        ));

        let counter = load(Mode::Counter).await;
        let options = counter
            .read_options(&["gac".to_string(), "6".to_string()])
            .unwrap();
        assert_eq!(options.activity.as_deref(), Some("GAC"));
        assert_eq!(options.depth, 6);

        let war = load(Mode::War).await;
        assert_eq!(war.read_options(&[]).unwrap().depth, 5);
    }

    #[test]
    fn test_extract_activity() {
        assert_eq!(
            extract_activity("Go first tag=gac and win"),
            ("Go first and win".to_string(), Some("GAC".to_string()))
        );
        assert_eq!(extract_activity("no tag here"), ("no tag here".to_string(), None));
    }
}
