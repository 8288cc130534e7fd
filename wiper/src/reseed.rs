//! Map selection for the next wipe
//!
//! A server either rotates through fixed custom maps, rotates through fixed
//! procedural seeds, or gets a fresh random seed. The random source is a trait
//! object so tests can pin the choice.

use rand::Rng;

use crate::config::ServerWipeConfig;
use crate::constants::seeds::{MAX_GENERATED, MIN_GENERATED};

pub trait MapSelector: Send + Sync {
    /// Index into a non-empty list of `len` choices
    fn pick(&self, len: usize) -> usize;

    /// Seed in `[MIN_GENERATED, MAX_GENERATED]`
    fn generate_seed(&self) -> u64;
}

pub struct RandomSelector;

impl MapSelector for RandomSelector {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }

    fn generate_seed(&self) -> u64 {
        rand::thread_rng().gen_range(MIN_GENERATED..=MAX_GENERATED)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapChoice {
    /// Custom map download URL
    MapUrl(String),
    /// Seed picked from the configured list
    ListedSeed(u64),
    /// Seed generated for this wipe
    GeneratedSeed(u64),
}

pub fn choose_map(config: &ServerWipeConfig, selector: &dyn MapSelector) -> MapChoice {
    if let Some(maps) = config.maps.as_deref().filter(|maps| !maps.is_empty()) {
        let index = selector.pick(maps.len()).min(maps.len() - 1);
        return MapChoice::MapUrl(maps[index].clone());
    }

    if let Some(seeds) = config.seeds.as_deref().filter(|seeds| !seeds.is_empty()) {
        let index = selector.pick(seeds.len()).min(seeds.len() - 1);
        return MapChoice::ListedSeed(seeds[index]);
    }

    MapChoice::GeneratedSeed(selector.generate_seed().clamp(MIN_GENERATED, MAX_GENERATED))
}
