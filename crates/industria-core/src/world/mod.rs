mod init;
mod snapshot;
mod step;

use std::collections::{BTreeMap, BTreeSet};

use industria_proto::{Bounds, ProductView, RecipeView, SimConfig};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::catalog::Recipe;
use crate::contract::{ContractBook, Market};
use crate::error::CatalogError;
use crate::producer::{Producer, ProducerId, ProducerTable};

/// The entire economy, owned by one object and mutated only under its
/// caller's critical section. Same seed, same command sequence: bit-identical
/// snapshots.
#[derive(Debug, Clone)]
pub struct SimWorld {
    config: SimConfig,
    producers: ProducerTable,
    next_producer_id: u64,
    contracts: ContractBook,
    recipes: Vec<Recipe>,
    market: Market,
    sink_floors: BTreeMap<String, usize>,
    tick: u64,
    rng: ChaCha8Rng,
    bounds: Bounds,
}

impl SimWorld {
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn contracts(&self) -> &ContractBook {
        &self.contracts
    }

    pub fn producer_count(&self) -> usize {
        self.producers.len()
    }

    pub fn factory_count(&self) -> usize {
        self.producers
            .values()
            .filter(|p| matches!(p, Producer::Factory(_)))
            .count()
    }

    pub fn recipes(&self) -> Vec<RecipeView> {
        self.recipes
            .iter()
            .map(|recipe| RecipeView {
                name: recipe.display_name.clone(),
                inputs: product_views(recipe.inputs.iter()),
                outputs: product_views(recipe.outputs.iter()),
                active: recipe.active,
            })
            .collect()
    }

    /// Toggles a recipe by display name; returns false when no recipe
    /// matches. Deactivating tears down every factory spawned from it;
    /// reactivating only affects future spawn draws.
    pub fn set_recipe(&mut self, name: &str, active: bool) -> bool {
        let Some(recipe) = self
            .recipes
            .iter_mut()
            .find(|recipe| recipe.display_name == name)
        else {
            return false;
        };
        recipe.active = active;

        if !active {
            let doomed = self
                .producers
                .iter()
                .filter_map(|(id, producer)| match producer {
                    Producer::Factory(factory) if factory.name == name => Some(*id),
                    _ => None,
                })
                .collect::<Vec<_>>();
            debug!(recipe = name, removed = doomed.len(), "recipe deactivated");
            for id in doomed {
                self.remove_factory(id);
            }
            self.sweep_contracts();
        }
        true
    }

    fn alloc_producer(&mut self, producer: Producer) -> ProducerId {
        let id = ProducerId(self.next_producer_id);
        self.next_producer_id += 1;
        self.producers.insert(id, producer);
        id
    }

    /// Tears down a factory: every contract it holds, on either side, is
    /// cancelled before the producer disappears.
    fn remove_factory(&mut self, id: ProducerId) {
        let Some(producer) = self.producers.remove(&id) else {
            return;
        };
        for contract_id in producer.held_contracts() {
            self.contracts.cancel(contract_id);
        }
    }

    /// Reclaims cancelled contracts once both endpoints have compacted past
    /// them.
    fn sweep_contracts(&mut self) {
        let mut referenced = BTreeSet::new();
        for producer in self.producers.values() {
            referenced.extend(producer.held_contracts());
        }
        self.contracts.sweep(&referenced);
    }

    fn keep_floor(&self, products_key: &str) -> usize {
        self.sink_floors
            .get(products_key)
            .copied()
            .unwrap_or(self.config.min_producers_to_keep)
    }
}

fn product_views<'a>(products: impl Iterator<Item = &'a crate::production::Production>) -> Vec<ProductView> {
    products
        .map(|p| ProductView {
            name: p.name.clone(),
            rate: p.rate,
        })
        .collect()
}
