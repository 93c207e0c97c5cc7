use std::cmp::Ordering;

use rand::Rng;
use tracing::{debug, error};

use super::*;
use crate::contract::{Contract, ContractId};
use crate::error::{ContractError, MoveError};
use crate::factory::Factory;
use crate::point::Point;
use crate::production::{transport_cost, Production};

impl SimWorld {
    /// Advances the economy by one tick. The caller holds the critical
    /// section for the whole call; nothing in here suspends. Each tick runs
    /// exactly one annealing phase, rotating spawn -> move -> cull every
    /// `phase_length_ticks`.
    pub fn tick(&mut self) {
        self.tick += 1;
        let phase_length = self.config.phase_length_ticks.max(1);
        match (self.tick / phase_length) % 3 {
            0 => self.spawn_phase(),
            1 => self.move_phase(),
            _ => self.cull_phase(),
        }
    }

    /// Phase 0: draw a random location and a random active recipe; if every
    /// input can be sourced, a new factory joins the economy with one
    /// contract per input, and sinks hungry for its outputs attach directly.
    fn spawn_phase(&mut self) {
        let location = Point::new(
            self.rng.gen_range(self.bounds.xmin..self.bounds.xmax),
            self.rng.gen_range(self.bounds.ymin..self.bounds.ymax),
        );

        let active = self
            .recipes
            .iter()
            .enumerate()
            .filter(|(_, recipe)| recipe.active)
            .map(|(idx, _)| idx)
            .collect::<Vec<_>>();
        if active.is_empty() {
            return;
        }
        let recipe = &self.recipes[active[self.rng.gen_range(0..active.len())]];

        let sources =
            match recipe.source_products(&self.producers, location, &self.contracts, &self.config)
            {
                Ok(sources) => sources,
                Err(err) => {
                    debug!(tick = self.tick, error = %err, "failed to source all recipe ingredients");
                    return;
                }
            };

        let name = recipe.display_name.clone();
        let factory = Factory::new(
            name.clone(),
            location,
            self.tick,
            recipe.inputs.clone(),
            recipe.outputs.clone(),
        );
        let factory_id = self.alloc_producer(Producer::Factory(factory));

        for source in sources {
            if let Err(err) =
                self.write_contract(source.seller, factory_id, source.order, source.transport_cost)
            {
                debug!(tick = self.tick, factory = %name, error = %err, "failed to sign supply contract");
            }
        }
        self.attach_sinks(factory_id);
        debug!(tick = self.tick, factory = %name, "spawned producer");
    }

    /// Sinks can never be sourced from; they pull goods by signing directly
    /// with any newly spawned factory that produces what they want.
    pub(super) fn attach_sinks(&mut self, factory_id: ProducerId) {
        let Some(factory) = self.producers.get(&factory_id) else {
            return;
        };
        let factory_location = factory.location();
        let outputs = factory.products();

        let mut wanted = Vec::new();
        for (id, producer) in &self.producers {
            let Producer::Sink(sink) = producer else {
                continue;
            };
            for order in &sink.inputs {
                if outputs.contains(&order.name) {
                    let cost =
                        transport_cost(factory_location, sink.location(), &self.config);
                    wanted.push((*id, order.clone(), cost));
                }
            }
        }
        for (sink_id, order, cost) in wanted {
            if let Err(err) = self.write_contract(factory_id, sink_id, order, cost) {
                debug!(tick = self.tick, sink = %sink_id, error = %err, "failed to supply sink");
            }
        }
    }

    /// Phase 1: every movable producer descends its local transport-cost
    /// gradient. A failed move is logged and skipped; the phase never stops.
    fn move_phase(&mut self) {
        let ids = self.producers.keys().copied().collect::<Vec<_>>();
        for id in ids {
            let plan = match self.producers.get(&id) {
                Some(producer) if producer.is_movable() => {
                    producer.plan_move(&self.producers, &self.contracts, &self.config)
                }
                _ => None,
            };
            if let Some(target) = plan {
                if let Err(err) = self.apply_move(id, target) {
                    error!(tick = self.tick, producer = %id, "failed to move producer: {err}");
                }
            }
        }
    }

    /// Relocates a producer and reprices the transport leg of every live
    /// contract it holds. The target is clamped to the world bounds.
    fn apply_move(&mut self, id: ProducerId, target: Point) -> Result<(), MoveError> {
        let clamped = Point::new(
            target.x.clamp(self.bounds.xmin, self.bounds.xmax),
            target.y.clamp(self.bounds.ymin, self.bounds.ymax),
        );
        let held = {
            let producer = self
                .producers
                .get_mut(&id)
                .ok_or(MoveError::MissingProducer(id))?;
            producer.set_location(clamped);
            producer.held_contracts()
        };

        for contract_id in held {
            let Some(contract) = self.contracts.get(contract_id) else {
                continue;
            };
            if contract.cancelled {
                continue;
            }
            let (Some(seller), Some(buyer)) = (
                self.producers.get(&contract.seller),
                self.producers.get(&contract.buyer),
            ) else {
                continue;
            };
            let cost = transport_cost(seller.location(), buyer.location(), &self.config);
            self.contracts.set_transport_cost(contract_id, cost);
        }
        Ok(())
    }

    /// Phase 2: realize profit for everyone, group producers by product key,
    /// rank each group by profit, and apply the keep table to its factories.
    fn cull_phase(&mut self) {
        let ids = self.producers.keys().copied().collect::<Vec<_>>();
        let mut groups: BTreeMap<String, Vec<(ProducerId, f64)>> = BTreeMap::new();
        for id in ids {
            let Some(producer) = self.producers.get_mut(&id) else {
                continue;
            };
            let profit = producer.profit(&self.contracts);
            groups
                .entry(producer.products_key())
                .or_default()
                .push((id, profit));
        }

        for (products_key, mut group) in groups {
            group.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(Ordering::Equal)
                    .then(a.0.cmp(&b.0))
            });
            let floor = self.keep_floor(&products_key);
            for (rank, (id, profit)) in group.iter().enumerate() {
                let cull = match self.producers.get(id) {
                    Some(Producer::Factory(factory)) => should_cull(
                        factory,
                        rank,
                        floor,
                        *profit,
                        self.tick,
                        self.config.factory_lifetime_ticks,
                        &self.contracts,
                    ),
                    // Deposits and sinks cannot be removed.
                    _ => false,
                };
                if cull {
                    debug!(tick = self.tick, producer = %id, profit, "culled factory");
                    self.remove_factory(*id);
                }
            }
        }

        self.sweep_contracts();
    }

    /// Signs a bilateral supply contract. The market floor caps the product
    /// cost: a strictly cheaper offer lowers the floor for everyone after it,
    /// anything else trades at the floor.
    pub(super) fn write_contract(
        &mut self,
        seller: ProducerId,
        buyer: ProducerId,
        order: Production,
        transport_cost: f64,
    ) -> Result<ContractId, ContractError> {
        let seller_ref = self
            .producers
            .get(&seller)
            .ok_or(ContractError::UnknownParty(seller))?;
        self.producers
            .get(&buyer)
            .ok_or(ContractError::UnknownParty(buyer))?;

        seller_ref
            .has_capacity_for(&order, &self.contracts)
            .map_err(|err| ContractError::NoCapacity(Box::new(err)))?;
        let sales_price =
            seller_ref.sales_price_for(&order, transport_cost, &self.contracts, &self.config);
        let product_cost = self.market.quote(&order.name, sales_price);

        let contract_id = self.contracts.write(Contract {
            seller,
            buyer,
            order: order.clone(),
            product_cost,
            transport_cost,
            cancelled: false,
        });

        if let Some(producer) = self.producers.get_mut(&seller) {
            if let Err(err) = producer.sign_as_seller(contract_id) {
                self.contracts.cancel(contract_id);
                return Err(ContractError::SellerRejected(Box::new(err)));
            }
        }
        if let Some(producer) = self.producers.get_mut(&buyer) {
            if let Err(err) = producer.sign_as_buyer(contract_id) {
                self.contracts.cancel(contract_id);
                return Err(ContractError::BuyerRejected(Box::new(err)));
            }
        }

        debug!(
            order = %order,
            transport_cost,
            product_cost,
            "signed contract"
        );
        Ok(contract_id)
    }
}

/// The keep table, applied to one factory at its rank within the product
/// group. Mandatory removals come first; the grace window, the group floor,
/// and live sales protect the rest; persistent losers go last.
fn should_cull(
    factory: &Factory,
    rank: usize,
    floor: usize,
    profit: f64,
    current_tick: u64,
    lifetime: u64,
    book: &ContractBook,
) -> bool {
    if factory
        .purchases
        .iter()
        .any(|id| book.is_cancelled(*id))
    {
        return true;
    }
    if factory.purchases.len() != factory.inputs.len() {
        return true;
    }
    if factory.purchases.is_empty() {
        return true;
    }
    if factory.created_tick + lifetime >= current_tick {
        return false;
    }
    if rank < floor {
        return false;
    }
    if factory.sales.iter().any(|id| book.is_active(*id)) {
        return false;
    }
    profit <= 0.0
}
