use industria_proto::{Coord, FactoryView, ResourceView, SinkView, Snapshot, TransportView};

use super::*;
use crate::point::Point;

impl SimWorld {
    /// Projects the economy into an immutable view for the presentation
    /// plane: three parallel producer lists, the live transport edges, and
    /// the world rectangle. Deposit sales are compacted on the way through,
    /// and an idle deposit is flagged inactive.
    pub fn snapshot(&mut self, running: bool) -> Snapshot {
        let ids = self.producers.keys().copied().collect::<Vec<_>>();

        // Compaction pass: deposits drop cancelled sales before projection.
        for id in &ids {
            if let Some(Producer::Deposit(deposit)) = self.producers.get_mut(id) {
                let book = &self.contracts;
                deposit.sales.retain(|sale| book.is_active(*sale));
            }
        }

        let mut resources = Vec::new();
        let mut factories = Vec::new();
        let mut sinks = Vec::new();
        let mut transports = Vec::new();

        for id in &ids {
            let Some(producer) = self.producers.get(id) else {
                continue;
            };
            let profitability = normalized(producer.profitability(&self.contracts));
            let label = format!(
                "{} ({})",
                producer.display_name(),
                producer.contracts_in().len()
            );

            match producer {
                Producer::Deposit(deposit) => resources.push(ResourceView {
                    location: coord(deposit.location()),
                    recipe: label,
                    product: deposit.production.name.clone(),
                    profitability,
                    active: !deposit.sales.is_empty(),
                }),
                Producer::Factory(factory) => factories.push(FactoryView {
                    location: coord(factory.location()),
                    recipe: label,
                    products: factory.outputs.names(),
                    profitability,
                }),
                Producer::Sink(sink) => sinks.push(SinkView {
                    location: coord(sink.location()),
                    label,
                    products: sink.inputs.names(),
                    profitability,
                }),
            }

            for contract_id in producer.contracts_in() {
                let Some(contract) = self.contracts.get(*contract_id) else {
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
                let rate = if contract.order.rate.is_nan() {
                    0.0
                } else {
                    contract.order.rate
                };
                transports.push(TransportView {
                    origin: coord(seller.location()),
                    destination: coord(buyer.location()),
                    rate,
                });
            }
        }

        Snapshot {
            resources,
            factories,
            sinks,
            transports,
            tick: self.tick,
            running,
            bounds: self.bounds,
        }
    }
}

fn coord(point: Point) -> Coord {
    Coord {
        x: point.x,
        y: point.y,
    }
}

fn normalized(profitability: f64) -> f64 {
    if profitability.is_nan() {
        0.0
    } else {
        profitability
    }
}
