use std::fmt;

use industria_proto::SimConfig;

use crate::contract::{ContractBook, ContractId};
use crate::error::ContractError;
use crate::point::Point;
use crate::producer::ProducerTable;
use crate::production::{transport_cost, Products};

/// A pure consumer anchoring demand for terminal products. Sinks never sell
/// and can never be sourced from; goods reach them through contracts written
/// directly at factory-spawn time.
#[derive(Debug, Clone)]
pub struct Sink {
    pub name: String,
    location: Point,
    pub inputs: Products,
    pub purchases: Vec<ContractId>,
}

impl Sink {
    pub fn new(name: impl Into<String>, location: Point, inputs: Products) -> Self {
        Self {
            name: name.into(),
            location,
            inputs,
            purchases: Vec::new(),
        }
    }

    pub fn location(&self) -> Point {
        self.location
    }

    pub fn set_location(&mut self, location: Point) {
        self.location = location;
    }

    pub fn capacity_refusal(&self) -> ContractError {
        ContractError::CannotProduce {
            name: self.to_string(),
        }
    }

    /// Sinks never sell; their asking price is unbeatable.
    pub fn sales_price(&self) -> f64 {
        f64::INFINITY
    }

    pub fn sign_as_buyer(&mut self, id: ContractId) {
        self.purchases.push(id);
    }

    /// Sinks only spend. Compacts the purchase list.
    pub fn profit(&mut self, book: &ContractBook) -> f64 {
        let mut profit = 0.0;
        self.purchases.retain(|id| match book.get(*id) {
            Some(purchase) if !purchase.cancelled => {
                profit -= purchase.transport_cost;
                true
            }
            _ => false,
        });
        profit
    }

    /// Unbounded when nothing has been bought yet: an unfed sink is pure
    /// unmet demand.
    pub fn profitability(&self, book: &ContractBook) -> f64 {
        let mut expenses = 0.0;
        for id in &self.purchases {
            if let Some(purchase) = book.get(*id) {
                if !purchase.cancelled {
                    expenses += purchase.product_cost;
                    expenses += purchase.transport_cost;
                }
            }
        }
        if expenses == 0.0 {
            return f64::INFINITY;
        }
        1.0 / expenses
    }

    fn transport_costs_at(
        &self,
        candidate: Point,
        producers: &ProducerTable,
        book: &ContractBook,
        config: &SimConfig,
    ) -> f64 {
        let mut costs = 0.0;
        for id in &self.purchases {
            let Some(purchase) = book.get(*id) else { continue };
            if purchase.cancelled {
                continue;
            }
            if let Some(seller) = producers.get(&purchase.seller) {
                costs += transport_cost(candidate, seller.location(), config);
            }
        }
        costs
    }

    /// Same 4-neighborhood descent as a factory, but crawling one cell at a
    /// time and pulled only by its purchases.
    pub fn plan_move(
        &self,
        producers: &ProducerTable,
        book: &ContractBook,
        config: &SimConfig,
    ) -> Option<Point> {
        let costs_here = self.transport_costs_at(self.location, producers, book, config);
        let neighbors = [
            self.location.up(1),
            self.location.down(1),
            self.location.left(1),
            self.location.right(1),
        ];

        let mut winner = None;
        let mut winner_costs = f64::INFINITY;
        for neighbor in neighbors {
            let costs = self.transport_costs_at(neighbor, producers, book, config);
            if costs < winner_costs {
                winner = Some(neighbor);
                winner_costs = costs;
            }
        }
        if winner_costs >= costs_here {
            return None;
        }
        winner
    }
}

impl fmt::Display for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.inputs.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::Contract;
    use crate::deposit::{Purity, ResourceDeposit};
    use crate::producer::{Producer, ProducerId};
    use crate::production::Production;

    fn sink(location: Point) -> Sink {
        Sink::new(
            "SpaceElevator",
            location,
            Products::new(vec![Production::new("SpaceElevatorPart_1", 1.0, 30.0)]),
        )
    }

    #[test]
    fn unfed_sink_has_unbounded_profitability() {
        let book = ContractBook::default();
        let s = sink(Point::new(0, 0));
        assert_eq!(s.profitability(&book), f64::INFINITY);
        assert_eq!(s.sales_price(), f64::INFINITY);
    }

    #[test]
    fn profit_is_negated_transport_and_compacts() {
        let mut book = ContractBook::default();
        let mut s = sink(Point::new(0, 0));

        let live = book.write(Contract {
            seller: ProducerId(0),
            buyer: ProducerId(1),
            order: Production::new("SpaceElevatorPart_1", 1.0, 30.0),
            product_cost: 8.0,
            transport_cost: 1.5,
            cancelled: false,
        });
        let dead = book.write(Contract {
            seller: ProducerId(0),
            buyer: ProducerId(1),
            order: Production::new("SpaceElevatorPart_1", 1.0, 30.0),
            product_cost: 8.0,
            transport_cost: 4.0,
            cancelled: false,
        });
        s.sign_as_buyer(live);
        s.sign_as_buyer(dead);
        book.cancel(dead);

        assert_eq!(s.profit(&book), -1.5);
        assert_eq!(s.purchases.len(), 1);
        assert_eq!(s.profitability(&book), 1.0 / 9.5);
    }

    #[test]
    fn crawls_one_cell_toward_its_supplier() {
        let config = SimConfig::default();
        let mut book = ContractBook::default();
        let mut producers = ProducerTable::new();

        let seller_id = ProducerId(0);
        producers.insert(
            seller_id,
            Producer::Deposit(ResourceDeposit::new(
                Production::new("SpaceElevatorPart_1", 60.0, 60.0),
                Purity::Normal,
                Point::new(0, 500),
            )),
        );

        let mut s = sink(Point::new(0, 0));
        let purchase = book.write(Contract {
            seller: seller_id,
            buyer: ProducerId(1),
            order: Production::new("SpaceElevatorPart_1", 1.0, 30.0),
            product_cost: 8.0,
            transport_cost: 1.05,
            cancelled: false,
        });
        s.sign_as_buyer(purchase);

        let target = s.plan_move(&producers, &book, &config).expect("supplier pulls the sink");
        assert_eq!(target, Point::new(0, 1));
    }
}
