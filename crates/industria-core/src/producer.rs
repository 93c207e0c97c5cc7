use std::collections::BTreeMap;
use std::fmt;

use industria_proto::SimConfig;

use crate::contract::{ContractBook, ContractId};
use crate::deposit::ResourceDeposit;
use crate::error::ContractError;
use crate::factory::Factory;
use crate::point::Point;
use crate::production::{Production, Products};
use crate::sink::Sink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProducerId(pub u64);

impl fmt::Display for ProducerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type ProducerTable = BTreeMap<ProducerId, Producer>;

/// The three inhabitants of the economy. The kernel dispatches on the
/// concrete kind only in the cull and the snapshot; everything else goes
/// through this capability set.
#[derive(Debug, Clone)]
pub enum Producer {
    Deposit(ResourceDeposit),
    Factory(Factory),
    Sink(Sink),
}

impl Producer {
    pub fn location(&self) -> Point {
        match self {
            Producer::Deposit(d) => d.location(),
            Producer::Factory(f) => f.location(),
            Producer::Sink(s) => s.location(),
        }
    }

    pub fn set_location(&mut self, location: Point) {
        match self {
            Producer::Deposit(_) => {}
            Producer::Factory(f) => f.set_location(location),
            Producer::Sink(s) => s.set_location(location),
        }
    }

    /// The product vector this producer can supply; for a sink this is its
    /// demand vector (it still identifies the cull group).
    pub fn products(&self) -> Products {
        match self {
            Producer::Deposit(d) => d.products(),
            Producer::Factory(f) => f.outputs.clone(),
            Producer::Sink(s) => s.inputs.clone(),
        }
    }

    pub fn products_key(&self) -> String {
        self.products().key()
    }

    pub fn display_name(&self) -> &str {
        match self {
            Producer::Deposit(d) => &d.production.name,
            Producer::Factory(f) => &f.name,
            Producer::Sink(s) => &s.name,
        }
    }

    pub fn has_capacity_for(
        &self,
        order: &Production,
        book: &ContractBook,
    ) -> Result<(), ContractError> {
        match self {
            Producer::Deposit(d) => d.has_capacity_for(order, book),
            Producer::Factory(f) => f.has_capacity_for(order),
            Producer::Sink(s) => Err(s.capacity_refusal()),
        }
    }

    pub fn sales_price_for(
        &self,
        _order: &Production,
        transport_cost: f64,
        book: &ContractBook,
        config: &SimConfig,
    ) -> f64 {
        match self {
            Producer::Deposit(d) => d.sales_price_for(transport_cost, config),
            Producer::Factory(f) => f.sales_price_for(transport_cost, book, config),
            Producer::Sink(s) => s.sales_price(),
        }
    }

    pub fn sign_as_seller(&mut self, id: ContractId) -> Result<(), ContractError> {
        match self {
            Producer::Deposit(d) => {
                d.sign_as_seller(id);
                Ok(())
            }
            Producer::Factory(f) => {
                f.sign_as_seller(id);
                Ok(())
            }
            Producer::Sink(s) => Err(ContractError::CannotSell {
                name: s.to_string(),
            }),
        }
    }

    pub fn sign_as_buyer(&mut self, id: ContractId) -> Result<(), ContractError> {
        match self {
            Producer::Deposit(d) => Err(ContractError::CannotBuy {
                name: d.to_string(),
            }),
            Producer::Factory(f) => {
                f.sign_as_buyer(id);
                Ok(())
            }
            Producer::Sink(s) => {
                s.sign_as_buyer(id);
                Ok(())
            }
        }
    }

    /// Contracts delivering products into this producer.
    pub fn contracts_in(&self) -> &[ContractId] {
        match self {
            Producer::Deposit(_) => &[],
            Producer::Factory(f) => &f.purchases,
            Producer::Sink(s) => &s.purchases,
        }
    }

    /// Every contract id this producer holds, on either side.
    pub fn held_contracts(&self) -> Vec<ContractId> {
        match self {
            Producer::Deposit(d) => d.sales.clone(),
            Producer::Factory(f) => {
                let mut held = f.purchases.clone();
                held.extend_from_slice(&f.sales);
                held
            }
            Producer::Sink(s) => s.purchases.clone(),
        }
    }

    pub fn profit(&mut self, book: &ContractBook) -> f64 {
        match self {
            Producer::Deposit(d) => d.profit(book),
            Producer::Factory(f) => f.profit(book),
            Producer::Sink(s) => s.profit(book),
        }
    }

    pub fn profitability(&self, book: &ContractBook) -> f64 {
        match self {
            Producer::Deposit(d) => d.profitability(book),
            Producer::Factory(f) => f.profitability(book),
            Producer::Sink(s) => s.profitability(book),
        }
    }

    pub fn is_movable(&self) -> bool {
        !matches!(self, Producer::Deposit(_))
    }

    pub fn is_removable(&self) -> bool {
        matches!(self, Producer::Factory(_))
    }

    pub fn plan_move(
        &self,
        producers: &ProducerTable,
        book: &ContractBook,
        config: &SimConfig,
    ) -> Option<Point> {
        match self {
            Producer::Deposit(_) => None,
            Producer::Factory(f) => f.plan_move(producers, book, config),
            Producer::Sink(s) => s.plan_move(producers, book, config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deposit::Purity;

    #[test]
    fn role_refusals_match_the_variant() {
        let book = ContractBook::default();
        let mut deposit = Producer::Deposit(ResourceDeposit::new(
            Production::new("OreIron", 60.0, 60.0),
            Purity::Normal,
            Point::new(0, 0),
        ));
        let mut sink = Producer::Sink(Sink::new(
            "SpaceElevator",
            Point::new(0, 0),
            Products::new(vec![Production::new("SpaceElevatorPart_1", 1.0, 30.0)]),
        ));

        assert!(deposit.sign_as_buyer(ContractId(0)).is_err());
        assert!(deposit.sign_as_seller(ContractId(0)).is_ok());
        assert!(sink.sign_as_seller(ContractId(1)).is_err());
        assert!(sink.sign_as_buyer(ContractId(1)).is_ok());
        assert!(sink
            .has_capacity_for(&Production::new("SpaceElevatorPart_1", 1.0, 30.0), &book)
            .is_err());

        assert!(!deposit.is_movable());
        assert!(!deposit.is_removable());
        assert!(sink.is_movable());
        assert!(!sink.is_removable());
    }
}
