use std::fmt;

use industria_proto::SimConfig;

use crate::contract::{ContractBook, ContractId};
use crate::error::ContractError;
use crate::point::Point;
use crate::producer::ProducerTable;
use crate::production::{transport_cost, Production, Products};

/// A movable, removable producer driven by one recipe: buys its inputs,
/// sells its outputs, and earns the markup on transport.
#[derive(Debug, Clone)]
pub struct Factory {
    pub name: String,
    location: Point,
    pub created_tick: u64,
    pub inputs: Products,
    pub outputs: Products,
    pub purchases: Vec<ContractId>,
    pub sales: Vec<ContractId>,
}

impl Factory {
    pub fn new(
        name: impl Into<String>,
        location: Point,
        created_tick: u64,
        inputs: Products,
        outputs: Products,
    ) -> Self {
        Self {
            name: name.into(),
            location,
            created_tick,
            inputs,
            outputs,
            purchases: Vec::new(),
            sales: Vec::new(),
        }
    }

    pub fn location(&self) -> Point {
        self.location
    }

    pub fn set_location(&mut self, location: Point) {
        self.location = location;
    }

    /// Current inbound cost of goods plus the outbound leg, marked up.
    pub fn sales_price_for(
        &self,
        transport_cost: f64,
        book: &ContractBook,
        config: &SimConfig,
    ) -> f64 {
        let mut purchase_costs = 0.0;
        for id in &self.purchases {
            if let Some(purchase) = book.get(*id) {
                if !purchase.cancelled {
                    purchase_costs += purchase.product_cost;
                }
            }
        }
        (purchase_costs + transport_cost) * config.markup
    }

    pub fn has_capacity_for(&self, order: &Production) -> Result<(), ContractError> {
        if order.rate <= 0.0 {
            return Err(ContractError::NonPositiveRate);
        }
        if !self.outputs.contains(&order.name) {
            return Err(ContractError::WrongProduct {
                seller: self.to_string(),
                product: order.name.clone(),
            });
        }
        Ok(())
    }

    pub fn sign_as_seller(&mut self, id: ContractId) {
        self.sales.push(id);
    }

    pub fn sign_as_buyer(&mut self, id: ContractId) {
        self.purchases.push(id);
    }

    /// Transport margin realized since the last call: sale legs earn, purchase
    /// legs cost. Product cost is pass-through and not counted. Compacts both
    /// contract lists.
    pub fn profit(&mut self, book: &ContractBook) -> f64 {
        let mut profit = 0.0;
        self.sales.retain(|id| match book.get(*id) {
            Some(sale) if !sale.cancelled => {
                profit += sale.transport_cost;
                true
            }
            _ => false,
        });
        self.purchases.retain(|id| match book.get(*id) {
            Some(purchase) if !purchase.cancelled => {
                profit -= purchase.transport_cost;
                true
            }
            _ => false,
        });
        profit
    }

    pub fn profitability(&self, book: &ContractBook) -> f64 {
        let mut income = 0.0;
        let mut expenses = 0.0;
        for id in &self.sales {
            if let Some(sale) = book.get(*id) {
                if !sale.cancelled {
                    income += sale.product_cost;
                    expenses += sale.transport_cost;
                }
            }
        }
        for id in &self.purchases {
            if let Some(purchase) = book.get(*id) {
                if !purchase.cancelled {
                    expenses += purchase.product_cost;
                    expenses += purchase.transport_cost;
                }
            }
        }
        income / expenses
    }

    /// Total transport cost of every live contract if the factory stood at
    /// `candidate`: outbound legs to buyers, inbound legs from sellers.
    pub fn transport_costs_at(
        &self,
        candidate: Point,
        producers: &ProducerTable,
        book: &ContractBook,
        config: &SimConfig,
    ) -> f64 {
        let mut costs = 0.0;
        for id in &self.sales {
            let Some(sale) = book.get(*id) else { continue };
            if sale.cancelled {
                continue;
            }
            if let Some(buyer) = producers.get(&sale.buyer) {
                costs += transport_cost(buyer.location(), candidate, config);
            }
        }
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

    /// Gradient descent over the 4-neighborhood. The cheapest neighbor wins,
    /// ties resolving in up/down/left/right order; no move unless it strictly
    /// beats the current location. The winner pulls the factory toward it by
    /// a step proportional to the improvement.
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

        let mut winner = 0;
        let mut winner_costs = f64::INFINITY;
        for (idx, neighbor) in neighbors.iter().enumerate() {
            let costs = self.transport_costs_at(*neighbor, producers, book, config);
            if costs < winner_costs {
                winner = idx;
                winner_costs = costs;
            }
        }
        if winner_costs >= costs_here {
            return None;
        }

        let step = ((config.move_step_scale * (costs_here - winner_costs)).floor() as i64)
            .clamp(config.move_step_min, config.move_step_max);
        Some(match winner {
            0 => self.location.up(step),
            1 => self.location.down(step),
            2 => self.location.left(step),
            _ => self.location.right(step),
        })
    }
}

impl fmt::Display for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]=>[{}]",
            self.name,
            self.inputs.key(),
            self.outputs.key()
        )
    }
}
