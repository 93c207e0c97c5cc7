use std::fmt;

use industria_proto::SimConfig;

use crate::contract::{ContractBook, ContractId};
use crate::error::ContractError;
use crate::point::Point;
use crate::production::{Production, Products};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purity {
    Impure,
    Normal,
    Pure,
}

impl Purity {
    /// Base extraction amount in units per minute.
    pub fn base_amount(self) -> f64 {
        match self {
            Purity::Impure => 30.0,
            Purity::Normal => 60.0,
            Purity::Pure => 120.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Purity::Impure => "Impure",
            Purity::Normal => "Normal",
            Purity::Pure => "Pure",
        }
    }
}

/// An immovable raw-resource extractor. Sells its one product up to a
/// bounded rate; never buys.
#[derive(Debug, Clone)]
pub struct ResourceDeposit {
    pub production: Production,
    pub purity: Purity,
    location: Point,
    pub sales: Vec<ContractId>,
}

impl ResourceDeposit {
    pub fn new(production: Production, purity: Purity, location: Point) -> Self {
        Self {
            production,
            purity,
            location,
            sales: Vec::new(),
        }
    }

    pub fn location(&self) -> Point {
        self.location
    }

    pub fn products(&self) -> Products {
        Products::new(vec![self.production.clone()])
    }

    /// The order must name this deposit's product, carry a positive rate,
    /// and fit inside the rate not yet promised to other live sales.
    pub fn has_capacity_for(
        &self,
        order: &Production,
        book: &ContractBook,
    ) -> Result<(), ContractError> {
        if order.rate <= 0.0 {
            return Err(ContractError::NonPositiveRate);
        }
        if order.name != self.production.name {
            return Err(ContractError::WrongProduct {
                seller: self.to_string(),
                product: order.name.clone(),
            });
        }

        let mut remaining = self.production.rate;
        for id in &self.sales {
            if let Some(sale) = book.get(*id) {
                if !sale.cancelled && sale.order.name == self.production.name {
                    remaining -= sale.order.rate;
                }
            }
        }
        if remaining < order.rate {
            return Err(ContractError::RateExhausted {
                seller: self.to_string(),
                product: order.name.clone(),
                rate: order.rate,
            });
        }
        Ok(())
    }

    /// Deposits have no upstream expenses; the sale price is the outbound
    /// transport leg marked up.
    pub fn sales_price_for(&self, transport_cost: f64, config: &SimConfig) -> f64 {
        transport_cost * config.markup
    }

    pub fn sign_as_seller(&mut self, id: ContractId) {
        self.sales.push(id);
    }

    /// Realized margin since the last call. Compacts the sales list.
    pub fn profit(&mut self, book: &ContractBook) -> f64 {
        let mut profit = 0.0;
        self.sales.retain(|id| match book.get(*id) {
            Some(sale) if !sale.cancelled => {
                profit += sale.product_cost;
                profit -= sale.transport_cost;
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
        income / expenses
    }
}

impl fmt::Display for ResourceDeposit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Resource {} ({}) @ {}",
            self.production.name,
            self.purity.as_str(),
            self.location
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::Contract;
    use crate::producer::ProducerId;

    fn deposit() -> ResourceDeposit {
        ResourceDeposit::new(
            Production::new("OreIron", 60.0, 60.0),
            Purity::Normal,
            Point::new(0, 0),
        )
    }

    fn sale(book: &mut ContractBook, deposit: &mut ResourceDeposit, rate: f64) -> ContractId {
        let id = book.write(Contract {
            seller: ProducerId(0),
            buyer: ProducerId(1),
            order: Production::new("OreIron", rate, 1.0),
            product_cost: 3.0,
            transport_cost: 1.5,
            cancelled: false,
        });
        deposit.sign_as_seller(id);
        id
    }

    #[test]
    fn refuses_foreign_products_and_non_positive_rates() {
        let book = ContractBook::default();
        let d = deposit();
        assert!(d
            .has_capacity_for(&Production::new("OreCopper", 1.0, 1.0), &book)
            .is_err());
        assert!(d
            .has_capacity_for(&Production::new("OreIron", 0.0, 1.0), &book)
            .is_err());
    }

    #[test]
    fn live_sales_consume_capacity_and_cancelled_ones_release_it() {
        let mut book = ContractBook::default();
        let mut d = deposit();
        let first = sale(&mut book, &mut d, 0.8);

        let order = Production::new("OreIron", 0.5, 1.0);
        assert!(d.has_capacity_for(&order, &book).is_err());

        book.cancel(first);
        assert!(d.has_capacity_for(&order, &book).is_ok());
    }

    #[test]
    fn sales_price_is_marked_up_transport() {
        let config = SimConfig::default();
        assert_eq!(deposit().sales_price_for(2.0, &config), 3.0);
    }

    #[test]
    fn profit_compacts_cancelled_sales() {
        let mut book = ContractBook::default();
        let mut d = deposit();
        sale(&mut book, &mut d, 0.2);
        let doomed = sale(&mut book, &mut d, 0.3);
        book.cancel(doomed);

        assert_eq!(d.profit(&book), 1.5);
        assert_eq!(d.sales.len(), 1);
    }

    #[test]
    fn profitability_is_income_over_expenses() {
        let mut book = ContractBook::default();
        let mut d = deposit();
        sale(&mut book, &mut d, 0.2);
        assert_eq!(d.profitability(&book), 2.0);

        let idle = deposit();
        assert!(idle.profitability(&book).is_nan());
    }
}
