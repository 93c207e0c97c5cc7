use rand::SeedableRng;

use super::*;
use crate::catalog;
use crate::point::Point;
use crate::production::{Production, Products};
use crate::sink::Sink;

impl SimWorld {
    /// Loads both catalogs and installs the initial producer population:
    /// every resource deposit plus the hard-coded sinks. Any catalog parse
    /// failure is fatal; no partial world is ever returned.
    pub fn new(config: SimConfig) -> Result<Self, CatalogError> {
        let deposits = catalog::load_resources()?;
        let recipes = catalog::load_recipes()?;
        if deposits.is_empty() {
            return Err(CatalogError::EmptyResourceTable);
        }

        let mut xmin = deposits[0].location().x;
        let mut xmax = xmin;
        let mut ymin = deposits[0].location().y;
        let mut ymax = ymin;
        for deposit in &deposits {
            let loc = deposit.location();
            xmin = xmin.min(loc.x);
            xmax = xmax.max(loc.x);
            ymin = ymin.min(loc.y);
            ymax = ymax.max(loc.y);
        }
        let padding_x = (xmax - xmin) as f64 * config.border_padding_pct;
        let padding_y = (ymax - ymin) as f64 * config.border_padding_pct;
        let bounds = Bounds {
            xmin: (xmin as f64 - padding_x) as i64,
            xmax: (xmax as f64 + padding_x) as i64,
            ymin: (ymin as f64 - padding_y) as i64,
            ymax: (ymax as f64 + padding_y) as i64,
        };

        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let sink_floors = config.sink_floors.clone();

        let mut world = Self {
            config,
            producers: ProducerTable::new(),
            next_producer_id: 0,
            contracts: ContractBook::default(),
            recipes,
            market: Market::default(),
            sink_floors,
            tick: 0,
            rng,
            bounds,
        };

        for deposit in deposits {
            world.alloc_producer(Producer::Deposit(deposit));
        }

        let center = Point::new(
            (bounds.xmin + bounds.xmax) / 2,
            (bounds.ymin + bounds.ymax) / 2,
        );
        world.alloc_producer(Producer::Sink(Sink::new(
            "SpaceElevator",
            center,
            Products::new(vec![Production::new("SpaceElevatorPart_1", 1.0, 30.0)]),
        )));

        Ok(world)
    }

    /// Re-runs initialization in place with the original seed, so a reset
    /// world replays the exact same history as a freshly constructed one.
    pub fn reset(&mut self) -> Result<(), CatalogError> {
        *self = Self::new(self.config.clone())?;
        Ok(())
    }
}
