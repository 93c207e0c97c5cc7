//! Deterministic factory-economy simulation kernel: catalog loaders,
//! producers, bilateral supply contracts, and the spawn/move/cull tick loop.

pub mod catalog;
pub mod contract;
pub mod deposit;
pub mod error;
pub mod factory;
pub mod point;
pub mod producer;
pub mod production;
pub mod sink;
pub mod world;

pub use contract::{Contract, ContractBook, ContractId, Market};
pub use error::{CatalogError, ContractError, MoveError};
pub use point::Point;
pub use producer::{Producer, ProducerId};
pub use production::{transport_cost, Production, Products};
pub use world::SimWorld;
