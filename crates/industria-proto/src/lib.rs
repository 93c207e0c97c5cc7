//! Cross-boundary types for the industria kernel, API, and viewer plane.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION_V1: &str = "1.0";

/// Tunables for one simulation run. Every knob the kernel consults lives
/// here; the kernel itself carries no module-level constants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Ticks spent in each annealing phase before the dispatcher rotates to
    /// the next one (spawn -> move -> cull).
    #[serde(default = "default_phase_length_ticks")]
    pub phase_length_ticks: u64,
    /// Grace window: a factory younger than this is never culled.
    #[serde(default = "default_factory_lifetime_ticks")]
    pub factory_lifetime_ticks: u64,
    /// World bounds are the resource bounding box padded by this fraction
    /// per side.
    #[serde(default = "default_border_padding_pct")]
    pub border_padding_pct: f64,
    /// Sale-price multiplier applied by every selling producer.
    #[serde(default = "default_markup")]
    pub markup: f64,
    #[serde(default = "default_transport_base_cost")]
    pub transport_base_cost: f64,
    #[serde(default = "default_transport_distance_divisor")]
    pub transport_distance_divisor: f64,
    /// Factory migration step length is
    /// clamp(move_step_min, move_step_max, floor(move_step_scale * delta)).
    /// Hand-tuned; changing any of the three desynchronizes replays.
    #[serde(default = "default_move_step_scale")]
    pub move_step_scale: f64,
    #[serde(default = "default_move_step_min")]
    pub move_step_min: i64,
    #[serde(default = "default_move_step_max")]
    pub move_step_max: i64,
    /// Fallback keep floor for product groups without a `sink_floors` entry.
    #[serde(default = "default_min_producers_to_keep")]
    pub min_producers_to_keep: usize,
    /// Per-product-group overrides of the cull keep floor, keyed by the
    /// group's products key.
    #[serde(default)]
    pub sink_floors: BTreeMap<String, usize>,
    /// Once the tick counter passes this, the run loop sleeps between ticks
    /// to bound CPU.
    #[serde(default = "default_warmup_ticks")]
    pub warmup_ticks: u64,
    #[serde(default = "default_run_sleep_ms")]
    pub run_sleep_ms: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            phase_length_ticks: default_phase_length_ticks(),
            factory_lifetime_ticks: default_factory_lifetime_ticks(),
            border_padding_pct: default_border_padding_pct(),
            markup: default_markup(),
            transport_base_cost: default_transport_base_cost(),
            transport_distance_divisor: default_transport_distance_divisor(),
            move_step_scale: default_move_step_scale(),
            move_step_min: default_move_step_min(),
            move_step_max: default_move_step_max(),
            min_producers_to_keep: default_min_producers_to_keep(),
            sink_floors: BTreeMap::new(),
            warmup_ticks: default_warmup_ticks(),
            run_sleep_ms: default_run_sleep_ms(),
        }
    }
}

fn default_seed() -> u64 {
    52
}

fn default_phase_length_ticks() -> u64 {
    3000
}

fn default_factory_lifetime_ticks() -> u64 {
    6000
}

fn default_border_padding_pct() -> f64 {
    0.1
}

fn default_markup() -> f64 {
    1.5
}

fn default_transport_base_cost() -> f64 {
    1.0
}

fn default_transport_distance_divisor() -> f64 {
    10_000.0
}

fn default_move_step_scale() -> f64 {
    100_000.0
}

fn default_move_step_min() -> i64 {
    1
}

fn default_move_step_max() -> i64 {
    100
}

fn default_min_producers_to_keep() -> usize {
    5
}

fn default_warmup_ticks() -> u64 {
    50_000
}

fn default_run_sleep_ms() -> u64 {
    10
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Coord {
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bounds {
    pub xmin: i64,
    pub xmax: i64,
    pub ymin: i64,
    pub ymax: i64,
}

/// Immutable projection of the whole economy, built under the kernel lock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub resources: Vec<ResourceView>,
    pub factories: Vec<FactoryView>,
    pub sinks: Vec<SinkView>,
    pub transports: Vec<TransportView>,
    pub tick: u64,
    pub running: bool,
    pub bounds: Bounds,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceView {
    pub location: Coord,
    pub recipe: String,
    pub product: String,
    pub profitability: f64,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactoryView {
    pub location: Coord,
    pub recipe: String,
    pub products: Vec<String>,
    pub profitability: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SinkView {
    pub location: Coord,
    pub label: String,
    pub products: Vec<String>,
    pub profitability: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransportView {
    pub origin: Coord,
    pub destination: Coord,
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeView {
    pub name: String,
    pub inputs: Vec<ProductView>,
    pub outputs: Vec<ProductView>,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductView {
    pub name: String,
    pub rate: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    RecipeNotFound,
    InvalidRequest,
    InternalError,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details,
        }
    }
}
