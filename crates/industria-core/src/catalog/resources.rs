use serde::Deserialize;

use crate::deposit::{Purity, ResourceDeposit};
use crate::error::CatalogError;
use crate::point::Point;
use crate::production::Production;

const RESOURCES: &[u8] = include_bytes!("../../data/resources.json");

// Base extraction runs on a one-minute cycle.
const EXTRACTION_DURATION_SECS: f64 = 60.0;

#[derive(Debug, Deserialize)]
struct ResourceRow {
    id: String,
    lat: f64,
    lng: f64,
}

/// Loads the embedded deposit table. Every id carries a purity suffix; the
/// remaining prefix maps through the canonical product-name table.
pub fn load_resources() -> Result<Vec<ResourceDeposit>, CatalogError> {
    let rows: Vec<ResourceRow> = serde_json::from_slice(RESOURCES)?;

    let mut deposits = Vec::with_capacity(rows.len());
    for row in rows {
        let (raw_name, purity) = if let Some(name) = row.id.strip_suffix("Impure") {
            (name, Purity::Impure)
        } else if let Some(name) = row.id.strip_suffix("Normal") {
            (name, Purity::Normal)
        } else if let Some(name) = row.id.strip_suffix("Pure") {
            (name, Purity::Pure)
        } else {
            return Err(CatalogError::InvalidResourceId { id: row.id });
        };

        let name = canonical_name(raw_name);
        let location = Point::new((row.lng * 1000.0) as i64, (row.lat * 1000.0) as i64);
        deposits.push(ResourceDeposit::new(
            Production::new(name, purity.base_amount(), EXTRACTION_DURATION_SECS),
            purity,
            location,
        ));
    }
    Ok(deposits)
}

fn canonical_name(raw: &str) -> &str {
    match raw {
        "limestone" => "Stone",
        "iron" => "OreIron",
        "copper" => "OreCopper",
        "caterium" => "OreGold",
        "coal" => "Coal",
        "oil" => "LiquidOil",
        "sulfur" => "Sulfur",
        "bauxite" => "OreBauxite",
        "quartz" => "RawQuartz",
        "uranium" => "OreUranium",
        _ => raw,
    }
}
