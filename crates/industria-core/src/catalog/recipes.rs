use std::fmt;

use industria_proto::SimConfig;
use serde::Deserialize;

use crate::catalog::grammar;
use crate::contract::ContractBook;
use crate::error::{CatalogError, ContractError};
use crate::point::Point;
use crate::producer::{ProducerId, ProducerTable};
use crate::production::{transport_cost, Production, Products};

const DOCS: &[u8] = include_bytes!("../../data/docs.json");

const FG_RECIPE: &str = "/Script/CoreUObject.Class'/Script/FactoryGame.FGRecipe'";
const BUILDABLE_FACTORY: &str = "/Game/FactoryGame/Buildable/Factory";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerKind {
    Assembler,
    Constructor,
    Manufacturer,
    Refinery,
    Smelter,
    Foundry,
    Packager,
    Blender,
    Collider,
    BuildGun,
    Workshop,
    NullProducer,
}

impl ProducerKind {
    const FACTORY_KINDS: [ProducerKind; 9] = [
        ProducerKind::Assembler,
        ProducerKind::Constructor,
        ProducerKind::Manufacturer,
        ProducerKind::Refinery,
        ProducerKind::Smelter,
        ProducerKind::Foundry,
        ProducerKind::Packager,
        ProducerKind::Blender,
        ProducerKind::Collider,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProducerKind::Assembler => "Assembler",
            ProducerKind::Constructor => "Constructor",
            ProducerKind::Manufacturer => "Manufacturer",
            ProducerKind::Refinery => "Refinery",
            ProducerKind::Smelter => "Smelter",
            ProducerKind::Foundry => "Foundry",
            ProducerKind::Packager => "Packager",
            ProducerKind::Blender => "Blender",
            ProducerKind::Collider => "Collider",
            ProducerKind::BuildGun => "BuildGun",
            ProducerKind::Workshop => "Workshop",
            ProducerKind::NullProducer => "NullProducer",
        }
    }

    /// Recipes tagged with one of these never enter the live catalog.
    pub fn is_sentinel(self) -> bool {
        matches!(
            self,
            ProducerKind::NullProducer | ProducerKind::BuildGun | ProducerKind::Workshop
        )
    }

    fn parse(value: &str) -> Result<Self, CatalogError> {
        if value.is_empty() {
            return Ok(ProducerKind::NullProducer);
        }
        if !value.contains(BUILDABLE_FACTORY) {
            if value.contains("BuildGun") {
                return Ok(ProducerKind::BuildGun);
            }
            if value.contains("Workshop") {
                return Ok(ProducerKind::Workshop);
            }
            return Err(CatalogError::UnknownProducerKind {
                value: value.to_string(),
            });
        }
        for kind in Self::FACTORY_KINDS {
            if value.contains(kind.as_str()) {
                return Ok(kind);
            }
        }
        Err(CatalogError::UnknownProducerKind {
            value: value.to_string(),
        })
    }
}

impl fmt::Display for ProducerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Recipe {
    pub display_name: String,
    pub produced_in: ProducerKind,
    pub inputs: Products,
    pub outputs: Products,
    pub duration: f64,
    pub active: bool,
}

/// One input of a planned factory, matched to the cheapest capable seller.
#[derive(Debug, Clone)]
pub struct SourcedInput {
    pub order: Production,
    pub seller: ProducerId,
    pub transport_cost: f64,
}

impl Recipe {
    pub fn name(&self) -> &str {
        &self.display_name
    }

    /// Finds a seller for every input, preferring the cheapest transport leg
    /// to `destination` (first candidate wins ties). Fails the whole attempt
    /// when any input has no capable seller.
    pub fn source_products(
        &self,
        producers: &ProducerTable,
        destination: Point,
        book: &ContractBook,
        config: &SimConfig,
    ) -> Result<Vec<SourcedInput>, ContractError> {
        let mut sourced = Vec::with_capacity(self.inputs.len());
        for order in &self.inputs {
            let mut best: Option<(ProducerId, f64)> = None;
            for (id, seller) in producers {
                if seller.has_capacity_for(order, book).is_err() {
                    continue;
                }
                let cost = transport_cost(seller.location(), destination, config);
                if best.is_none_or(|(_, best_cost)| cost < best_cost) {
                    best = Some((*id, cost));
                }
            }
            let Some((seller, cost)) = best else {
                return Err(ContractError::NoSellerFor {
                    product: order.name.clone(),
                });
            };
            sourced.push(SourcedInput {
                order: order.clone(),
                seller,
                transport_cost: cost,
            });
        }
        Ok(sourced)
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) {} => {}",
            self.display_name,
            self.produced_in,
            self.inputs.key(),
            self.outputs.key()
        )
    }
}

#[derive(Debug, Deserialize)]
struct DocEntry {
    #[serde(rename = "NativeClass")]
    native_class: String,
    #[serde(rename = "Classes")]
    classes: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RawRecipe {
    #[serde(rename = "mDisplayName")]
    display_name: String,
    #[serde(rename = "mProducedIn", default)]
    produced_in: String,
    #[serde(rename = "mIngredients")]
    ingredients: String,
    #[serde(rename = "mProduct")]
    product: String,
    #[serde(rename = "mManufactoringDuration")]
    duration: String,
}

/// Loads the embedded recipe manifest. The document is UTF-16LE with a BOM;
/// recipes live under the `FGRecipe` native class, and entries produced in a
/// sentinel producer are dropped.
pub fn load_recipes() -> Result<Vec<Recipe>, CatalogError> {
    let text = decode_utf16le(DOCS)?;
    let docs: Vec<DocEntry> = serde_json::from_str(&text)?;

    let mut recipes = Vec::new();
    for doc in docs {
        if doc.native_class != FG_RECIPE {
            continue;
        }
        let entries: Vec<RawRecipe> = serde_json::from_value(doc.classes)?;
        for entry in entries {
            let produced_in = ProducerKind::parse(&entry.produced_in)?;
            let duration =
                entry
                    .duration
                    .parse::<f64>()
                    .map_err(|source| CatalogError::BadDuration {
                        value: entry.duration.clone(),
                        source,
                    })?;
            let inputs = parse_product_list(&entry.ingredients, duration)?;
            let outputs = parse_product_list(&entry.product, duration)?;
            if produced_in.is_sentinel() {
                continue;
            }
            recipes.push(Recipe {
                display_name: entry.display_name,
                produced_in,
                inputs,
                outputs,
                duration,
                active: true,
            });
        }
    }
    Ok(recipes)
}

/// Amounts are per manufacturing cycle; dividing by the duration turns them
/// into units per second.
fn parse_product_list(value: &str, duration: f64) -> Result<Products, CatalogError> {
    let items = grammar::parse_item_list(value)?;
    Ok(Products::new(
        items
            .into_iter()
            .map(|(name, amount)| Production::new(name, amount, duration))
            .collect(),
    ))
}

fn decode_utf16le(bytes: &[u8]) -> Result<String, CatalogError> {
    let Some(payload) = bytes.strip_prefix(&[0xFF, 0xFE]) else {
        return Err(CatalogError::MissingBom);
    };
    if payload.len() % 2 != 0 {
        return Err(CatalogError::TruncatedUtf16);
    }
    let units = payload
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect::<Vec<_>>();
    Ok(String::from_utf16(&units)?)
}
