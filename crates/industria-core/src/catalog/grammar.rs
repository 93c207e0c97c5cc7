//! The manifest's nested-tuple grammar for item lists, e.g.
//! `((ItemClass=/Script/Engine.BlueprintGeneratedClass'"/Game/FactoryGame/
//! Resource/Parts/IronPlate/Desc_IronPlate.Desc_IronPlate_C"',Amount=6),…)`.
//! All helpers operate on the JSON-decoded string, so the decorative quotes
//! around the class path appear as `'"` and `"'`.

use crate::error::CatalogError;

const CLASS_REFERENCE_PREFIX: &str = "ItemClass=/Script/Engine.BlueprintGeneratedClass";
const AMOUNT_PREFIX: &str = "Amount=";

const PATH_PREFIXES: [&str; 10] = [
    "/Game/FactoryGame/Resource/Parts/",
    "/Game/FactoryGame/Events/Christmas/",
    "/Game/FactoryGame/Resource/RawResources/",
    "/Game/FactoryGame/Resource/Equipment/",
    "/Game/FactoryGame/Resource/Environment/",
    "/Game/FactoryGame/Buildable/Factory/",
    "/Game/FactoryGame/Buildable/Building/",
    "/Game/FactoryGame/Buildable/Vehicle/",
    "/Game/FactoryGame/Equipment/",
    "/Game/FactoryGame/Prototype/Buildable/",
];

pub fn strip_outer_group(value: &str) -> Result<&str, CatalogError> {
    let trimmed = value
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'));
    trimmed.ok_or_else(|| CatalogError::MissingOuterGroup {
        value: value.to_string(),
    })
}

/// Splits `(…),(…),…` into its parenthesis groups, parens included.
pub fn split_groups(list: &str) -> Vec<&str> {
    let mut groups = Vec::new();
    let mut start = None;
    for (idx, byte) in list.bytes().enumerate() {
        match byte {
            b'(' if start.is_none() => start = Some(idx),
            b')' => {
                if let Some(open) = start.take() {
                    groups.push(&list[open..=idx]);
                }
            }
            _ => {}
        }
    }
    groups
}

pub fn strip_parens<'a>(list: &str, entry: &'a str) -> Result<&'a str, CatalogError> {
    let inner = entry
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| CatalogError::UnbalancedEntry {
            entry: entry.to_string(),
        })?;
    if inner.is_empty() {
        return Err(CatalogError::EmptyEntry {
            list: list.to_string(),
        });
    }
    Ok(inner)
}

/// Splits one entry into the class reference and the amount literal.
pub fn split_class_and_amount(entry: &str) -> Result<(&str, &str), CatalogError> {
    let mut parts = entry.split(',');
    let (Some(reference), Some(amount), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(CatalogError::MalformedEntry {
            entry: entry.to_string(),
        });
    };
    let reference = reference
        .strip_prefix(CLASS_REFERENCE_PREFIX)
        .unwrap_or(reference);
    let amount = amount.strip_prefix(AMOUNT_PREFIX).unwrap_or(amount);
    Ok((reference, amount))
}

pub fn strip_quote_decoration(reference: &str) -> Result<&str, CatalogError> {
    reference
        .strip_prefix("'\"")
        .and_then(|rest| rest.strip_suffix("\"'"))
        .ok_or_else(|| CatalogError::MissingDecoration {
            reference: reference.to_string(),
        })
}

/// Reduces a blueprint path to the canonical product name:
/// strip a known path prefix, take the class half after the dot, then strip
/// `Desc_`/`BP_` and `_C`. An entry that none of the strips touched is not a
/// product reference.
pub fn clean_class_name(path: &str) -> Result<String, CatalogError> {
    let mut rest = path;
    for prefix in PATH_PREFIXES {
        if let Some(stripped) = rest.strip_prefix(prefix) {
            rest = stripped;
            break;
        }
    }
    if rest.starts_with("/Game/FactoryGame") {
        return Err(CatalogError::UnknownPath {
            path: path.to_string(),
        });
    }

    let parts = rest.split('.').collect::<Vec<_>>();
    let &[_, class_name] = parts.as_slice() else {
        return Err(CatalogError::MalformedClassPath {
            name: rest.to_string(),
        });
    };

    let mut name = class_name;
    name = name.strip_prefix("Desc_").unwrap_or(name);
    name = name.strip_prefix("BP_").unwrap_or(name);
    name = name.strip_suffix("_C").unwrap_or(name);
    if name == class_name {
        return Err(CatalogError::UnknownClassName {
            name: class_name.to_string(),
        });
    }
    Ok(name.to_string())
}

/// Full pipeline for one item list: returns `(name, amount)` pairs.
pub fn parse_item_list(value: &str) -> Result<Vec<(String, f64)>, CatalogError> {
    let list = strip_outer_group(value)?;
    let mut items = Vec::new();
    for group in split_groups(list) {
        let entry = strip_parens(list, group)?;
        let (reference, amount_literal) = split_class_and_amount(entry)?;
        let path = strip_quote_decoration(reference)?;
        let name = clean_class_name(path)?;
        let amount = amount_literal
            .parse::<f64>()
            .map_err(|source| CatalogError::BadAmount {
                value: amount_literal.to_string(),
                source,
            })?;
        items.push((name, amount));
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLATE: &str = "((ItemClass=/Script/Engine.BlueprintGeneratedClass'\"/Game/FactoryGame/Resource/Parts/IronPlate/Desc_IronPlate.Desc_IronPlate_C\"',Amount=6),(ItemClass=/Script/Engine.BlueprintGeneratedClass'\"/Game/FactoryGame/Resource/Parts/IronScrew/Desc_IronScrew.Desc_IronScrew_C\"',Amount=12))";

    #[test]
    fn parses_a_two_item_list() {
        let items = parse_item_list(PLATE).expect("list parses");
        assert_eq!(
            items,
            vec![
                ("IronPlate".to_string(), 6.0),
                ("IronScrew".to_string(), 12.0)
            ]
        );
    }

    #[test]
    fn rejects_a_value_without_the_outer_group() {
        assert!(matches!(
            parse_item_list("ItemClass=whatever"),
            Err(CatalogError::MissingOuterGroup { .. })
        ));
    }

    #[test]
    fn rejects_missing_quote_decoration() {
        let bare =
            "((ItemClass=/Script/Engine.BlueprintGeneratedClass/Game/X.Desc_X_C,Amount=1))";
        assert!(matches!(
            parse_item_list(bare),
            Err(CatalogError::MissingDecoration { .. })
        ));
    }

    #[test]
    fn rejects_paths_outside_the_known_prefixes() {
        let alien = "((ItemClass=/Script/Engine.BlueprintGeneratedClass'\"/Game/FactoryGame/Unknown/Desc_Thing.Desc_Thing_C\"',Amount=1))";
        assert!(matches!(
            parse_item_list(alien),
            Err(CatalogError::UnknownPath { .. })
        ));
    }

    #[test]
    fn rejects_class_names_without_known_affixes() {
        let undecorated = "((ItemClass=/Script/Engine.BlueprintGeneratedClass'\"/Game/FactoryGame/Resource/Parts/Thing/Thing.Thing\"',Amount=1))";
        assert!(matches!(
            parse_item_list(undecorated),
            Err(CatalogError::UnknownClassName { .. })
        ));
    }

    #[test]
    fn rejects_paths_with_extra_dots() {
        let dotted = "((ItemClass=/Script/Engine.BlueprintGeneratedClass'\"/Game/FactoryGame/Resource/Parts/A/Desc_A.Desc_A.Desc_A_C\"',Amount=1))";
        assert!(matches!(
            parse_item_list(dotted),
            Err(CatalogError::MalformedClassPath { .. })
        ));
    }

    #[test]
    fn strips_bp_prefixes_too() {
        let miner = "((ItemClass=/Script/Engine.BlueprintGeneratedClass'\"/Game/FactoryGame/Resource/Equipment/PortableMiner/BP_PortableMiner.BP_PortableMiner_C\"',Amount=1))";
        let items = parse_item_list(miner).expect("list parses");
        assert_eq!(items, vec![("PortableMiner".to_string(), 1.0)]);
    }
}
