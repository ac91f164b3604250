//! Sample game state used by `save --demo` and `load --pretty`.
//!
//! Field names match the JSON the game client serializes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameData {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Level")]
    pub level: i32,
    #[serde(rename = "Inventory", default)]
    pub inventory: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "Name")]
    pub name: String,
    pub amount: i32,
}

impl GameData {
    pub fn demo() -> Self {
        Self {
            name: "Hero".into(),
            level: 5,
            inventory: vec![
                Item {
                    name: "Potion".into(),
                    amount: 3,
                },
                Item {
                    name: "Iron Sword".into(),
                    amount: 1,
                },
                Item {
                    name: "Gold".into(),
                    amount: 250,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(GameData::demo()).unwrap();

        assert_eq!(json["Name"], "Hero");
        assert_eq!(json["Level"], 5);
        assert_eq!(json["Inventory"][0]["Name"], "Potion");
        assert_eq!(json["Inventory"][0]["amount"], 3);
    }

    #[test]
    fn test_missing_inventory_defaults_empty() {
        let data: GameData = serde_json::from_str(r#"{"Name":"New","Level":1}"#).unwrap();
        assert!(data.inventory.is_empty());
    }
}
