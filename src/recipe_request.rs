use crate::api_connection::endpoints::{
    default_safety_settings, Content, GenerateContentRequest, GenerationConfig, Part, SafetySetting,
};
use crate::pantry::PantryItem;

pub const INPUT_LABEL: &str = "input: Pantry Descriptions ";

const PLAIN_INSTRUCTION: &str = "output: Write a recipe based on these pantry descriptions. The recipe should include ingredients and step-by-step instructions.";

/// A recipe generation request. Built once from a pantry snapshot and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeRequest {
    pub descriptions: String,
    pub cuisine_style: Option<String>,
    pub generation_config: GenerationConfig,
    pub safety_settings: Vec<SafetySetting>,
}

impl RecipeRequest {
    /// The instruction segment, with the cuisine twist when a style was given.
    pub fn instruction(&self) -> String {
        match &self.cuisine_style {
            Some(style) => format!(
                "output: Write a recipe based on these pantry descriptions, with a {} twist. The recipe should include ingredients and step-by-step instructions. ",
                style
            ),
            None => PLAIN_INSTRUCTION.to_string(),
        }
    }

    pub fn payload(&self) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part { text: INPUT_LABEL.to_string() },
                    Part { text: self.descriptions.clone() },
                    Part { text: self.instruction() },
                ],
            }],
            generation_config: self.generation_config.clone(),
            safety_settings: self.safety_settings.clone(),
        }
    }
}

/// Serializes pantry items as `"Name: count"` pairs joined by `", "`.
pub fn describe_items(items: &[PantryItem]) -> String {
    items
        .iter()
        .map(|item| format!("{}: {}", item.name, item.quantity))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builds a request from the pantry snapshot. A missing, empty or blank cuisine style
/// selects the plain instruction used by one-shot generation.
pub fn build_request(items: &[PantryItem], cuisine_style: Option<&str>) -> RecipeRequest {
    let cuisine_style = cuisine_style
        .map(str::trim)
        .filter(|style| !style.is_empty())
        .map(str::to_string);

    RecipeRequest {
        descriptions: describe_items(items),
        cuisine_style,
        generation_config: GenerationConfig::default(),
        safety_settings: default_safety_settings(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(name: &str, quantity: u32) -> PantryItem {
        PantryItem::new(name, quantity)
    }

    #[test]
    fn single_item_with_cuisine() {
        let request = build_request(&[item("Egg", 2)], Some("italian"));
        assert_eq!(request.descriptions, "Egg: 2");
        assert!(request.instruction().contains("italian"));
        assert!(request.instruction().contains("with a italian twist"));
    }

    #[test]
    fn items_are_comma_joined_in_order() {
        let request = build_request(&[item("Apple", 1), item("Brown Rice", 3)], None);
        assert_eq!(request.descriptions, "Apple: 1, Brown Rice: 3");
    }

    #[test]
    fn empty_pantry_yields_empty_descriptions() {
        let request = build_request(&[], Some("french"));
        assert_eq!(request.descriptions, "");
    }

    #[test]
    fn blank_cuisine_uses_plain_instruction() {
        for style in [None, Some(""), Some("   ")] {
            let request = build_request(&[item("Egg", 1)], style);
            assert_eq!(request.cuisine_style, None);
            assert_eq!(request.instruction(), PLAIN_INSTRUCTION);
        }
    }

    #[test]
    fn payload_matches_wire_shape() {
        let request = build_request(&[item("Egg", 2)], Some("mexican"));
        let value = serde_json::to_value(request.payload()).unwrap();

        let parts = &value["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], json!("input: Pantry Descriptions "));
        assert_eq!(parts[1]["text"], json!("Egg: 2"));
        assert!(parts[2]["text"].as_str().unwrap().contains("mexican"));

        let config = &value["generationConfig"];
        assert_eq!(config["topK"], json!(25));
        assert_eq!(config["maxOutputTokens"], json!(1000));
        assert_eq!(config["stopSequences"], json!([]));
        assert!((config["temperature"].as_f64().unwrap() - 0.95).abs() < 1e-6);
        assert!((config["topP"].as_f64().unwrap() - 0.95).abs() < 1e-6);

        let safety = value["safetySettings"].as_array().unwrap();
        assert_eq!(safety.len(), 4);
        assert_eq!(safety[1]["category"], json!("HARM_CATEGORY_HATE_SPEECH"));
        assert!(safety.iter().all(|s| s["threshold"] == json!("BLOCK_MEDIUM_AND_ABOVE")));
    }
}
