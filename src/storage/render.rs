//! Recipe → page payload rendering.

use crate::model::Recipe;
use serde_json::{json, Value};

/// Page properties for a recipe: title plus the flat metadata fields.
pub fn recipe_properties(recipe: &Recipe) -> Value {
    let meta = &recipe.metadata;
    let mut fields = serde_json::Map::new();
    fields.insert(
        "title".into(),
        json!({ "title": [{ "text": { "content": recipe.title } }] }),
    );
    fields.insert("made".into(), json!({ "checkbox": meta.made }));
    if let Some(servings) = meta.servings {
        fields.insert("servings".into(), json!({ "number": servings }));
    }
    if let Some(calories) = meta.calories {
        fields.insert("calories".into(), json!({ "number": calories }));
    }
    if let Some(total) = meta.total_time_min {
        fields.insert("total_time_min".into(), json!({ "number": total }));
    }
    if let Some(date) = meta.date {
        fields.insert("date".into(), json!({ "date": { "start": date.to_string() } }));
    }
    if let Some(url) = &meta.url {
        fields.insert("url".into(), json!({ "url": url }));
    }
    if !meta.tags.is_empty() {
        let tags: Vec<Value> = meta.tags.iter().map(|tag| json!({ "name": tag })).collect();
        fields.insert("tags".into(), json!({ "multi_select": tags }));
    }
    Value::Object(fields)
}

/// Body blocks: an ingredients list followed by numbered instruction steps
/// and an optional notes paragraph.
pub fn recipe_to_blocks(recipe: &Recipe) -> Value {
    let mut blocks = Vec::new();

    blocks.push(heading("Ingredientes"));
    for ing in &recipe.ingredients {
        let line = format!("{} {} {}", ing.quantity, ing.unit, ing.name);
        blocks.push(bulleted_item(line.trim()));
    }

    blocks.push(heading("Preparación"));
    for step in &recipe.instructions {
        blocks.push(numbered_item(step));
    }

    if let Some(notes) = &recipe.metadata.notes {
        blocks.push(heading("Notas"));
        blocks.push(paragraph(notes));
    }

    Value::Array(blocks)
}

fn heading(text: &str) -> Value {
    json!({
        "object": "block",
        "type": "heading_2",
        "heading_2": { "rich_text": [{ "text": { "content": text } }] }
    })
}

fn bulleted_item(text: &str) -> Value {
    json!({
        "object": "block",
        "type": "bulleted_list_item",
        "bulleted_list_item": { "rich_text": [{ "text": { "content": text } }] }
    })
}

fn numbered_item(text: &str) -> Value {
    json!({
        "object": "block",
        "type": "numbered_list_item",
        "numbered_list_item": { "rich_text": [{ "text": { "content": text } }] }
    })
}

fn paragraph(text: &str) -> Value {
    json!({
        "object": "block",
        "type": "paragraph",
        "paragraph": { "rich_text": [{ "text": { "content": text } }] }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Ingredient, RecipeMetadata};

    fn sample_recipe() -> Recipe {
        let mut metadata = RecipeMetadata {
            title: "Tortilla".to_string(),
            servings: Some(2),
            ..RecipeMetadata::default()
        };
        metadata.tags.insert("clásico".to_string());
        Recipe::new(
            metadata,
            vec![Ingredient::new("huevos", 4.0, "unidad")],
            vec!["Batir los huevos".to_string(), "Cuajar en sartén".to_string()],
        )
    }

    #[test]
    fn test_properties_carry_title_and_servings() {
        let props = recipe_properties(&sample_recipe());
        assert_eq!(
            props["title"]["title"][0]["text"]["content"],
            "Tortilla"
        );
        assert_eq!(props["servings"]["number"], 2);
        assert_eq!(props["made"]["checkbox"], false);
    }

    #[test]
    fn test_blocks_cover_ingredients_and_steps() {
        let blocks = recipe_to_blocks(&sample_recipe());
        let blocks = blocks.as_array().unwrap();
        // heading + 1 ingredient + heading + 2 steps
        assert_eq!(blocks.len(), 5);
        assert_eq!(blocks[1]["type"], "bulleted_list_item");
        assert_eq!(blocks[4]["type"], "numbered_list_item");
    }
}
