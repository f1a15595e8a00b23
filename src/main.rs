use log::{error, info, warn};
use recipe_extract::config::AppConfig;
use recipe_extract::metrics::MetricsRegistry;
use recipe_extract::model::PLACEHOLDER_TITLE;
use recipe_extract::RecipeProcessor;
use std::env;
use std::path::Path;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let paths: Vec<String> = env::args().skip(1).collect();
    if paths.is_empty() {
        return Err("Usage: recipe-extract <file>...".into());
    }

    let config = AppConfig::load().unwrap_or_else(|err| {
        warn!("Falling back to default configuration: {}", err);
        AppConfig::default()
    });
    let metrics = Arc::new(MetricsRegistry::new());
    let processor = RecipeProcessor::new(&config.extraction, metrics.clone());

    let mut failures = 0usize;
    for path in &paths {
        let recipe = processor.process_file(Path::new(path));
        // A placeholder title with nothing extracted means the source gave us nothing
        if recipe.title == PLACEHOLDER_TITLE
            && recipe.ingredients.is_empty()
            && recipe.instructions.is_empty()
        {
            error!("No recipe could be extracted from {}", path);
            failures += 1;
            continue;
        }
        println!("{}", serde_json::to_string_pretty(&recipe)?);
    }

    for (name, value) in metrics.snapshot() {
        info!("{} = {}", name, value);
    }
    if failures > 0 {
        warn!("{}/{} files yielded no recipe", failures, paths.len());
    }

    Ok(())
}
