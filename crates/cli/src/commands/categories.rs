//! Categories command handler.

use super::print_json;
use clap::Args;
use pqrs_core::AppResult;
use pqrs_knowledge::Category;

/// List the complaint categories
#[derive(Args, Debug)]
pub struct CategoriesCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CategoriesCommand {
    pub fn execute(&self) -> AppResult<()> {
        if self.json {
            let categories: Vec<_> = Category::ALL
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "value": c.label(),
                        "label": c.display_name(),
                        "description": c.description(),
                    })
                })
                .collect();
            return print_json(&categories);
        }

        let width = Category::ALL
            .iter()
            .map(|c| c.label().len())
            .max()
            .unwrap_or(0);
        for category in Category::ALL {
            println!(
                "{:<width$}  {}",
                category.label(),
                category.description(),
                width = width
            );
        }

        Ok(())
    }
}
