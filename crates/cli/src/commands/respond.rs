//! Respond command handler.
//!
//! Answers a citizen complaint with retrieved evidence.

use super::{print_json, responder};
use clap::Args;
use pqrs_core::{config::AppConfig, AppResult};
use pqrs_knowledge::{Category, ComplaintRequest, ComplaintType};

/// Answer a citizen complaint
#[derive(Args, Debug)]
pub struct RespondCommand {
    /// Request kind (peticion, queja, reclamo, sugerencia)
    #[arg(long = "type")]
    pub complaint_type: ComplaintType,

    /// Short summary of the problem
    #[arg(long)]
    pub title: String,

    /// Full description of the problem
    #[arg(long)]
    pub description: String,

    /// Citizen name
    #[arg(long)]
    pub name: String,

    /// Citizen email
    #[arg(long)]
    pub email: String,

    /// Where the problem is
    #[arg(long)]
    pub location: Option<String>,

    /// Citizen phone
    #[arg(long)]
    pub phone: Option<String>,

    /// Category (classified automatically when omitted)
    #[arg(long)]
    pub category: Option<Category>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl RespondCommand {
    fn request(&self) -> ComplaintRequest {
        ComplaintRequest {
            complaint_type: self.complaint_type,
            category: self.category,
            title: self.title.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            citizen_name: self.name.clone(),
            citizen_email: self.email.clone(),
            citizen_phone: self.phone.clone(),
        }
    }

    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!(collection = %config.collection, "Executing respond command");

        let request = self.request();
        request.validate()?;

        let responder = responder(config)?;
        let response = responder.respond(&request).await;

        if self.json {
            return print_json(&response);
        }

        println!("{} ({})", response.complaint_id, response.detected_category.display_name());
        println!();
        println!("{}", response.response);
        println!();

        if response.reference_documents.is_empty() {
            println!("References: (none)");
        } else {
            println!("References:");
            for title in &response.reference_documents {
                println!("- {}", title);
            }
        }

        println!();
        println!("Recommendations:");
        for recommendation in &response.recommendations {
            println!("- {}", recommendation);
        }

        println!();
        println!(
            "Confidence: {:.2} | Time: {:.2}s",
            response.confidence, response.elapsed_secs
        );

        Ok(())
    }
}
