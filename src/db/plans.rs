use std::sync::Arc;

use super::documents::{from_documents, to_document, DocumentStore, WEEKLY_PLANS};
use crate::{error::AppResult, models::WeeklyPlan};

/// Stores at most one weekly plan per wardrobe
#[derive(Clone)]
pub struct PlanStore {
    docs: Arc<dyn DocumentStore>,
}

impl PlanStore {
    pub fn new(docs: Arc<dyn DocumentStore>) -> Self {
        Self { docs }
    }

    /// Replaces every existing plan of the wardrobe with `plan`
    pub async fn replace_plan(&self, plan: &WeeklyPlan) -> AppResult<String> {
        self.docs
            .replace_by(
                WEEKLY_PLANS,
                "wardrobe_id",
                &plan.wardrobe_id,
                to_document(plan)?,
            )
            .await?;

        tracing::info!(
            plan_id = %plan.plan_id,
            wardrobe_id = %plan.wardrobe_id,
            store = self.docs.name(),
            "Weekly plan stored"
        );

        Ok(plan.plan_id.clone())
    }

    /// The wardrobe's plan; the newest one if a concurrent write left two
    pub async fn get_plan(&self, wardrobe_id: &str) -> AppResult<Option<WeeklyPlan>> {
        let docs = self.docs.find_by(WEEKLY_PLANS, "wardrobe_id", wardrobe_id).await?;
        let plans: Vec<WeeklyPlan> = from_documents(docs)?;
        Ok(plans.into_iter().max_by_key(|p| p.created_at))
    }

    pub async fn delete_plans(&self, wardrobe_id: &str) -> AppResult<u64> {
        self.docs.delete_many(WEEKLY_PLANS, "wardrobe_id", wardrobe_id).await
    }
}
