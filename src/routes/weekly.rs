use std::collections::HashSet;
use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;

use super::AppState;
use crate::{
    error::AppResult,
    middleware::AuthUser,
    models::{CreateWeeklyPlanResponse, GetWeeklyPlanResponse, PlanWeekRequest},
    services::planner::{build_weekly_plan, PlanError},
};

/// PUT /weekly/create-plan: generates a plan and replaces the current one
pub async fn create_plan(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    request: Option<Json<PlanWeekRequest>>,
) -> AppResult<Json<CreateWeeklyPlanResponse>> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let wardrobe_id = user.user_id();

    let outfits = state.outfits.list(wardrobe_id).await?;
    if outfits.is_empty() {
        return Err(PlanError::EmptyWardrobe.into());
    }

    let now = Utc::now();
    let daily_plans = state
        .planner
        .generate_weekly_plan(&outfits, wardrobe_id, request.location(), now.date_naive())
        .await?;

    let plan = build_weekly_plan(wardrobe_id, daily_plans, now);
    let plan_id = state.plans.replace_plan(&plan).await?;

    Ok(Json(CreateWeeklyPlanResponse {
        result: true,
        message: "Weekly plan created successfully".to_string(),
        plan_id,
    }))
}

/// GET /weekly/plan: the current plan, without outfits deleted since
pub async fn get_plan(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> AppResult<Json<GetWeeklyPlanResponse>> {
    let Some(mut plan) = state.plans.get_plan(user.user_id()).await? else {
        return Ok(Json(GetWeeklyPlanResponse {
            weekly_plans: Vec::new(),
        }));
    };

    let existing: HashSet<String> = state
        .outfits
        .list(user.user_id())
        .await?
        .into_iter()
        .map(|o| o.outfit_id)
        .collect();

    let mut stale = 0;
    for day in plan.daily_plans.values_mut() {
        let before = day.outfit_ids.len();
        day.outfit_ids.retain(|id| existing.contains(id));
        stale += before - day.outfit_ids.len();
    }
    if stale > 0 {
        tracing::debug!(plan_id = %plan.plan_id, stale, "Filtered deleted outfits from plan");
    }

    Ok(Json(GetWeeklyPlanResponse {
        weekly_plans: vec![plan],
    }))
}
