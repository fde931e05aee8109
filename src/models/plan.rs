use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One day of a weekly plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyPlan {
    pub date: NaiveDate,
    /// Weekday name, e.g. "Monday"
    pub day: String,
    /// Composite preview URL; `None` when compositing failed
    #[serde(default)]
    pub image_url: Option<String>,
    pub outfit_ids: Vec<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub condition_icon: Option<String>,
}

/// Daily plans keyed `day1`, `day2`, ...
pub type DailyPlans = BTreeMap<String, DailyPlan>;

/// The single active plan of a wardrobe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeeklyPlan {
    pub plan_id: String,
    pub wardrobe_id: String,
    pub created_at: DateTime<Utc>,
    pub week_start: NaiveDate,
    pub daily_plans: DailyPlans,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlanWeekRequest {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Accepted for client compatibility; unused
    #[serde(default)]
    pub temperature: Option<f64>,
}

impl PlanWeekRequest {
    /// Coordinates, when both are given
    pub fn location(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

#[derive(Debug, Serialize)]
pub struct CreateWeeklyPlanResponse {
    pub result: bool,
    pub message: String,
    pub plan_id: String,
}

#[derive(Debug, Serialize)]
pub struct GetWeeklyPlanResponse {
    pub weekly_plans: Vec<WeeklyPlan>,
}
