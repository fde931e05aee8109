//! Weekly plan generation.
//!
//! Each plan covers `PLAN_DAYS` consecutive days starting today. Every day
//! draws its own random subset of the wardrobe, gets a grid composite of
//! those outfits, and the matching day of the forecast when one is available.
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use super::imaging::{CompositeService, Layout};
use super::providers::WeatherProvider;
use crate::models::{DailyPlan, DailyPlans, ForecastDay, Outfit, WeeklyPlan};

pub const PLAN_DAYS: usize = 3;
pub const MIN_DAILY_OUTFITS: usize = 3;
pub const MAX_DAILY_OUTFITS: usize = 5;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PlanError {
    #[error("No outfits found in wardrobe. Please add some outfits first.")]
    EmptyWardrobe,
}

/// Draws 3 to 5 distinct outfits, or the whole wardrobe when it is smaller
pub fn select_daily_outfits<'a, R: Rng + ?Sized>(outfits: &'a [Outfit], rng: &mut R) -> Vec<&'a Outfit> {
    let size = rng
        .gen_range(MIN_DAILY_OUTFITS..=MAX_DAILY_OUTFITS)
        .min(outfits.len());
    outfits.choose_multiple(rng, size).collect()
}

/// Outfits picked for one calendar day
#[derive(Debug, Clone)]
pub struct DaySelection {
    pub date: NaiveDate,
    pub outfits: Vec<Outfit>,
}

/// Independent selections for each plan day starting at `today`
pub fn plan_selections<R: Rng + ?Sized>(
    outfits: &[Outfit],
    today: NaiveDate,
    rng: &mut R,
) -> Result<Vec<DaySelection>, PlanError> {
    if outfits.is_empty() {
        return Err(PlanError::EmptyWardrobe);
    }

    Ok((0..PLAN_DAYS)
        .map(|offset| DaySelection {
            date: today + Duration::days(offset as i64),
            outfits: select_daily_outfits(outfits, rng)
                .into_iter()
                .cloned()
                .collect(),
        })
        .collect())
}

/// Wraps generated daily plans into a new stored plan record
pub fn build_weekly_plan(wardrobe_id: &str, daily_plans: DailyPlans, now: DateTime<Utc>) -> WeeklyPlan {
    WeeklyPlan {
        plan_id: Uuid::new_v4().to_string(),
        wardrobe_id: wardrobe_id.to_string(),
        created_at: now,
        week_start: now.date_naive(),
        daily_plans,
    }
}

#[derive(Clone)]
pub struct WeeklyPlanner {
    composites: CompositeService,
    weather: Option<Arc<dyn WeatherProvider>>,
}

impl WeeklyPlanner {
    pub fn new(composites: CompositeService, weather: Option<Arc<dyn WeatherProvider>>) -> Self {
        Self {
            composites,
            weather,
        }
    }

    /// Builds `day1..day3` for a wardrobe.
    ///
    /// Composite and weather failures only blank the affected fields.
    pub async fn generate_weekly_plan(
        &self,
        outfits: &[Outfit],
        wardrobe_id: &str,
        location: Option<(f64, f64)>,
        today: NaiveDate,
    ) -> Result<DailyPlans, PlanError> {
        let selections = {
            let mut rng = rand::thread_rng();
            plan_selections(outfits, today, &mut rng)?
        };

        let forecast = self.forecast(location).await;

        let mut daily_plans = DailyPlans::new();
        for (offset, selection) in selections.into_iter().enumerate() {
            let image_url = self.composite_url(&selection.outfits).await;
            let weather = forecast.get(offset);

            let plan = DailyPlan {
                date: selection.date,
                day: selection.date.format("%A").to_string(),
                image_url,
                outfit_ids: selection
                    .outfits
                    .iter()
                    .map(|o| o.outfit_id.clone())
                    .collect(),
                temperature: weather.and_then(|w| w.avg_temp_c),
                condition: weather.and_then(|w| w.condition_text.clone()),
                condition_icon: weather.and_then(|w| w.condition_icon.clone()),
            };

            daily_plans.insert(format!("day{}", offset + 1), plan);
        }

        tracing::info!(
            wardrobe_id = %wardrobe_id,
            wardrobe_size = outfits.len(),
            days = daily_plans.len(),
            with_weather = !forecast.is_empty(),
            "Weekly plan generated"
        );

        Ok(daily_plans)
    }

    /// One random selection with its composite URL
    pub async fn suggest(&self, outfits: &[Outfit]) -> Result<(Vec<Outfit>, Option<String>), PlanError> {
        if outfits.is_empty() {
            return Err(PlanError::EmptyWardrobe);
        }

        let selection: Vec<Outfit> = {
            let mut rng = rand::thread_rng();
            select_daily_outfits(outfits, &mut rng)
                .into_iter()
                .cloned()
                .collect()
        };

        let image_url = self.composite_url(&selection).await;
        Ok((selection, image_url))
    }

    async fn composite_url(&self, outfits: &[Outfit]) -> Option<String> {
        let urls: Vec<String> = outfits.iter().map(|o| o.image_url.clone()).collect();

        match self.composites.create_and_upload(&urls, Layout::Grid).await {
            Ok(blob) => Some(blob.url),
            Err(e) => {
                tracing::warn!(error = %e, images = urls.len(), "Composite failed, leaving image empty");
                None
            }
        }
    }

    async fn forecast(&self, location: Option<(f64, f64)>) -> Vec<ForecastDay> {
        let (Some(provider), Some((latitude, longitude))) = (&self.weather, location) else {
            return Vec::new();
        };

        match provider.forecast(latitude, longitude, PLAN_DAYS).await {
            Ok(days) => days,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    provider = provider.name(),
                    "Weather lookup failed, planning without weather"
                );
                Vec::new()
            }
        }
    }
}
