pub mod chat;
pub mod outfit;
pub mod plan;
pub mod user;
pub mod weather;

pub use chat::{ChatMessage, ChatRequest, ChatResponse};
pub use outfit::{
    DeleteOutfitQuery, GetOutfitsResponse, Outfit, ResultResponse, SuggestOutfitRequest,
    SuggestOutfitResponse, Tags, UpdateOutfitRequest, UploadOutfitResponse,
};
pub use plan::{
    CreateWeeklyPlanResponse, DailyPlan, DailyPlans, GetWeeklyPlanResponse, PlanWeekRequest,
    WeeklyPlan,
};
pub use user::{LoginRequest, SessionResponse, SignUpRequest, SignUpResponse, User};
pub use weather::ForecastDay;
