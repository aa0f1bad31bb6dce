//! Request and response models for the Brain API.

mod chat;
mod filters;
mod health;
mod insights;
mod visualization;

pub use chat::{
    AnalysisRequest, AnalysisResponse, ChatRequest, ChatResponse, ChatRole, ChatTurn,
    Conversation, DiagramResponse, VisualizeRequest,
};
pub use filters::{DataFilters, Gender};
pub use health::{AiHealth, DatabaseHealth, HealthStatus, PoolStats, PoolStatus};
pub use insights::{InsightMetric, InsightSection, InsightSummary};
pub use visualization::{
    AgeGroupCount, CategoryCount, CategoryList, DataVisualization, GenderCount, StayCount,
    TimeSeriesPoint,
};
