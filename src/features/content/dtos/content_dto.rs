use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Body of `POST /api/hero`: the same `{data}` shape the endpoint returns
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HeroContentDto {
    /// Hero document. `texts` drives `title`, `subtitle`, `companyName` and `description`.
    #[schema(value_type = Object)]
    pub data: Value,
}
