mod conversions;
mod types;

pub use types::{
    AnomalyRequest, AnomalyResponse, EvaluationResponse, PdrRequest, PdrResponse,
    SqlRejectedResponse, SqlRequest, SqlResponse,
};
