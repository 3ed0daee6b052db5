//! Wire types for the text-analysis collaborator.
//!
//! The backend itself is external; this module owns only the request/response
//! shape and the client-side validation applied before the data reaches the
//! chart or the recorder.

use crate::{
    foundation::error::{ChartcastError, ChartcastResult},
    model::profile::ChartKind,
    model::series::SeriesSet,
};

/// Request body for the analysis endpoint.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AnalyzeRequest {
    /// Free-form text describing the data to visualize.
    pub text: String,
}

/// Successful analysis response.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    /// Extracted series, ready for charting.
    pub data_series: SeriesSet,
    /// The chart kind the backend considers the best fit.
    pub recommended_chart_type: ChartKind,
    /// Human-readable rationale for the recommendation.
    pub chart_type_explanation: String,
}

/// Typed error body returned by the analysis endpoint.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AnalyzeErrorBody {
    /// Short error code or message.
    pub error: String,
    /// Optional free-form details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Either side of an analysis exchange.
#[derive(Clone, Debug)]
pub enum AnalyzeOutcome {
    /// The backend extracted usable data.
    Success(AnalyzeResponse),
    /// The backend returned its typed error body.
    Failure(AnalyzeErrorBody),
}

impl AnalyzeResponse {
    /// Validate the payload the way the original client does: at least one
    /// data point, every point labelled with a finite value.
    pub fn validate(&self) -> ChartcastResult<()> {
        if self.data_series.is_empty() {
            return Err(ChartcastError::validation(
                "analysis returned no data points; try rephrasing with clearer numerical values",
            ));
        }
        self.data_series.validate()
    }
}

/// Parse a raw response body, distinguishing the success shape from the typed
/// error shape.
pub fn parse_analyze_response(body: &str) -> ChartcastResult<AnalyzeOutcome> {
    if let Ok(err) = serde_json::from_str::<AnalyzeErrorBody>(body) {
        // The error body is the smaller shape; only treat it as an error when
        // the success fields are genuinely absent.
        if serde_json::from_str::<AnalyzeResponse>(body).is_err() {
            return Ok(AnalyzeOutcome::Failure(err));
        }
    }

    let resp: AnalyzeResponse = serde_json::from_str(body).map_err(|e| {
        ChartcastError::validation(format!("malformed analysis response: {e}"))
    })?;
    resp.validate()?;
    Ok(AnalyzeOutcome::Success(resp))
}
