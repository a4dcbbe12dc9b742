//! Search and recommendation handlers.

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use serde::Serialize;

use super::super::types::{AppState, ErrorBody};
use crate::error_handling::SearchError;

/// `GET /hotels?inDate=..&outDate=..&lat=..&lon=..[&locale=..]`
pub async fn hotels_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    respond(state.stack.frontend.search_hotels(&params).await)
}

/// `GET /recommendations?lat=..&lon=..&require=..[&locale=..]`
pub async fn recommendations_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    respond(state.stack.frontend.recommend(&params).await)
}

pub(super) fn respond<T: Serialize>(result: Result<T, SearchError>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => (
            status_code(&e),
            Json(ErrorBody {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

fn status_code(error: &SearchError) -> StatusCode {
    match error {
        SearchError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        SearchError::DeadlineExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::{CacheError, StoreError};
    use std::time::Duration;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            status_code(&SearchError::invalid("lat")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_code(&SearchError::DeadlineExceeded(Duration::from_secs(1))),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_code(&StoreError::Unavailable("down".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_code(&CacheError::Unavailable("down".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_code(&SearchError::Cancelled),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
