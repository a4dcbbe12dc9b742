//! Booking handler.

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    response::Response,
};

use super::super::types::AppState;
use super::search::respond;

/// `POST /reservation?inDate=..&outDate=..&hotelId=..&customerName=..[&number=..]`
///
/// A full hotel is still a 200, with `"reserved": false`.
pub async fn reservation_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    respond(state.stack.frontend.reserve(&params).await)
}
