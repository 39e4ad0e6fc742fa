//! HTTP surface
//!
//! Wires the four endpoint handlers to warp routes and maps handler
//! outcomes to HTTP responses: 200 with the JSON document on success, or a
//! structured JSON error body with the matching status code.

use std::net::SocketAddr;
use std::sync::Arc;

use warp::http::StatusCode;
use warp::{Filter, Reply};

use crate::error::ApiError;
use crate::handlers::Gateway;
use crate::xml::XmlObject;

/// Builds the route tree for a gateway.
pub fn routes(
    gateway: Arc<Gateway>,
) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    let context = warp::any().map(move || Arc::clone(&gateway));

    let alerts = warp::path!("weather" / "alerts" / String)
        .and(warp::get())
        .and(context.clone())
        .and_then(|zone_id: String, gateway: Arc<Gateway>| async move {
            Ok::<_, warp::Rejection>(to_response(gateway.alerts(&zone_id).await))
        });

    let observations = warp::path!("weather" / "current-observations" / String)
        .and(warp::get())
        .and(context.clone())
        .and_then(|station: String, gateway: Arc<Gateway>| async move {
            Ok::<_, warp::Rejection>(to_response(gateway.current_observations(&station).await))
        });

    let forecast = warp::path!("weather" / "forecast" / String)
        .and(warp::get())
        .and(context.clone())
        .and_then(|zip_code: String, gateway: Arc<Gateway>| async move {
            Ok::<_, warp::Rejection>(to_response(gateway.forecast(&zip_code).await))
        });

    let glance = warp::path!("weather" / "forecast-glance" / String)
        .and(warp::get())
        .and(context)
        .and_then(|zip_code: String, gateway: Arc<Gateway>| async move {
            Ok::<_, warp::Rejection>(to_response(gateway.forecast_glance(&zip_code).await))
        });

    alerts.or(observations).or(forecast).or(glance)
}

/// Serves the gateway on `address` until the process exits.
pub async fn run(gateway: Arc<Gateway>, address: SocketAddr) {
    warp::serve(routes(gateway)).run(address).await
}

fn to_response(result: Result<XmlObject, ApiError>) -> warp::reply::Response {
    match result {
        Ok(document) => warp::reply::json(&document).into_response(),
        Err(error) => {
            let body = serde_json::json!({
                "error": error.code(),
                "message": error.to_string(),
                "identifier": error.identifier(),
            });
            warp::reply::with_status(warp::reply::json(&body), status_for(&error)).into_response()
        }
    }
}

fn status_for(error: &ApiError) -> StatusCode {
    match error {
        ApiError::InvalidInput { .. } | ApiError::ResolutionFailed { .. } => {
            StatusCode::BAD_REQUEST
        }
        ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
        ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
        ApiError::Transport { .. } => StatusCode::BAD_GATEWAY,
    }
}
