// src/api.rs
use crate::error::AppError;
use crate::service::ReportService;
use chrono::Local;
use log::{error, info, warn};
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

pub const API_KEY_HEADER: &str = "stock-api-key";

pub fn routes(
    service: Arc<ReportService>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    warp::path("report")
        .and(warp::path::end())
        .and(warp::get().or(warp::post()).unify())
        .and(warp::header::optional::<String>(API_KEY_HEADER))
        .and(with_service(service))
        .and_then(report_handler)
        .recover(handle_rejection)
}

fn with_service(
    service: Arc<ReportService>,
) -> impl Filter<Extract = (Arc<ReportService>,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}

async fn report_handler(
    api_key: Option<String>,
    service: Arc<ReportService>,
) -> Result<impl Reply, Rejection> {
    if let Err(e) = service.authorize(api_key.as_deref()) {
        warn!("Rejected report request: missing or wrong {}", API_KEY_HEADER);
        return Err(warp::reject::custom(e));
    }

    match service.run(Local::now()).await {
        Ok(json) => {
            info!("Report run finished.");
            Ok(warp::reply::with_header(
                json,
                "content-type",
                "application/json",
            ))
        }
        Err(e) => {
            error!("Report run failed: {}", e);
            Err(warp::reject::custom(e))
        }
    }
}

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, body) = if let Some(e) = err.find::<AppError>() {
        (e.status(), e.to_string())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not found".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "method not allowed".to_string(),
        )
    } else {
        (StatusCode::BAD_REQUEST, format!("{:?}", err))
    };
    Ok(warp::reply::with_status(body, status))
}
