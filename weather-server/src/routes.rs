//! HTTP JSON API.
//!
//! - `GET /api/weather/{city}`: fetch, store and return the current reading
//! - `GET /api/weather/history/{city}`: up to ten stored readings, newest first

use percent_encoding::percent_decode_str;
use serde::Serialize;
use std::convert::Infallible;
use warp::{
    Filter, Rejection, Reply,
    http::StatusCode,
    reply::{self, Response},
};

use weather_core::{ServiceError, WeatherService};

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

pub fn api(
    service: WeatherService,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let history = warp::path!("api" / "weather" / "history" / String)
        .and(warp::get())
        .and(with_service(service.clone()))
        .and_then(get_history);

    let current = warp::path!("api" / "weather" / String)
        .and(warp::get())
        .and(with_service(service))
        .and_then(get_current);

    history.or(current).unify().with(warp::trace::request())
}

fn with_service(
    service: WeatherService,
) -> impl Filter<Extract = (WeatherService,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}

async fn get_current(city: String, service: WeatherService) -> Result<Response, Infallible> {
    let reply = match service.get_current(&decode_segment(&city)).await {
        Ok(reading) => reply::json(&reading).into_response(),
        Err(e) => error_reply(&e),
    };
    Ok(reply)
}

async fn get_history(city: String, service: WeatherService) -> Result<Response, Infallible> {
    let reply = match service.get_history(&decode_segment(&city)).await {
        Ok(history) => reply::json(&history).into_response(),
        Err(e) => error_reply(&e),
    };
    Ok(reply)
}

fn decode_segment(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

fn error_reply(err: &ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorBody { error: err.user_message() };
    reply::with_status(reply::json(&body), status).into_response()
}
