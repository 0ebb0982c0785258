use actix_web::{web, HttpResponse, Responder};

use crate::models::error::ErrorBody;
use crate::models::trip::ItineraryRequest;
use crate::AppState;

pub const BUSY_MESSAGE: &str = "Sanchaara AI is currently busy. Please wait a moment and try again.";

/*
    /api/generate-itinerary
*/
pub async fn generate_itinerary(
    state: web::Data<AppState>,
    input: web::Json<ItineraryRequest>,
) -> impl Responder {
    let form = input.into_inner().form_data;

    match state.planner.plan(&form).await {
        Ok(itinerary) => HttpResponse::Ok().json(itinerary),
        Err(err) if err.is_client_error() => HttpResponse::BadRequest().json(ErrorBody::new(err.to_string())),
        Err(err) => {
            log::error!("Itinerary endpoint error: {}", err);
            HttpResponse::InternalServerError().json(ErrorBody::new(BUSY_MESSAGE).with_details(err.to_string()))
        }
    }
}
