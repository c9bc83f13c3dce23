use actix_web::{HttpResponse, Responder, get, web::Data};
use prometheus::{Encoder, Registry, TextEncoder};
use tracing::error;

/// Prometheus scrape endpoint
#[get("/metrics")]
pub async fn metrics_route(registry: Data<Registry>) -> impl Responder {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    match encoder.encode(&registry.gather(), &mut buffer) {
        Ok(()) => HttpResponse::Ok().content_type(encoder.format_type()).body(buffer),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            HttpResponse::InternalServerError().finish()
        }
    }
}
