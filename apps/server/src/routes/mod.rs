use actix_web::{HttpResponse, Responder, get, web::ServiceConfig};

mod metrics;

/// Routes served on the debug address
pub fn routes(cfg: &mut ServiceConfig) {
    cfg.service(liveness_route).service(metrics::metrics_route);
}

/// Liveness probe for the daemon itself, answers once the debug server is up.
#[get("/")]
async fn liveness_route() -> impl Responder {
    HttpResponse::NoContent()
}
