mod chain;
mod health;
pub mod models;
mod nodes;
mod tx;

use actix_web::HttpResponse;
use actix_web::error::InternalError;
use actix_web::web::{self, ServiceConfig};
use log::{error, warn};

use crate::error::NodeError;
use models::MessageResponse;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.app_data(json_config())
        .service(health::health_check)
        .service(chain::full_chain)
        .service(chain::mine)
        .service(tx::new_transaction)
        .service(nodes::register_nodes)
        .service(nodes::resolve);
}

/// Malformed or incomplete JSON bodies become a 400 with a message.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req| {
        let message = format!("Missing or invalid values: {err}");
        warn!("{} {} - rejected body: {err}", req.method(), req.path());
        let response = HttpResponse::BadRequest().json(MessageResponse { message });
        InternalError::from_response(err, response).into()
    })
}

pub(crate) fn error_response(err: &NodeError) -> HttpResponse {
    match err {
        NodeError::Validation(msg) => HttpResponse::BadRequest().json(MessageResponse {
            message: msg.clone(),
        }),
        other => {
            error!("API - request failed: {other}");
            HttpResponse::InternalServerError().json(MessageResponse {
                message: other.to_string(),
            })
        }
    }
}
