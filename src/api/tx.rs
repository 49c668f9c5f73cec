use actix_web::{HttpResponse, Responder, post, web};
use log::info;

use super::error_response;
use super::models::{MessageResponse, NewTransactionRequest};
use crate::node::Node;

/// Queue a transaction for the next mined block.
#[post("/transactions/new")]
pub async fn new_transaction(
    node: web::Data<Node>,
    body: web::Json<NewTransactionRequest>,
) -> impl Responder {
    match node.submit_transaction(&body.sender, &body.recipient, body.amount) {
        Ok(index) => {
            info!("POST /transactions/new - queued for block #{index}");
            HttpResponse::Created().json(MessageResponse {
                message: format!("Transaction will be added to Block {index}"),
            })
        }
        Err(e) => error_response(&e),
    }
}
