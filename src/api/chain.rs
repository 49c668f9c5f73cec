use actix_web::{HttpResponse, Responder, get, web};

use super::error_response;
use super::models::{ChainResponse, MineResponse};
use crate::node::Node;

/// Get the full blockchain.
#[get("/chain")]
pub async fn full_chain(node: web::Data<Node>) -> impl Responder {
    let (chain, length) = node.get_chain();
    HttpResponse::Ok().json(ChainResponse { chain, length })
}

/// Mine a block from the pending pool, paying this node's identity.
#[get("/mine")]
pub async fn mine(node: web::Data<Node>) -> impl Responder {
    match node.mine_next_block(node.identity()).await {
        Ok(block) => HttpResponse::Ok().json(MineResponse {
            message: "New Block Forged",
            block,
        }),
        Err(e) => error_response(&e),
    }
}
