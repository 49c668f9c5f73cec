use actix_web::{HttpResponse, Responder, get, post, web};

use super::error_response;
use super::models::{RegisterNodesRequest, RegisterNodesResponse, ResolveResponse};
use crate::node::Node;

#[post("/nodes/register")]
pub async fn register_nodes(
    node: web::Data<Node>,
    body: web::Json<RegisterNodesRequest>,
) -> impl Responder {
    match node.register_peers(body.nodes.as_slice()) {
        Ok(total_nodes) => HttpResponse::Created().json(RegisterNodesResponse {
            message: "New nodes have been added",
            total_nodes,
        }),
        Err(e) => error_response(&e),
    }
}

/// Run longest-chain consensus against every known peer.
#[get("/nodes/resolve")]
pub async fn resolve(node: web::Data<Node>) -> impl Responder {
    match node.resolve_consensus().await {
        Ok((replaced, new_chain)) => HttpResponse::Ok().json(ResolveResponse {
            message: if replaced {
                "Blockchain was replaced"
            } else {
                "Blockchain is authoritative"
            },
            new_chain,
        }),
        Err(e) => error_response(&e),
    }
}
