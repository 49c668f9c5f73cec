use std::io;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::info;

use pow_node::api;
use pow_node::config::NodeConfig;
use pow_node::network::HttpChainFetcher;
use pow_node::node::Node;

#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = NodeConfig::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let fetcher = HttpChainFetcher::new(config.peer_timeout).map_err(io::Error::other)?;
    let node = Node::new(&config, Arc::new(fetcher)).map_err(io::Error::other)?;

    println!(
        "⛓️ Starting node {} at http://{}:{}",
        config.node_id, config.host, config.port
    );
    info!("peers: {:?}", node.peers());

    let state = web::Data::new(node);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
