//! HTTP surface for the room keeper (spec.md §6): four JSON-over-HTTP
//! verbs under a configurable route prefix, bearer-token gated.

pub mod error;
pub mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use cc_auth::TokenValidator;
use cc_keeper::RoomKeeper;
use cc_scheduler::OpeningBook;

pub use error::ApiFailure;

/// Binding and routing knobs for [`run`]. The route prefix defaults to
/// empty, matching spec.md §6's "configurable prefix" without assuming
/// any particular mount point.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub route_prefix: String,
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            route_prefix: String::new(),
            workers: 6,
        }
    }
}

#[rustfmt::skip]
pub async fn run(
    keeper: Arc<RoomKeeper>,
    book: Arc<dyn OpeningBook>,
    validator: Arc<dyn TokenValidator>,
    config: ServerConfig,
) -> std::io::Result<()> {
    let keeper = web::Data::new(keeper);
    let book = web::Data::new(book);
    let validator = web::Data::new(validator);
    let prefix = config.route_prefix.clone();
    log::info!("starting room keeper server on {}", config.bind_addr);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .app_data(keeper.clone())
            .app_data(book.clone())
            .app_data(validator.clone())
            .service(
                web::scope(&prefix)
                    .route("/hello", web::post().to(handlers::hello))
                    .route("/job", web::post().to(handlers::job))
                    .route("/update", web::post().to(handlers::update))
                    .route("/bye", web::post().to(handlers::bye)),
            )
    })
    .workers(config.workers)
    .bind(config.bind_addr.clone())?
    .run()
    .await
}
