// Route exports
pub mod auth;
pub mod errors;
pub mod history;
pub mod matches;

use actix_web::web;

pub use errors::{handle_json_payload_error, handle_query_payload_error, ApiError};
pub use matches::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(matches::health_check))
        .service(
            web::scope("/api")
                .configure(matches::configure)
                .configure(history::configure),
        );
}
