pub mod handlers;

pub use handlers::bridge::*;
pub use handlers::health::*;

use actix_web::web;

/// Register every relay endpoint
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(
        web::scope("/api")
            .service(get_status)
            .service(connect)
            .service(disconnect)
            .service(scan)
            .service(get_balances)
            .service(find_routes)
            .service(get_routes)
            .service(select_route)
            .service(execute)
            .service(get_history),
    );
}
