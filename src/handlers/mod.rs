pub mod graphql_handler;
pub mod health_handler;
pub mod session_handler;

pub use graphql_handler::{graphiql, graphql};
pub use health_handler::{health_check, health_check_live, health_check_ready};
pub use session_handler::configure as configure_session_routes;
