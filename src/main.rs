use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use quizzes_server::{
    app_state::AppState,
    auth::{AuthMiddleware, JwtService},
    config::Config,
    db::Database,
    graphql::create_schema,
    handlers::{
        configure_session_routes, graphiql, graphql, health_check, health_check_live,
        health_check_ready,
    },
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    if !cfg!(debug_assertions) {
        config.validate_for_production();
    }

    let db = Database::connect(&config)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let state = AppState::new(config.clone(), &db)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let topics = state.topic_service.initialize().await;
    log::info!("{} topics available", topics.len());

    let _sweeper = state
        .session_service
        .clone()
        .spawn_sweeper(std::time::Duration::from_secs(60));

    let schema = create_schema(state.clone());
    let jwt_service = state.jwt_service.as_ref().clone();
    let state = std::sync::Arc::new(state);

    let bind = (config.web_server_host.clone(), config.web_server_port);
    log::info!("Starting HTTP server on {}:{}", bind.0, bind.1);
    log::info!("GraphiQL playground: http://{}:{}/graphiql", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(schema.clone()))
            .app_data(web::Data::new(jwt_service.clone()))
            .app_data(web::Data::new(db.clone()))
            .wrap(AuthMiddleware)
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .service(health_check)
            .service(health_check_live)
            .service(health_check_ready)
            .service(graphql)
            .service(graphiql)
            .configure(configure_session_routes)
    })
    .bind(bind)?
    .run()
    .await
}
