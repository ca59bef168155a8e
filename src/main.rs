use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use testseries_server::{
    app_state::AppState, auth::JwtService, config::Config, handlers,
    middleware::RequestIdMiddleware,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    if config.is_production() {
        config.validate_for_production().map_err(std::io::Error::other)?;
    }

    let state = AppState::new(config.clone())
        .await
        .map_err(std::io::Error::other)?;
    let jwt_service = JwtService::new(&config.jwt_secret, config.jwt_expiration_hours);

    let bind = (config.web_server_host.clone(), config.web_server_port);
    log::info!("Starting HTTP server on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        let cors = match &config.cors_allowed_origin {
            Some(origin) => Cors::default()
                .allowed_origin(origin)
                .allow_any_method()
                .allow_any_header()
                .max_age(3600),
            None => Cors::permissive(),
        };

        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(jwt_service.clone()))
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(RequestIdMiddleware)
            .configure(handlers::configure)
    })
    .bind(bind)?
    .run()
    .await
}
