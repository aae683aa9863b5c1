use std::io;

use actix_cors::Cors;
use actix_web::{
    middleware::{Condition, Logger},
    web, App, HttpServer,
};

use taskhub::{
    error::development_details, ratelimit::RateLimit, routes, security::security_headers,
    AppState, Config,
};

fn startup_error(e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;
    let development = config.is_development();

    let state = AppState::from_config(&config)
        .await
        .map_err(startup_error)?;
    if let Some((email, password)) = &config.admin_seed {
        state
            .seed_admin(email, password)
            .await
            .map_err(startup_error)?;
    }

    let state = web::Data::new(state);
    let api_prefix = config.api_prefix.clone();

    log::info!(
        "Starting TaskHub server at {} ({} rate limiter)",
        config.server_url(),
        state.rate_limiter.backend()
    );

    HttpServer::new(move || {
        let api_prefix = api_prefix.clone();
        App::new()
            .app_data(state.clone())
            .wrap(Condition::new(development, development_details()))
            .wrap(RateLimit::new(state.rate_limiter.clone()))
            .wrap(security_headers(!development))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(move |cfg| routes::configure(cfg, &api_prefix))
            .default_service(web::to(routes::not_found))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
