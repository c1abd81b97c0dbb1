//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use emote_portal::Trace;
#[cfg(debug_assertions)]
use emote_portal::doc::ApiDoc;
use emote_portal::inbound::http::cdn::{get_asset, purge_asset};
use emote_portal::inbound::http::emote_sets::get_emote_set;
use emote_portal::inbound::http::emotes::get_emote;
use emote_portal::inbound::http::health::{HealthState, live, ready};
use emote_portal::inbound::http::special_events::{get_special_event, list_special_events};
use emote_portal::inbound::http::state::HttpState;
use emote_portal::inbound::http::users::{
    get_user, get_user_entitlements, list_user_emote_sets, list_user_emotes,
};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let api = web::scope("/api/v1")
        .service(get_user)
        .service(get_user_entitlements)
        .service(list_user_emotes)
        .service(list_user_emote_sets)
        .service(get_emote)
        .service(get_emote_set)
        .service(list_special_events)
        .service(get_special_event);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(get_asset)
        .service(purge_asset)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// The server is marked ready once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when the catalogue seed cannot be loaded, a
/// CDN setting is invalid, or binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config.settings)?;
    let ServerConfig {
        bind_addr,
        settings: _,
        #[cfg(feature = "metrics")]
        prometheus,
    } = config;
    #[cfg(feature = "metrics")]
    let prometheus = match prometheus {
        Some(prometheus) => prometheus,
        None => default_metrics()?,
    };

    let server = HttpServer::new(move || {
        let app = build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        });

        #[cfg(feature = "metrics")]
        let app = app.wrap(prometheus.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

/// Prometheus middleware exposing `/metrics` under the `emote_portal` namespace.
///
/// # Errors
/// Returns [`std::io::Error`] when the default collectors fail to register.
#[cfg(feature = "metrics")]
pub fn default_metrics() -> std::io::Result<actix_web_prom::PrometheusMetrics> {
    actix_web_prom::PrometheusMetricsBuilder::new("emote_portal")
        .endpoint("/metrics")
        .build()
        .map_err(|err| std::io::Error::other(format!("metrics registration failed: {err}")))
}
