use std::sync::Arc;

use http::Method;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use switchback::{cors, handler_fn, logging, HttpError, HttpServer, Mux, RouterService};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut mux = Mux::new();
    mux.wrap(logging());

    mux.get(
        "/health",
        handler_fn(|ctx| ctx.json(&json!({"status": "ok"}))),
    );

    mux.group("/api/v1", |api| {
        api.wrap(cors());

        api.get(
            "/users/:id",
            handler_fn(|ctx| {
                let id = ctx
                    .param("id")
                    .ok_or_else(|| HttpError::new(400, "missing id"))?
                    .to_string();
                ctx.json(&json!({"id": id}))
            }),
        );

        api.post(
            "/users",
            handler_fn(|ctx| {
                let body = ctx
                    .body()
                    .cloned()
                    .ok_or_else(|| HttpError::new(400, "request body required"))?;
                ctx.set_status(201);
                ctx.json(&body)
            }),
        );

        api.route(
            Method::GET,
            "/teams/:team/members/:id",
            handler_fn(|ctx| {
                let team = ctx.param("team").unwrap_or_default().to_string();
                let id = ctx.param("id").unwrap_or_default().to_string();
                ctx.json(&json!({"team": team, "id": id}))
            }),
        );
    });

    mux.get(
        "/files/*path",
        handler_fn(|ctx| {
            let path = ctx.param("path").unwrap_or_default().to_string();
            ctx.json(&json!({"path": path}))
        }),
    );

    let addr = std::env::var("SWITCHBACK_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    info!(%addr, "starting server");

    let server = HttpServer(RouterService::new(Arc::new(mux)));
    let handle = server.start(&addr)?;
    handle
        .join()
        .map_err(|_| anyhow::anyhow!("server thread panicked"))?;
    Ok(())
}
