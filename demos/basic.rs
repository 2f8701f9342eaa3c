//! Minimal trellis example: a users API, a subdomain party and custom
//! error pages.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl -X POST http://localhost:3000/users -d 'name=alice' \
//!        -H 'content-type: application/x-www-form-urlencoded'
//!   curl http://localhost:3000/files/css/site.css
//!   curl -H 'Host: acme.localhost:3000' http://localhost:3000/whoami
//!   curl http://localhost:3000/nope

use trellis::{Config, Context, Mux, Server, StatusCode, middleware};

#[tokio::main]
async fn main() -> Result<(), trellis::Error> {
    tracing_subscriber::fmt::init();

    let mut mux = Mux::with_config(Config::default().with_host("localhost:3000"));
    {
        let mut users = mux.party("/users");
        users.middleware(middleware::trace());
        users.get("/:id", get_user)?;
        users.post("", create_user)?;
        users.delete("/:id", |ctx: &mut Context| ctx.set_status(StatusCode::NO_CONTENT))?;
    }
    mux.get("/files/*path", |ctx: &mut Context| {
        let path = ctx.param("path").unwrap_or_default().to_owned();
        ctx.text(StatusCode::OK, format!("would serve {path}"));
    })?;
    mux.party("*.").get("/whoami", |ctx: &mut Context| {
        let tenant = ctx.param("subdomain").unwrap_or_default().to_owned();
        ctx.text(StatusCode::OK, format!("tenant {tenant}"));
    })?;

    mux.on_error(StatusCode::NOT_FOUND, |ctx: &mut Context| {
        ctx.text(StatusCode::NOT_FOUND, "nothing here");
    });
    mux.on_error(StatusCode::INTERNAL_SERVER_ERROR, |ctx: &mut Context| {
        ctx.text(StatusCode::INTERNAL_SERVER_ERROR, "something broke");
    });

    Server::bind("0.0.0.0:3000")?.serve(mux).await
}

// GET /users/:id
fn get_user(ctx: &mut Context) {
    let id = ctx.param("id").unwrap_or_default().to_owned();
    ctx.set_header("content-type", "application/json");
    ctx.write_str(&format!(r#"{{"id":"{id}","name":"alice"}}"#));
}

// POST /users
fn create_user(ctx: &mut Context) {
    let Some(name) = ctx.form_value("name").map(str::to_owned) else {
        ctx.emit_error(StatusCode::BAD_REQUEST);
        return;
    };
    ctx.set_status(StatusCode::CREATED);
    ctx.set_header("location", "/users/99");
    ctx.set_header("content-type", "application/json");
    ctx.write_str(&format!(r#"{{"id":"99","name":"{name}"}}"#));
}
