use std::sync::Arc;
use std::thread;

use trellis::{
    Action, Config, Context, Controller, Handler, Method, Mux, Request, Response, RouteError, StatusCode,
};

const HOST: &str = "localhost:8080";

fn request(mux: &Mux, method: Method, path: &str) -> Response {
    mux.serve(Request::new(method, HOST, path))
}

fn body(text: &'static str) -> impl Handler {
    move |ctx: &mut Context| ctx.write_str(text)
}

fn boom(_: &mut Context) {
    panic!("boom");
}

fn unreachable_unit(_: &mut Context) {
    panic!("terminal unit must not run");
}

#[test]
fn every_method_routes_its_own_tree() {
    let mut mux = Mux::new();
    for method in Method::ALL {
        let path = format!("/test_{}", method.as_str().to_lowercase());
        let text = format!("hello, {}!", method.as_str().to_lowercase());
        mux.handle(method, &path, move |ctx: &mut Context| ctx.write_str(&text))
            .unwrap();
    }

    for method in Method::ALL {
        let name = method.as_str().to_lowercase();

        let res = request(&mux, method, &format!("/test_{name}"));
        assert_eq!(res.status(), StatusCode::OK, "{method}");
        assert_eq!(res.text(), format!("hello, {name}!"));

        let res = request(&mux, method, &format!("/test_{name}_nofound"));
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{method}");
        assert!(res.body().is_empty());
    }

    // registered for GET only
    assert_eq!(request(&mux, Method::Post, "/test_get").status(), StatusCode::NOT_FOUND);
}

#[test]
fn static_route_has_no_params() {
    let mut mux = Mux::new();
    mux.get("/about", body("about")).unwrap();

    let dispatch = mux.dispatch(&Request::new(Method::Get, HOST, "/about"));
    assert!(dispatch.matched);
    assert!(dispatch.params.is_empty());
    assert_eq!(dispatch.chain.len(), 1);
}

#[test]
fn path_parameters() {
    let mut mux = Mux::new();
    let echo = |ctx: &mut Context| {
        let params = ctx.params().to_string();
        ctx.write_str(&params);
    };
    mux.get("/test_get_parameter1/:name", echo).unwrap();
    mux.get("/test_get_parameter2/:name/details/:something", echo).unwrap();
    mux.get("/test_get_parameter2/:name/details/:something/*else", echo).unwrap();

    let cases = [
        ("/test_get_parameter1/iris", "name=iris"),
        ("/test_get_parameter2/iris/details/anything", "name=iris,something=anything"),
        (
            "/test_get_parameter2/iris/details/anything/elsehere",
            "name=iris,something=anything,else=/elsehere",
        ),
    ];
    for (path, expected) in cases {
        let res = request(&mux, Method::Get, path);
        assert_eq!(res.status(), StatusCode::OK, "{path}");
        assert_eq!(res.text(), expected, "{path}");
    }

    let dispatch = mux.dispatch(&Request::new(
        Method::Get,
        HOST,
        "/test_get_parameter2/iris/details/anything/elsehere",
    ));
    assert_eq!(dispatch.params.get("else"), Some("/elsehere"));
}

#[test]
fn query_parameters_are_separate_from_path_parameters() {
    let mut mux = Mux::new();
    mux.get("/details/:name", |ctx: &mut Context| {
        let out = format!(
            "name={},highlight={},path_params={},url_params={}",
            ctx.param("name").unwrap_or_default(),
            ctx.url_param("highlight").unwrap_or_default(),
            ctx.params().len(),
            ctx.url_params(),
        );
        ctx.text(StatusCode::OK, out);
    })
    .unwrap();

    let res = mux.serve(
        Request::new(Method::Get, HOST, "/details/Sakamoto desu ga").with_query("highlight=text&x=1"),
    );
    assert_eq!(
        res.text(),
        "name=Sakamoto desu ga,highlight=text,path_params=1,url_params=highlight=text,x=1"
    );
    assert_eq!(res.header("content-type"), Some("text/plain; charset=utf-8"));
}

#[test]
fn static_segment_wins_over_named() {
    let mut mux = Mux::new();
    mux.get("/users/:id", |ctx: &mut Context| {
        let id = ctx.param("id").unwrap_or_default().to_owned();
        ctx.write_str(&format!("user {id}"));
    })
    .unwrap();
    mux.get("/users/me", body("me")).unwrap();

    assert_eq!(request(&mux, Method::Get, "/users/me").text(), "me");
    assert_eq!(request(&mux, Method::Get, "/users/7").text(), "user 7");

    let dispatch = mux.dispatch(&Request::new(Method::Get, HOST, "/users/me"));
    assert!(dispatch.params.get("id").is_none());
}

#[test]
fn registration_errors_are_returned() {
    let mut mux = Mux::new();
    mux.get("/users/:id", body("")).unwrap();

    assert_eq!(
        mux.get("/users/:id", body("")),
        Err(RouteError::Duplicate { path: "/users/:id".into() })
    );
    assert!(matches!(
        mux.get("/users/:name/posts", body("")),
        Err(RouteError::ParamConflict { .. })
    ));
    assert!(matches!(
        mux.get("/files/*path/raw", body("")),
        Err(RouteError::WildcardNotLast { .. })
    ));

    // same path, different method, is a different route
    assert!(mux.post("/users/:id", body("")).is_ok());

    let mut party = mux.party("/v1");
    assert!(party.get("/users/:id", body("")).is_ok());
    assert!(matches!(
        party.get("/users/:id", body("")),
        Err(RouteError::Duplicate { .. })
    ));
}

#[test]
fn party_prefixes() {
    let mut mux = Mux::new();
    let h = |ctx: &mut Context| {
        let out = format!("{}{}", ctx.host(), ctx.path());
        ctx.write_str(&out);
    };
    {
        let mut p = mux.party("/party1");
        p.get("/", h).unwrap();
        p.get("/path1", h).unwrap();
        p.get("/path2", h).unwrap();
        p.get("/namedpath/:param1/something/:param2", h).unwrap();
        p.get("/namedpath/:param1/something/:param2/else", h).unwrap();
        p.put("/path1", h).unwrap();
    }

    for path in [
        "/party1/",
        "/party1/path1",
        "/party1/path2",
        "/party1/namedpath/theparam1/something/theparam2",
        "/party1/namedpath/theparam1/something/theparam2/else",
    ] {
        let res = request(&mux, Method::Get, path);
        assert_eq!(res.status(), StatusCode::OK, "{path}");
        assert_eq!(res.text(), format!("{HOST}{path}"));
    }

    assert_eq!(request(&mux, Method::Put, "/party1/path1").status(), StatusCode::OK);
    assert_eq!(request(&mux, Method::Put, "/path1").status(), StatusCode::NOT_FOUND);
}

#[test]
fn nested_parties_concatenate_prefixes_and_middleware() {
    let mut mux = Mux::new();
    {
        let mut api = mux.party("/api");
        api.middleware(|ctx: &mut Context| {
            ctx.write_str("api>");
            ctx.next();
        });
        let mut v1 = api.party("/v1");
        v1.middleware(|ctx: &mut Context| {
            ctx.write_str("v1>");
            ctx.next();
        });
        v1.get("/ping", body("pong")).unwrap();
    }

    assert_eq!(request(&mux, Method::Get, "/api/v1/ping").text(), "api>v1>pong");
    assert_eq!(request(&mux, Method::Get, "/v1/ping").status(), StatusCode::NOT_FOUND);
}

#[test]
fn middleware_can_short_circuit_and_share_values() {
    let mut mux = Mux::new();
    let authenticate = |ctx: &mut Context| {
        if ctx.header("authorization").is_some() {
            ctx.set("user", String::from("username"));
        }
        ctx.next();
    };
    let require_user = |ctx: &mut Context| {
        if ctx.get::<String>("user").is_some_and(|u| u == "username") {
            ctx.write_str("I assume that you are authenticated\n");
            ctx.next();
        } else {
            ctx.set_status(StatusCode::UNAUTHORIZED);
        }
    };
    mux.handle_chain(
        Method::Get,
        "/secret",
        vec![authenticate.boxed(), require_user.boxed(), body("secret").boxed()],
    )
    .unwrap();

    let res = mux.serve(Request::new(Method::Get, HOST, "/secret").with_header("Authorization", "token"));
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text(), "I assume that you are authenticated\nsecret");

    let res = request(&mux, Method::Get, "/secret");
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.body().is_empty());
}

#[test]
fn custom_error_handlers() {
    let not_found = "custom message for 404 not found";
    let internal = "custom message for 500 internal server error";

    let mut mux = Mux::new();
    for method in Method::ALL {
        let path = format!("/test_{}_panic_custom", method.as_str().to_lowercase());
        mux.handle(method, &path, |ctx: &mut Context| {
            ctx.write_str("partial output");
            ctx.emit_error(StatusCode::INTERNAL_SERVER_ERROR);
        })
        .unwrap();
    }
    mux.on_error(StatusCode::NOT_FOUND, move |ctx: &mut Context| ctx.write_str(not_found));
    mux.on_error(StatusCode::INTERNAL_SERVER_ERROR, move |ctx: &mut Context| ctx.write_str(internal));

    for method in Method::ALL {
        let name = method.as_str().to_lowercase();

        let res = request(&mux, method, &format!("/test_{name}_nofound_custom"));
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.text(), not_found);

        let res = request(&mux, method, &format!("/test_{name}_panic_custom"));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.text(), internal);
    }
}

#[test]
fn emit_error_skips_the_rest_of_the_chain() {
    let mut mux = Mux::new();
    mux.on_error(StatusCode::FORBIDDEN, body("forbidden"));
    mux.handle_chain(
        Method::Get,
        "/admin",
        vec![
            (|ctx: &mut Context| {
                ctx.emit_error(StatusCode::FORBIDDEN);
                ctx.next();
            })
            .boxed(),
            unreachable_unit.boxed(),
        ],
    )
    .unwrap();

    let res = request(&mux, Method::Get, "/admin");
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(res.text(), "forbidden");
}

#[test]
fn unregistered_error_status_has_no_body() {
    let mut mux = Mux::new();
    mux.get("/teapot", |ctx: &mut Context| {
        ctx.set_header("x-brew", "tea");
        ctx.write_str("short and stout");
        ctx.emit_error(StatusCode::IM_A_TEAPOT);
    })
    .unwrap();

    let res = request(&mux, Method::Get, "/teapot");
    assert_eq!(res.status(), StatusCode::IM_A_TEAPOT);
    assert!(res.body().is_empty());
    assert!(res.headers().is_empty());
}

#[test]
fn panics_become_500() {
    let mut mux = Mux::new();
    mux.get("/boom", boom).unwrap();
    mux.get("/fine", body("fine")).unwrap();

    let res = request(&mux, Method::Get, "/boom");
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.body().is_empty());

    mux.on_error(StatusCode::INTERNAL_SERVER_ERROR, body("recovered"));
    let res = request(&mux, Method::Get, "/boom");
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.text(), "recovered");

    // the mux keeps serving
    assert_eq!(request(&mux, Method::Get, "/fine").text(), "fine");
}

#[test]
fn panicking_error_handler_falls_back() {
    let mut mux = Mux::new();
    mux.on_error(StatusCode::NOT_FOUND, boom);

    let res = request(&mux, Method::Get, "/missing");
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.body().is_empty());
}

#[test]
fn error_chain_cannot_redispatch() {
    let mut mux = Mux::new();
    mux.on_error(StatusCode::NOT_FOUND, |ctx: &mut Context| {
        ctx.write_str("gone");
        ctx.emit_error(StatusCode::GONE);
    });
    mux.on_error(StatusCode::GONE, body("should not run"));

    let res = request(&mux, Method::Get, "/missing");
    assert_eq!(res.status(), StatusCode::GONE);
    assert_eq!(res.text(), "gone");
}

#[test]
fn dispatch_reports_unmatched_with_404_chain() {
    let mut mux = Mux::new();
    mux.on_error(StatusCode::NOT_FOUND, body("nope"));

    let dispatch = mux.dispatch(&Request::new(Method::Get, HOST, "/missing"));
    assert!(!dispatch.matched);
    assert!(dispatch.params.is_empty());
    assert!(Arc::ptr_eq(&dispatch.chain, &mux.error_chain(StatusCode::NOT_FOUND)));
}

fn subdomain_mux() -> Mux {
    let mut mux = Mux::with_config(Config::default().with_host(HOST));
    let h = |ctx: &mut Context| {
        let out = format!("{}{}", ctx.host(), ctx.path());
        ctx.write_str(&out);
    };
    {
        let mut api = mux.party("api.");
        api.get("/", h).unwrap();
        api.get("/path1", h).unwrap();
        api.get("/namedpath/:param1/something/:param2", h).unwrap();
        api.get("/namedpath/:param1/something/:param2/else", h).unwrap();
    }
    mux.get("/root-only", h).unwrap();
    mux
}

#[test]
fn subdomain_routes_are_isolated_from_root() {
    let mux = subdomain_mux();
    let api_host = format!("api.{HOST}");

    for path in [
        "/",
        "/path1",
        "/namedpath/theparam1/something/theparam2",
        "/namedpath/theparam1/something/theparam2/else",
    ] {
        let res = mux.serve(Request::new(Method::Get, api_host.as_str(), path));
        assert_eq!(res.status(), StatusCode::OK, "{path}");
        assert_eq!(res.text(), format!("{api_host}{path}"));

        assert_eq!(request(&mux, Method::Get, path).status(), StatusCode::NOT_FOUND, "{path}");
    }

    assert_eq!(request(&mux, Method::Get, "/root-only").status(), StatusCode::OK);
    let res = mux.serve(Request::new(Method::Get, api_host.as_str(), "/root-only"));
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // unregistered subdomains use the root routes
    let res = mux.serve(Request::new(Method::Get, format!("www.{HOST}"), "/root-only"));
    assert_eq!(res.status(), StatusCode::OK);
}

#[test]
fn wildcard_subdomain_binds_the_subdomain() {
    let mut mux = subdomain_mux();
    {
        let mut tenants = mux.party("*.");
        tenants
            .get("/whoami", |ctx: &mut Context| {
                let out = ctx.params().to_string();
                ctx.write_str(&out);
            })
            .unwrap();
        tenants
            .party("/files")
            .get("/*path", |ctx: &mut Context| {
                let out = ctx.params().to_string();
                ctx.write_str(&out);
            })
            .unwrap();
    }

    let res = mux.serve(Request::new(Method::Get, format!("acme.{HOST}"), "/whoami"));
    assert_eq!(res.text(), "subdomain=acme");

    let res = mux.serve(Request::new(Method::Get, format!("acme.{HOST}"), "/files/a/b.txt"));
    assert_eq!(res.text(), "subdomain=acme,path=/a/b.txt");

    // literal subdomains take priority
    let res = mux.serve(Request::new(Method::Get, format!("api.{HOST}"), "/whoami"));
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // the root host is not a subdomain
    assert_eq!(request(&mux, Method::Get, "/whoami").status(), StatusCode::NOT_FOUND);
}

#[test]
fn subdomain_param_name_is_configurable() {
    let mut mux = Mux::with_config(Config::default().with_host(HOST).with_subdomain_param("tenant"));
    mux.party("*.")
        .get("/", |ctx: &mut Context| {
            let tenant = ctx.param("tenant").unwrap_or_default().to_owned();
            ctx.write_str(&tenant);
        })
        .unwrap();

    let res = mux.serve(Request::new(Method::Get, format!("acme.{HOST}"), "/"));
    assert_eq!(res.text(), "acme");
}

#[test]
fn independent_muxes_coexist() {
    let mut root = Mux::new();
    root.get("/", body("root")).unwrap();

    let mut scoped = Mux::with_config(Config::default().with_host(HOST));
    scoped.party("api.").get("/", body("api")).unwrap();

    assert_eq!(request(&root, Method::Get, "/").text(), "root");
    assert_eq!(request(&scoped, Method::Get, "/").status(), StatusCode::NOT_FOUND);
    let res = scoped.serve(Request::new(Method::Get, format!("api.{HOST}"), "/"));
    assert_eq!(res.text(), "api");
}

#[test]
fn concurrent_requests_share_the_mux() {
    let mut mux = Mux::new();
    mux.get("/items/:id", |ctx: &mut Context| {
        let id = ctx.param("id").unwrap_or_default().to_owned();
        ctx.set("id", id.clone());
        ctx.next();
        ctx.write_str(&id);
    })
    .unwrap();
    let mux = Arc::new(mux);

    let workers: Vec<_> = (0..8)
        .map(|i| {
            let mux = Arc::clone(&mux);
            thread::spawn(move || {
                for j in 0..100 {
                    let id = format!("{i}-{j}");
                    let res = mux.serve(Request::new(Method::Get, HOST, format!("/items/{id}")));
                    assert_eq!(res.text(), id);
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }
}

struct UserApi;

impl Controller for UserApi {
    fn actions(&self) -> &[Action] {
        &[Action::Get, Action::GetBy, Action::Put, Action::PostBy, Action::DeleteBy]
    }

    fn serve(&self, action: Action, id: Option<String>, ctx: &mut Context) {
        let id = id.unwrap_or_default();
        let name = ctx.form_value("name").unwrap_or_default().to_owned();
        let out = match action {
            Action::Get => "Get Users\n".to_owned(),
            Action::GetBy => format!("Get By {id}\n"),
            Action::Put => format!("Put, name: {name}\n"),
            Action::PostBy => format!("Post By {id}, name: {name}\n"),
            Action::DeleteBy => format!("Delete By {id}\n"),
            _ => unreachable!("undeclared action {action:?}"),
        };
        ctx.write_str(&out);
    }
}

#[test]
fn controller_actions_become_routes() {
    let authenticated = "I assume that you are authenticated\n";

    let mut mux = Mux::new();
    {
        let mut users = mux.party("");
        users.middleware(|ctx: &mut Context| {
            ctx.set("user", String::from("username"));
            ctx.next();
        });
        users.middleware(move |ctx: &mut Context| {
            if ctx.get::<String>("user").is_some_and(|u| u == "username") {
                ctx.write_str(authenticated);
                ctx.next();
            } else {
                ctx.set_status(StatusCode::UNAUTHORIZED);
            }
        });
        users.controller("/users", UserApi).unwrap();
    }

    let form = |method, path: &str| {
        Request::new(method, HOST, path)
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_body("name=kataras")
    };

    let res = request(&mux, Method::Get, "/users");
    assert_eq!(res.text(), format!("{authenticated}Get Users\n"));

    let res = request(&mux, Method::Get, "/users/4077");
    assert_eq!(res.text(), format!("{authenticated}Get By 4077\n"));

    let res = mux.serve(form(Method::Put, "/users"));
    assert_eq!(res.text(), format!("{authenticated}Put, name: kataras\n"));

    let res = mux.serve(form(Method::Post, "/users/4077"));
    assert_eq!(res.text(), format!("{authenticated}Post By 4077, name: kataras\n"));

    let res = request(&mux, Method::Delete, "/users/4077");
    assert_eq!(res.text(), format!("{authenticated}Delete By 4077\n"));

    // undeclared actions are not routed
    assert_eq!(request(&mux, Method::Post, "/users").status(), StatusCode::NOT_FOUND);
    assert_eq!(request(&mux, Method::Patch, "/users/4077").status(), StatusCode::NOT_FOUND);
}

struct CustomHandler {
    sysname: &'static str,
    version: u32,
}

impl Handler for CustomHandler {
    fn serve(&self, ctx: &mut Context) {
        let param = ctx.param("myparam").unwrap_or_default().to_owned();
        ctx.set_header("content-type", "application/json");
        ctx.write_str(&format!(
            r#"{{"Sysname":"{}","Version":{},"DynamicPathParameter":"{param}"}}"#,
            self.sysname, self.version
        ));
    }
}

#[test]
fn custom_handler_objects() {
    let mut mux = Mux::new();
    mux.get("/custom_handler_1/:myparam", CustomHandler { sysname: "Redhat", version: 1 })
        .unwrap();
    mux.get("/custom_handler_2/:myparam", CustomHandler { sysname: "Redhat", version: 1 })
        .unwrap();

    for (path, param) in [
        ("/custom_handler_1/thisimyparam1", "thisimyparam1"),
        ("/custom_handler_1/thisimyparam2", "thisimyparam2"),
        ("/custom_handler_2/thisimyparam3", "thisimyparam3"),
    ] {
        let res = request(&mux, Method::Get, path);
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.header("content-type"), Some("application/json"));
        assert_eq!(
            res.text(),
            format!(r#"{{"Sysname":"Redhat","Version":1,"DynamicPathParameter":"{param}"}}"#)
        );
    }
}

#[test]
fn any_registers_every_method() {
    let mut mux = Mux::new();
    mux.any("/health", |ctx: &mut Context| {
        let method = ctx.method().to_string();
        ctx.write_str(&method);
    })
    .unwrap();

    for method in Method::ALL {
        assert_eq!(request(&mux, method, "/health").text(), method.as_str());
    }
}

#[test]
fn non_standard_status_codes_are_kept() {
    let retry = StatusCode::from_u16(599).unwrap();

    let mut mux = Mux::new();
    mux.get("/flaky", move |ctx: &mut Context| ctx.emit_error(retry)).unwrap();
    mux.on_error(retry, body("try again"));

    let res = request(&mux, Method::Get, "/flaky");
    assert_eq!(res.status(), retry);
    assert_eq!(res.text(), "try again");
}

#[test]
fn chain_without_handler_is_rejected() {
    let mut mux = Mux::new();
    assert_eq!(
        mux.handle_chain(Method::Get, "/x", Vec::new()),
        Err(RouteError::EmptyChain { path: "/x".into() })
    );
    assert_eq!(request(&mux, Method::Get, "/x").status(), StatusCode::NOT_FOUND);
}

#[test]
fn subdomain_hosts_ignore_case() {
    let mux = subdomain_mux();

    let res = mux.serve(Request::new(Method::Get, "API.LocalHost:8080", "/path1"));
    assert_eq!(res.status(), StatusCode::OK);

    let res = mux.serve(Request::new(Method::Get, "API.localhost:8080", "/root-only"));
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[test]
fn wildcard_subdomain_must_stand_alone() {
    let mut mux = Mux::with_config(Config::default().with_host(HOST));
    let mut api = mux.party("api.");
    let err = api.party("*.").get("/", body("")).unwrap_err();
    assert_eq!(
        err,
        RouteError::NestedWildcardSubdomain { path: "/".into(), subdomain: "*.api.".into() }
    );
}
