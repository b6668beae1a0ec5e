//! Per-request IDs and request/response logging.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::Level;
use rocket::{
    fairing::{Fairing, Info, Kind},
    http::{Status, StatusClass},
    request::{FromRequest, Outcome},
    Data, Orbit, Request, Response, Rocket, Route,
};

use crate::config::Config;

/// Identifies one request in the logs, e.g. `->req7` and `<-rsp7`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct RequestId(pub usize);

impl RequestId {
    /// Atomically allocate the next ID, wrapping on overflow.
    pub fn next() -> Self {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// The ID of `req`, allocated the first time it is asked for.
    fn of<'r>(req: &'r Request<'_>) -> &'r Self {
        req.local_cache(Self::next)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for &'r RequestId {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        Outcome::Success(RequestId::of(req))
    }
}

/// The level a response with the given status is logged at.
fn response_level(status: Status) -> Level {
    match status.class() {
        StatusClass::ServerError => Level::Error,
        StatusClass::ClientError => Level::Warn,
        _ => Level::Info,
    }
}

fn route_label(route: Option<&Route>) -> String {
    match route {
        Some(Route {
            name: Some(name),
            uri,
            ..
        }) => format!("{name} ({uri})"),
        Some(route) => route.uri.to_string(),
        None => "no route".to_string(),
    }
}

/// Logs server lifecycle events and every request/response pair.
#[derive(Debug, Copy, Clone)]
pub struct LoggerFairing;

#[rocket::async_trait]
impl Fairing for LoggerFairing {
    fn info(&self) -> Info {
        Info {
            name: "Logger",
            kind: Kind::Liftoff | Kind::Request | Kind::Response | Kind::Shutdown,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        let config = rocket.config();
        let scheme = if config.tls_enabled() { "https" } else { "http" };
        info!(
            "Polls server listening on {scheme}://{}:{}",
            config.address, config.port
        );
        if let Some(app) = rocket.state::<Config>() {
            info!("Reference policy: {:?}", app.reference_policy());
        }
    }

    async fn on_request(&self, req: &mut Request<'_>, _data: &mut Data<'_>) {
        let id = RequestId::of(req);
        info!("->req{id} {} {}", req.method(), req.uri());
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let id = RequestId::of(req);
        let status = res.status();
        log::log!(
            response_level(status),
            "<-rsp{id} {status} {}",
            route_label(req.route())
        );
    }

    async fn on_shutdown(&self, _rocket: &Rocket<Orbit>) {
        warn!("Shutting down polls server");
    }
}
