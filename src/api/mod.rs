use rocket::Route;

mod options;
mod polls;
mod votes;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(polls::routes());
    routes.extend(options::routes());
    routes.extend(votes::routes());
    routes
}
