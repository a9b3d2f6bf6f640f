use crate::core::contracts::{Handler, Method, Request, Response, Route, Router};
use crate::core::error_capability::RouteError;
use crate::core::routing::{join, normalize};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

struct RouteRecord {
    method: Method,
    path: String,
    handler: Handler,
}

/// In-memory routing surface. Groups derived with [`Router::group`] write to
/// the same table under their prefix.
#[derive(Clone)]
pub struct RouteTable {
    prefix: String,
    routes: Arc<RwLock<Vec<RouteRecord>>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self {
            prefix: "/".to_string(),
            routes: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Every registered method and full path, in registration order.
    pub fn routes(&self) -> Vec<(Method, String)> {
        self.routes
            .read()
            .iter()
            .map(|r| (r.method, r.path.clone()))
            .collect()
    }

    /// Paths registered at or below this table's prefix.
    pub fn routes_here(&self) -> Vec<(Method, String)> {
        self.routes()
            .into_iter()
            .filter(|(_, path)| is_under(&self.prefix, path))
            .collect()
    }

    pub fn dispatch(&self, method: Method, path: &str, body: serde_json::Value) -> Response {
        let Ok(path) = normalize(path) else {
            return Response::not_found();
        };
        let matched = self.routes.read().iter().find_map(|route| {
            if route.method != method {
                return None;
            }
            match_path(&route.path, &path).map(|params| (Arc::clone(&route.handler), params))
        });

        match matched {
            Some((handler, params)) => handler(&Request {
                method,
                path,
                params,
                body,
            }),
            None => Response::not_found(),
        }
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Router for RouteTable {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn mount(&self, routes: Vec<Route>) -> Result<(), RouteError> {
        let mut records = Vec::with_capacity(routes.len());
        for route in routes {
            records.push(RouteRecord {
                method: route.method,
                path: join(&self.prefix, &normalize(&route.path)?),
                handler: route.handler,
            });
        }

        let mut table = self.routes.write();
        for (i, record) in records.iter().enumerate() {
            if table
                .iter()
                .chain(&records[..i])
                .any(|r| r.method == record.method && same_shape(&r.path, &record.path))
            {
                return Err(RouteError::Duplicate(record.method, record.path.clone()));
            }
        }
        table.extend(records);
        Ok(())
    }

    fn group(&self, prefix: &str) -> Result<Arc<dyn Router>, RouteError> {
        Ok(Arc::new(RouteTable {
            prefix: join(&self.prefix, &normalize(prefix)?),
            routes: Arc::clone(&self.routes),
        }))
    }
}

fn is_under(prefix: &str, path: &str) -> bool {
    prefix == "/" || path == prefix || path.starts_with(&format!("{prefix}/"))
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// `/posts/:id` and `/posts/:slug` collide.
fn same_shape(a: &str, b: &str) -> bool {
    let (a, b): (Vec<&str>, Vec<&str>) = (segments(a).collect(), segments(b).collect());
    a.len() == b.len()
        && a.iter().zip(&b).all(|(x, y)| {
            x == y || (x.starts_with(':') && y.starts_with(':'))
        })
}

fn match_path(pattern: &str, path: &str) -> Option<BTreeMap<String, String>> {
    let pattern: Vec<&str> = segments(pattern).collect();
    let actual: Vec<&str> = segments(path).collect();
    if pattern.len() != actual.len() {
        return None;
    }
    let mut params = BTreeMap::new();
    for (p, a) in pattern.iter().zip(&actual) {
        match p.strip_prefix(':') {
            Some(name) => {
                params.insert(name.to_string(), a.to_string());
            }
            None if p == a => {}
            None => return None,
        }
    }
    Some(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo(tag: &'static str) -> Handler {
        Arc::new(move |req: &Request| {
            Response::ok(json!({ "tag": tag, "params": req.params, "body": req.body }))
        })
    }

    #[test]
    fn test_groups_share_table_under_prefix() {
        let table = RouteTable::new();
        let auth = table.group("/auth").unwrap();
        let nested = auth.group("oauth/").unwrap();

        table.handle(Method::Get, "/health", echo("health")).unwrap();
        auth.handle(Method::Post, "/login", echo("login")).unwrap();
        nested.handle(Method::Get, "/callback", echo("cb")).unwrap();

        assert_eq!(auth.prefix(), "/auth");
        assert_eq!(nested.prefix(), "/auth/oauth");
        assert_eq!(
            table.routes(),
            vec![
                (Method::Get, "/health".to_string()),
                (Method::Post, "/auth/login".to_string()),
                (Method::Get, "/auth/oauth/callback".to_string()),
            ]
        );
    }

    #[test]
    fn test_duplicate_route_is_rejected() {
        let table = RouteTable::new();
        table.handle(Method::Get, "/posts/:id", echo("a")).unwrap();

        let err = table
            .handle(Method::Get, "posts/:slug", echo("b"))
            .unwrap_err();
        assert_eq!(err, RouteError::Duplicate(Method::Get, "/posts/:slug".into()));
        assert!(table.handle(Method::Delete, "/posts/:id", echo("c")).is_ok());
    }

    #[test]
    fn test_mount_is_all_or_nothing() {
        let table = RouteTable::new();
        let route = |method, path: &str| Route {
            method,
            path: path.to_string(),
            handler: echo(""),
        };

        let err = table
            .mount(vec![
                route(Method::Get, "/media/list"),
                route(Method::Patch, "/media/:id"),
                route(Method::Get, "/media/list/"),
            ])
            .unwrap_err();
        assert_eq!(err, RouteError::Duplicate(Method::Get, "/media/list".into()));
        assert!(table.routes().is_empty());
        assert_eq!(table.dispatch(Method::Get, "/media/list", json!(null)).status, 404);

        table
            .mount(vec![
                route(Method::Get, "/media/list"),
                route(Method::Patch, "/media/:id"),
            ])
            .unwrap();
        assert_eq!(table.routes().len(), 2);
    }

    #[test]
    fn test_invalid_group_prefix_is_rejected() {
        let table = RouteTable::new();
        assert!(matches!(
            table.group("/auth me"),
            Err(RouteError::InvalidPath(p)) if p == "/auth me"
        ));
    }

    #[test]
    fn test_dispatch_matches_params_and_falls_back_to_not_found() {
        let table = RouteTable::new();
        let api = table.group("api").unwrap();
        let api: &dyn Router = api.as_ref();
        api.get("/posts/:id", |req| {
            Response::ok(json!({ "id": req.param("id") }))
        })
        .unwrap();
        table.handle(Method::Post, "/echo", echo("echo")).unwrap();

        let found = table.dispatch(Method::Get, "/api/posts/42", json!(null));
        assert_eq!(found.status, 200);
        assert_eq!(found.body["id"], "42");

        let echoed = table.dispatch(Method::Post, "echo/", json!({"x": 1}));
        assert_eq!(echoed.body["body"]["x"], 1);

        assert_eq!(table.dispatch(Method::Post, "/api/posts/42", json!(null)).status, 404);
        assert_eq!(table.dispatch(Method::Get, "/missing", json!(null)).status, 404);
    }

    #[test]
    fn test_verb_helpers_register_their_method() {
        let table = RouteTable::new();
        let router: &dyn Router = &table;
        router.patch("/posts/:id", |req| Response::ok(json!(req.param("id")))).unwrap();
        router.put("/posts/:id", |_| Response::ok(json!("put"))).unwrap();

        assert_eq!(
            table.routes(),
            vec![
                (Method::Patch, "/posts/:id".to_string()),
                (Method::Put, "/posts/:id".to_string()),
            ]
        );
        assert_eq!(table.dispatch(Method::Patch, "/posts/3", json!(null)).body, json!("3"));
    }

    #[test]
    fn test_routes_here_filters_by_prefix() {
        let table = RouteTable::new();
        let auth = RouteTable {
            prefix: "/auth".into(),
            routes: Arc::clone(&table.routes),
        };
        table.handle(Method::Get, "/authors", echo("a")).unwrap();
        auth.handle(Method::Get, "/me", echo("me")).unwrap();

        assert_eq!(auth.routes_here(), vec![(Method::Get, "/auth/me".to_string())]);
        assert_eq!(table.routes_here().len(), 2);
    }
}
