use crate::core::contracts::{Route, Router};
use crate::core::error_capability::RouteError;
use parking_lot::Mutex;
use std::sync::Arc;

/// Surface that records routes instead of serving them.
///
/// Groups derived from it write into the same batch. Recorded paths are
/// relative to the surface the batch is later committed to.
pub(crate) struct StagedRouter {
    prefix: String,
    relative: String,
    routes: Arc<Mutex<Vec<Route>>>,
}

impl StagedRouter {
    pub(crate) fn for_surface(surface: &dyn Router) -> Self {
        Self {
            prefix: surface.prefix().to_string(),
            relative: "/".to_string(),
            routes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.routes.lock().len()
    }

    /// Hands the whole batch to `surface` in one call and returns how many
    /// routes went live.
    pub(crate) fn commit(&self, surface: &dyn Router) -> Result<usize, RouteError> {
        let routes = std::mem::take(&mut *self.routes.lock());
        let count = routes.len();
        surface.mount(routes)?;
        Ok(count)
    }
}

impl Router for StagedRouter {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn mount(&self, routes: Vec<Route>) -> Result<(), RouteError> {
        let mut staged = Vec::with_capacity(routes.len());
        for route in routes {
            let path = join(&self.relative, &normalize(&route.path)?);
            staged.push(Route { path, ..route });
        }
        self.routes.lock().extend(staged);
        Ok(())
    }

    fn group(&self, prefix: &str) -> Result<Arc<dyn Router>, RouteError> {
        let prefix = normalize(prefix)?;
        Ok(Arc::new(StagedRouter {
            prefix: join(&self.prefix, &prefix),
            relative: join(&self.relative, &prefix),
            routes: Arc::clone(&self.routes),
        }))
    }
}

/// Collapses repeated slashes and rejects whitespace, query and fragment
/// characters and bare `:` segments.
pub(crate) fn normalize(path: &str) -> Result<String, RouteError> {
    if path.chars().any(|c| c.is_whitespace() || c == '?' || c == '#') {
        return Err(RouteError::InvalidPath(path.to_string()));
    }
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.iter().any(|s| *s == ":") {
        return Err(RouteError::InvalidPath(path.to_string()));
    }
    Ok(format!("/{}", segments.join("/")))
}

pub(crate) fn join(prefix: &str, path: &str) -> String {
    match (prefix, path) {
        ("/", p) => p.to_string(),
        (p, "/") => p.to_string(),
        (p, rest) => format!("{p}{rest}"),
    }
}
