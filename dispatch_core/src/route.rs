//! Pending destination-dispatch trips.
//!
//! Routes are kept in insertion order; `process_routes` walks them front to
//! back so an unservable head blocks everything behind it.

use std::sync::{Arc, Weak};

use dispatch_traits::{CallStation, Direction, Floor};

#[derive(Debug, Clone)]
pub struct Route {
    pub origin: Floor,
    pub destination: Floor,
    /// Merged duplicate requests for this pair, always >= 1.
    pub requests: u32,
    /// A car has been sent to `origin` for this trip.
    pub processed: bool,
    pub station: Option<Weak<dyn CallStation>>,
}

impl Route {
    pub fn direction(&self) -> Direction {
        Direction::of_trip(self.origin, self.destination)
    }

    /// The originating station, if it is still alive.
    pub fn station(&self) -> Option<Arc<dyn CallStation>> {
        self.station.as_ref().and_then(Weak::upgrade)
    }

    fn matches(&self, origin: Floor, destination: Floor) -> bool {
        self.origin == origin && self.destination == destination
    }
}

/// Result of admitting a request into the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Merged into an existing unprocessed route; carries its new count.
    Merged { requests: u32 },
    /// A new route was appended.
    Opened,
    /// The only matching route is full and a single car serves the pair;
    /// the request is absorbed without changing the table.
    Saturated,
}

#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request for `origin -> destination`.
    ///
    /// The first unprocessed route for the pair with room below `cap` absorbs
    /// the request. When every such route is full, a second route is opened
    /// only if `overflow` is allowed (more than one car bound).
    pub fn admit(
        &mut self,
        origin: Floor,
        destination: Floor,
        station: Option<&Arc<dyn CallStation>>,
        cap: u32,
        overflow: bool,
    ) -> Admission {
        let mut full = false;
        for r in self
            .routes
            .iter_mut()
            .filter(|r| !r.processed && r.matches(origin, destination))
        {
            if r.requests < cap {
                r.requests += 1;
                return Admission::Merged {
                    requests: r.requests,
                };
            }
            full = true;
        }
        if full && !overflow {
            return Admission::Saturated;
        }
        self.routes.push(Route {
            origin,
            destination,
            requests: 1,
            processed: false,
            station: station.map(Arc::downgrade),
        });
        Admission::Opened
    }

    /// Remove the first route for the pair. Returns false if none matched.
    pub fn remove(&mut self, origin: Floor, destination: Floor) -> bool {
        match self
            .routes
            .iter()
            .position(|r| r.matches(origin, destination))
        {
            Some(i) => {
                self.routes.remove(i);
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove_at(&mut self, idx: usize) -> Route {
        self.routes.remove(idx)
    }

    pub(crate) fn get(&self, idx: usize) -> Option<&Route> {
        self.routes.get(idx)
    }

    pub(crate) fn get_mut(&mut self, idx: usize) -> Option<&mut Route> {
        self.routes.get_mut(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Unprocessed routes for the pair.
    pub fn pending_for(&self, origin: Floor, destination: Floor) -> usize {
        self.routes
            .iter()
            .filter(|r| !r.processed && r.matches(origin, destination))
            .count()
    }
}
