//! Three-step price calculator flow: origin → destination → details.
//!
//! [`SelectionFlow`] holds what the user picked and what has been loaded for
//! it. It does no I/O itself: each choice returns a [`Ticket`], the caller
//! resolves the data and hands the result back with that ticket. Only the
//! latest ticket of each kind is honoured, so a slow answer for an earlier
//! choice can never overwrite the answer for the current one.

use crate::domain::{LocationId, RouteId};
use crate::resolver::{Destination, ResolveError, RouteDetails, filter_destinations};

/// Where the user is in the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    NoOrigin,
    OriginSelected,
    DestinationSelected,
}

/// State of a value that is fetched asynchronously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loadable<T> {
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Loadable::Idle
    }
}

impl<T> Loadable<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Loadable::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Loadable::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Handle for one outstanding fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Error from an invalid flow transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("choose an origin before choosing a destination")]
    NoOrigin,

    #[error("route {route} is not a delivery from {origin}")]
    NotADestination { route: RouteId, origin: LocationId },
}

/// Snapshot of the flow for rendering.
///
/// Stage and the two loading flags are independent: the destination list
/// can still be loading while details are loading too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowView {
    pub stage: Stage,
    pub is_loading_list: bool,
    pub is_loading_details: bool,
}

/// The price calculator's selection state.
#[derive(Debug, Clone, Default)]
pub struct SelectionFlow {
    origin: Option<LocationId>,
    route: Option<RouteId>,
    search: String,
    destinations: Loadable<Vec<Destination>>,
    details: Loadable<RouteDetails>,
    issued: u64,
    list_ticket: Option<Ticket>,
    details_ticket: Option<Ticket>,
}

impl SelectionFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        match (&self.origin, &self.route) {
            (None, _) => Stage::NoOrigin,
            (Some(_), None) => Stage::OriginSelected,
            (Some(_), Some(_)) => Stage::DestinationSelected,
        }
    }

    pub fn origin(&self) -> Option<&LocationId> {
        self.origin.as_ref()
    }

    pub fn route(&self) -> Option<&RouteId> {
        self.route.as_ref()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn destinations(&self) -> &Loadable<Vec<Destination>> {
        &self.destinations
    }

    pub fn details(&self) -> &Loadable<RouteDetails> {
        &self.details
    }

    /// Select an origin. Valid from any stage.
    ///
    /// Drops the chosen route, its details and the search text, and starts
    /// loading the new origin's destinations.
    pub fn choose_origin(&mut self, origin: LocationId) -> Ticket {
        self.origin = Some(origin);
        self.route = None;
        self.search.clear();
        self.details = Loadable::Idle;
        self.details_ticket = None;
        self.destinations = Loadable::Loading;

        let ticket = self.issue();
        self.list_ticket = Some(ticket);
        ticket
    }

    /// Select a route from the current origin's destinations.
    ///
    /// Once the destination list has loaded, the route must be on it.
    /// Choosing again while a route is selected replaces it.
    pub fn choose_destination(&mut self, route: RouteId) -> Result<Ticket, SelectionError> {
        let Some(origin) = &self.origin else {
            return Err(SelectionError::NoOrigin);
        };
        if let Loadable::Loaded(list) = &self.destinations {
            if !list.iter().any(|d| d.route_id == route) {
                return Err(SelectionError::NotADestination {
                    route,
                    origin: origin.clone(),
                });
            }
        }
        self.route = Some(route);
        self.details = Loadable::Loading;

        let ticket = self.issue();
        self.details_ticket = Some(ticket);
        Ok(ticket)
    }

    /// Back to the start. Outstanding tickets are invalidated.
    pub fn reset(&mut self) {
        *self = SelectionFlow {
            issued: self.issued,
            ..SelectionFlow::default()
        };
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    /// Loaded destinations matching the search text.
    pub fn visible_destinations(&self) -> Vec<&Destination> {
        match &self.destinations {
            Loadable::Loaded(list) => filter_destinations(list, &self.search),
            _ => Vec::new(),
        }
    }

    /// Apply a destination list. Returns `false` if `ticket` was superseded.
    pub fn complete_list(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<Destination>, ResolveError>,
    ) -> bool {
        if self.list_ticket != Some(ticket) {
            return false;
        }
        self.list_ticket = None;
        self.destinations = match result {
            Ok(list) => Loadable::Loaded(list),
            Err(e) => Loadable::Failed(e.to_string()),
        };
        true
    }

    /// Apply route details. Returns `false` if `ticket` was superseded.
    pub fn complete_details(
        &mut self,
        ticket: Ticket,
        result: Result<RouteDetails, ResolveError>,
    ) -> bool {
        if self.details_ticket != Some(ticket) {
            return false;
        }
        self.details_ticket = None;
        self.details = match result {
            Ok(details) => Loadable::Loaded(details),
            Err(e) => Loadable::Failed(e.to_string()),
        };
        true
    }

    pub fn view(&self) -> FlowView {
        FlowView {
            stage: self.stage(),
            is_loading_list: self.destinations.is_loading(),
            is_loading_details: self.details.is_loading(),
        }
    }

    /// Whether the "start order" action is enabled.
    pub fn can_start_order(&self) -> bool {
        self.stage() == Stage::DestinationSelected
            && self.details.loaded().is_some_and(|d| d.is_available)
    }

    fn issue(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Step {
        Origin(u8),
        Destination(u8),
        Reset,
        Search(String),
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            (0u8..5).prop_map(Step::Origin),
            (0u8..5).prop_map(Step::Destination),
            Just(Step::Reset),
            "[a-z]{0,4}".prop_map(Step::Search),
        ]
    }

    proptest! {
        /// After any history, choosing an origin leaves no route, details or search.
        #[test]
        fn choose_origin_always_clears(steps in prop::collection::vec(step(), 0..20), origin in 0u8..5) {
            let mut flow = SelectionFlow::new();
            for step in steps {
                match step {
                    Step::Origin(n) => { flow.choose_origin(LocationId::new(format!("l{n}")).unwrap()); }
                    Step::Destination(n) => { let _ = flow.choose_destination(RouteId::new(format!("r{n}")).unwrap()); }
                    Step::Reset => flow.reset(),
                    Step::Search(q) => flow.set_search(q),
                }
            }

            flow.choose_origin(LocationId::new(format!("l{origin}")).unwrap());

            prop_assert_eq!(flow.stage(), Stage::OriginSelected);
            prop_assert!(flow.route().is_none());
            prop_assert_eq!(flow.details(), &Loadable::Idle);
            prop_assert_eq!(flow.search(), "");
            prop_assert!(!flow.can_start_order());
        }
    }
}
