//! Route patterns, the route table and the routing stage

pub mod metadata;
pub mod middleware;
pub mod pattern;
pub mod table;

pub use metadata::{AuthorizationRequirement, EndpointMetadata};
pub use middleware::{RouteMiss, RoutingMiddleware};
pub use pattern::{ParamConstraint, PathSegment, RoutePattern, RoutePatternError};
pub use table::{Endpoint, RouteLookup, RouteMatch, RouteTable};
