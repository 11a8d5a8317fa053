use std::sync::Arc;

use rym_http::{Controller, DateOnly, HttpContextAccessor, HttpError, RouteDefinition};
use serde::Serialize;

use crate::application::Clock;

/// Reports whether the API is up and who is calling
pub struct StatusController;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ServiceStatus {
    name: &'static str,
    status: &'static str,
    description: &'static str,
    service_date: DateOnly,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CallerIdentity {
    subject: String,
    display_name: String,
    roles: Vec<String>,
    authentication_type: String,
    trace_id: String,
}

impl Controller for StatusController {
    fn name(&self) -> &'static str {
        "Status"
    }

    fn base_path(&self) -> &str {
        "/api/status"
    }

    fn routes(self: Arc<Self>) -> Vec<RouteDefinition> {
        vec![
            RouteDefinition::get("", |context, _| async move {
                let clock = context.resolve::<Arc<dyn Clock>>()?;
                context.ok(&ServiceStatus {
                    name: "RyM Lubricentro API",
                    status: "ok",
                    description: "Gestión de turnos y atención mecánica",
                    service_date: DateOnly::from(clock.today()),
                })
            })
            .name("Get")
            .summary("Service status"),
            RouteDefinition::get("me", |context, _| async move {
                let current = context
                    .resolve::<HttpContextAccessor>()?
                    .current()
                    .ok_or_else(|| HttpError::internal("No request context on the current task"))?;
                let user = current
                    .user()
                    .ok_or_else(|| HttpError::internal("Authorized request without a principal"))?;

                context.ok(&CallerIdentity {
                    subject: user.subject.clone(),
                    display_name: user.display_name().to_string(),
                    roles: user.roles.clone(),
                    authentication_type: user.authentication_type.clone(),
                    trace_id: current.trace_identifier().to_string(),
                })
            })
            .name("GetCurrentUser")
            .summary("Identity of the caller")
            .authorize(),
        ]
    }
}
