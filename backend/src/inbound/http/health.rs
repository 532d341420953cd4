//! Liveness and readiness probes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, web};

/// Shared readiness flag flipped once startup completes.
#[derive(Clone, Debug, Default)]
pub struct HealthState {
    ready: Arc<AtomicBool>,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the service ready to receive traffic.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

/// Liveness: the process is up.
#[utoipa::path(
    get,
    path = "/healthz",
    responses((status = 200, description = "Alive")),
    tags = ["health"],
    operation_id = "live",
    security([])
)]
#[get("/healthz")]
pub async fn live() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

/// Readiness: startup finished and traffic is welcome.
#[utoipa::path(
    get,
    path = "/readyz",
    responses(
        (status = 200, description = "Ready"),
        (status = 503, description = "Still starting")
    ),
    tags = ["health"],
    operation_id = "ready",
    security([])
)]
#[get("/readyz")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    if state.is_ready() {
        HttpResponse::Ok().body("ok")
    } else {
        HttpResponse::ServiceUnavailable().body("starting")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};

    #[actix_web::test]
    async fn readiness_flips_with_state() {
        let state = HealthState::new();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .service(live)
                .service(ready),
        )
        .await;

        let starting =
            test::call_service(&app, test::TestRequest::get().uri("/readyz").to_request()).await;
        assert_eq!(starting.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.mark_ready();
        let ready_res =
            test::call_service(&app, test::TestRequest::get().uri("/readyz").to_request()).await;
        assert_eq!(ready_res.status(), StatusCode::OK);

        let live_res =
            test::call_service(&app, test::TestRequest::get().uri("/healthz").to_request()).await;
        assert_eq!(live_res.status(), StatusCode::OK);
    }
}
