use std::sync::Arc;

use hazard_core::escalation::EscalationPolicy;
use hazard_core::identity::CredentialValidator;
use hazard_core::store::{
    AlertStore, EmergencyRequestStore, NotificationLogStore, SubscriberAlertStore,
    SubscriberRegistry,
};
use hazard_events::NotificationGateway;
use hazard_pipeline::{
    AlertService, CycleRunner, CycleSettings, EscalationController, MonitorCycle,
    TelemetryProvider,
};

use crate::auth::jwt::JwtValidator;
use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool; `None` when running on the in-memory store.
    pub pool: Option<hazard_db::DbPool>,
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager; also the gateway's transport.
    pub ws_manager: Arc<WsManager>,
    pub credentials: Arc<dyn CredentialValidator>,
    pub alerts: Arc<dyn AlertStore>,
    pub subscriber_alerts: Arc<dyn SubscriberAlertStore>,
    pub notification_logs: Arc<dyn NotificationLogStore>,
    pub gateway: NotificationGateway,
    pub alert_service: AlertService,
    /// Single-flight runner shared by the scheduler and the manual trigger.
    pub runner: Arc<CycleRunner>,
}

impl AppState {
    /// Wire every service over one store implementation.
    ///
    /// `store` is a `PgStore` in production and a `MemoryStore` in tests.
    pub fn build<S>(
        config: ServerConfig,
        store: Arc<S>,
        telemetry: Arc<dyn TelemetryProvider>,
        pool: Option<hazard_db::DbPool>,
    ) -> Self
    where
        S: AlertStore
            + SubscriberAlertStore
            + EmergencyRequestStore
            + NotificationLogStore
            + SubscriberRegistry
            + 'static,
    {
        let ws_manager = Arc::new(WsManager::new());
        let gateway = NotificationGateway::new(ws_manager.clone(), store.clone())
            .with_delivery_timeout(config.delivery_timeout());
        let alert_service = AlertService::new(store.clone(), gateway.clone());

        let escalation = Arc::new(EscalationController::new(
            EscalationPolicy::with_cooldown_minutes(config.monitor.escalation_cooldown_minutes),
            store.clone(),
        ));
        let cycle = MonitorCycle::new(
            CycleSettings {
                location: config.monitor.location(),
                radius_km: config.monitor.radius_km,
                telemetry_timeout: config.monitor.telemetry_timeout(),
            },
            telemetry,
            store.clone(),
            store.clone(),
            alert_service.clone(),
            gateway.clone(),
            escalation,
        );

        Self {
            pool,
            credentials: Arc::new(JwtValidator::new(config.jwt.clone())),
            config: Arc::new(config),
            ws_manager,
            alerts: store.clone(),
            subscriber_alerts: store.clone(),
            notification_logs: store,
            gateway,
            alert_service,
            runner: Arc::new(CycleRunner::new(Arc::new(cycle))),
        }
    }
}
