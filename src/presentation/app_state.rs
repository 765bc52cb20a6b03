// Application state for HTTP handlers
use crate::application::car_service::CarService;
use crate::application::report_service::ReportService;
use crate::application::streaming_service::StreamingDashboardService;
use crate::application::telemetry_service::TelemetryService;

#[derive(Clone)]
pub struct AppState {
    pub car_service: CarService,
    pub telemetry_service: TelemetryService,
    pub report_service: ReportService,
    pub streaming_service: StreamingDashboardService,
}
