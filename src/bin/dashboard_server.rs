use lhb_dashboard::{
    dashboard_router, init_logging, log_app_bind, log_app_start, log_init_finished,
    log_source_selected, logging_config_from_env, DashboardConfig, DashboardController,
    DayLoadOutcome, InitOutcome,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_cfg = logging_config_from_env();
    init_logging(&logging_cfg)?;
    log_app_start(&logging_cfg);

    let cfg = DashboardConfig::from_env()?;
    let source = cfg.build_source()?;
    log_source_selected(cfg.data.kind(), &cfg.data.describe(), cfg.trend_days);

    let controller = DashboardController::with_trend_days(source, cfg.trend_days);
    // A failed index load is rendered by the page; the server still starts so it can be reloaded.
    let outcome = match controller.initialize().await {
        Ok(InitOutcome::NoData) => "no_data",
        Ok(InitOutcome::Loaded(DayLoadOutcome::Failed(_))) => "day_failed",
        Ok(InitOutcome::Loaded(_)) => "ready",
        Err(_) => "index_failed",
    };
    log_init_finished(outcome);

    let app = dashboard_router(controller);
    let listener = tokio::net::TcpListener::bind(cfg.bind_addr).await?;
    let bound_addr = listener.local_addr()?;

    log_app_bind(bound_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
