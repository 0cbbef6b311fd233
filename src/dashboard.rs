//! HTML rendering of a [`DashboardView`] and the HTTP routes that drive the controller.

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use tracing::info;

use crate::controller::{DashboardController, InitOutcome};
use crate::error::DashboardError;
use crate::navigation::StepDirection;
use crate::session::DayLoadOutcome;
use crate::view::{DashboardView, RankEntry, ViewStatus};

pub const TABLE_HEADERS: [&str; 5] = ["Code", "Name", "Market", "Change", "Links"];

pub fn dashboard_router(controller: DashboardController) -> Router {
    Router::new()
        .route("/dashboard", get(get_dashboard_html))
        .route("/dashboard/view", get(get_dashboard_view))
        .route("/dashboard/date", post(post_date))
        .route("/dashboard/year", post(post_year))
        .route("/dashboard/month", post(post_month))
        .route("/dashboard/prev", post(post_prev))
        .route("/dashboard/next", post(post_next))
        .route("/dashboard/market", post(post_market))
        .route("/dashboard/reload", post(post_reload))
        .with_state(controller)
}

pub fn render_dashboard_html(view: &DashboardView) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html><html lang=\"zh-CN\"><head><meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str("<title>LHB Daily Dashboard</title>\n");
    out.push_str("<style>:root{--bg:#f3f1ec;--card:#fff;--ink:#1d232a;--muted:#65707a;--line:#dde2e7;--head:#2b1d1d;--up:#c8102e;--down:#0a8f4e;--flat:#65707a;--accent:#a8322d}*{box-sizing:border-box}body{margin:0;color:var(--ink);font-family:\"Space Grotesk\",\"PingFang SC\",\"Segoe UI\",sans-serif;background:linear-gradient(160deg,#f8f4ea,#eef2f4);min-height:100vh}.shell{max-width:1280px;margin:0 auto;padding:24px 18px 28px}.hero{background:linear-gradient(135deg,#3b1f1c 0%,#8c2f28 100%);color:#fff8f2;border-radius:16px;padding:18px 20px;display:flex;justify-content:space-between;gap:16px;flex-wrap:wrap}.hero h1{margin:0 0 8px;font-size:1.6rem}.hero-meta{display:flex;gap:16px;flex-wrap:wrap;font-size:.9rem;color:#f3dcd6}.card{margin-top:16px;background:var(--card);border:1px solid var(--line);border-radius:16px;padding:14px 16px;box-shadow:0 10px 24px rgba(26,35,42,.08)}.controls{display:flex;gap:10px;flex-wrap:wrap;align-items:center}.controls form{display:inline-flex;gap:6px;margin:0}button{border:1px solid var(--line);background:#fff;border-radius:9px;padding:6px 10px;cursor:pointer;font:inherit}button.active{background:var(--accent);color:#fff;border-color:var(--accent)}button:disabled{opacity:.4;cursor:default}.metrics{display:grid;grid-template-columns:repeat(auto-fit,minmax(140px,1fr));gap:12px}.metric .label{font-size:.78rem;text-transform:uppercase;color:var(--muted)}.metric .value{font-size:1.5rem;font-weight:700}.tone-up{color:var(--up)}.tone-down{color:var(--down)}.tone-flat{color:var(--flat)}.bar-row{display:grid;grid-template-columns:90px 1fr 50px;gap:8px;align-items:center;margin:4px 0}.bar{height:10px;border-radius:5px;background:var(--accent)}.ranks{display:grid;grid-template-columns:1fr 1fr;gap:16px}.ranks ol{margin:0;padding-left:20px}table{width:100%;border-collapse:collapse}thead th{background:var(--head);color:#fbeee9;font-size:.8rem;text-align:left;padding:8px 10px}tbody td{font-size:.86rem;padding:8px 10px;border-bottom:1px solid var(--line)}.placeholder{text-align:center;color:var(--muted)}.error{text-align:center;color:var(--up);font-weight:700}.spark circle.active{fill:var(--accent)}@media (max-width:760px){.ranks{grid-template-columns:1fr}.shell{padding:12px}}</style>\n");
    out.push_str("</head><body><main class=\"shell\">\n");

    render_hero(&mut out, view);

    if view.status != ViewStatus::Ready {
        out.push_str("<section class=\"card\"><table id=\"stock-table\"><tbody>");
        let message = view.message.as_deref().unwrap_or_default();
        let class = if view.status == ViewStatus::Failed {
            "error"
        } else {
            "placeholder"
        };
        out.push_str(&format!(
            "<tr><td class=\"{class}\">{}</td></tr>",
            escape_html(message)
        ));
        out.push_str("</tbody></table>");
        out.push_str(
            "<form method=\"post\" action=\"/dashboard/reload\"><button type=\"submit\">Reload</button></form>",
        );
        out.push_str("</section>\n</main></body></html>\n");
        return out;
    }

    render_controls(&mut out, view);
    render_metrics(&mut out, view);
    render_sparkline(&mut out, view);
    render_bars(&mut out, view);
    render_filters(&mut out, view);
    render_table(&mut out, view);
    out.push_str("<section class=\"card ranks\">");
    render_rank_list(&mut out, "Top gainers", &view.top_gainers);
    render_rank_list(&mut out, "Top losers", &view.top_losers);
    out.push_str("</section>\n");

    out.push_str("</main></body></html>\n");
    out
}

fn render_hero(out: &mut String, view: &DashboardView) {
    out.push_str("<section class=\"hero\"><div><h1>LHB Daily Dashboard</h1>");
    out.push_str("<div class=\"hero-meta\">");
    if let Some(date) = &view.hero.date {
        out.push_str(&format!("<span>Date: {}</span>", escape_html(date)));
    }
    out.push_str(&format!("<span>Days: {}</span>", view.hero.total_days));
    if let Some(rows) = view.hero.total_rows {
        out.push_str(&format!("<span>Rows: {rows}</span>"));
    }
    if !view.hero.generated_at.is_empty() {
        out.push_str(&format!(
            "<span>Generated: {}</span>",
            escape_html(&view.hero.generated_at)
        ));
    }
    if let Some(source_file) = &view.hero.source_file {
        out.push_str(&format!("<span>Source: {}</span>", escape_html(source_file)));
    }
    out.push_str("</div></div></section>\n");
}

fn render_controls(out: &mut String, view: &DashboardView) {
    out.push_str("<section class=\"card controls\">");
    out.push_str(&nav_button("prev", "&larr; Prev", view.nav.prev_disabled()));

    out.push_str("<form method=\"post\" action=\"/dashboard/year\"><select name=\"year\">");
    for option in &view.calendar.years {
        push_option(out, &option.value, option.selected);
    }
    out.push_str("</select><button type=\"submit\">Year</button></form>");

    out.push_str("<form method=\"post\" action=\"/dashboard/month\"><select name=\"month\">");
    for option in &view.calendar.months {
        push_option(out, &option.value, option.selected);
    }
    out.push_str("</select><button type=\"submit\">Month</button></form>");

    out.push_str("<div class=\"date-pills\">");
    for pill in &view.date_pills {
        out.push_str("<form method=\"post\" action=\"/dashboard/date\">");
        out.push_str(&format!(
            "<input type=\"hidden\" name=\"date\" value=\"{}\">",
            escape_html(&pill.date)
        ));
        out.push_str(&format!(
            "<button type=\"submit\" class=\"{}\" title=\"{}\">{}</button></form>",
            if pill.active { "active" } else { "" },
            escape_html(&pill.date),
            escape_html(&pill.label)
        ));
    }
    out.push_str("</div>");

    out.push_str(&nav_button("next", "Next &rarr;", view.nav.next_disabled()));
    out.push_str("</section>\n");
}

fn nav_button(action: &str, label: &str, disabled: bool) -> String {
    format!(
        "<form method=\"post\" action=\"/dashboard/{action}\"><button type=\"submit\" id=\"nav-{action}\"{}>{label}</button></form>",
        if disabled { " disabled" } else { "" }
    )
}

fn push_option(out: &mut String, value: &str, selected: bool) {
    let value = escape_html(value);
    out.push_str(&format!(
        "<option value=\"{value}\"{}>{value}</option>",
        if selected { " selected" } else { "" }
    ));
}

fn render_metrics(out: &mut String, view: &DashboardView) {
    out.push_str("<section class=\"card metrics\">");
    for metric in &view.metrics {
        out.push_str(&format!(
            "<div class=\"metric\"><div class=\"label\">{}</div><div class=\"value {}\">{}</div></div>",
            escape_html(metric.label),
            metric.tone.css_class(),
            escape_html(&metric.value)
        ));
    }
    out.push_str("</section>\n");
}

fn render_sparkline(out: &mut String, view: &DashboardView) {
    let line = &view.sparkline;
    out.push_str(&format!(
        "<section class=\"card\"><svg class=\"spark\" viewBox=\"0 0 {w} {h}\" width=\"{w}\" height=\"{h}\">",
        w = line.width,
        h = line.height
    ));
    if !line.path.is_empty() {
        out.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"#8c2f28\" stroke-width=\"2\"/>",
            line.path
        ));
    }
    for point in &line.points {
        out.push_str(&format!(
            "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{}\" class=\"{}\"><title>{} · {}</title></circle>",
            point.x,
            point.y,
            if point.highlighted { 4 } else { 2 },
            if point.highlighted { "active" } else { "" },
            escape_html(&point.date),
            point.total_count
        ));
    }
    out.push_str("</svg></section>\n");
}

fn render_bars(out: &mut String, view: &DashboardView) {
    out.push_str("<section class=\"card bars\">");
    for bar in &view.market_bars {
        out.push_str(&format!(
            "<div class=\"bar-row\"><span>{}</span><div class=\"bar\" style=\"width:{:.1}%\"></div><span>{}</span></div>",
            escape_html(&bar.label),
            bar.width_pct,
            bar.count
        ));
    }
    out.push_str("</section>\n");
}

fn render_filters(out: &mut String, view: &DashboardView) {
    out.push_str("<section class=\"card controls\" id=\"market-filters\">");
    for filter in &view.filters {
        out.push_str("<form method=\"post\" action=\"/dashboard/market\">");
        out.push_str(&format!(
            "<input type=\"hidden\" name=\"market\" value=\"{}\">",
            escape_html(&filter.code)
        ));
        out.push_str(&format!(
            "<button type=\"submit\" class=\"{}\">{}</button></form>",
            if filter.active { "active" } else { "" },
            escape_html(&filter.label)
        ));
    }
    out.push_str("</section>\n");
}

fn render_table(out: &mut String, view: &DashboardView) {
    out.push_str("<section class=\"card\"><table id=\"stock-table\"><thead><tr>");
    for header in TABLE_HEADERS {
        out.push_str("<th>");
        out.push_str(&escape_html(header));
        out.push_str("</th>");
    }
    out.push_str("</tr></thead><tbody>\n");

    let colspan = TABLE_HEADERS.len();
    if let Some(error) = &view.table.error {
        out.push_str(&format!(
            "<tr><td class=\"error\" colspan=\"{colspan}\">{}</td></tr>\n",
            escape_html(error)
        ));
    } else if let Some(placeholder) = &view.table.placeholder {
        out.push_str(&format!(
            "<tr><td class=\"placeholder\" colspan=\"{colspan}\">{}</td></tr>\n",
            escape_html(placeholder)
        ));
    }

    for row in &view.table.rows {
        out.push_str("<tr>");
        out.push_str(&format!("<td>{}</td>", escape_html(&row.security_code)));
        out.push_str(&format!("<td>{}</td>", escape_html(&row.security_name)));
        out.push_str(&format!("<td>{}</td>", escape_html(&row.market_label)));
        out.push_str(&format!(
            "<td class=\"{}\">{}</td>",
            row.tone.css_class(),
            escape_html(&row.change)
        ));
        out.push_str("<td>");
        push_link(out, row.detail_link.as_deref(), "Detail");
        push_link(out, row.quote_link.as_deref(), "Quote");
        out.push_str("</td></tr>\n");
    }
    out.push_str("</tbody></table></section>\n");
}

fn render_rank_list(out: &mut String, title: &str, entries: &[RankEntry]) {
    out.push_str(&format!("<div><h2>{}</h2><ol>", escape_html(title)));
    for entry in entries {
        out.push_str("<li>");
        let label = format!("{} {}", entry.security_code, entry.security_name);
        match entry.detail_link.as_deref() {
            Some(link) => push_link(out, Some(link), &label),
            None => out.push_str(&escape_html(&label)),
        }
        out.push_str(&format!(
            " <span class=\"{}\">{}</span></li>",
            entry.tone.css_class(),
            escape_html(&entry.change)
        ));
    }
    out.push_str("</ol></div>");
}

fn push_link(out: &mut String, href: Option<&str>, label: &str) {
    if let Some(href) = href.filter(|href| !href.is_empty()) {
        out.push_str(&format!(
            "<a target=\"_blank\" rel=\"noopener noreferrer\" href=\"{}\">{}</a> ",
            escape_html(href),
            escape_html(label)
        ));
    }
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[derive(Debug, Deserialize)]
struct DateForm {
    date: String,
}

#[derive(Debug, Deserialize)]
struct YearForm {
    year: String,
}

#[derive(Debug, Deserialize)]
struct MonthForm {
    month: String,
}

#[derive(Debug, Deserialize)]
struct MarketForm {
    market: String,
}

fn back_to_dashboard() -> Redirect {
    Redirect::to("/dashboard")
}

async fn get_dashboard_html(State(controller): State<DashboardController>) -> impl IntoResponse {
    let view = controller.view().await;
    info!(
        component = "dashboard_server",
        event = "http.dashboard.request",
        status = ?view.status
    );
    Html(render_dashboard_html(&view))
}

async fn get_dashboard_view(State(controller): State<DashboardController>) -> impl IntoResponse {
    let view = controller.view().await;
    info!(
        component = "dashboard_server",
        event = "http.view.request",
        status = ?view.status
    );
    Json(view)
}

async fn post_date(
    State(controller): State<DashboardController>,
    Form(form): Form<DateForm>,
) -> Result<Redirect, DashboardError> {
    controller.select_date(form.date.trim()).await?;
    Ok(back_to_dashboard())
}

async fn post_year(
    State(controller): State<DashboardController>,
    Form(form): Form<YearForm>,
) -> Result<Redirect, DashboardError> {
    controller.select_year(form.year.trim()).await?;
    Ok(back_to_dashboard())
}

async fn post_month(
    State(controller): State<DashboardController>,
    Form(form): Form<MonthForm>,
) -> Result<Redirect, DashboardError> {
    controller.select_month(form.month.trim()).await?;
    Ok(back_to_dashboard())
}

async fn post_prev(State(controller): State<DashboardController>) -> Result<Redirect, DashboardError> {
    controller.step(StepDirection::Prev).await?;
    Ok(back_to_dashboard())
}

async fn post_next(State(controller): State<DashboardController>) -> Result<Redirect, DashboardError> {
    controller.step(StepDirection::Next).await?;
    Ok(back_to_dashboard())
}

async fn post_market(
    State(controller): State<DashboardController>,
    Form(form): Form<MarketForm>,
) -> Result<Redirect, DashboardError> {
    controller.select_filter(form.market.trim()).await?;
    Ok(back_to_dashboard())
}

async fn post_reload(State(controller): State<DashboardController>) -> Redirect {
    let outcome = match controller.reload().await {
        Ok(InitOutcome::NoData) => "no_data",
        Ok(InitOutcome::Loaded(DayLoadOutcome::Failed(_))) => "day_failed",
        Ok(InitOutcome::Loaded(_)) => "ready",
        // Rendered by the page as the failed state.
        Err(_) => "index_failed",
    };
    info!(
        component = "dashboard_server",
        event = "http.reload.request",
        outcome
    );
    back_to_dashboard()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::ChangeTone;
    use crate::navigation::NavTargets;
    use crate::sparkline::build_sparkline;
    use crate::view::{
        CalendarControls, DatePill, FilterButton, HeroView, SelectOption, StockRowView, TableView,
    };

    fn ready_view() -> DashboardView {
        DashboardView {
            status: ViewStatus::Ready,
            message: None,
            hero: HeroView {
                date: Some("2025-03-04".to_string()),
                generated_at: "2025-03-04 08:00 UTC".to_string(),
                total_days: 2,
                total_rows: Some(10),
                source_file: None,
            },
            metrics: Vec::new(),
            market_bars: Vec::new(),
            filters: vec![FilterButton {
                code: "ALL".to_string(),
                label: "All".to_string(),
                active: true,
            }],
            table: TableView {
                rows: vec![StockRowView {
                    security_code: "600000".to_string(),
                    security_name: "<浦发银行>".to_string(),
                    market_label: "沪市".to_string(),
                    change: "+9.98%".to_string(),
                    tone: ChangeTone::Up,
                    detail_link: Some("https://data.eastmoney.com/stock/lhb,2025-03-04,600000.html".to_string()),
                    quote_link: None,
                }],
                placeholder: None,
                error: None,
            },
            top_gainers: Vec::new(),
            top_losers: Vec::new(),
            calendar: CalendarControls {
                years: vec![SelectOption {
                    value: "2025".to_string(),
                    selected: true,
                }],
                months: Vec::new(),
            },
            date_pills: vec![DatePill {
                date: "2025-03-04".to_string(),
                label: "03-04".to_string(),
                active: true,
            }],
            nav: NavTargets {
                prev: Some("2025-03-03".to_string()),
                next: None,
            },
            sparkline: build_sparkline(&[], None),
        }
    }

    #[test]
    fn ready_page_has_controls_table_and_escaped_cells() {
        let html = render_dashboard_html(&ready_view());
        assert!(html.contains("id=\"stock-table\""));
        assert!(html.contains("action=\"/dashboard/market\""));
        assert!(html.contains("&lt;浦发银行&gt;"));
        assert!(html.contains("class=\"tone-up\">+9.98%"));
        assert!(html.contains("id=\"nav-next\" disabled"));
        assert!(!html.contains("id=\"nav-prev\" disabled"));
        assert!(html.contains("<option value=\"2025\" selected>"));
    }

    #[test]
    fn failed_page_shows_only_the_error_row() {
        let mut view = ready_view();
        view.status = ViewStatus::Failed;
        view.message = Some("Failed to load dashboard index: HTTP 500".to_string());
        let html = render_dashboard_html(&view);
        assert!(html.contains("class=\"error\">Failed to load dashboard index: HTTP 500"));
        assert!(!html.contains("market-filters"));
        assert!(html.contains("/dashboard/reload"));
    }

    #[test]
    fn table_error_and_placeholder_rows_span_all_columns() {
        let mut view = ready_view();
        view.table = TableView {
            rows: Vec::new(),
            placeholder: Some("No stocks for this market filter.".to_string()),
            error: None,
        };
        let html = render_dashboard_html(&view);
        assert!(html.contains("class=\"placeholder\" colspan=\"5\""));

        view.table.error = Some("Failed to load 2025-03-03".to_string());
        let html = render_dashboard_html(&view);
        assert!(html.contains("class=\"error\" colspan=\"5\""));
        assert!(!html.contains("class=\"placeholder\""));
    }
}
