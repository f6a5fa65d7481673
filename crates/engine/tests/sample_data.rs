//! The bundled dashboards evaluated with the bundled and the default configuration.

use std::path::PathBuf;

use guardian_core::{Dashboard, EngineConfig, IssueKind};
use guardian_engine::{Engine, Evaluation, TemplateAnnotator};

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

fn dashboards() -> Vec<Dashboard> {
    let raw = std::fs::read_to_string(data_dir().join("dashboards/sample-dashboards.json"))
        .expect("sample dashboards present");
    serde_json::from_str(&raw).expect("sample dashboards parse")
}

fn bundled_config() -> EngineConfig {
    EngineConfig::from_file(data_dir().join("config/quality-config.yml"))
        .expect("bundled config is valid")
}

fn kinds(evaluation: &Evaluation, metric_id: &str) -> Vec<IssueKind> {
    evaluation.issues_by_metric[metric_id]
        .iter()
        .map(|i| i.kind())
        .collect()
}

#[test]
fn bundled_config_results() {
    let engine = Engine::new(bundled_config()).unwrap();
    let dashboards = dashboards();
    assert_eq!(dashboards.len(), 2);

    let sales = engine.evaluate_dashboard(&dashboards[0]).unwrap();
    assert_eq!(sales.dashboard_id, "sales-overview");
    assert_eq!(
        kinds(&sales, "sales-overview/kpis/revenue"),
        vec![IssueKind::ExtremeValue, IssueKind::Spike]
    );
    assert_eq!(
        kinds(&sales, "sales-overview/kpis/orders"),
        vec![IssueKind::NullOrZero]
    );
    assert_eq!(
        kinds(&sales, "sales-overview/kpis/margin"),
        vec![IssueKind::Flatline]
    );
    assert_eq!(sales.score.score, 77);

    let marketing = engine.evaluate_dashboard(&dashboards[1]).unwrap();
    assert_eq!(
        kinds(&marketing, "marketing-performance/funnel/site_visits"),
        vec![IssueKind::NullOrZero, IssueKind::ExtremeValue, IssueKind::Drop]
    );
    assert!(kinds(&marketing, "marketing-performance/funnel/conversions").is_empty());
    assert!(kinds(&marketing, "marketing-performance/funnel/cost").is_empty());
    assert_eq!(marketing.score.score, 79);
}

#[test]
fn default_config_needs_more_history_for_percentiles() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    let dashboards = dashboards();

    let sales = engine.evaluate_dashboard(&dashboards[0]).unwrap();
    assert_eq!(
        kinds(&sales, "sales-overview/kpis/revenue"),
        vec![IssueKind::Spike]
    );
    assert_eq!(sales.score.score, 84);

    // site_visits carries its own expected range
    let marketing = engine.evaluate_dashboard(&dashboards[1]).unwrap();
    assert_eq!(marketing.score.score, 79);
}

#[tokio::test]
async fn full_run_produces_a_report_per_dashboard() {
    let engine = Engine::new(bundled_config()).unwrap();
    let outcome = engine.run(&dashboards(), &TemplateAnnotator).await;
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.reports.len(), 2);

    let sales = &outcome.reports[0];
    assert_eq!(sales.dashboard_name(), "Sales Overview");
    assert_eq!(sales.issues().count(), 4);
    assert!(sales
        .issues()
        .all(|ri| ri.explanation_source == "template" && !ri.explanation.is_empty()));

    let summary = sales.summary_text();
    assert!(summary.starts_with("Data Quality Report: Sales Overview"));
    assert!(summary.contains("Score: 77/100 (critical 0, major 3, minor 1)"));
}
