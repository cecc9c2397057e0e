//! Dashboard aggregates over persisted predictions.
//!
//! Everything here is read-only and computed relative to a reference day,
//! normally today.

use crate::error::Result;
use chrono::{Datelike, NaiveDate};
use mdp_data::classify::{Action, RiskLevel};
use mdp_db::{Database, PredictionRecord};
use mdp_utils::dates::{month_abbreviation, month_bounds, previous_month, stepped_dates_back};
use serde::Serialize;

/// Number of points in the trailing trend.
pub const TREND_POINTS: u32 = 6;

/// Day step between trend points. An approximation of one month.
pub const TREND_STEP_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_predicted_amount: f64,
    /// Percent change against the previous calendar month.
    pub previous_month_change: f64,
    pub high_risk_count: usize,
    pub medium_risk_count: usize,
    pub immediate_action_count: usize,
    pub regular_check_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrend {
    pub month: String,
    pub year: i32,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskArea {
    pub beach_name: String,
    pub predicted_amount: f64,
    pub risk_level: RiskLevel,
    pub action_required: Action,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardResponse {
    /// `YYYY-MM` of the reference day.
    pub target_month: String,
    pub summary: DashboardSummary,
    pub monthly_trends: Vec<MonthlyTrend>,
    pub risk_areas: Vec<RiskArea>,
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// `(current - previous) / previous * 100`, or `0` when there is no
/// positive baseline.
pub fn change_rate(previous: f64, current: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

/// Total predicted mass over a calendar month.
pub fn month_total(db: &Database, year: i32, month: u32) -> Result<f64> {
    let (first, last) = month_bounds(year, month)?;
    Ok(db.query_total_between(&first, &last)?)
}

/// Each site's latest record in the month, ranked by mass, heaviest first.
///
/// Sites with equal mass keep their relative order.
pub fn risk_areas(latest: &[PredictionRecord]) -> Vec<RiskArea> {
    let mut areas: Vec<RiskArea> = latest
        .iter()
        .map(|r| RiskArea {
            beach_name: r.site_name.clone(),
            predicted_amount: r.trash_amount,
            risk_level: RiskLevel::for_mass(r.trash_amount),
            action_required: Action::for_mass(r.trash_amount),
            latitude: r.latitude,
            longitude: r.longitude,
        })
        .collect();
    areas.sort_by(|a, b| b.predicted_amount.total_cmp(&a.predicted_amount));
    areas
}

/// Monthly totals for the calendar months containing `today - 30·i` days,
/// `i = 5..=0`, oldest first. Two points can land in the same month.
pub fn monthly_trend(db: &Database, today: &NaiveDate) -> Result<Vec<MonthlyTrend>> {
    stepped_dates_back(today, TREND_POINTS, TREND_STEP_DAYS)?
        .into_iter()
        .map(|d| -> Result<MonthlyTrend> {
            let total = month_total(db, d.year(), d.month())?;
            Ok(MonthlyTrend {
                month: month_abbreviation(d.month()).to_string(),
                year: d.year(),
                total_amount: round_to(total, 2),
            })
        })
        .collect()
}

/// Build the dashboard for the calendar month containing `today`.
pub fn dashboard(db: &Database, today: NaiveDate) -> Result<DashboardResponse> {
    let (year, month) = (today.year(), today.month());
    let (first, last) = month_bounds(year, month)?;
    let (prev_year, prev_month) = previous_month(year, month);

    let current = month_total(db, year, month)?;
    let previous = month_total(db, prev_year, prev_month)?;

    let latest = db.query_latest_per_site_between(&first, &last)?;
    let areas = risk_areas(&latest);

    let summary = DashboardSummary {
        total_predicted_amount: round_to(current, 2),
        previous_month_change: round_to(change_rate(previous, current), 1),
        high_risk_count: areas.iter().filter(|a| a.risk_level == RiskLevel::High).count(),
        medium_risk_count: areas.iter().filter(|a| a.risk_level == RiskLevel::Medium).count(),
        immediate_action_count: areas
            .iter()
            .filter(|a| a.action_required == Action::ImmediateCollection)
            .count(),
        regular_check_count: areas.iter().filter(|a| a.action_required.is_routine()).count(),
    };

    log::info!(
        "Dashboard for {}-{:02}: total {:.2}, {} sites ranked",
        year,
        month,
        summary.total_predicted_amount,
        areas.len()
    );

    Ok(DashboardResponse {
        target_month: format!("{}-{:02}", year, month),
        summary,
        monthly_trends: monthly_trend(db, &today)?,
        risk_areas: areas,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::site;
    use chrono::NaiveDateTime;
    use mdp_data::classify::Status;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn db() -> Database {
        let db = Database::new().unwrap();
        db.insert_sites(&[
            site("Gwakji", 33.450, 126.305),
            site("Hamdeok", 33.543, 126.669),
            site("Iho Tewoo", 33.498, 126.452),
            site("Woljeong", 33.556, 126.795),
        ])
        .unwrap();
        db
    }

    fn record(name: &str, on: NaiveDate, mass: f64) -> PredictionRecord {
        PredictionRecord {
            site_name: name.to_string(),
            prediction_date: on,
            latitude: 33.5,
            longitude: 126.5,
            trash_amount: mass,
            status: Status::for_mass(mass),
            current_dir: None,
            current_speed: None,
            wind_dir: None,
            wind_speed: None,
            temperature: None,
            created_at: NaiveDateTime::default(),
        }
    }

    fn put(db: &Database, on: NaiveDate, rows: &[(&str, f64)]) {
        let records: Vec<_> = rows.iter().map(|(n, m)| record(n, on, *m)).collect();
        db.replace_records_for_date(&on, &records).unwrap();
    }

    #[test]
    fn test_change_rate() {
        assert_eq!(change_rate(0.0, 500.0), 0.0);
        assert!((change_rate(1000.0, 1100.0) - 10.0).abs() < 1e-9);
        assert!((change_rate(200.0, 150.0) + 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1234.5678, 2), 1234.57);
        assert_eq!(round_to(9.96, 1), 10.0);
    }

    #[test]
    fn test_risk_areas_sorted_and_stable() {
        let day = date(2025, 12, 18);
        let latest = vec![
            record("Gwakji", day, 250.0),
            record("Hamdeok", day, 410.0),
            record("Iho Tewoo", day, 250.0),
            record("Woljeong", day, 120.0),
        ];
        let areas = risk_areas(&latest);
        let names: Vec<&str> = areas.iter().map(|a| a.beach_name.as_str()).collect();
        assert_eq!(names, vec!["Hamdeok", "Gwakji", "Iho Tewoo", "Woljeong"]);
        assert_eq!(areas[0].risk_level, RiskLevel::High);
        assert_eq!(areas[0].action_required, Action::ImmediateCollection);
        assert_eq!(areas[1].risk_level, RiskLevel::Medium);
        assert_eq!(areas[1].action_required, Action::RegularInspection);
        assert_eq!(areas[3].action_required, Action::Watch);
    }

    #[test]
    fn test_monthly_trend_buckets() {
        let db = db();
        put(&db, date(2025, 7, 10), &[("Hamdeok", 100.0)]);
        put(&db, date(2025, 12, 2), &[("Hamdeok", 50.25), ("Gwakji", 20.0)]);

        let trend = monthly_trend(&db, &date(2025, 12, 18)).unwrap();
        let labels: Vec<(&str, i32)> = trend.iter().map(|t| (t.month.as_str(), t.year)).collect();
        assert_eq!(
            labels,
            vec![
                ("Jul", 2025),
                ("Aug", 2025),
                ("Sep", 2025),
                ("Oct", 2025),
                ("Nov", 2025),
                ("Dec", 2025)
            ]
        );
        assert_eq!(trend[0].total_amount, 100.0);
        assert_eq!(trend[1].total_amount, 0.0);
        assert_eq!(trend[5].total_amount, 70.25);
    }

    #[test]
    fn test_monthly_trend_can_repeat_a_month() {
        // 2025-03-31 minus 30 days lands in March again
        let trend = monthly_trend(&db(), &date(2025, 3, 31)).unwrap();
        assert_eq!(trend.len(), 6);
        assert_eq!((trend[4].month.as_str(), trend[5].month.as_str()), ("Mar", "Mar"));
    }

    #[test]
    fn test_dashboard_summary() {
        let db = db();
        put(&db, date(2025, 11, 20), &[("Hamdeok", 1000.0)]);
        put(
            &db,
            date(2025, 12, 3),
            &[("Hamdeok", 500.0), ("Gwakji", 300.0), ("Iho Tewoo", 100.0)],
        );
        put(&db, date(2025, 12, 17), &[("Hamdeok", 200.0)]);

        let response = dashboard(&db, date(2025, 12, 18)).unwrap();
        assert_eq!(response.target_month, "2025-12");
        assert_eq!(response.summary.total_predicted_amount, 1100.0);
        assert_eq!(response.summary.previous_month_change, 10.0);

        // latest per site: Hamdeok 200 (12-17), Gwakji 300, Iho Tewoo 100
        let names: Vec<&str> = response
            .risk_areas
            .iter()
            .map(|a| a.beach_name.as_str())
            .collect();
        assert_eq!(names, vec!["Gwakji", "Hamdeok", "Iho Tewoo"]);
        assert_eq!(response.summary.high_risk_count, 0);
        assert_eq!(response.summary.medium_risk_count, 1);
        assert_eq!(response.summary.immediate_action_count, 0);
        assert_eq!(response.summary.regular_check_count, 2);
        assert_eq!(response.monthly_trends.len(), 6);
        assert_eq!(response.monthly_trends[4].total_amount, 1000.0);
    }

    #[test]
    fn test_dashboard_without_previous_month() {
        let db = db();
        put(&db, date(2026, 1, 5), &[("Woljeong", 500.0)]);
        let response = dashboard(&db, date(2026, 1, 9)).unwrap();
        assert_eq!(response.target_month, "2026-01");
        assert_eq!(response.summary.previous_month_change, 0.0);
        assert_eq!(response.summary.high_risk_count, 1);
        assert_eq!(response.summary.immediate_action_count, 1);
    }

    #[test]
    fn test_dashboard_empty_database() {
        let response = dashboard(&db(), date(2025, 12, 18)).unwrap();
        assert_eq!(response.summary.total_predicted_amount, 0.0);
        assert!(response.risk_areas.is_empty());
        assert!(response.monthly_trends.iter().all(|t| t.total_amount == 0.0));
    }

    #[test]
    fn test_dashboard_serializes_labels() {
        let db = db();
        put(&db, date(2025, 12, 1), &[("Hamdeok", 420.0)]);
        let json = serde_json::to_value(dashboard(&db, date(2025, 12, 18)).unwrap()).unwrap();
        assert_eq!(json["risk_areas"][0]["risk_level"], "HIGH");
        assert_eq!(json["risk_areas"][0]["action_required"], "IMMEDIATE_COLLECTION");
        assert_eq!(json["monthly_trends"][5]["month"], "Dec");
    }
}
