//! Derived statistics over the full appointment collection.
//!
//! Everything here is a pure function of the rows plus a reference time,
//! recomputed from scratch on each fetch. Group counts use sorted maps so
//! results never depend on input ordering.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::models::{AppointmentRow, AppointmentStatus, BlogPostRow, GalleryImageRow};

/// Display-only estimate; swap this out for a real pricing lookup without
/// touching the rest of the aggregation.
pub const REVENUE_PER_APPOINTMENT_TZS: i64 = 2_000_000;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const PROCEDURE_PALETTE: [&str; 7] = [
    "#8884d8", "#82ca9d", "#ffc658", "#ff8042", "#0088fe", "#ff6b6b", "#4ecdc4",
];

fn status_color(status: AppointmentStatus) -> &'static str {
    match status {
        AppointmentStatus::Pending => "#ffa726",
        AppointmentStatus::Confirmed => "#66bb6a",
        AppointmentStatus::Completed => "#29b6f6",
        AppointmentStatus::Cancelled => "#ef5350",
    }
}

pub fn estimated_revenue(count: u32) -> i64 {
    i64::from(count) * REVENUE_PER_APPOINTMENT_TZS
}

/// Placeholder metric: there is no inquiries entity to measure a real
/// funnel against, so the denominator pads the total with a constant.
pub fn conversion_rate(total: u32) -> u32 {
    let denominator = if total > 0 { total + 5 } else { 10 };
    ((f64::from(total) / f64::from(denominator)) * 100.0).round() as u32
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthlyPoint {
    pub month: &'static str,
    pub appointments: u32,
    pub revenue: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DistributionSlice {
    pub name: String,
    pub value: u32,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub total_appointments: u32,
    pub total_revenue: i64,
    pub avg_monthly_appointments: u32,
    pub conversion_rate: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSnapshot {
    pub appointment_data: Vec<MonthlyPoint>,
    pub procedure_data: Vec<DistributionSlice>,
    pub status_data: Vec<DistributionSlice>,
    pub summary: AnalyticsSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_appointments: u32,
    pub pending_appointments: u32,
    pub this_month_appointments: u32,
    pub conversion_rate: u32,
    pub total_blog_posts: u32,
    pub published_blog_posts: u32,
    pub total_gallery_images: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Appointment,
    Blog,
    Gallery,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityItem {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Appointments created per calendar month of the reference year, with the
/// revenue estimate. Months with no appointments are dropped.
pub fn monthly_series(appointments: &[AppointmentRow], now: DateTime<Utc>) -> Vec<MonthlyPoint> {
    let year = now.year();
    let mut counts = [0u32; 12];
    for appt in appointments {
        if appt.created_at.year() == year {
            counts[appt.created_at.month0() as usize] += 1;
        }
    }

    MONTHS
        .into_iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(month, count)| MonthlyPoint {
            month,
            appointments: count,
            revenue: estimated_revenue(count),
        })
        .collect()
}

/// Group-count by procedure, empty values bucketed as "Other". Colors are
/// assigned cyclically over the sorted names so the result is independent
/// of input order.
pub fn procedure_distribution(appointments: &[AppointmentRow]) -> Vec<DistributionSlice> {
    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for appt in appointments {
        let name = if appt.procedure.is_empty() {
            "Other"
        } else {
            appt.procedure.as_str()
        };
        *counts.entry(name).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, (name, value))| DistributionSlice {
            name: name.to_string(),
            value,
            color: PROCEDURE_PALETTE[i % PROCEDURE_PALETTE.len()].to_string(),
        })
        .collect()
}

/// Group-count by status with the fixed color table and capitalized
/// labels; statuses with no appointments are omitted.
pub fn status_distribution(appointments: &[AppointmentRow]) -> Vec<DistributionSlice> {
    let mut counts: BTreeMap<usize, u32> = BTreeMap::new();
    for appt in appointments {
        let idx = AppointmentStatus::ALL
            .iter()
            .position(|s| *s == appt.status)
            .unwrap_or(0);
        *counts.entry(idx).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|(idx, value)| {
            let status = AppointmentStatus::ALL[idx];
            DistributionSlice {
                name: status.label().to_string(),
                value,
                color: status_color(status).to_string(),
            }
        })
        .collect()
}

fn this_month_count(appointments: &[AppointmentRow], now: DateTime<Utc>) -> u32 {
    let month_start = now
        .date_naive()
        .with_day(1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let month_start = DateTime::<Utc>::from_naive_utc_and_offset(month_start, Utc);
    appointments
        .iter()
        .filter(|a| a.created_at >= month_start)
        .count() as u32
}

pub fn analytics_snapshot(appointments: &[AppointmentRow], now: DateTime<Utc>) -> AnalyticsSnapshot {
    let appointment_data = monthly_series(appointments, now);
    let procedure_data = procedure_distribution(appointments);
    let status_data = status_distribution(appointments);

    let total_appointments = appointments.len() as u32;
    let total_revenue = appointment_data.iter().map(|p| p.revenue).sum();
    let avg_monthly_appointments = if appointment_data.is_empty() {
        0
    } else {
        (f64::from(total_appointments) / appointment_data.len() as f64).round() as u32
    };

    AnalyticsSnapshot {
        appointment_data,
        procedure_data,
        status_data,
        summary: AnalyticsSummary {
            total_appointments,
            total_revenue,
            avg_monthly_appointments,
            conversion_rate: conversion_rate(total_appointments),
        },
    }
}

pub fn dashboard_stats(
    appointments: &[AppointmentRow],
    blog_posts: &[BlogPostRow],
    gallery_images: &[GalleryImageRow],
    now: DateTime<Utc>,
) -> DashboardStats {
    let total_appointments = appointments.len() as u32;
    let pending_appointments = appointments
        .iter()
        .filter(|a| a.status == AppointmentStatus::Pending)
        .count() as u32;

    DashboardStats {
        total_appointments,
        pending_appointments,
        this_month_appointments: this_month_count(appointments, now),
        conversion_rate: conversion_rate(total_appointments),
        total_blog_posts: blog_posts.len() as u32,
        published_blog_posts: blog_posts
            .iter()
            .filter(|p| p.status == "published")
            .count() as u32,
        total_gallery_images: gallery_images.len() as u32,
    }
}

/// Latest records across collections, merged into one feed: top three
/// appointments, top two blog posts, top two gallery images, newest five
/// overall.
pub fn recent_activity(
    appointments: &[AppointmentRow],
    blog_posts: &[BlogPostRow],
    gallery_images: &[GalleryImageRow],
) -> Vec<ActivityItem> {
    let mut items: Vec<ActivityItem> = Vec::new();

    let mut appts: Vec<&AppointmentRow> = appointments.iter().collect();
    appts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    items.extend(appts.into_iter().take(3).map(|a| ActivityItem {
        id: a.id,
        kind: ActivityKind::Appointment,
        title: format!("New appointment: {}", a.name),
        timestamp: a.created_at,
        status: Some(a.status.as_str().to_string()),
    }));

    let mut posts: Vec<&BlogPostRow> = blog_posts.iter().collect();
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    items.extend(posts.into_iter().take(2).map(|p| ActivityItem {
        id: p.id,
        kind: ActivityKind::Blog,
        title: format!("Blog post: {}", p.title),
        timestamp: p.created_at,
        status: Some(p.status.clone()),
    }));

    let mut images: Vec<&GalleryImageRow> = gallery_images.iter().collect();
    images.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    items.extend(images.into_iter().take(2).map(|g| ActivityItem {
        id: g.id,
        kind: ActivityKind::Gallery,
        title: format!(
            "Gallery image: {}",
            g.title.as_deref().unwrap_or("Untitled")
        ),
        timestamp: g.created_at,
        status: None,
    }));

    items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    items.truncate(5);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn appt(status: AppointmentStatus, procedure: &str, created: DateTime<Utc>) -> AppointmentRow {
        AppointmentRow {
            id: Uuid::new_v4(),
            name: "Jane Doe".into(),
            email: "jane@x.com".into(),
            phone: "+255700000000".into(),
            procedure: procedure.into(),
            preferred_date: None,
            message: None,
            status,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn status_distribution_is_permutation_invariant() {
        use AppointmentStatus::*;
        let rows = vec![
            appt(Pending, "Rhinoplasty", ts(2026, 1, 1)),
            appt(Pending, "Face Lift", ts(2026, 2, 1)),
            appt(Confirmed, "Rhinoplasty", ts(2026, 3, 1)),
        ];
        let forward = status_distribution(&rows);

        let reversed: Vec<AppointmentRow> = rows.iter().rev().cloned().collect();
        assert_eq!(forward, status_distribution(&reversed));

        assert_eq!(forward.len(), 2);
        assert_eq!(forward[0].name, "Pending");
        assert_eq!(forward[0].value, 2);
        assert_eq!(forward[0].color, "#ffa726");
        assert_eq!(forward[1].name, "Confirmed");
        assert_eq!(forward[1].value, 1);
    }

    #[test]
    fn procedure_distribution_defaults_empty_to_other() {
        use AppointmentStatus::Pending;
        let rows = vec![
            appt(Pending, "", ts(2026, 1, 1)),
            appt(Pending, "Rhinoplasty", ts(2026, 1, 2)),
            appt(Pending, "Rhinoplasty", ts(2026, 1, 3)),
        ];
        let dist = procedure_distribution(&rows);
        assert_eq!(dist.len(), 2);
        assert_eq!(dist[0].name, "Other");
        assert_eq!(dist[0].value, 1);
        assert_eq!(dist[1].name, "Rhinoplasty");
        assert_eq!(dist[1].value, 2);

        let reversed: Vec<AppointmentRow> = rows.iter().rev().cloned().collect();
        assert_eq!(dist, procedure_distribution(&reversed));
    }

    #[test]
    fn monthly_series_drops_empty_months_and_other_years() {
        use AppointmentStatus::Pending;
        let now = ts(2026, 8, 5);
        let rows = vec![
            appt(Pending, "Rhinoplasty", ts(2026, 3, 1)),
            appt(Pending, "Rhinoplasty", ts(2026, 3, 20)),
            appt(Pending, "Face Lift", ts(2026, 8, 2)),
            appt(Pending, "Face Lift", ts(2025, 8, 2)),
        ];
        let series = monthly_series(&rows, now);
        assert_eq!(
            series,
            vec![
                MonthlyPoint {
                    month: "Mar",
                    appointments: 2,
                    revenue: 4_000_000
                },
                MonthlyPoint {
                    month: "Aug",
                    appointments: 1,
                    revenue: 2_000_000
                },
            ]
        );
    }

    #[test]
    fn empty_collection_yields_zeroed_snapshot() {
        let snapshot = analytics_snapshot(&[], ts(2026, 8, 5));
        assert_eq!(snapshot.summary.total_appointments, 0);
        assert_eq!(snapshot.summary.conversion_rate, 0);
        assert_eq!(snapshot.summary.total_revenue, 0);
        assert!(snapshot.appointment_data.is_empty());
        assert!(snapshot.procedure_data.is_empty());
        assert!(snapshot.status_data.is_empty());
    }

    #[test]
    fn conversion_rate_placeholder_formula() {
        assert_eq!(conversion_rate(0), 0);
        assert_eq!(conversion_rate(1), 17);
        assert_eq!(conversion_rate(5), 50);
        assert_eq!(conversion_rate(95), 95);
    }

    #[test]
    fn this_month_respects_the_calendar_boundary() {
        use AppointmentStatus::Pending;
        let now = ts(2026, 8, 5);
        let rows = vec![
            appt(Pending, "Rhinoplasty", ts(2026, 7, 31)),
            appt(Pending, "Rhinoplasty", ts(2026, 8, 1)),
            appt(Pending, "Rhinoplasty", ts(2026, 8, 4)),
        ];
        let stats = dashboard_stats(&rows, &[], &[], now);
        assert_eq!(stats.this_month_appointments, 2);
        assert_eq!(stats.total_appointments, 3);
        assert_eq!(stats.pending_appointments, 3);
    }

    #[test]
    fn recent_activity_merges_and_truncates() {
        use AppointmentStatus::Pending;
        let appts: Vec<AppointmentRow> = (1..=4)
            .map(|d| appt(Pending, "Rhinoplasty", ts(2026, 6, d)))
            .collect();
        let posts = vec![
            BlogPostRow {
                id: Uuid::new_v4(),
                title: "Recovery tips".into(),
                slug: "recovery-tips".into(),
                excerpt: None,
                content: None,
                image_url: None,
                status: "published".into(),
                published_at: Some(ts(2026, 6, 10)),
                created_at: ts(2026, 6, 10),
                updated_at: ts(2026, 6, 10),
            },
        ];
        let images = vec![GalleryImageRow {
            id: Uuid::new_v4(),
            title: None,
            image_url: "/uploads/x.jpg".into(),
            category: None,
            before_after: false,
            display_order: None,
            created_at: ts(2026, 6, 12),
        }];

        let feed = recent_activity(&appts, &posts, &images);
        assert_eq!(feed.len(), 5);
        // newest overall first
        assert_eq!(feed[0].kind, ActivityKind::Gallery);
        assert_eq!(feed[0].title, "Gallery image: Untitled");
        assert_eq!(feed[1].kind, ActivityKind::Blog);
        // only the top three appointments are considered
        assert_eq!(
            feed.iter()
                .filter(|i| i.kind == ActivityKind::Appointment)
                .count(),
            3
        );
    }
}
