//! CSV export of the appointment list for the admin dashboard.

use chrono::{DateTime, Utc};

use crate::models::{AppointmentRow, AppointmentStatus};

const HEADERS: [&str; 10] = [
    "ID",
    "Patient Name",
    "Email",
    "Phone",
    "Procedure",
    "Preferred Date",
    "Status",
    "Message",
    "Created At",
    "Updated At",
];

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

pub fn appointments_to_csv(appointments: &[AppointmentRow]) -> String {
    let mut lines = Vec::with_capacity(appointments.len() + 1);
    lines.push(HEADERS.join(","));

    for appt in appointments {
        let fields = [
            appt.id.to_string(),
            appt.name.clone(),
            appt.email.clone(),
            appt.phone.clone(),
            appt.procedure.clone(),
            appt.preferred_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            appt.status.as_str().to_string(),
            appt.message.clone().unwrap_or_default(),
            appt.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            appt.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ];
        let row: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        lines.push(row.join(","));
    }

    lines.join("\n")
}

/// Same predicate the admin list view applies: case-insensitive search over
/// name/email/procedure, substring match on phone, optional status filter.
pub fn filter_appointments(
    appointments: &[AppointmentRow],
    search: &str,
    status: Option<AppointmentStatus>,
) -> Vec<AppointmentRow> {
    let needle = search.to_lowercase();
    appointments
        .iter()
        .filter(|appt| {
            let matches_search = needle.is_empty()
                || appt.name.to_lowercase().contains(&needle)
                || appt.email.to_lowercase().contains(&needle)
                || appt.phone.contains(search)
                || appt.procedure.to_lowercase().contains(&needle);
            let matches_status = status.is_none_or(|s| appt.status == s);
            matches_search && matches_status
        })
        .cloned()
        .collect()
}

pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("appointments-{}.csv", now.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn appt(name: &str, status: AppointmentStatus, message: Option<&str>) -> AppointmentRow {
        let created = Utc.with_ymd_and_hms(2026, 8, 1, 9, 30, 0).unwrap();
        AppointmentRow {
            id: Uuid::nil(),
            name: name.into(),
            email: format!("{}@x.com", name.to_lowercase().replace(' ', ".")),
            phone: "+255700000000".into(),
            procedure: "Rhinoplasty".into(),
            preferred_date: None,
            message: message.map(str::to_string),
            status,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn header_row_matches_admin_columns() {
        let csv = appointments_to_csv(&[]);
        assert_eq!(
            csv,
            "ID,Patient Name,Email,Phone,Procedure,Preferred Date,Status,Message,Created At,Updated At"
        );
    }

    #[test]
    fn quotes_are_doubled_inside_fields() {
        let rows = vec![appt(
            "Jane Doe",
            AppointmentStatus::Pending,
            Some("said \"soon\""),
        )];
        let csv = appointments_to_csv(&rows);
        assert!(csv.contains("\"said \"\"soon\"\"\""));
        assert!(csv.contains("\"2026-08-01 09:30:00\""));
        assert!(csv.contains("\"pending\""));
    }

    #[test]
    fn search_filter_is_case_insensitive() {
        let rows = vec![
            appt("Jane Doe", AppointmentStatus::Pending, None),
            appt("John Smith", AppointmentStatus::Confirmed, None),
        ];
        let hits = filter_appointments(&rows, "JANE", None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Jane Doe");
    }

    #[test]
    fn status_filter_composes_with_search() {
        let rows = vec![
            appt("Jane Doe", AppointmentStatus::Pending, None),
            appt("Jane Roe", AppointmentStatus::Confirmed, None),
        ];
        let hits = filter_appointments(&rows, "jane", Some(AppointmentStatus::Confirmed));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Jane Roe");
    }

    #[test]
    fn export_filename_is_dated() {
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 0, 0, 0).unwrap();
        assert_eq!(export_filename(now), "appointments-2026-08-05.csv");
    }
}
