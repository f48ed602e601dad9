use serde::{Deserialize, Serialize};

use crate::schema::Kpis;

#[derive(Debug, Clone, PartialEq)]
pub struct Patient {
    pub patient_id: u32,
    pub arrival_hour: u32,
    /// 1 (minor) ..= 5 (critical)
    pub acuity_level: u8,
    pub estimated_service_time: f64,
    pub started_hour: Option<u32>,
    pub completed_hour: Option<u32>,
    pub has_error: bool,
}

impl Patient {
    pub fn arriving(patient_id: u32, arrival_hour: u32, acuity_level: u8, estimated_service_time: f64) -> Self {
        Self {
            patient_id,
            arrival_hour,
            acuity_level,
            estimated_service_time,
            started_hour: None,
            completed_hour: None,
            has_error: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub beds: u32,
    pub nurses: u32,
    pub doctors: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisruptionEvent {
    pub name: &'static str,
    pub severity: f64,
    pub remaining_hours: u32,
}

/// Aggregated outcome of one shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftReport {
    pub door_to_doctor: f64,
    pub length_of_stay: f64,
    pub throughput: u32,
    pub error_rate: f64,
    pub treated_patients: u32,
    pub untreated_patients: u32,
    pub event_log: Vec<String>,
}

impl From<ShiftReport> for Kpis {
    fn from(report: ShiftReport) -> Self {
        Kpis {
            door_to_doctor: report.door_to_doctor,
            length_of_stay: report.length_of_stay,
            throughput: f64::from(report.throughput),
            error_rate: report.error_rate,
            treated_patients: report.treated_patients,
            untreated_patients: report.untreated_patients,
            event_log: report.event_log,
        }
    }
}
