use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde_json::json;

use super::entities::{DisruptionEvent, Patient, Resources, ShiftReport};
use crate::config::SimulationSettings;
use crate::economics::round_to;
use crate::logging::{log, obj, v_num, Domain, Level, ProfileScope};

const MASS_CASUALTY: (&str, f64, u32) = ("mass_casualty", 0.45, 2);
const SYSTEM_OUTAGE: (&str, f64, u32) = ("system_outage", 0.7, 1);

pub struct ErSimulation {
    shift_hours: u32,
    patients_per_hour: u32,
    event_probabilities: HashMap<String, f64>,
    rng: StdRng,
}

impl ErSimulation {
    /// A `None` seed draws from entropy.
    pub fn new(settings: &SimulationSettings, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            shift_hours: settings.shift_hours,
            patients_per_hour: settings.patients_per_hour,
            event_probabilities: settings.event_probabilities.clone(),
            rng,
        }
    }

    pub fn run(&mut self, resources: Resources, triage_efficiency: f64, workflow_efficiency: f64) -> ShiftReport {
        let _scope = ProfileScope::with_context(
            "er_shift",
            &[
                ("triage_efficiency", v_num(triage_efficiency)),
                ("workflow_efficiency", v_num(workflow_efficiency)),
            ],
        );

        let mut patients = self.generate_patients();
        let mut queue: Vec<usize> = Vec::new();
        let mut events: Vec<DisruptionEvent> = Vec::new();
        let mut event_log: Vec<String> = Vec::new();

        for hour in 0..self.shift_hours {
            queue.extend(
                patients
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.arrival_hour == hour)
                    .map(|(idx, _)| idx),
            );
            self.activate_events(hour, &mut events, &mut event_log);

            let disruption = 1.0 + events.iter().map(|e| e.severity).sum::<f64>();
            let capacity = hourly_capacity(resources, disruption, workflow_efficiency);

            // Highest acuity first; shorter jobs first within the same acuity.
            queue.sort_by(|&a, &b| {
                let (pa, pb) = (&patients[a], &patients[b]);
                pb.acuity_level.cmp(&pa.acuity_level).then(
                    pa.estimated_service_time
                        .total_cmp(&pb.estimated_service_time),
                )
            });

            let served = capacity.min(queue.len());
            for &idx in &queue[..served] {
                let error_chance = (0.015 * disruption * (1.0 / triage_efficiency)).min(0.5);
                let has_error = self.rng.gen::<f64>() < error_chance;
                let patient = &mut patients[idx];
                if patient.started_hour.is_none() {
                    patient.started_hour = Some(hour);
                }
                let duration = (patient.estimated_service_time * disruption)
                    .round_ties_even()
                    .max(1.0) as u32;
                patient.completed_hour = Some(self.shift_hours.min(hour + duration));
                patient.has_error = has_error;
            }
            queue.drain(..served);
            decay_events(&mut events);
        }

        summarize(&patients, event_log)
    }

    fn generate_patients(&mut self) -> Vec<Patient> {
        let mut patients = Vec::with_capacity((self.shift_hours * self.patients_per_hour) as usize);
        let mut patient_id = 0;
        for hour in 0..self.shift_hours {
            for _ in 0..self.patients_per_hour {
                let acuity: u8 = self.rng.gen_range(1..=5);
                let noise: f64 = self.rng.sample(StandardNormal);
                let service_time = (1.3 + f64::from(acuity) * 0.25 + noise * 0.35).max(0.4);
                patients.push(Patient::arriving(patient_id, hour, acuity, service_time));
                patient_id += 1;
            }
        }
        patients
    }

    fn activate_events(&mut self, hour: u32, events: &mut Vec<DisruptionEvent>, event_log: &mut Vec<String>) {
        for (name, severity, duration) in [MASS_CASUALTY, SYSTEM_OUTAGE] {
            let probability = self.event_probabilities.get(name).copied().unwrap_or(0.0);
            if self.rng.gen::<f64>() < probability {
                events.push(DisruptionEvent {
                    name,
                    severity,
                    remaining_hours: duration,
                });
                event_log.push(format!("Hour {}: {}", hour, name));
                log(
                    Level::Debug,
                    Domain::Simulation,
                    "disruption",
                    obj(&[("hour", json!(hour)), ("event", json!(name))]),
                );
            }
        }
    }
}

fn hourly_capacity(resources: Resources, disruption: f64, workflow_efficiency: f64) -> usize {
    let gross = f64::from(resources.doctors) * 2.0
        + f64::from(resources.nurses)
        + f64::from(resources.beds) * 0.4;
    let adjusted = gross * workflow_efficiency / disruption;
    (adjusted.floor() as usize).max(1)
}

fn decay_events(events: &mut Vec<DisruptionEvent>) {
    for event in events.iter_mut() {
        event.remaining_hours = event.remaining_hours.saturating_sub(1);
    }
    events.retain(|e| e.remaining_hours > 0);
}

fn summarize(patients: &[Patient], event_log: Vec<String>) -> ShiftReport {
    let treated: Vec<&Patient> = patients
        .iter()
        .filter(|p| p.started_hour.is_some() && p.completed_hour.is_some())
        .collect();
    let untreated = patients.iter().filter(|p| p.started_hour.is_none()).count() as u32;

    if treated.is_empty() {
        return ShiftReport {
            door_to_doctor: 0.0,
            length_of_stay: 0.0,
            throughput: 0,
            error_rate: 1.0,
            treated_patients: 0,
            untreated_patients: untreated,
            event_log,
        };
    }

    let n = treated.len() as f64;
    let mut wait = 0.0;
    let mut stay = 0.0;
    let mut errors = 0usize;
    for p in &treated {
        if let (Some(started), Some(completed)) = (p.started_hour, p.completed_hour) {
            wait += f64::from(started - p.arrival_hour);
            stay += f64::from(completed - p.arrival_hour);
        }
        if p.has_error {
            errors += 1;
        }
    }

    ShiftReport {
        door_to_doctor: round_to(wait / n, 2),
        length_of_stay: round_to(stay / n, 2),
        throughput: treated.len() as u32,
        error_rate: round_to(errors as f64 / n, 3),
        treated_patients: treated.len() as u32,
        untreated_patients: untreated,
        event_log,
    }
}
