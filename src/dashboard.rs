use std::collections::HashMap;

use crate::metrics::{self, ProgressBand};
use crate::models::{DashboardStats, StudentRecord};

/// A student is fully complete only with at least one module and every module completed.
/// An empty course map is "not started", not vacuously complete.
pub fn is_fully_completed(student: &StudentRecord) -> bool {
    let progress = &student.course_progress;
    !progress.is_empty() && progress.completed_count() == progress.len()
}

pub fn compute_stats(students: &[StudentRecord], total_fee: u64) -> DashboardStats {
    let total_students = students.len();
    if total_students == 0 {
        return DashboardStats::default();
    }

    let mut progress_sum = 0u64;
    let mut total_revenue = 0u64;
    let mut completed = 0u64;

    for student in students {
        let derived = metrics::derive(student, total_fee);
        progress_sum += u64::from(derived.progress_percentage);
        total_revenue = total_revenue.saturating_add(derived.amount_paid);
        if is_fully_completed(student) {
            completed += 1;
        }
    }

    DashboardStats {
        total_students,
        // mean of percentages == rounded_percent(sum, 100 * n)
        average_progress: metrics::rounded_percent(progress_sum, 100 * total_students as u64),
        total_revenue,
        completion_rate: metrics::rounded_percent(completed, total_students as u64),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandCount {
    pub band: ProgressBand,
    pub count: usize,
}

/// Students per progress band, lowest band first.
pub fn band_breakdown(students: &[StudentRecord]) -> Vec<BandCount> {
    let mut counts: HashMap<ProgressBand, usize> = HashMap::new();
    for student in students {
        let pct = metrics::progress_percentage(Some(&student.course_progress));
        *counts.entry(ProgressBand::for_percentage(pct)).or_insert(0) += 1;
    }

    [
        ProgressBand::Low,
        ProgressBand::Moderate,
        ProgressBand::Progressing,
        ProgressBand::Completed,
    ]
    .into_iter()
    .map(|band| BandCount {
        band,
        count: counts.get(&band).copied().unwrap_or(0),
    })
    .collect()
}

/// Students with a balance left, largest balance first. Ties keep source order.
pub fn outstanding_balances(students: &[StudentRecord], total_fee: u64) -> Vec<(&StudentRecord, u64)> {
    let mut owing: Vec<(&StudentRecord, u64)> = students
        .iter()
        .map(|student| (student, metrics::derive(student, total_fee).outstanding))
        .filter(|(_, outstanding)| *outstanding > 0)
        .collect();
    owing.sort_by(|a, b| b.1.cmp(&a.1));
    owing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::TOTAL_FEE;
    use crate::models::{CourseProgress, CourseStatus, PaymentDetails, PaymentStatus};

    fn student(name: &str, statuses: &[bool], paid: Option<u64>) -> StudentRecord {
        let progress = statuses
            .iter()
            .enumerate()
            .map(|(i, done)| {
                let status = if *done {
                    CourseStatus::Completed
                } else {
                    CourseStatus::Pending("Not Completed".to_string())
                };
                (format!("Module {i}"), status)
            })
            .collect();
        StudentRecord {
            full_name: name.to_string(),
            course_progress: CourseProgress::new(progress),
            payment_status: paid.map(|paid| {
                PaymentStatus::Detailed(PaymentDetails {
                    paid: Some(paid),
                    ..PaymentDetails::default()
                })
            }),
            ..StudentRecord::default()
        }
    }

    #[test]
    fn empty_collection_degrades_to_zero() {
        let stats = compute_stats(&[], TOTAL_FEE);
        assert_eq!(stats, DashboardStats::default());
        assert_eq!(stats.average_progress, 0);
        assert_eq!(stats.completion_rate, 0);
    }

    #[test]
    fn aggregates_over_the_collection() {
        let students = vec![
            student("Moses", &[true, true], Some(25_000)),
            student("Sarah", &[true, false], Some(TOTAL_FEE)),
            student("Grace", &[false, false], None),
        ];
        let stats = compute_stats(&students, TOTAL_FEE);
        assert_eq!(stats.total_students, 3);
        // (100 + 50 + 0) / 3 = 50
        assert_eq!(stats.average_progress, 50);
        assert_eq!(stats.total_revenue, 25_000 + TOTAL_FEE);
        // 1 of 3 -> 33
        assert_eq!(stats.completion_rate, 33);
    }

    #[test]
    fn zero_course_student_is_not_complete() {
        let students = vec![student("Empty", &[], None), student("Done", &[true], None)];
        assert!(!is_fully_completed(&students[0]));
        let stats = compute_stats(&students, TOTAL_FEE);
        assert_eq!(stats.completion_rate, 50);
        assert_eq!(stats.average_progress, 50);
    }

    #[test]
    fn bands_cover_every_student() {
        let students = vec![
            student("a", &[false], None),
            student("b", &[true, false], None),
            student("c", &[true, true, true, false], None),
            student("d", &[true], None),
            student("e", &[], None),
        ];
        let bands = band_breakdown(&students);
        let counts: Vec<usize> = bands.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![2, 1, 1, 1]);
    }

    #[test]
    fn outstanding_sorted_by_balance() {
        let students = vec![
            student("partial", &[], Some(30_000)),
            student("none", &[], None),
            student("paid", &[], Some(TOTAL_FEE)),
        ];
        let owing = outstanding_balances(&students, TOTAL_FEE);
        let names: Vec<&str> = owing.iter().map(|(s, _)| s.full_name.as_str()).collect();
        assert_eq!(names, vec!["none", "partial"]);
        assert_eq!(owing[1].1, TOTAL_FEE - 30_000);
    }
}
