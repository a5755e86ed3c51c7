use crossterm::style::Color;

use crate::models::{CourseProgress, DerivedMetrics, PaymentStatus, StudentRecord};

/// Full programme fee in UGX.
pub const TOTAL_FEE: u64 = 36_696;

/// `round(100 * part / whole)` with halves rounded up; 0 when `whole` is 0.
pub fn rounded_percent(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    let part = part as u128;
    let whole = whole as u128;
    let value = (200 * part + whole) / (2 * whole);
    u32::try_from(value).unwrap_or(u32::MAX)
}

pub fn progress_percentage(progress: Option<&CourseProgress>) -> u32 {
    match progress {
        Some(progress) => {
            rounded_percent(progress.completed_count() as u64, progress.len() as u64)
        }
        None => 0,
    }
}

pub fn amount_paid(payment: Option<&PaymentStatus>) -> u64 {
    payment.map(PaymentStatus::paid).unwrap_or(0)
}

/// Not clamped: an overpaying student reports more than 100.
pub fn payment_percentage(amount_paid: u64, total_fee: u64) -> u32 {
    rounded_percent(amount_paid, total_fee)
}

/// Payment on the record itself, falling back to the flat `amountPaid` column.
pub fn record_amount_paid(record: &StudentRecord) -> u64 {
    match record.payment_status {
        Some(_) => amount_paid(record.payment_status.as_ref()),
        None => record.amount_paid.unwrap_or(0),
    }
}

pub fn derive(record: &StudentRecord, total_fee: u64) -> DerivedMetrics {
    let paid = record_amount_paid(record);
    DerivedMetrics {
        progress_percentage: progress_percentage(Some(&record.course_progress)),
        amount_paid: paid,
        payment_percentage: payment_percentage(paid, total_fee),
        outstanding: total_fee.saturating_sub(paid),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressBand {
    Low,
    Moderate,
    Progressing,
    Completed,
}

impl ProgressBand {
    pub fn for_percentage(percentage: u32) -> Self {
        match percentage {
            0..=39 => ProgressBand::Low,
            40..=69 => ProgressBand::Moderate,
            70..=99 => ProgressBand::Progressing,
            _ => ProgressBand::Completed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProgressBand::Low => "Low",
            ProgressBand::Moderate => "Moderate",
            ProgressBand::Progressing => "Progressing",
            ProgressBand::Completed => "Completed!",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            ProgressBand::Low => "red",
            ProgressBand::Moderate => "orange",
            ProgressBand::Progressing => "blue",
            ProgressBand::Completed => "green",
        }
    }

    /// Terminal counterpart of [`ProgressBand::color`].
    pub fn terminal_color(self) -> Color {
        match self {
            ProgressBand::Low => palette::RED,
            ProgressBand::Moderate => palette::ORANGE,
            ProgressBand::Progressing => palette::BLUE,
            ProgressBand::Completed => palette::GREEN,
        }
    }
}

mod palette {
    use crossterm::style::Color;

    pub const RED: Color = Color::Rgb { r: 220, g: 50, b: 47 };
    pub const ORANGE: Color = Color::Rgb { r: 255, g: 140, b: 0 };
    pub const BLUE: Color = Color::Rgb { r: 38, g: 139, b: 210 };
    pub const GREEN: Color = Color::Rgb { r: 133, g: 153, b: 0 };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CourseStatus, PaymentDetails};

    fn courses(statuses: &[&str]) -> CourseProgress {
        CourseProgress::new(
            statuses
                .iter()
                .enumerate()
                .map(|(i, status)| (format!("Module {i}"), CourseStatus::from(status.to_string())))
                .collect(),
        )
    }

    #[test]
    fn half_of_two_modules_is_fifty() {
        let progress = CourseProgress::new(vec![
            ("Module A".to_string(), CourseStatus::Completed),
            ("Module B".to_string(), CourseStatus::Pending("Not Completed".to_string())),
        ]);
        assert_eq!(progress_percentage(Some(&progress)), 50);
    }

    #[test]
    fn empty_or_missing_progress_is_zero() {
        assert_eq!(progress_percentage(Some(&CourseProgress::default())), 0);
        assert_eq!(progress_percentage(None), 0);
    }

    #[test]
    fn progress_rounds_half_up_and_stays_in_range() {
        // 1/3 -> 33.33, 2/3 -> 66.67, 1/8 -> 12.5
        assert_eq!(progress_percentage(Some(&courses(&["Completed", "No", "No"]))), 33);
        assert_eq!(progress_percentage(Some(&courses(&["Completed", "Completed", "No"]))), 67);
        let eighth = courses(&["Completed", "No", "No", "No", "No", "No", "No", "No"]);
        assert_eq!(progress_percentage(Some(&eighth)), 13);

        for total in 1..12 {
            for done in 0..=total {
                let mut statuses = vec!["Completed"; done];
                statuses.extend(vec!["Not Completed"; total - done]);
                let pct = progress_percentage(Some(&courses(&statuses)));
                assert!(pct <= 100);
            }
        }
    }

    #[test]
    fn payment_percentage_matches_fee_formula() {
        assert_eq!(payment_percentage(0, TOTAL_FEE), 0);
        assert_eq!(payment_percentage(TOTAL_FEE, TOTAL_FEE), 100);
        // 25000 / 36696 = 68.13%
        assert_eq!(payment_percentage(25_000, TOTAL_FEE), 68);
        // 18348 is exactly half
        assert_eq!(payment_percentage(18_348, TOTAL_FEE), 50);
    }

    #[test]
    fn missing_payment_is_zero() {
        assert_eq!(amount_paid(None), 0);
        let record = StudentRecord::default();
        let metrics = derive(&record, TOTAL_FEE);
        assert_eq!(metrics.amount_paid, 0);
        assert_eq!(metrics.payment_percentage, 0);
        assert_eq!(metrics.outstanding, TOTAL_FEE);
    }

    #[test]
    fn overpayment_is_not_clamped() {
        let record = StudentRecord {
            payment_status: Some(PaymentStatus::Amount(40_000)),
            ..StudentRecord::default()
        };
        let metrics = derive(&record, TOTAL_FEE);
        assert_eq!(metrics.payment_percentage, 109);
        assert_eq!(metrics.outstanding, 0);
    }

    #[test]
    fn payment_status_wins_over_flat_amount() {
        let record = StudentRecord {
            payment_status: Some(PaymentStatus::Detailed(PaymentDetails {
                paid: Some(10_000),
                ..PaymentDetails::default()
            })),
            amount_paid: Some(99),
            ..StudentRecord::default()
        };
        assert_eq!(record_amount_paid(&record), 10_000);

        let flat = StudentRecord {
            amount_paid: Some(20_000),
            ..StudentRecord::default()
        };
        assert_eq!(record_amount_paid(&flat), 20_000);
    }

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(ProgressBand::for_percentage(0), ProgressBand::Low);
        assert_eq!(ProgressBand::for_percentage(39), ProgressBand::Low);
        assert_eq!(ProgressBand::for_percentage(40), ProgressBand::Moderate);
        assert_eq!(ProgressBand::for_percentage(69), ProgressBand::Moderate);
        assert_eq!(ProgressBand::for_percentage(70), ProgressBand::Progressing);
        assert_eq!(ProgressBand::for_percentage(99), ProgressBand::Progressing);
        assert_eq!(ProgressBand::for_percentage(100), ProgressBand::Completed);
        assert_eq!(ProgressBand::for_percentage(100).color(), "green");
    }

    #[test]
    fn every_band_has_its_own_terminal_colour() {
        let bands = [
            ProgressBand::Low,
            ProgressBand::Moderate,
            ProgressBand::Progressing,
            ProgressBand::Completed,
        ];
        for (i, a) in bands.iter().enumerate() {
            for b in &bands[i + 1..] {
                assert_ne!(a.terminal_color(), b.terminal_color());
            }
        }
        assert_eq!(ProgressBand::Low.terminal_color(), palette::RED);
    }
}
