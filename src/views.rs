use std::fmt::Write;

use chrono::NaiveDateTime;
use crossterm::style::Stylize;

use crate::metrics::{self, ProgressBand};
use crate::models::{DashboardStats, DerivedMetrics, StudentRecord};
use crate::pagination::PageMeta;

const BAR_CELLS: usize = 20;
/// Terminals at least this wide get the table layout.
pub const WIDE_LAYOUT_MIN_COLUMNS: u16 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactChannel {
    Phone,
    WhatsApp,
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailField {
    School,
    District,
    Courses,
    Payment,
    Registration,
    StudyDevice,
    PhysicalClasses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Table,
    Cards,
}

impl Layout {
    pub fn for_width(columns: u16) -> Self {
        if columns >= WIDE_LAYOUT_MIN_COLUMNS {
            Layout::Table
        } else {
            Layout::Cards
        }
    }
}

/// Which parts of a record the summary and detail renderings show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewConfig {
    pub contacts: Vec<ContactChannel>,
    pub fields: Vec<DetailField>,
    pub total_fee: u64,
    pub color: bool,
}

impl ViewConfig {
    pub fn admin(total_fee: u64) -> Self {
        Self {
            contacts: vec![ContactChannel::Email, ContactChannel::Phone, ContactChannel::WhatsApp],
            fields: vec![
                DetailField::School,
                DetailField::District,
                DetailField::Courses,
                DetailField::Payment,
                DetailField::Registration,
                DetailField::StudyDevice,
                DetailField::PhysicalClasses,
            ],
            total_fee,
            color: false,
        }
    }

    pub fn student(total_fee: u64) -> Self {
        Self {
            contacts: vec![ContactChannel::Email, ContactChannel::WhatsApp],
            fields: vec![
                DetailField::School,
                DetailField::StudyDevice,
                DetailField::Courses,
                DetailField::District,
                DetailField::PhysicalClasses,
            ],
            total_fee,
            color: false,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn shows(&self, field: DetailField) -> bool {
        self.fields.contains(&field)
    }
}

pub fn digits_only(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub fn contact_uri(channel: ContactChannel, student: &StudentRecord) -> Option<String> {
    match channel {
        ContactChannel::Phone => {
            let digits = digits_only(&student.telephone);
            if digits.is_empty() {
                return None;
            }
            let prefix = if student.telephone.trim_start().starts_with('+') { "+" } else { "" };
            Some(format!("tel:{prefix}{digits}"))
        }
        ContactChannel::WhatsApp => {
            let digits = digits_only(&student.whatsapp);
            if digits.is_empty() {
                None
            } else {
                Some(format!("https://wa.me/{digits}"))
            }
        }
        ContactChannel::Email => {
            let email = student.email.trim();
            if email.is_empty() {
                None
            } else {
                Some(format!("mailto:{email}"))
            }
        }
    }
}

pub fn parse_registration(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), "%m/%d/%Y %H:%M:%S").ok()
}

/// `Jan 5, 2024, 3:07 PM`, or an empty string when the timestamp is unreadable.
pub fn format_registration(raw: &str) -> String {
    match parse_registration(raw) {
        Some(at) => at.format("%b %-d, %Y, %-I:%M %p").to_string(),
        None => {
            tracing::debug!(raw, "unparseable registration timestamp");
            String::new()
        }
    }
}

/// Short `M/D/YYYY` date for list rows.
pub fn format_registration_date(raw: &str) -> String {
    parse_registration(raw)
        .map(|at| at.format("%-m/%-d/%Y").to_string())
        .unwrap_or_default()
}

/// `36,696 UGX`
pub fn format_ugx(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{grouped} UGX")
}

pub fn last_name(full_name: &str) -> &str {
    full_name.split_whitespace().last().unwrap_or("")
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

fn progress_bar(percentage: u32, config: &ViewConfig) -> String {
    let filled = (percentage.min(100) as usize * BAR_CELLS + 50) / 100;
    let bar = format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_CELLS - filled));
    if config.color {
        let band = ProgressBand::for_percentage(percentage);
        bar.with(band.terminal_color()).to_string()
    } else {
        bar
    }
}

fn payment_line(derived: &DerivedMetrics) -> String {
    format!("{} ({}% paid)", format_ugx(derived.amount_paid), derived.payment_percentage)
}

pub fn render_stats(stats: &DashboardStats) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Total Students   {}", stats.total_students);
    let _ = writeln!(output, "Average Progress {}%", stats.average_progress);
    let _ = writeln!(output, "Total Revenue    {}", format_ugx(stats.total_revenue));
    let _ = writeln!(output, "Completion Rate  {}%", stats.completion_rate);
    output
}

/// One row or card per student. Row numbers start at `first_row` so selection can refer
/// to the number shown on screen.
pub fn render_summary(
    students: &[&StudentRecord],
    first_row: usize,
    layout: Layout,
    config: &ViewConfig,
) -> String {
    let mut output = String::new();

    if students.is_empty() {
        let _ = writeln!(output, "No students match this search.");
        return output;
    }

    match layout {
        Layout::Table => {
            let _ = writeln!(
                output,
                "{:>4}  {:<28} {:<26} {:<28} {:<24}",
                "#", "STUDENT", "SCHOOL", "PROGRESS", "PAYMENT"
            );
            for (offset, student) in students.iter().enumerate() {
                let derived = metrics::derive(student, config.total_fee);
                let _ = writeln!(
                    output,
                    "{:>4}  {:<28} {:<26} {} {:>4}%  {:<24}",
                    first_row + offset,
                    truncate(&student.full_name, 28),
                    truncate(&student.school_name, 26),
                    progress_bar(derived.progress_percentage, config),
                    derived.progress_percentage,
                    payment_line(&derived),
                );
                let _ = writeln!(
                    output,
                    "{:>4}  {:<28} {:<26}",
                    "",
                    truncate(&student.email, 28),
                    truncate(&student.role_at_school, 26)
                );
            }
        }
        Layout::Cards => {
            for (offset, student) in students.iter().enumerate() {
                let derived = metrics::derive(student, config.total_fee);
                let _ = writeln!(output, "[{}] {}", first_row + offset, student.full_name);
                let _ = writeln!(output, "    {}", student.school_name);
                let registered = format_registration_date(&student.registered_at);
                if !registered.is_empty() {
                    let _ = writeln!(output, "    Registered {registered}");
                }
                let _ = writeln!(
                    output,
                    "    Progress {} {}%",
                    progress_bar(derived.progress_percentage, config),
                    derived.progress_percentage
                );
                let _ = writeln!(output, "    Payment: {}", payment_line(&derived));
                let _ = writeln!(output);
            }
        }
    }

    output
}

pub fn render_page_footer(meta: &PageMeta) -> String {
    if meta.total_items == 0 {
        return "Page 1 of 1 (0 students)".to_string();
    }
    let first = (meta.page - 1) * meta.page_size + 1;
    let last = (meta.page * meta.page_size).min(meta.total_items);
    format!(
        "Showing {first}-{last} of {} students, page {} of {}",
        meta.total_items, meta.page, meta.total_pages
    )
}

pub fn render_detail(student: &StudentRecord, config: &ViewConfig) -> String {
    let derived = metrics::derive(student, config.total_fee);
    let mut output = String::new();

    let _ = writeln!(output, "== {} ==", student.full_name);

    if !config.contacts.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "Contact");
        for channel in &config.contacts {
            let (label, value) = match channel {
                ContactChannel::Email => ("Email", &student.email),
                ContactChannel::Phone => ("Tel", &student.telephone),
                ContactChannel::WhatsApp => ("WhatsApp", &student.whatsapp),
            };
            match contact_uri(*channel, student) {
                Some(uri) => {
                    let _ = writeln!(output, "  {label:<9} {value}  <{uri}>");
                }
                None => {
                    let _ = writeln!(output, "  {label:<9} -");
                }
            }
        }
    }

    if config.shows(DetailField::School) || config.shows(DetailField::District) {
        let _ = writeln!(output);
        let _ = writeln!(output, "School");
        if config.shows(DetailField::School) {
            let _ = writeln!(output, "  {}", student.school_name);
            let _ = writeln!(
                output,
                "  {} - {}",
                student.institution_level, student.role_at_school
            );
        }
        if config.shows(DetailField::District) {
            let _ = writeln!(output, "  District: {}", student.district);
        }
    }

    if config.shows(DetailField::Courses) {
        let band = ProgressBand::for_percentage(derived.progress_percentage);
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "Course Progress {} {}% ({})",
            progress_bar(derived.progress_percentage, config),
            derived.progress_percentage,
            band.label()
        );
        if student.course_progress.is_empty() {
            let _ = writeln!(output, "  No modules recorded.");
        }
        for (module, status) in student.course_progress.iter() {
            let mark = if status.is_completed() { "x" } else { " " };
            let _ = writeln!(output, "  [{mark}] {module:<40} {}", status.label());
        }
    }

    if config.shows(DetailField::Payment) {
        let _ = writeln!(output);
        let _ = writeln!(output, "Payment");
        let _ = writeln!(output, "  Paid:    {}", payment_line(&derived));
        let _ = writeln!(output, "  Balance: {}", format_ugx(derived.outstanding));
        if let Some(date) = student
            .payment_status
            .as_ref()
            .and_then(|status| status.last_payment_date())
        {
            let _ = writeln!(output, "  Last payment: {date}");
        }
    }

    let extras = [
        DetailField::Registration,
        DetailField::StudyDevice,
        DetailField::PhysicalClasses,
    ];
    if extras.iter().any(|field| config.shows(*field)) {
        let _ = writeln!(output);
        let _ = writeln!(output, "Additional Information");
        if config.shows(DetailField::Registration) {
            let _ = writeln!(
                output,
                "  Registered: {}",
                format_registration(&student.registered_at)
            );
        }
        if config.shows(DetailField::StudyDevice) {
            let _ = writeln!(output, "  Study Device: {}", student.study_device);
        }
        if config.shows(DetailField::PhysicalClasses) {
            let _ = writeln!(output, "  Physical Classes: {}", student.physical_classes);
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::TOTAL_FEE;
    use crate::models::{CourseProgress, CourseStatus, PaymentStatus};

    fn sample() -> StudentRecord {
        StudentRecord {
            full_name: "Masereka Moses".to_string(),
            email: " moses@example.com ".to_string(),
            telephone: "+256 772 123-456".to_string(),
            whatsapp: "0772 123 456".to_string(),
            school_name: "Kampala Primary School".to_string(),
            role_at_school: "Teacher".to_string(),
            institution_level: "Primary".to_string(),
            district: "Kasese".to_string(),
            registered_at: "1/5/2024 15:07:09".to_string(),
            course_progress: CourseProgress::new(vec![
                ("HTML Basics".to_string(), CourseStatus::Completed),
                ("CSS Layout".to_string(), CourseStatus::Pending("Not Completed".to_string())),
            ]),
            payment_status: Some(PaymentStatus::Amount(25_000)),
            ..StudentRecord::default()
        }
    }

    #[test]
    fn contact_uris_are_normalised() {
        let student = sample();
        assert_eq!(
            contact_uri(ContactChannel::WhatsApp, &student).as_deref(),
            Some("https://wa.me/0772123456")
        );
        assert_eq!(
            contact_uri(ContactChannel::Phone, &student).as_deref(),
            Some("tel:+256772123456")
        );
        assert_eq!(
            contact_uri(ContactChannel::Email, &student).as_deref(),
            Some("mailto:moses@example.com")
        );
        assert_eq!(contact_uri(ContactChannel::Phone, &StudentRecord::default()), None);
    }

    #[test]
    fn registration_formats_unpadded_input() {
        assert_eq!(format_registration("1/5/2024 15:07:09"), "Jan 5, 2024, 3:07 PM");
        assert_eq!(format_registration("12/25/2023 0:30:00"), "Dec 25, 2023, 12:30 AM");
        assert_eq!(format_registration_date("1/5/2024 9:03:00"), "1/5/2024");
    }

    #[test]
    fn malformed_registration_is_blank() {
        assert_eq!(format_registration(""), "");
        assert_eq!(format_registration("2024-01-05"), "");
        assert_eq!(format_registration("13/45/2024 1:00:00"), "");
    }

    #[test]
    fn ugx_groups_thousands() {
        assert_eq!(format_ugx(0), "0 UGX");
        assert_eq!(format_ugx(999), "999 UGX");
        assert_eq!(format_ugx(36_696), "36,696 UGX");
        assert_eq!(format_ugx(1_234_567), "1,234,567 UGX");
    }

    #[test]
    fn last_name_is_final_word() {
        assert_eq!(last_name("Masereka Moses"), "Moses");
        assert_eq!(last_name("Cher"), "Cher");
        assert_eq!(last_name(""), "");
    }

    #[test]
    fn layout_switches_at_breakpoint() {
        assert_eq!(Layout::for_width(80), Layout::Cards);
        assert_eq!(Layout::for_width(WIDE_LAYOUT_MIN_COLUMNS), Layout::Table);
    }

    #[test]
    fn detail_lists_courses_in_order_and_payment() {
        let text = render_detail(&sample(), &ViewConfig::admin(TOTAL_FEE));
        let html = text.find("HTML Basics").unwrap();
        let css = text.find("CSS Layout").unwrap();
        assert!(html < css);
        assert!(text.contains("50% (Moderate)"));
        assert!(text.contains("25,000 UGX (68% paid)"));
        assert!(text.contains("Registered: Jan 5, 2024, 3:07 PM"));
        assert!(text.contains("<https://wa.me/0772123456>"));
    }

    #[test]
    fn student_preset_hides_payment_and_phone() {
        let text = render_detail(&sample(), &ViewConfig::student(TOTAL_FEE));
        assert!(!text.contains("Payment"));
        assert!(!text.contains("tel:"));
        assert!(text.contains("mailto:moses@example.com"));
    }

    #[test]
    fn summary_numbers_rows_from_offset() {
        let student = sample();
        let rows = vec![&student];
        let cards = render_summary(&rows, 11, Layout::Cards, &ViewConfig::admin(TOTAL_FEE));
        assert!(cards.starts_with("[11] Masereka Moses"));
        let table = render_summary(&rows, 11, Layout::Table, &ViewConfig::admin(TOTAL_FEE));
        assert!(table.contains("  11  Masereka Moses"));
        assert!(render_summary(&[], 1, Layout::Table, &ViewConfig::admin(TOTAL_FEE))
            .contains("No students"));
    }

    #[test]
    fn progress_bar_fills_by_percentage() {
        let plain = ViewConfig::admin(TOTAL_FEE);
        assert_eq!(progress_bar(50, &plain), "[##########..........]");
        assert_eq!(progress_bar(109, &plain), format!("[{}]", "#".repeat(BAR_CELLS)));
        assert!(!progress_bar(0, &plain).contains('\u{1b}'));

        let coloured = progress_bar(50, &ViewConfig::admin(TOTAL_FEE).with_color(true));
        assert!(coloured.contains("[##########..........]"));
    }

    #[test]
    fn footer_describes_current_window() {
        let meta = PageMeta {
            page: 3,
            page_size: 10,
            total_items: 25,
            total_pages: 3,
            has_next: false,
            has_prev: true,
        };
        assert_eq!(render_page_footer(&meta), "Showing 21-25 of 25 students, page 3 of 3");
    }
}
