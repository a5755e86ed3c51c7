use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;
use crate::metrics;
use crate::models::{
    self, CourseProgress, CourseStatus, PaymentDetails, PaymentEntry, PaymentStatus,
    StudentRecord, SummaryRow,
};
use crate::views;

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistrationSheet {
    #[serde(default, rename = "Form Responses 1")]
    responses: Vec<StudentRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LedgerEntry {
    #[serde(default, rename = "Full Name", deserialize_with = "models::lenient_string")]
    pub full_name: String,
    #[serde(default, rename = "amountPaid", deserialize_with = "models::lenient_amount")]
    pub amount_paid: Option<u64>,
    #[serde(
        default,
        rename = "lastPaymentDate",
        deserialize_with = "models::lenient_optional_string"
    )]
    pub last_payment_date: Option<String>,
    #[serde(default, rename = "paymentHistory")]
    pub payment_history: Vec<PaymentEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct LedgerSheet {
    #[serde(default, rename = "Form Responses 1")]
    entries: Vec<LedgerEntry>,
}

fn read(path: &Path) -> Result<String, DashboardError> {
    std::fs::read_to_string(path).map_err(|source| DashboardError::Read {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_students(raw: &str) -> Result<Vec<StudentRecord>, DashboardError> {
    let sheet: RegistrationSheet = serde_json::from_str(raw)?;
    Ok(sheet.responses)
}

pub fn load_students(path: &Path) -> Result<Vec<StudentRecord>, DashboardError> {
    let students = parse_students(&read(path)?)?;
    tracing::debug!(path = %path.display(), count = students.len(), "loaded registrations");
    Ok(students)
}

pub fn parse_ledger(raw: &str) -> Result<Vec<LedgerEntry>, DashboardError> {
    let sheet: LedgerSheet = serde_json::from_str(raw)?;
    Ok(sheet.entries)
}

pub fn load_ledger(path: &Path) -> Result<Vec<LedgerEntry>, DashboardError> {
    parse_ledger(&read(path)?)
}

/// Attaches ledger payments to students that carry no payment data of their own, matching
/// on full name. Returns how many students were updated.
pub fn apply_ledger(students: &mut [StudentRecord], ledger: &[LedgerEntry]) -> usize {
    let by_name: HashMap<&str, &LedgerEntry> = ledger
        .iter()
        .map(|entry| (entry.full_name.trim(), entry))
        .collect();

    let mut applied = 0usize;
    let mut matched: HashSet<&str> = HashSet::new();
    for student in students.iter_mut() {
        let Some((name, entry)) = by_name.get_key_value(student.full_name.trim()) else {
            continue;
        };
        matched.insert(*name);
        if student.payment_status.is_some() || student.amount_paid.is_some() {
            continue;
        }
        student.payment_status = Some(PaymentStatus::Detailed(PaymentDetails {
            paid: entry.amount_paid,
            last_payment_date: entry.last_payment_date.clone(),
            history: entry.payment_history.clone(),
        }));
        applied += 1;
    }

    if matched.len() < by_name.len() {
        tracing::warn!(
            unmatched = by_name.len() - matched.len(),
            "ledger entries without a matching registration"
        );
    }
    applied
}

pub fn summary_rows(students: &[StudentRecord], total_fee: u64) -> Vec<SummaryRow> {
    students
        .iter()
        .map(|student| {
            let derived = metrics::derive(student, total_fee);
            SummaryRow {
                full_name: student.full_name.clone(),
                email: student.email.clone(),
                school_name: student.school_name.clone(),
                role_at_school: student.role_at_school.clone(),
                progress_percentage: derived.progress_percentage,
                amount_paid: derived.amount_paid,
                payment_percentage: derived.payment_percentage,
                registered: views::format_registration(&student.registered_at),
            }
        })
        .collect()
}

pub fn export_csv<W: Write>(
    writer: W,
    students: &[StudentRecord],
    total_fee: u64,
) -> Result<usize, DashboardError> {
    let mut out = csv::Writer::from_writer(writer);
    let rows = summary_rows(students, total_fee);
    for row in &rows {
        out.serialize(row)?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(rows.len())
}

pub fn to_json(students: &[StudentRecord]) -> Result<String, DashboardError> {
    let sheet = RegistrationSheet {
        responses: students.to_vec(),
    };
    Ok(serde_json::to_string_pretty(&sheet)?)
}

const MODULES: [&str; 5] = [
    "Introduction to Website Building",
    "Domains and Hosting",
    "Page Layout and Design",
    "Content Management",
    "Publishing and Maintenance",
];

fn progress(done: usize) -> CourseProgress {
    CourseProgress::new(
        MODULES
            .iter()
            .enumerate()
            .map(|(i, module)| {
                let status = if i < done {
                    CourseStatus::Completed
                } else {
                    CourseStatus::Pending("Not Completed".to_string())
                };
                (module.to_string(), status)
            })
            .collect(),
    )
}

/// Built-in registrations for demos and first runs.
pub fn seed() -> Vec<StudentRecord> {
    let rows = [
        (
            "Masereka Moses",
            "masereka.moses@awb.example",
            "+256 772 100 201",
            "Kasese Model Primary School",
            "Head Teacher",
            "Primary",
            "Kasese",
            "Laptop",
            "Yes",
            "1/15/2024 9:12:44",
            4,
            Some(25_000),
        ),
        (
            "Sarah Nakato",
            "sarah.nakato@awb.example",
            "+256 701 334 872",
            "Kampala Primary School",
            "Class Teacher",
            "Primary",
            "Kampala",
            "Smartphone",
            "Yes",
            "1/18/2024 14:05:10",
            5,
            Some(36_696),
        ),
        (
            "Michael Okello",
            "m.okello@awb.example",
            "0782 554 110",
            "Gulu High School",
            "ICT Teacher",
            "Secondary",
            "Gulu",
            "Laptop",
            "No",
            "1/22/2024 8:47:31",
            3,
            Some(20_000),
        ),
        (
            "Patricia Namubiru",
            "patricia.namubiru@awb.example",
            "0753 882 019",
            "Jinja Academy",
            "Deputy Head Teacher",
            "Secondary",
            "Jinja",
            "Desktop",
            "Yes",
            "1/25/2024 11:30:00",
            2,
            Some(30_000),
        ),
        (
            "Masereka Ronald",
            "ronald.m@awb.example",
            "0772 900 412",
            "Bwera Secondary School",
            "Teacher",
            "Secondary",
            "Kasese",
            "Smartphone",
            "No",
            "2/2/2024 16:20:55",
            1,
            None,
        ),
        (
            "Grace Auma",
            "grace.auma@awb.example",
            "0774 210 338",
            "Lira Town College",
            "Librarian",
            "Tertiary",
            "Lira",
            "Laptop",
            "Yes",
            "2/6/2024 10:02:17",
            0,
            None,
        ),
        (
            "Ivan Ssentongo",
            "ivan.ssentongo@awb.example",
            "0700 613 745",
            "Mukono Secondary School",
            "Director of Studies",
            "Secondary",
            "Mukono",
            "Tablet",
            "Yes",
            "2/9/2024 19:44:02",
            0,
            None,
        ),
    ];

    rows.into_iter()
        .map(
            |(
                name,
                email,
                phone,
                school,
                role,
                level,
                district,
                device,
                physical,
                registered,
                done,
                paid,
            )| StudentRecord {
                full_name: name.to_string(),
                email: email.to_string(),
                telephone: phone.to_string(),
                whatsapp: phone.to_string(),
                school_name: school.to_string(),
                role_at_school: role.to_string(),
                institution_level: level.to_string(),
                district: district.to_string(),
                study_device: device.to_string(),
                physical_classes: physical.to_string(),
                registered_at: registered.to_string(),
                course_progress: progress(done),
                payment_status: paid.map(|paid| {
                    PaymentStatus::Detailed(PaymentDetails {
                        paid: Some(paid),
                        ..PaymentDetails::default()
                    })
                }),
                amount_paid: None,
            },
        )
        .collect()
}
