use std::fmt;

use serde::de::{IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const COMPLETED_LABEL: &str = "Completed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum CourseStatus {
    Completed,
    /// Anything other than the exact "Completed" label, kept verbatim for display.
    Pending(String),
}

impl CourseStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, CourseStatus::Completed)
    }

    pub fn label(&self) -> &str {
        match self {
            CourseStatus::Completed => COMPLETED_LABEL,
            CourseStatus::Pending(label) => label,
        }
    }
}

impl From<String> for CourseStatus {
    fn from(value: String) -> Self {
        if value == COMPLETED_LABEL {
            CourseStatus::Completed
        } else {
            CourseStatus::Pending(value)
        }
    }
}

impl From<CourseStatus> for String {
    fn from(value: CourseStatus) -> Self {
        value.label().to_string()
    }
}

impl<'de> Deserialize<'de> for CourseStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient_string(deserializer).map(CourseStatus::from)
    }
}

// Sheet exports are loosely typed: a blank cell comes through as null, a phone number as a
// JSON number, an amount as a float or a quoted string. None of these may fail a load.

fn text_from(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Whole UGX from an integer, a float (truncated) or a numeric string. Negative or
/// non-numeric input is no amount at all.
fn amount_from(value: &Value) -> Option<u64> {
    let from_float = |amount: f64| (amount.is_finite() && amount >= 0.0).then(|| amount as u64);
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().and_then(from_float)),
        Value::String(text) => {
            let text: String = text.trim().chars().filter(|c| *c != ',').collect();
            text.parse::<u64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(from_float))
        }
        _ => None,
    }
}

pub(crate) fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<String, D::Error> {
    Ok(text_from(Value::deserialize(deserializer)?).unwrap_or_default())
}

pub(crate) fn lenient_optional_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(text_from(Value::deserialize(deserializer)?))
}

pub(crate) fn lenient_amount<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<u64>, D::Error> {
    Ok(amount_from(&Value::deserialize(deserializer)?))
}

fn lenient_amount_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Ok(lenient_amount(deserializer)?.unwrap_or(0))
}

fn lenient_payment<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<PaymentStatus>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(PaymentStatus::from_value(value))
}

/// Course modules in the order the data source listed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseProgress(Vec<(String, CourseStatus)>);

impl CourseProgress {
    pub fn new(entries: Vec<(String, CourseStatus)>) -> Self {
        Self(entries)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn completed_count(&self) -> usize {
        self.0.iter().filter(|(_, status)| status.is_completed()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CourseStatus)> {
        self.0.iter().map(|(name, status)| (name.as_str(), status))
    }
}

impl Serialize for CourseProgress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, status) in &self.0 {
            map.serialize_entry(name, status.label())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CourseProgress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = CourseProgress;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of course names to status labels")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(CourseProgress::default())
            }

            // any scalar or list where the map belongs means no modules are recorded
            fn visit_bool<E: serde::de::Error>(self, _: bool) -> Result<Self::Value, E> {
                Ok(CourseProgress::default())
            }

            fn visit_i64<E: serde::de::Error>(self, _: i64) -> Result<Self::Value, E> {
                Ok(CourseProgress::default())
            }

            fn visit_u64<E: serde::de::Error>(self, _: u64) -> Result<Self::Value, E> {
                Ok(CourseProgress::default())
            }

            fn visit_f64<E: serde::de::Error>(self, _: f64) -> Result<Self::Value, E> {
                Ok(CourseProgress::default())
            }

            fn visit_str<E: serde::de::Error>(self, _: &str) -> Result<Self::Value, E> {
                Ok(CourseProgress::default())
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                while access.next_element::<IgnoredAny>()?.is_some() {}
                Ok(CourseProgress::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, CourseStatus)> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, status)) = access.next_entry::<String, CourseStatus>()? {
                    // later duplicates win but keep the first position
                    if let Some(slot) = entries.iter_mut().find(|(existing, _)| *existing == name) {
                        slot.1 = status;
                    } else {
                        entries.push((name, status));
                    }
                }
                Ok(CourseProgress(entries))
            }
        }

        deserializer.deserialize_any(OrderedVisitor)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentEntry {
    #[serde(default, deserialize_with = "lenient_amount_or_zero")]
    pub amount: u64,
    #[serde(default, deserialize_with = "lenient_optional_string")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetails {
    #[serde(default, deserialize_with = "lenient_amount")]
    pub paid: Option<u64>,
    #[serde(
        default,
        rename = "lastPaymentDate",
        deserialize_with = "lenient_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_payment_date: Option<String>,
    #[serde(
        default,
        rename = "paymentHistory",
        deserialize_with = "lenient_history",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub history: Vec<PaymentEntry>,
}

fn lenient_history<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<PaymentEntry>, D::Error> {
    let entries = match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries,
        _ => return Ok(Vec::new()),
    };
    Ok(entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect())
}

/// Both shapes the registration exports have used for payment data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PaymentStatus {
    Amount(u64),
    Detailed(PaymentDetails),
}

impl<'de> Deserialize<'de> for PaymentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        PaymentStatus::from_value(value).ok_or_else(|| {
            serde::de::Error::custom("expected a payment amount or a payment details object")
        })
    }
}

impl PaymentStatus {
    /// A bare amount, a details object, or `None` for anything unrecognisable (null, a
    /// list, a non-numeric string).
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(_) => match serde_json::from_value(value) {
                Ok(details) => Some(PaymentStatus::Detailed(details)),
                Err(error) => {
                    tracing::debug!(%error, "ignoring unreadable payment details");
                    None
                }
            },
            other => amount_from(&other).map(PaymentStatus::Amount),
        }
    }

    pub fn paid(&self) -> u64 {
        match self {
            PaymentStatus::Amount(amount) => *amount,
            PaymentStatus::Detailed(details) => details.paid.unwrap_or(0),
        }
    }

    pub fn last_payment_date(&self) -> Option<&str> {
        match self {
            PaymentStatus::Amount(_) => None,
            PaymentStatus::Detailed(details) => details.last_payment_date.as_deref(),
        }
    }
}

/// One registration form response. The serde names are the form's column labels; nothing
/// past the loader addresses fields by label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    #[serde(default, deserialize_with = "lenient_string", rename = "Full Name")]
    pub full_name: String,
    #[serde(default, deserialize_with = "lenient_string", rename = "Email Address")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string", rename = "Telephone contact")]
    pub telephone: String,
    #[serde(default, deserialize_with = "lenient_string", rename = "WhatsApp number")]
    pub whatsapp: String,
    #[serde(default, deserialize_with = "lenient_string", rename = "School Name")]
    pub school_name: String,
    #[serde(default, deserialize_with = "lenient_string", rename = "Role at School")]
    pub role_at_school: String,
    #[serde(default, deserialize_with = "lenient_string", rename = "Level of Institution")]
    pub institution_level: String,
    #[serde(default, deserialize_with = "lenient_string", rename = "District of Residence")]
    pub district: String,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        rename = "Which device will you use for study during the course?"
    )]
    pub study_device: String,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        rename = "Can you attend physical classes if the training centre is around Kampala?"
    )]
    pub physical_classes: String,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        rename = "Timestamp",
        alias = "Registration date"
    )]
    pub registered_at: String,
    #[serde(default, rename = "courseProgress")]
    pub course_progress: CourseProgress,
    #[serde(
        default,
        rename = "paymentStatus",
        deserialize_with = "lenient_payment",
        skip_serializing_if = "Option::is_none"
    )]
    pub payment_status: Option<PaymentStatus>,
    #[serde(
        default,
        rename = "amountPaid",
        deserialize_with = "lenient_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount_paid: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedMetrics {
    pub progress_percentage: u32,
    pub amount_paid: u64,
    pub payment_percentage: u32,
    pub outstanding: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardStats {
    pub total_students: usize,
    pub average_progress: u32,
    pub total_revenue: u64,
    pub completion_rate: u32,
}

/// Flat row written by the CSV export.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub full_name: String,
    pub email: String,
    pub school_name: String,
    pub role_at_school: String,
    pub progress_percentage: u32,
    pub amount_paid: u64,
    pub payment_percentage: u32,
    pub registered: String,
}
