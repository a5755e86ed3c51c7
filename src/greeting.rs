use chrono::{Local, Timelike};

use crate::views::last_name;

pub fn greeting_for_hour(hour: u32) -> &'static str {
    match hour {
        5..=11 => "Good morning",
        12..=16 => "Good afternoon",
        17..=21 => "Good evening",
        _ => "Good night",
    }
}

/// "Good morning, Tr. Moses"
pub fn greet(full_name: &str, hour: u32) -> String {
    format!("{}, Tr. {}", greeting_for_hour(hour), last_name(full_name))
}

pub fn greet_now(full_name: &str) -> String {
    greet(full_name, Local::now().hour())
}
