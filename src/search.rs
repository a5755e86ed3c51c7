use crate::models::StudentRecord;

/// Records whose name, email or school name contains `query`, ignoring case.
/// Source order is kept; a blank query keeps everything.
pub fn filter_students<'a>(students: &'a [StudentRecord], query: &str) -> Vec<&'a StudentRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return students.iter().collect();
    }

    students
        .iter()
        .filter(|student| matches(student, &needle))
        .collect()
}

fn matches(student: &StudentRecord, needle: &str) -> bool {
    [&student.full_name, &student.email, &student.school_name]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(name: &str, email: &str, school: &str) -> StudentRecord {
        StudentRecord {
            full_name: name.to_string(),
            email: email.to_string(),
            school_name: school.to_string(),
            ..StudentRecord::default()
        }
    }

    fn roster() -> Vec<StudentRecord> {
        vec![
            student("Masereka Moses", "moses@example.com", "Kampala Primary School"),
            student("Sarah Nakato", "sarah@example.com", "Jinja Academy"),
            student("Grace Auma", "grace.auma@example.com", "Gulu High"),
            student("Ivan Ssentongo", "ivan@kampala.ac.ug", "Mukono Secondary"),
        ]
    }

    #[test]
    fn empty_query_returns_everything_in_order() {
        let students = roster();
        let filtered = filter_students(&students, "");
        assert_eq!(filtered.len(), students.len());
        for (kept, original) in filtered.iter().zip(students.iter()) {
            assert_eq!(*kept, original);
        }
        assert_eq!(filter_students(&students, "   ").len(), students.len());
    }

    #[test]
    fn school_match_is_case_insensitive() {
        let students = roster();
        let filtered = filter_students(&students, "KaMpAlA");
        let names: Vec<&str> = filtered.iter().map(|s| s.full_name.as_str()).collect();
        assert!(names.contains(&"Masereka Moses"));
        assert!(!names.contains(&"Sarah Nakato"));
    }

    #[test]
    fn matches_email_and_keeps_relative_order() {
        let students = roster();
        let filtered = filter_students(&students, "kampala");
        let names: Vec<&str> = filtered.iter().map(|s| s.full_name.as_str()).collect();
        assert_eq!(names, vec!["Masereka Moses", "Ivan Ssentongo"]);
    }

    #[test]
    fn filtered_is_a_subsequence() {
        let students = roster();
        for query in ["a", "example", "zzz", "Gulu", "s"] {
            let filtered = filter_students(&students, query);
            let mut cursor = 0;
            for kept in &filtered {
                let position = students[cursor..]
                    .iter()
                    .position(|s| std::ptr::eq(s, *kept))
                    .expect("element must come from the source in order");
                cursor += position + 1;
            }
        }
    }

    #[test]
    fn no_match_is_empty() {
        assert!(filter_students(&roster(), "Mbarara").is_empty());
    }
}
