use std::str::FromStr;

use crate::error::DashboardError;
use crate::models::StudentRecord;

/// Who is looking at the dashboard. Supplied by the caller; nothing here checks credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Admin,
    Student(usize),
}

impl FromStr for Viewer {
    type Err = DashboardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("admin") {
            return Ok(Viewer::Admin);
        }
        value
            .parse::<usize>()
            .map(Viewer::Student)
            .map_err(|_| DashboardError::InvalidViewer(value.to_string()))
    }
}

/// Viewer identity bound to the dataset it was resolved against.
#[derive(Debug, Clone, Copy)]
pub struct Session<'a> {
    pub viewer: Viewer,
    students: &'a [StudentRecord],
}

impl<'a> Session<'a> {
    pub fn new(viewer: Viewer, students: &'a [StudentRecord]) -> Result<Self, DashboardError> {
        if let Viewer::Student(index) = viewer {
            if index >= students.len() {
                return Err(DashboardError::UnknownStudent {
                    index,
                    len: students.len(),
                });
            }
        }
        Ok(Self { viewer, students })
    }

    pub fn require_admin(&self) -> Result<&'a [StudentRecord], DashboardError> {
        match self.viewer {
            Viewer::Admin => Ok(self.students),
            Viewer::Student(_) => Err(DashboardError::AdminRequired),
        }
    }

    /// The student's own record; admins must name the index they want to open.
    pub fn student(&self, index: Option<usize>) -> Result<&'a StudentRecord, DashboardError> {
        let index = match (self.viewer, index) {
            (Viewer::Student(own), _) => own,
            (Viewer::Admin, Some(index)) => index,
            (Viewer::Admin, None) => return Err(DashboardError::StudentRequired),
        };
        self.students.get(index).ok_or(DashboardError::UnknownStudent {
            index,
            len: self.students.len(),
        })
    }
}
