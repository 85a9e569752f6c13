use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::catalog::Course;
use crate::model::ids::CourseId;

/// Whether a certificate has been earned yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CertificateState {
    Pending,
    Earned,
}

/// Derived credential record for one enrolled course.
///
/// Certificates are a view, recomputed wholesale on every aggregation pass;
/// nothing here is a source of truth. The completion date comes from the
/// durable first-earned milestone recorded when progress first hit 100 %.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Certificate {
    pub id: String,
    pub course_id: CourseId,
    pub course_title: String,
    pub user_name: String,
    pub state: CertificateState,
    pub completion_date: Option<DateTime<Utc>>,
}

impl Certificate {
    /// Derives the certificate record for a course at the given progress.
    ///
    /// Total and deterministic: every course yields exactly one record,
    /// `Earned` iff `percent == 100`. `earned_at` is attached only in the
    /// earned state.
    #[must_use]
    pub fn derive(
        course: &Course,
        percent: u8,
        user_name: &str,
        earned_at: Option<DateTime<Utc>>,
    ) -> Self {
        let earned = percent == 100;
        let id = if earned {
            format!("cert-{}", course.id())
        } else {
            format!("cert-pending-{}", course.id())
        };

        Self {
            id,
            course_id: course.id().clone(),
            course_title: course.title().to_owned(),
            user_name: user_name.to_owned(),
            state: if earned {
                CertificateState::Earned
            } else {
                CertificateState::Pending
            },
            completion_date: if earned { earned_at } else { None },
        }
    }

    #[must_use]
    pub fn is_earned(&self) -> bool {
        self.state == CertificateState::Earned
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
