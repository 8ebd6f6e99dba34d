use serde::{Deserialize, Serialize};

/// A host's activity record, as assembled by the (external) stats collaborator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HostActivity {
    pub days_active: u32,
    pub trips_completed: u32,
    pub incident_count: u32,
}

/// Which of the two qualifying paths was satisfied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualifyingPath {
    Tenure,
    Volume,
}

/// Tenure path: sustained presence plus a minimum trip count.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TenurePath {
    pub min_days_active: u32,
    pub min_trips: u32,
}

/// Volume path: trip count alone.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VolumePath {
    pub min_trips: u32,
}

/// Two-path OR rule behind a clean-record gate, shared by every program
/// check of this shape (loss-wage coverage and friends). The gate applies to
/// both paths; satisfying either path qualifies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EligibilityPolicy {
    pub clean_record_max_incidents: u32,
    pub tenure: TenurePath,
    pub volume: VolumePath,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EligibilityOutcome {
    pub eligible: bool,
    pub gate_passed: bool,
    pub qualified_path: Option<QualifyingPath>,
}

impl EligibilityPolicy {
    /// The loss-wage program rule: 90 days hosting with 10 trips, or 25
    /// trips outright, with at most one incident on record.
    pub fn loss_wage() -> Self {
        Self {
            clean_record_max_incidents: 1,
            tenure: TenurePath {
                min_days_active: 90,
                min_trips: 10,
            },
            volume: VolumePath { min_trips: 25 },
        }
    }

    pub fn evaluate(&self, activity: &HostActivity) -> EligibilityOutcome {
        if activity.incident_count > self.clean_record_max_incidents {
            return EligibilityOutcome {
                eligible: false,
                gate_passed: false,
                qualified_path: None,
            };
        }

        let qualified_path = if activity.days_active >= self.tenure.min_days_active
            && activity.trips_completed >= self.tenure.min_trips
        {
            Some(QualifyingPath::Tenure)
        } else if activity.trips_completed >= self.volume.min_trips {
            Some(QualifyingPath::Volume)
        } else {
            None
        };

        EligibilityOutcome {
            eligible: qualified_path.is_some(),
            gate_passed: true,
            qualified_path,
        }
    }
}
