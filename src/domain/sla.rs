//! SLA Calculator
//!
//! Pure functions mapping (device type, priority, creation time) to a target
//! completion time and a tri-state status. No I/O; the stored `sla_status`
//! column can go stale, so read paths recompute from the current clock.

use chrono::{DateTime, Duration, Utc};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceType { Printer, Fotocopy, Komputer, Lainnya }

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Priority { Urgent, High, Normal, Low }

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlaState { OnTime, AtRisk, Overdue }

impl DeviceType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "printer" => Some(Self::Printer),
            "fotocopy" => Some(Self::Fotocopy),
            "komputer" => Some(Self::Komputer),
            "lainnya" => Some(Self::Lainnya),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Printer => "printer",
            Self::Fotocopy => "fotocopy",
            Self::Komputer => "komputer",
            Self::Lainnya => "lainnya",
        }
    }

    fn base_hours(&self) -> i64 {
        match self {
            Self::Printer | Self::Lainnya => 48,
            Self::Fotocopy => 72,
            Self::Komputer => 96,
        }
    }
}

impl Priority {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "urgent" => Some(Self::Urgent),
            "high" => Some(Self::High),
            "normal" => Some(Self::Normal),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
        }
    }

    /// Multiplier expressed in percent to keep the arithmetic integral.
    fn multiplier_pct(&self) -> i64 {
        match self {
            Self::Urgent => 50,
            Self::High => 75,
            Self::Normal => 100,
            Self::Low => 150,
        }
    }
}

impl SlaState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnTime => "on-time",
            Self::AtRisk => "at-risk",
            Self::Overdue => "overdue",
        }
    }
}

/// Deadline for a ticket: `created_at + base_hours(device) * multiplier(priority)`.
pub fn calculate_target(device: DeviceType, priority: Priority, created_at: DateTime<Utc>) -> DateTime<Utc> {
    let minutes = device.base_hours() * 60 * priority.multiplier_pct() / 100;
    created_at + Duration::minutes(minutes)
}

/// Tri-state SLA status at a given instant. At-risk window is the last 12 hours.
pub fn status_of(target: DateTime<Utc>, now: DateTime<Utc>) -> SlaState {
    if now > target {
        SlaState::Overdue
    } else if target - now <= Duration::hours(12) {
        SlaState::AtRisk
    } else {
        SlaState::OnTime
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_printer_normal_is_48h() {
        assert_eq!(calculate_target(DeviceType::Printer, Priority::Normal, t0()), t0() + Duration::hours(48));
    }

    #[test]
    fn test_komputer_urgent_halves_96h() {
        assert_eq!(calculate_target(DeviceType::Komputer, Priority::Urgent, t0()), t0() + Duration::hours(48));
    }

    #[test]
    fn test_fotocopy_high() {
        // 72 * 0.75 = 54
        assert_eq!(calculate_target(DeviceType::Fotocopy, Priority::High, t0()), t0() + Duration::hours(54));
    }

    #[test]
    fn test_low_priority_relaxes_deadline() {
        assert_eq!(calculate_target(DeviceType::Lainnya, Priority::Low, t0()), t0() + Duration::hours(72));
    }

    #[test]
    fn test_status_boundaries() {
        let target = t0();
        assert_eq!(status_of(target, target - Duration::hours(13)), SlaState::OnTime);
        assert_eq!(status_of(target, target - Duration::hours(12)), SlaState::AtRisk);
        assert_eq!(status_of(target, target - Duration::hours(1)), SlaState::AtRisk);
        assert_eq!(status_of(target, target), SlaState::AtRisk);
        assert_eq!(status_of(target, target + Duration::seconds(1)), SlaState::Overdue);
    }

    #[test]
    fn test_parse_roundtrip() {
        for s in ["printer", "fotocopy", "komputer", "lainnya"] {
            assert_eq!(DeviceType::parse(s).unwrap().as_str(), s);
        }
        assert!(DeviceType::parse("laptop").is_none());
        assert!(Priority::parse("asap").is_none());
    }
}
