//! Status state machines for orders and service tickets.
//!
//! Statuses are persisted as strings but every mutation goes through these
//! transition tables, so an operator cannot jump a `pending` order straight
//! to `delivered` or revive a cancelled ticket.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Paid,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    PaymentRejected,
}

impl OrderStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            "confirmed" => Some(Self::Confirmed),
            "processing" => Some(Self::Processing),
            "shipped" => Some(Self::Shipped),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            "payment_rejected" => Some(Self::PaymentRejected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::PaymentRejected => "payment_rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled | Self::PaymentRejected)
    }

    /// Forward chain plus the two side exits. Cancellation is allowed any time
    /// before the parcel leaves; payment rejection only while payment is open.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (Pending, Paid) => true,
            (Pending, PaymentRejected) => true,
            (Paid, Confirmed) => true,
            (Confirmed, Processing) => true,
            (Processing, Shipped) => true,
            (Shipped, Delivered) => true,
            (Pending | Paid | Confirmed | Processing, Cancelled) => true,
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceStatus {
    Received,
    Checking,
    Repairing,
    Done,
    Delivered,
    Cancelled,
}

impl ServiceStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "received" => Some(Self::Received),
            "checking" => Some(Self::Checking),
            "repairing" => Some(Self::Repairing),
            "done" => Some(Self::Done),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Checking => "checking",
            Self::Repairing => "repairing",
            Self::Done => "done",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Linear repair pipeline; cancellation exits from any non-terminal state.
    pub fn can_transition_to(&self, next: ServiceStatus) -> bool {
        use ServiceStatus::*;
        match (self, next) {
            (Received, Checking) => true,
            (Checking, Repairing) => true,
            (Repairing, Done) => true,
            (Done, Delivered) => true,
            (s, Cancelled) if !s.is_terminal() => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_happy_path() {
        use OrderStatus::*;
        let chain = [Pending, Paid, Confirmed, Processing, Shipped, Delivered];
        for pair in chain.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{:?} -> {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_order_rejects_skips() {
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn test_order_side_exits() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::PaymentRejected));
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::PaymentRejected));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_service_pipeline() {
        use ServiceStatus::*;
        assert!(Received.can_transition_to(Checking));
        assert!(Checking.can_transition_to(Repairing));
        assert!(!Received.can_transition_to(Done));
        assert!(Repairing.can_transition_to(Cancelled));
        assert!(!Delivered.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Received));
    }

    #[test]
    fn test_status_strings_roundtrip() {
        for s in ["pending", "paid", "confirmed", "processing", "shipped", "delivered", "cancelled", "payment_rejected"] {
            assert_eq!(OrderStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(OrderStatus::parse("refunded").is_none());
    }
}
