//! Pure business logic: SLA arithmetic, status transitions, order codes.

pub mod codes;
pub mod sla;
pub mod status;
