//! Admission decision over an integer allowance.

/// Outcome of one admission check
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Admission {
    pub admitted: bool,
    /// Allowance left once this request is accounted for.
    pub next: u32,
}

impl Admission {
    pub fn admit(next: u32) -> Self {
        Self { admitted: true, next }
    }

    pub fn deny() -> Self {
        Self {
            admitted: false,
            next: 0,
        }
    }
}

/// Decide for a client-held allowance.
///
/// A missing allowance is a first visit and receives `initial_grant`.
/// A positive allowance is admitted and decremented, zero is denied.
pub fn decide(current: Option<u32>, initial_grant: u32) -> Admission {
    match current {
        None => Admission::admit(initial_grant),
        Some(0) => Admission::deny(),
        Some(remaining) => Admission::admit(remaining - 1),
    }
}

/// Decide for the shared pool counter. Callers must hold the pool lock so the
/// decision and the write of `next` are observed together.
pub fn decide_shared(available: u32) -> Admission {
    match available {
        0 => Admission::deny(),
        n => Admission::admit(n - 1),
    }
}
