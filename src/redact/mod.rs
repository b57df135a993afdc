//! Masking of personally identifiable fields before they reach the audit trail.

mod redactor;

pub use redactor::{
    redact, Redactor, EMAIL_FIELD, IP_ADDRESS_FIELD, NAME_FIELD, PATIENT_ID_FIELD,
};
