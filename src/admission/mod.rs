//! Candidate admission: payload validation and materialization.
//!
//! Validation uses `Validation` to accumulate ALL violations across a batch
//! rather than stopping at the first, so content authors see every problem
//! in one pass. Materialization expands each payload into one item per
//! declared option.

use crate::core::{Item, Payload};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// One reason a payload cannot be admitted.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AdmissionViolation {
    #[error("Payload has an empty id")]
    EmptyId,

    #[error("Payload '{id}' declares no options")]
    NoOptions { id: String },

    #[error("Payload '{id}' declares surface '{surface}' variant '{variant}' twice")]
    DuplicateOption {
        id: String,
        surface: String,
        variant: String,
    },

    #[error("Payload '{id}' has negative cooldown {minutes} on surface '{surface}'")]
    NegativeCooldown {
        id: String,
        surface: String,
        minutes: i64,
    },
}

/// Validate one payload, accumulating every violation.
pub fn validate(payload: &Payload) -> Validation<(), NonEmptyVec<AdmissionViolation>> {
    let mut checks: Vec<Validation<(), NonEmptyVec<AdmissionViolation>>> = Vec::new();

    checks.push(if payload.id.is_empty() {
        Validation::fail(AdmissionViolation::EmptyId)
    } else {
        Validation::success(())
    });

    checks.push(if payload.options.is_empty() {
        Validation::fail(AdmissionViolation::NoOptions {
            id: payload.id.clone(),
        })
    } else {
        Validation::success(())
    });

    let mut seen: Vec<(&str, &str)> = Vec::new();
    for option in &payload.options {
        let key = (option.surface.as_str(), option.variant.as_str());
        checks.push(if seen.contains(&key) {
            Validation::fail(AdmissionViolation::DuplicateOption {
                id: payload.id.clone(),
                surface: option.surface.clone(),
                variant: option.variant.clone(),
            })
        } else {
            seen.push(key);
            Validation::success(())
        });

        if let Some(minutes) = option.cooldown_minutes {
            checks.push(if minutes < 0 {
                Validation::fail(AdmissionViolation::NegativeCooldown {
                    id: payload.id.clone(),
                    surface: option.surface.clone(),
                    minutes,
                })
            } else {
                Validation::success(())
            });
        }
    }

    Validation::all_vec(checks).map(|_| ())
}

/// Validate a batch and materialize it, accumulating violations across
/// every payload.
pub fn admit(payloads: &[Payload]) -> Validation<Vec<Item>, NonEmptyVec<AdmissionViolation>> {
    let checks: Vec<_> = payloads.iter().map(validate).collect();
    Validation::all_vec(checks).map(|_| materialize(payloads))
}

/// Expand each payload into one item per declared option.
pub fn materialize(payloads: &[Payload]) -> Vec<Item> {
    payloads
        .iter()
        .flat_map(|payload| {
            payload
                .options
                .iter()
                .map(move |option| Item::new(payload.clone(), option.clone()))
        })
        .collect()
}
