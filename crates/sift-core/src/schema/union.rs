use super::{Annotation, Schema};
use crate::validation::ValidationError;
use log::debug;

/// Accept a value matching either branch
///
/// `a` is tried first and wins on success. When both branches fail, their
/// failures are peer-merged so the caller sees why every branch rejected the
/// value.
pub fn union(a: impl Into<Schema>, b: impl Into<Schema>) -> Schema {
    let (a, b) = (a.into(), b.into());
    let annotation = Annotation::Union(a.clone(), b.clone());
    Schema::new().push_apply(
        move |value| {
            let mut error = ValidationError::new();
            for branch in [&a, &b] {
                match branch.parse_ref(value) {
                    Ok(parsed) => return Ok(parsed),
                    Err(failure) => error.merge(failure),
                }
            }
            debug!("no union branch accepted a {}", value.kind_name());
            Err(error)
        },
        vec![annotation],
    )
}
