//! Recovery of the permission annotation from a method's unknown option fields.

use crate::wire;

/// Separates individual permissions inside the annotation string.
pub const PERMISSION_DELIMITER: char = ',';

/// Extracts the required permissions annotated on a method.
///
/// `unknown_fields` is the wire-encoded tail of the method's options which
/// the descriptor types did not recognise. The annotation is the string
/// stored under `field_number`, split on [`PERMISSION_DELIMITER`]. Tokens are
/// returned verbatim: they are not trimmed, deduplicated or checked for
/// emptiness.
///
/// An absent annotation and an empty annotation both produce an empty list.
pub fn extract_permissions(unknown_fields: &[u8], field_number: u32) -> Vec<String> {
    match wire::extract_string(unknown_fields, field_number) {
        Some(annotation) if !annotation.is_empty() => annotation
            .split(PERMISSION_DELIMITER)
            .map(ToOwned::to_owned)
            .collect(),
        _ => Vec::new(),
    }
}
