use crate::constants::field_names;
use crate::spec::mark::MarkEncodingSpec;
use sanddance_common::escape::datum_field;

/// True for rows the host has collapsed out of the current selection
pub fn test_for_collapse_selection() -> String {
    datum_field(field_names::COLLAPSED)
}

/// Rule that flattens a channel to zero while a row is collapsed
pub fn collapsed_to_zero() -> MarkEncodingSpec {
    MarkEncodingSpec::value(0).with_test(test_for_collapse_selection())
}
