//! A single wager placed through an agency.

/// One bet record, as produced by the record source.
///
/// All fields are required and non-empty; validating that is the
/// record source's job, not this type's. Field values must not
/// contain `,` or `=` because the text wire encoding does not escape
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bet {
    /// Identity of the agency submitting the bet.
    pub agency_id: String,
    pub first_name: String,
    pub last_name: String,
    pub document: String,
    pub birth_date: String,
    pub number: String,
}
