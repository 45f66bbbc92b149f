
/// Fully-associative cache tests.
pub mod fully_associative;

/// Randomized hierarchy property tests.
pub mod hierarchy_properties;


/// Set-associative cache tests.
pub mod set_associative;
