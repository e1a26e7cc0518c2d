pub(crate) mod black_hole;
pub(crate) mod initial_parameters;
pub(crate) mod star;
pub(crate) mod surface;
pub(crate) mod units;
pub(crate) mod universe;
pub(crate) mod vector;
