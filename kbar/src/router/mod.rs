pub mod load;
pub mod plan;
pub mod resample;
pub mod validate;

pub mod util;
