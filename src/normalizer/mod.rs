mod recovery;

pub use recovery::{recover, recover_as, recover_or, Shape};
