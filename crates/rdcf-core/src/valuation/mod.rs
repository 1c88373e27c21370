pub mod compounding;
pub mod growth;
pub mod inputs;
pub mod intrinsic;
pub mod overvaluation;
pub mod reverse_dcf;
pub mod terminal;

pub use inputs::ModelInputs;
pub use overvaluation::{ObservedMultiples, ValuationResult, Verdict};
