pub mod bet;
pub mod record;

pub use bet::{BetType, Sportsbook};
pub use record::{ModelError, ReceiptRecord, Teams};
