pub mod projection;
pub mod record;
pub mod secured;

pub use projection::{Projection, SecuredProjection};
pub use record::{Entity, Record, RecordOptions};
pub use secured::{SecuredRecord, SecurityFlags};
