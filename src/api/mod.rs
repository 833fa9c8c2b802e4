pub mod format;

pub use format::{normalize_record, public_member, public_record, shape_page, RecordMapper};
