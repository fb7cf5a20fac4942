pub mod common;
pub mod note;
pub mod sync;
pub mod trip;
