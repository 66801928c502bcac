pub mod assignment;
pub mod conflicts;
pub mod efficiency;
