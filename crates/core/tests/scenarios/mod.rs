pub mod ambient;
pub mod end_to_end;
