pub mod analysis;
pub mod join;
pub mod note;
pub mod play;
pub mod workshop;
