pub mod analysis;
pub mod board;
pub mod note;
pub mod participant;
pub mod question;
pub mod workshop;
