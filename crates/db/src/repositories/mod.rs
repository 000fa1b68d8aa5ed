pub mod analysis_repo;
pub mod board_repo;
pub mod note_repo;
pub mod participant_repo;
pub mod question_repo;
pub mod workshop_repo;

pub use analysis_repo::AnalysisRepo;
pub use board_repo::BoardRepo;
pub use note_repo::NoteRepo;
pub use participant_repo::ParticipantRepo;
pub use question_repo::QuestionRepo;
pub use workshop_repo::WorkshopRepo;
