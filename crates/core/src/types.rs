use uuid::Uuid;

/// All database primary keys except participants are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Anonymous participant identity.
///
/// A bearer capability: issued at join time, stored only in the client's
/// local session, and trusted on possession. UUID v4 so it is unguessable —
/// possession is the entire authentication story for participants.
pub type ParticipantId = Uuid;

/// Authenticated facilitator identity — the `sub` claim of a validated JWT
/// issued by the external identity provider.
///
/// Kept as a separate alias from [`ParticipantId`] on purpose: the two
/// identity classes have different trust levels and lifecycles and must not
/// be unified into one "user" abstraction.
pub type FacilitatorId = Uuid;

/// Upper bound on note content length, in characters.
pub const MAX_NOTE_LENGTH: usize = 2000;

/// Number of distinct sticky-note / participant colors the UI cycles through.
pub const COLOR_COUNT: i32 = 8;
