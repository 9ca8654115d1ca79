// Ledger repositories
//
// The repositories are the only writers of persisted state; the scan engine
// and sweeper go through them rather than touching the pool directly.

pub mod announcement;
pub mod check_mark;

pub use announcement::AnnouncementRepository;
pub use check_mark::CheckMarkRepository;
