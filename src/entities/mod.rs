//! Entities module - Entità del dominio applicativo
//!
//! Questo modulo contiene tutte le entità (models) che rappresentano i dati persistiti nel database.
//! Ogni entity corrisponde a una tabella nel database.

pub mod alert;
pub mod attendance;
pub mod calendar_event;
pub mod classe;
pub mod conversation;
pub mod enums;
pub mod grade;
pub mod message;
pub mod notification;
pub mod session;
pub mod timetable;
pub mod user;
pub mod user_ref;

// Re-exports per facilitare l'import
pub use alert::Alert;
pub use attendance::Attendance;
pub use calendar_event::CalendarEvent;
pub use classe::Classe;
pub use conversation::{Conversation, ConversationParticipant};
pub use enums::{AlertLevel, AttendanceStatus, NotificationKind, SessionKind, UserKind};
pub use grade::{Grade, weighted_average};
pub use message::Message;
pub use notification::Notification;
pub use session::Session;
pub use timetable::Timetable;
pub use user::{Account, Administrator, ParentUser, Student, Teacher, hash_password};
pub use user_ref::UserRef;
