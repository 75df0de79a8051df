//! DTOs module - Data Transfer Objects
//!
//! Questo modulo contiene tutti i DTOs usati per la comunicazione client-server.
//! I DTOs separano la rappresentazione esterna (API) dalla rappresentazione interna (entities).

pub mod alert;
pub mod calendar;
pub mod classe;
pub mod conversation;
pub mod grade;
pub mod message;
pub mod notification;
pub mod query;
pub mod session;
pub mod statistics;
pub mod timetable;
pub mod user;

// Re-exports per facilitare l'import
pub use alert::{AlertAudience, AlertDispatchDTO, CreateAlertDTO, NewAlertDTO};
pub use calendar::{CreateEventDTO, NewEventDTO, UpdateEventDTO};
pub use classe::{ClasseDTO, CreateClasseDTO, UpdateClasseDTO};
pub use conversation::{AddParticipantDTO, ConversationDTO, CreateConversationDTO, ParticipantDTO};
pub use grade::{CreateGradeDTO, NewGradeDTO, StudentGradesDTO, UpdateGradeDTO};
pub use message::{CreateMessageDTO, MessageDTO, SendMessageDTO};
pub use notification::{CreateNotificationDTO, ReadAllDTO, UnreadCountDTO};
pub use query::{
    AttendanceQuery, CalendarQuery, ClasseListQuery, GradeQuery, MessagesQuery,
    NotificationQuery, Page, Pagination, PaginationQuery, SessionQuery, StudentListQuery,
    TimetableQuery, UserListQuery,
};
pub use session::{
    AttendanceEntryDTO, AttendanceErrorDTO, BulkAttendanceResultDTO, CreateSessionDTO,
    RecordAttendanceDTO, UpdateSessionDTO,
};
pub use statistics::{ClasseStatsDTO, OverviewStatsDTO, SubjectAverageDTO, UserCountsDTO};
pub use timetable::{CreateTimetableDTO, UpdateTimetableDTO};
pub use user::{
    AssignClasseDTO, AssignParentDTO, ChangePasswordDTO, CreateUserDTO, LoginDTO,
    LoginResponseDTO, NewAccountDTO, NewParentDTO, NewStudentDTO, NewTeacherDTO, UpdateUserDTO,
    UserDTO, UserSummaryDTO,
};
