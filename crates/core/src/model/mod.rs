mod catalog;
mod ids;
mod question;
mod stage;
mod user;

pub use catalog::DomainCategory;
pub use ids::{QuestionId, StudentId};
pub use question::{OptionLetter, ParseOptionLetterError, Question, UNSURE_OPTION_TEXT};
pub use stage::Stage;
pub use user::{UserRecord, UserUpdate, progress};
