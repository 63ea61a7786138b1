use thiserror::Error;

use crate::exam::ExamSessionError;
use crate::model::ParseOptionLetterError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    ExamSession(#[from] ExamSessionError),
    #[error(transparent)]
    ParseOptionLetter(#[from] ParseOptionLetterError),
}
