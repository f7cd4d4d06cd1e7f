use crate::domain::pos::{Pos, PosId};
use crate::domain::review::{Review, ReviewId};
use crate::domain::user::{User, UserId};
use crate::error::{Result, ReviewError};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Pos,
    User,
    Create,
    Approve,
    Update,
    Delete,
}

/// One raw row of a command batch. Unused columns may be left empty.
#[derive(Debug, Deserialize)]
struct CommandRecord {
    op: Operation,
    pos: Option<u64>,
    author: Option<u64>,
    user: Option<u64>,
    review: Option<u64>,
    text: Option<String>,
}

/// A request against the review workflow or its registries.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    RegisterPos(Pos),
    RegisterUser(User),
    Create(Review),
    /// Ids stay optional so the engine decides which missing one to report.
    Approve {
        review: Option<ReviewId>,
        user: Option<UserId>,
    },
    Update {
        review: ReviewId,
        text: String,
    },
    Delete(ReviewId),
}

fn required(value: Option<u64>, column: &str, op: Operation) -> Result<u64> {
    value.ok_or_else(|| {
        ReviewError::InvalidCommand(format!("'{column}' is required for {op:?}"))
    })
}

impl TryFrom<CommandRecord> for Command {
    type Error = ReviewError;

    fn try_from(record: CommandRecord) -> Result<Self> {
        let op = record.op;
        let text = record.text.unwrap_or_default();
        match op {
            Operation::Pos => Ok(Command::RegisterPos(Pos::new(
                required(record.pos, "pos", op)?,
                text,
            ))),
            Operation::User => Ok(Command::RegisterUser(User::new(
                required(record.user, "user", op)?,
                text,
            ))),
            Operation::Create => Ok(Command::Create(Review::new(
                PosId(required(record.pos, "pos", op)?),
                UserId(required(record.author, "author", op)?),
                text,
            ))),
            Operation::Approve => Ok(Command::Approve {
                review: record.review.map(ReviewId),
                user: record.user.map(UserId),
            }),
            Operation::Update => Ok(Command::Update {
                review: ReviewId(required(record.review, "review", op)?),
                text,
            }),
            Operation::Delete => Ok(Command::Delete(ReviewId(required(
                record.review,
                "review",
                op,
            )?))),
        }
    }
}

/// Reads review commands from a CSV source.
///
/// Expects the header `op, pos, author, user, review, text`. Whitespace is
/// trimmed and short rows are accepted, missing trailing columns read as empty.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and validates commands.
    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader
            .into_deserialize::<CommandRecord>()
            .map(|result| result.map_err(ReviewError::from).and_then(Command::try_from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(data: &str) -> Vec<Result<Command>> {
        CommandReader::new(data.as_bytes()).commands().collect()
    }

    #[test]
    fn test_reader_valid_stream() {
        let data = "op, pos, author, user, review, text\n\
                    pos, 7, , , , Mensa\n\
                    user, , , 1, , alice\n\
                    create, 7, 1, , ,\"Good, cheap coffee\"\n\
                    approve, , , 2, 1,\n\
                    update, , , , 1, Better coffee now\n\
                    delete, , , , 1";
        let results = parse(data);

        assert_eq!(results.len(), 6);
        assert_eq!(
            results[0].as_ref().unwrap(),
            &Command::RegisterPos(Pos::new(7, "Mensa"))
        );
        assert_eq!(
            results[1].as_ref().unwrap(),
            &Command::RegisterUser(User::new(1, "alice"))
        );
        assert_eq!(
            results[2].as_ref().unwrap(),
            &Command::Create(Review::new(PosId(7), UserId(1), "Good, cheap coffee"))
        );
        assert_eq!(
            results[3].as_ref().unwrap(),
            &Command::Approve {
                review: Some(ReviewId(1)),
                user: Some(UserId(2)),
            }
        );
        assert_eq!(
            results[4].as_ref().unwrap(),
            &Command::Update {
                review: ReviewId(1),
                text: "Better coffee now".to_string(),
            }
        );
        assert_eq!(
            results[5].as_ref().unwrap(),
            &Command::Delete(ReviewId(1))
        );
    }

    #[test]
    fn test_approve_keeps_missing_ids() {
        let results = parse("op, pos, author, user, review, text\napprove, , , , ,");
        assert_eq!(
            results[0].as_ref().unwrap(),
            &Command::Approve {
                review: None,
                user: None,
            }
        );
    }

    #[test]
    fn test_reader_malformed_lines() {
        let data = "op, pos, author, user, review, text\n\
                    rate, 7, 1, , , nope\n\
                    create, , 1, , , missing pos\n\
                    create, x, 1, , , bad id\n\
                    update, , , , , no review";
        let results = parse(data);

        assert!(matches!(results[0], Err(ReviewError::CsvError(_))));
        assert!(matches!(results[1], Err(ReviewError::InvalidCommand(_))));
        assert!(matches!(results[2], Err(ReviewError::CsvError(_))));
        assert!(matches!(results[3], Err(ReviewError::InvalidCommand(_))));
    }
}
