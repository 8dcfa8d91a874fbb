use crate::DocId;

/// A boolean query that cannot be parsed. Positions are byte offsets into the query string.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("unexpected `{token}` at position {position}")]
    UnexpectedToken { token: String, position: usize },
    #[error("operator `{operator}` at position {position} is missing an operand")]
    MissingOperand { operator: &'static str, position: usize },
    #[error("empty parentheses at position {position}")]
    EmptyGroup { position: usize },
    #[error("unclosed parenthesis at position {position}")]
    UnclosedParen { position: usize },
    #[error("unmatched closing parenthesis at position {position}")]
    UnmatchedParen { position: usize },
    #[error("query nests deeper than {limit} levels at position {position}")]
    TooDeep { limit: usize, position: usize },
}

impl QueryError {
    pub fn position(&self) -> usize {
        match self {
            Self::UnexpectedToken { position, .. }
            | Self::MissingOperand { position, .. }
            | Self::EmptyGroup { position }
            | Self::UnclosedParen { position }
            | Self::UnmatchedParen { position }
            | Self::TooDeep { position, .. } => *position,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CollectionError {
    #[error("document id {0} occurs more than once")]
    DuplicateId(DocId),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown retrieval model `{0}` (expected one of: linear-boolean, inverted-boolean, vector-space, fuzzy-set, signature)")]
pub struct UnknownModel(pub String);
