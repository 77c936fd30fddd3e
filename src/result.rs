use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Coarse classification of what went wrong.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub enum ErrorCategory {
    /// The text contains something the lexer does not know.
    Lex,
    /// The atoms are known but do not form an expression.
    Structural,
}

/// What exactly went wrong. Tree and chain report the same kind for an input with a
/// single defect. Inputs with several defects may be reported with different kinds,
/// since the tree meets them from the front and the chain from the back. The
/// [`ErrorCategory`](ErrorCategory) always coincides.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub enum ExErrorKind {
    /// Unknown symbol such as `%` or `\`.
    UnknownOperator,
    /// Unknown name such as `sin`.
    UnknownIdentifier,
    /// A run of digits and dots that is not a number, e.g., `3.4.`.
    InvalidNumber,
    NonAscii,
    UnmatchedOpenParen,
    UnmatchedCloseParen,
    /// Parentheses nested deeper than [`MAX_PAREN_DEPTH`](crate::definitions::MAX_PAREN_DEPTH)
    /// or a tree higher than [`MAX_TREE_DEPTH`](crate::definitions::MAX_TREE_DEPTH).
    TooDeeplyNested,
    EmptyExpression,
    /// An operator is missing its operand, e.g., `2+` or `*3`.
    IncompleteExpression,
    /// An operator appears where a value is required, e.g., `2+*3`.
    UnexpectedOperator,
    /// A value appears where an operator is required, e.g., `2 3`.
    UnexpectedValue,
    /// A chain where no link can be reduced anymore.
    IrreducibleChain,
}

impl ExErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ExErrorKind::UnknownOperator
            | ExErrorKind::UnknownIdentifier
            | ExErrorKind::InvalidNumber
            | ExErrorKind::NonAscii => ErrorCategory::Lex,
            _ => ErrorCategory::Structural,
        }
    }
}

/// This will be thrown at you if something within Zipex went wrong. Ok, obviously it is not an
/// exception, so thrown needs to be understood figuratively.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub struct ExError {
    pub kind: ExErrorKind,
    pub msg: String,
}
impl ExError {
    pub fn new(kind: ExErrorKind, msg: &str) -> ExError {
        ExError {
            kind,
            msg: msg.to_string(),
        }
    }
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }
}
impl Display for ExError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.msg)
    }
}
impl Error for ExError {}

/// Zipex' result type with [`ExError`](ExError) as error type.
pub type ExResult<U> = Result<U, ExError>;

/// Creates an [`ExError`](ExError) with a formatted message.
/// ```rust
/// use zipex::{format_exerr, ExErrorKind};
/// let err = format_exerr!(ExErrorKind::UnknownOperator, "unknown operator {}", '%');
/// assert_eq!(err.msg, "unknown operator %");
/// ```
#[macro_export]
macro_rules! format_exerr {
    ($kind:expr, $s:literal, $( $exps:expr ),*) => {
        $crate::ExError::new($kind, format!($s, $($exps,)*).as_str())
    }
}

/// Creates an `Err` variant of an [`ExResult`](ExResult) with a formatted message.
#[macro_export]
macro_rules! exerr {
    ($kind:expr, $s:literal, $( $exps:expr ),*) => {
        Err($crate::format_exerr!($kind, $s, $($exps),*))
    };
    ($kind:expr, $s:literal) => {
        Err($crate::ExError::new($kind, $s))
    };
}
