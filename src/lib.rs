#![doc(html_root_url = "https://docs.rs/zipex/0.3.0")]
//! Zipex evaluates arithmetic expressions given as strings, e.g.,
//! ```rust
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! #
//! let result = zipex::evaluate("3! - ln(5-1) + 7 / 3^2")?;
//! assert!((result - 5.39148).abs() < 1e-4);
//! #
//! #     Ok(())
//! # }
//! ```
//! Supported are numbers, the constants `pi` and `e`, the infix operators
//! `+ - * / ^`, the prefix operators `ln`, `+`, and `-`, the postfix factorial `!`,
//! and parentheses. The factorial is defined for non-integers via the gamma function.
//!
//! Texts are lexed into atoms, parentheses are folded into the binding powers of the
//! operators, and the resulting tokens are assembled into one of two structures.
//! [`DeepEx`](DeepEx) is a binary tree built by precedence climbing.
//! [`FlatEx`](FlatEx) is a chain of links, also called zipper, that is built from the
//! back by a state machine and evaluated by local reductions. Both implement
//! [`Express`](Express) and compute the same values.
//! ```rust
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! #
//! use zipex::prelude::*;
//! let deepex = DeepEx::<f64>::parse("2^3!+1")?;
//! let flatex = FlatEx::<f64>::parse("2^3!+1")?;
//! assert_eq!(deepex.eval()?, flatex.eval()?);
//! #
//! #     Ok(())
//! # }
//! ```
//!
//! Domain violations are not errors. `ln(0)`, `1/0`, or `(-1)!` evaluate to
//! infinities or `NaN`.
//!
//! With the feature `serde` enabled, expressions serialize to the string they have
//! been parsed from.

use log::debug;

mod data_type;
pub mod definitions;
mod expression;
pub mod lexer;
pub mod operators;
pub mod parser;
mod result;
mod util;

pub use {
    data_type::Real,
    expression::{
        deep::{DeepEx, DeepNode},
        flat::{ChainState, FlatEx, Link},
        Express,
    },
    lexer::{tokenize, Atom},
    operators::{binding_power, Sign, SignKind},
    parser::{atoms_to_tokens, OpToken, Token},
    result::{ErrorCategory, ExError, ExErrorKind, ExResult},
};

/// Exports the trait and the expression types needed in most cases.
pub mod prelude {
    pub use super::{DeepEx, Express, FlatEx};
}

fn with_context<U>(text: &str, res: ExResult<U>) -> ExResult<U> {
    res.map_err(|e| crate::format_exerr!(e.kind, "cannot evaluate '{}': {}", text, e.msg))
}

/// Parses and evaluates a string with the tree pipeline in an arbitrary float type.
///
/// # Errors
///
/// The string cannot be lexed or does not form a valid expression. The error message
/// contains the string.
///
pub fn eval_str<T: Real>(text: &str) -> ExResult<T> {
    with_context(text, DeepEx::<T>::parse(text).and_then(|deepex| deepex.eval()))
}

/// Parses and evaluates a string in single precision.
/// ```rust
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// #
/// assert!((zipex::evaluate("ln4!")? - 3.17805).abs() < 1e-4);
/// assert!(zipex::evaluate("(1+2").is_err());
/// #
/// #     Ok(())
/// # }
/// ```
/// # Errors
///
/// See [`eval_str`](eval_str).
///
pub fn evaluate(text: &str) -> ExResult<f32> {
    let res = eval_str::<f32>(text);
    debug!("evaluate {} -> {:?}", text, res);
    res
}

/// Like [`evaluate`](evaluate) but uses the chain.
///
/// # Errors
///
/// See [`eval_str`](eval_str).
///
pub fn evaluate_chain(text: &str) -> ExResult<f32> {
    let res = with_context(
        text,
        FlatEx::<f32>::parse(text).and_then(|flatex| flatex.eval()),
    );
    debug!("evaluate chain {} -> {:?}", text, res);
    res
}

/// Decides whether an answer is close enough to the expected value, i.e., closer than
/// [`GRADING_TOLERANCE`](definitions::GRADING_TOLERANCE).
pub fn is_close(answer: f32, expected: f32) -> bool {
    (answer - expected).abs() < definitions::GRADING_TOLERANCE
}
